//! Coordinate shifts.
//!
//! Shifting moves every address in a scope tree by a fixed number of rows
//! and columns, so that a layout written for one corner of a plate can be
//! spliced into another. Shifts are written as `"A1 to C4"`: whatever was at
//! `A1` ends up at `C4`.

use crate::coord::{col_index, col_name, row_index, row_name, well_index, WellIndex};
use crate::error::{LayoutError, LayoutResult};
use crate::pattern::{PatternKind, PatternShape};
use crate::scope::{ScopeEntries, ScopeKind, ScopeTree};
use std::fmt;
use std::ops::{Add, Neg};
use std::str::FromStr;

/// Row and column offset of a shift.
///
/// Composing and negating saturate instead of overflowing; a saturated shift
/// moves every address off the plate, which fails when it is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShiftVector {
    pub di: i64,
    pub dj: i64,
}

impl ShiftVector {
    pub const ZERO: ShiftVector = ShiftVector { di: 0, dj: 0 };

    pub const fn new(di: i64, dj: i64) -> Self {
        Self { di, dj }
    }

    /// The shift that moves `from` onto `to`.
    pub fn between(from: WellIndex, to: WellIndex) -> LayoutResult<Self> {
        let delta = |a: usize, b: usize| -> Option<i64> {
            i64::try_from(b).ok()?.checked_sub(i64::try_from(a).ok()?)
        };
        match (delta(from.i, to.i), delta(from.j, to.j)) {
            (Some(di), Some(dj)) => Ok(Self { di, dj }),
            _ => Err(LayoutError::Shift(format!(
                "Cannot shift from '{}' to '{}', the wells are too far apart",
                from, to
            ))),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for ShiftVector {
    type Output = ShiftVector;

    fn add(self, rhs: ShiftVector) -> ShiftVector {
        ShiftVector::new(self.di.saturating_add(rhs.di), self.dj.saturating_add(rhs.dj))
    }
}

impl Neg for ShiftVector {
    type Output = ShiftVector;

    fn neg(self) -> ShiftVector {
        ShiftVector::new(self.di.saturating_neg(), self.dj.saturating_neg())
    }
}

impl fmt::Display for ShiftVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.di, self.dj)
    }
}

impl FromStr for ShiftVector {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_shift(s)
    }
}

/// Parse a shift written as `"<from well> to <to well>"`.
pub fn parse_shift(text: &str) -> LayoutResult<ShiftVector> {
    let invalid = || {
        LayoutError::Shift(format!(
            "Cannot parse shift '{}', expected '<well> to <well>' e.g. 'A1 to B2'",
            text
        ))
    };

    let words: Vec<&str> = text.split_whitespace().collect();
    let [from, "to", to] = words.as_slice() else {
        return Err(invalid());
    };

    let from = well_index(from).map_err(|_| invalid())?;
    let to = well_index(to).map_err(|_| invalid())?;
    ShiftVector::between(from, to)
}

fn offset(index: usize, delta: i64, token: &str) -> LayoutResult<usize> {
    i64::try_from(index)
        .ok()
        .and_then(|x| x.checked_add(delta))
        .and_then(|x| usize::try_from(x).ok())
        .ok_or_else(|| {
            LayoutError::Address(format!(
                "Cannot shift '{}' by {}, it would fall off the plate",
                token, delta
            ))
        })
}

/// Shift a single row, column, or well token.
///
/// The token keeps its spelling: lower-case rows stay lower case and
/// zero-padded columns keep their width, so `"b02"` shifted by `(1, 1)` is
/// `"c03"`.
pub fn shift_token(token: &str, kind: PatternKind, shift: ShiftVector) -> LayoutResult<String> {
    let token = token.trim();
    match kind {
        PatternKind::Row => shift_row(token, shift.di, token),
        PatternKind::Col => shift_col(token, shift.dj, token),
        PatternKind::Well => {
            well_index(token)?;
            let split = token.find(|c: char| c.is_ascii_digit()).unwrap_or(token.len());
            let (row, col) = token.split_at(split);
            Ok(format!(
                "{}{}",
                shift_row(row, shift.di, token)?,
                shift_col(col, shift.dj, token)?
            ))
        }
    }
}

fn shift_row(row: &str, delta: i64, token: &str) -> LayoutResult<String> {
    let name = row_name(offset(row_index(row)?, delta, token)?);
    if row.bytes().all(|b| b.is_ascii_lowercase()) {
        Ok(name.to_ascii_lowercase())
    } else {
        Ok(name)
    }
}

fn shift_col(col: &str, delta: i64, token: &str) -> LayoutResult<String> {
    let name = col_name(offset(col_index(col)?, delta, token)?);
    if col.len() > 1 && col.starts_with('0') {
        Ok(format!("{:0>width$}", name, width = col.len()))
    } else {
        Ok(name)
    }
}

/// Shift every token of a pattern key, keeping its shape.
pub fn shift_pattern(key: &str, kind: PatternKind, shift: ShiftVector) -> LayoutResult<String> {
    let shifted = |token: &str| shift_token(token, kind, shift).map_err(|e| e.in_pattern(key));

    match PatternShape::parse(key)? {
        PatternShape::List(tokens) => {
            let tokens = tokens.into_iter().map(shifted).collect::<LayoutResult<Vec<_>>>()?;
            Ok(tokens.join(","))
        }
        PatternShape::Dash { first, last } => Ok(format!("{}-{}", shifted(first)?, shifted(last)?)),
        PatternShape::Ellipsis { first, second, last } => Ok(format!(
            "{},{},...,{}",
            shifted(first)?,
            shifted(second)?,
            shifted(last)?
        )),
    }
}

fn shift_entries(entries: ScopeEntries, scope: ScopeKind, shift: ShiftVector) -> LayoutResult<ScopeEntries> {
    let Some(kind) = scope.pattern_kind() else {
        return Ok(entries);
    };
    let mut shifted = ScopeEntries::new();
    for (key, attrs) in entries {
        shifted.push(shift_pattern(&key, kind, shift)?, attrs);
    }
    Ok(shifted)
}

/// Shift every address in a scope tree.
///
/// A zero shift hands the tree back untouched. Trees using `[irow]` or
/// `[icol]` cannot be shifted by anything else, because interleaving depends
/// on the parity of absolute row and column numbers.
pub fn shift_tree(tree: ScopeTree, shift: ShiftVector) -> LayoutResult<ScopeTree> {
    if shift.is_zero() {
        return Ok(tree);
    }
    if tree.is_interleaved() {
        return Err(LayoutError::Shift(
            "Can't shift layouts that use [irow] and/or [icol]".to_string(),
        ));
    }

    let mut blocks = Vec::with_capacity(tree.blocks.len());
    for (size, group) in tree.blocks {
        blocks.push((size, shift_entries(group, ScopeKind::Block, shift)?));
    }

    Ok(ScopeTree {
        wells: shift_entries(tree.wells, ScopeKind::Well, shift)?,
        blocks,
        rows: shift_entries(tree.rows, ScopeKind::Row, shift)?,
        cols: shift_entries(tree.cols, ScopeKind::Col, shift)?,
        irows: tree.irows,
        icols: tree.icols,
        global: tree.global,
    })
}
