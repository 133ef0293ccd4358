//! Well coordinates.
//!
//! Rows are named with letters (`A`..`Z`, then `AA`, `AB`, ...) and columns
//! with 1-based numbers. Internally both are zero-based offsets: `A1` is
//! `(0, 0)`, `B3` is `(1, 2)`.

use crate::error::{LayoutError, LayoutResult};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const LETTERS: usize = 26;

/// Zero-based (row, column) position of a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WellIndex {
    /// Row offset, `A` is 0.
    pub i: usize,

    /// Column offset, `1` is 0.
    pub j: usize,
}

impl WellIndex {
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// Parse a well name such as `"A1"` or `"B02"`.
    pub fn parse(name: &str) -> LayoutResult<Self> {
        well_index(name)
    }

    /// Canonical name of this well, e.g. `"A1"`.
    pub fn name(&self) -> String {
        well_name(self.i, self.j)
    }
}

impl From<(usize, usize)> for WellIndex {
    fn from((i, j): (usize, usize)) -> Self {
        Self { i, j }
    }
}

impl fmt::Display for WellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", row_name(self.i), col_name(self.j))
    }
}

/// Letter name of a row offset: 0 is `A`, 25 is `Z`, 26 is `AA`.
pub fn row_name(i: usize) -> String {
    let mut letters = Vec::new();
    let mut n = i;

    loop {
        letters.push(b'A' + (n % LETTERS) as u8);
        if n < LETTERS {
            break;
        }
        n = n / LETTERS - 1;
    }

    letters.iter().rev().map(|&b| char::from(b)).collect()
}

/// Row offset of a letter name. Case-insensitive.
pub fn row_index(name: &str) -> LayoutResult<usize> {
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(LayoutError::Address(format!(
            "Cannot parse row '{}', expected letter(s) e.g. 'A', 'B', etc.",
            name
        )));
    }

    let mut index: usize = 0;
    for b in name.bytes() {
        let digit = usize::from(b.to_ascii_uppercase() - b'A') + 1;
        index = index
            .checked_mul(LETTERS)
            .and_then(|x| x.checked_add(digit))
            .ok_or_else(|| LayoutError::Address(format!("Row '{}' is too far down", name)))?;
    }

    Ok(index - 1)
}

/// 1-based column name of a column offset.
pub fn col_name(j: usize) -> String {
    (j as u128 + 1).to_string()
}

/// Column offset of a 1-based column number. Zero padding is allowed.
pub fn col_index(text: &str) -> LayoutResult<usize> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LayoutError::Address(format!(
            "Cannot parse column '{}', expected digit(s) e.g. '1', '2', etc.",
            text
        )));
    }

    let number: usize = text
        .parse()
        .map_err(|_| LayoutError::Address(format!("Column '{}' is too far right", text)))?;

    number
        .checked_sub(1)
        .ok_or_else(|| LayoutError::Address(format!("Column '{}' is left of column 1", text)))
}

/// Canonical well name of a (row, column) offset pair.
pub fn well_name(i: usize, j: usize) -> String {
    format!("{}{}", row_name(i), col_name(j))
}

/// Well name with the column zero-padded to `digits` digits, e.g. `"A01"`.
pub fn well0_name(i: usize, j: usize, digits: usize) -> String {
    format!("{}{:0>width$}", row_name(i), col_name(j), width = digits)
}

fn well_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("well pattern is valid"))
}

/// Offsets of a well name. Accepts zero-padded columns, so `"A01"` and
/// `"A1"` are the same well.
pub fn well_index(name: &str) -> LayoutResult<WellIndex> {
    let name = name.trim();
    let caps = well_pattern().captures(name).ok_or_else(|| {
        LayoutError::Address(format!(
            "Cannot parse well '{}', expected 'A1', 'B2', etc.",
            name
        ))
    })?;

    let i = row_index(&caps[1])?;
    let j = col_index(&caps[2])?;
    Ok(WellIndex { i, j })
}

/// Convert a coordinate between "real" and "interleaved" space.
///
/// Only the first coordinate differs between the two spaces. A straight row
/// in interleaved space zig-zags between two adjacent real rows, one step per
/// column, and vice versa. Pass the column first and the row second to
/// interleave columns instead.
///
/// The function is its own inverse: `interleave(interleave(a, b), b) == a`.
pub fn interleave(a: i64, b: i64) -> i64 {
    let flip = b.rem_euclid(2);
    if a.rem_euclid(2) == 0 {
        a + flip
    } else {
        a - flip
    }
}

/// [`interleave`] restricted to grid offsets, which never leaves the grid.
pub(crate) fn interleave_offset(a: usize, b: usize) -> usize {
    let flip = b % 2;
    if a % 2 == 0 {
        a + flip
    } else {
        a - flip
    }
}

/// Every well in a `width` x `height` rectangle, row by row.
///
/// Fails if the rectangle reaches past the last row or column an index can
/// hold.
pub fn block_cells(
    top_left: WellIndex,
    width: usize,
    height: usize,
) -> LayoutResult<impl Iterator<Item = WellIndex>> {
    let last_i = top_left.i.checked_add(height.saturating_sub(1));
    let last_j = top_left.j.checked_add(width.saturating_sub(1));
    if last_i.is_none() || last_j.is_none() {
        return Err(LayoutError::Address(format!(
            "A {}x{} block at '{}' runs off the plate",
            width, height, top_left
        )));
    }

    Ok((0..height).flat_map(move |di| {
        (0..width).map(move |dj| WellIndex::new(top_left.i + di, top_left.j + dj))
    }))
}
