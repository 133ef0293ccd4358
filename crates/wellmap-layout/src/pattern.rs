//! Address pattern expansion.
//!
//! A scope key names one or more rows, columns, or wells in one of three
//! forms:
//!
//! - a list: `"A"`, `"A,C,F"`, `"A1,B2"`
//! - a dash range, step 1 and inclusive: `"B-D"`, `"1-6"`, `"A1-C3"`
//! - an ellipsis range: `"A,C,...,G"`, `"1,4,...,10"`, `"A1,C3,...,G11"`
//!
//! Well ranges are two-dimensional. Unless every endpoint shares a row (or a
//! column), a well range covers the full product of its row range and its
//! column range, so `"A1,C3,...,E5"` is a 3x3 grid rather than a diagonal.

use crate::coord::{col_index, row_index, well_index, WellIndex};
use crate::error::{LayoutError, LayoutResult};

const ELLIPSIS: &str = "...";

/// Which kind of token a pattern is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Row letters, e.g. `"A"`.
    Row,
    /// Column numbers, e.g. `"1"`.
    Col,
    /// Well names, e.g. `"A1"`.
    Well,
}

/// Shape of a pattern key, before its tokens are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternShape<'a> {
    List(Vec<&'a str>),
    Dash {
        first: &'a str,
        last: &'a str,
    },
    Ellipsis {
        first: &'a str,
        second: &'a str,
        last: &'a str,
    },
}

impl<'a> PatternShape<'a> {
    pub(crate) fn parse(key: &'a str) -> LayoutResult<Self> {
        let tokens: Vec<&str> = key.split(',').map(str::trim).collect();

        if tokens.contains(&ELLIPSIS) {
            if tokens.len() != 4 || tokens[2] != ELLIPSIS {
                return Err(LayoutError::Pattern(format!(
                    "Expected '<first>,<second>,...,<last>', not '{}'",
                    key
                )));
            }
            return Ok(PatternShape::Ellipsis {
                first: tokens[0],
                second: tokens[1],
                last: tokens[3],
            });
        }

        if tokens.len() == 1 && tokens[0].contains('-') {
            let parts: Vec<&str> = tokens[0].split('-').map(str::trim).collect();
            if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
                return Err(LayoutError::Pattern(format!(
                    "Expected '<first>-<last>', not '{}'",
                    key
                )));
            }
            return Ok(PatternShape::Dash {
                first: parts[0],
                last: parts[1],
            });
        }

        Ok(PatternShape::List(tokens))
    }
}

/// Why a range could not be expanded. Rendered with the endpoint tokens the
/// user wrote, not the resolved indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeFault {
    /// Endpoints out of order.
    Order { last_may_equal_second: bool },
    /// Last endpoint not reachable from the first in whole steps.
    Step { step: usize },
}

/// Step between `x0` and `x1`, provided `xn` lies a whole number of steps
/// past them.
fn check_range(x0: usize, x1: usize, xn: usize, single_step_ok: bool) -> Result<usize, RangeFault> {
    let ordered = x0 < x1 && (x1 < xn || (single_step_ok && x1 == xn));
    if !ordered {
        return Err(RangeFault::Order {
            last_may_equal_second: single_step_ok,
        });
    }

    let step = x1 - x0;
    if (xn - x0) % step != 0 {
        return Err(RangeFault::Step { step });
    }
    Ok(step)
}

fn inclusive_range(x0: usize, step: usize, xn: usize) -> Vec<usize> {
    (x0..=xn).step_by(step).collect()
}

fn indices_from_range(x0: usize, x1: usize, xn: usize) -> Result<Vec<usize>, RangeFault> {
    let step = check_range(x0, x1, xn, false)?;
    Ok(inclusive_range(x0, step, xn))
}

fn indices_from_dash(x0: usize, xn: usize) -> Result<Vec<usize>, RangeFault> {
    if x0 >= xn {
        return Err(RangeFault::Order {
            last_may_equal_second: false,
        });
    }
    Ok((x0..=xn).collect())
}

fn wells_from_range(x0: WellIndex, x1: WellIndex, xn: WellIndex) -> Result<Vec<WellIndex>, RangeFault> {
    // Single-row and single-column ranges are checked on their own axis only,
    // since the other axis has a step of zero.
    if x0.i == x1.i && x1.i == xn.i {
        let cols = indices_from_range(x0.j, x1.j, xn.j)?;
        return Ok(cols.into_iter().map(|j| WellIndex::new(x0.i, j)).collect());
    }
    if x0.j == x1.j && x1.j == xn.j {
        let rows = indices_from_range(x0.i, x1.i, xn.i)?;
        return Ok(rows.into_iter().map(|i| WellIndex::new(i, x0.j)).collect());
    }

    let row_step = check_range(x0.i, x1.i, xn.i, true)?;
    let col_step = check_range(x0.j, x1.j, xn.j, true)?;
    Ok(product(
        &inclusive_range(x0.i, row_step, xn.i),
        &inclusive_range(x0.j, col_step, xn.j),
    ))
}

fn wells_from_dash(x0: WellIndex, xn: WellIndex) -> Result<Vec<WellIndex>, RangeFault> {
    if x0.i == xn.i {
        let cols = indices_from_dash(x0.j, xn.j)?;
        return Ok(cols.into_iter().map(|j| WellIndex::new(x0.i, j)).collect());
    }
    if x0.j == xn.j {
        let rows = indices_from_dash(x0.i, xn.i)?;
        return Ok(rows.into_iter().map(|i| WellIndex::new(i, x0.j)).collect());
    }
    Ok(product(&indices_from_dash(x0.i, xn.i)?, &indices_from_dash(x0.j, xn.j)?))
}

fn product(rows: &[usize], cols: &[usize]) -> Vec<WellIndex> {
    rows.iter()
        .flat_map(|&i| cols.iter().map(move |&j| WellIndex::new(i, j)))
        .collect()
}

fn expand<T: Copy>(
    key: &str,
    parse: fn(&str) -> LayoutResult<T>,
    ellipsis: fn(T, T, T) -> Result<Vec<T>, RangeFault>,
    dash: fn(T, T) -> Result<Vec<T>, RangeFault>,
) -> LayoutResult<Vec<T>> {
    let shape = PatternShape::parse(key)?;
    let parse_in_key = |token: &str| parse(token).map_err(|e| e.in_pattern(key));

    match shape {
        PatternShape::List(tokens) if tokens.len() == 1 => Ok(vec![parse(tokens[0])?]),
        PatternShape::List(tokens) => tokens.into_iter().map(parse_in_key).collect(),
        PatternShape::Dash { first, last } => {
            let x0 = parse_in_key(first)?;
            let xn = parse_in_key(last)?;
            dash(x0, xn).map_err(|fault| match fault {
                RangeFault::Order { .. } => {
                    LayoutError::Pattern(format!("'{}': Expected {} < {}.", key, first, last))
                }
                RangeFault::Step { .. } => {
                    LayoutError::Pattern(format!("'{}': Cannot get from {} to {}.", key, first, last))
                }
            })
        }
        PatternShape::Ellipsis { first, second, last } => {
            let x0 = parse_in_key(first)?;
            let x1 = parse_in_key(second)?;
            let xn = parse_in_key(last)?;
            ellipsis(x0, x1, xn).map_err(|fault| {
                let msg = match fault {
                    RangeFault::Order {
                        last_may_equal_second,
                    } => format!(
                        "Expected {} < {} {} {}.",
                        first,
                        second,
                        if last_may_equal_second { "≤" } else { "<" },
                        last
                    ),
                    RangeFault::Step { step } => {
                        format!("Cannot get from {} to {} in steps of {}.", first, last, step)
                    }
                };
                LayoutError::Pattern(format!("'{}': {}", key, msg))
            })
        }
    }
}

/// Row offsets named by a `[row]` or `[irow]` key.
pub fn row_indices(key: &str) -> LayoutResult<Vec<usize>> {
    expand(key, row_index, indices_from_range, indices_from_dash)
}

/// Column offsets named by a `[col]` or `[icol]` key.
pub fn col_indices(key: &str) -> LayoutResult<Vec<usize>> {
    expand(key, col_index, indices_from_range, indices_from_dash)
}

/// Wells named by a `[well]` key or a block's top-left key.
pub fn well_indices(key: &str) -> LayoutResult<Vec<WellIndex>> {
    expand(key, well_index, wells_from_range, wells_from_dash)
}
