//! Scope-based microplate layout resolution.
//!
//! A layout assigns attributes to the wells of a microplate through scopes
//! of decreasing specificity: single wells, rectangular blocks, rows,
//! columns, interleaved rows and columns, and finally the whole experiment.
//! Resolution merges those scopes into one attribute set per well, with
//! more specific scopes winning.
//!
//! This crate does no I/O. It turns an already-parsed document into a
//! [`ScopeTree`] and resolves it; reading files is left to the caller.

pub mod coord;
pub mod error;
pub mod merge;
pub mod pattern;
pub mod resolve;
pub mod scope;
pub mod shift;

pub use coord::{
    block_cells, col_index, col_name, interleave, row_index, row_name,
    well0_name, well_index, well_name, WellIndex,
};
pub use error::{LayoutError, LayoutResult};
pub use merge::{recursive_merge, AttributeSet};
pub use pattern::{col_indices, row_indices, well_indices, PatternKind};
pub use resolve::{resolve, resolve_wells, PrecedenceStep, ResolvedLayout, PRECEDENCE};
pub use scope::{BlockSize, ScopeEntries, ScopeKind, ScopeTree};
pub use shift::{parse_shift, shift_pattern, shift_token, shift_tree, ShiftVector};
