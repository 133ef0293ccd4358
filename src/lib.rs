//! Wellmap - microplate layouts from TOML files
//!
//! A layout file describes what is in each well of one or more microplates,
//! using rows, columns, blocks, and single wells rather than listing every
//! well by hand. This crate reads those files, follows their `[meta]`
//! directives, and resolves them into per-well attributes using the
//! [`wellmap_layout`] engine.
//!
//! ```no_run
//! let layout = wellmap::load("plate.toml")?;
//! for record in layout.records() {
//!     println!("{} {:?}", record.well, record.attributes);
//! }
//! # Ok::<(), wellmap::LoadError>(())
//! ```

pub mod error;
pub mod file;
pub mod meta;
pub mod table;

pub use error::LoadError;
pub use file::{load, load_with, Layout, LoadOptions, PlateLayout};
pub use meta::{Alert, Meta};
pub use table::WellRecord;

pub use wellmap_layout;
pub use wellmap_layout::{
    parse_shift, resolve, resolve_wells, AttributeSet, LayoutError, LayoutResult, ResolvedLayout,
    ScopeTree, ShiftVector, WellIndex,
};
