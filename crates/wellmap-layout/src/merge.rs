//! Recursive attribute merge.
//!
//! Every precedence rule in the resolver comes down to the order in which
//! attribute sets are merged and whether each merge may overwrite:
//! - Tables: merged key by key, recursively
//! - Anything else: copied if the key is absent, replaced only on overwrite

use serde_json::{Map, Value};

/// Ordered mapping from attribute name to a scalar or a nested table.
pub type AttributeSet = Map<String, Value>;

/// Merge `src` into `dst`.
///
/// When both sides hold a table under the same key the tables are merged
/// recursively. Otherwise the value from `src` is copied in if `dst` lacks
/// the key, or unconditionally when `overwrite` is set. Returns `dst` for
/// chaining.
pub fn recursive_merge<'a>(
    dst: &'a mut AttributeSet,
    src: &AttributeSet,
    overwrite: bool,
) -> &'a mut AttributeSet {
    for (key, value) in src {
        match (dst.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                recursive_merge(existing, nested, overwrite);
            }
            (Some(_), _) if !overwrite => {}
            _ => {
                dst.insert(key.clone(), value.clone());
            }
        }
    }
    dst
}
