//! Scope tree.
//!
//! A layout document is split into scopes, each assigning attributes to a
//! different slice of the plate:
//!
//! ```toml
//! x = 1                   # global: every well
//!
//! [expt]                  # global, spelled out
//! y = 2
//!
//! [row.A]                 # every well in row A
//! [col."1,3,...,11"]      # odd columns
//! [irow.A]                # A1, B2, A3, B4, ...
//! [icol.1]                # A1, B2, C1, D2, ...
//! [block.2x3.A1]          # the 2-wide, 3-tall rectangle starting at A1
//! [well.B2]               # one well
//! ```
//!
//! Scope entries keep the order they were declared in, which matters for
//! tie-breaking between equal-sized blocks.

use crate::error::{LayoutError, LayoutResult};
use crate::merge::{recursive_merge, AttributeSet};
use crate::pattern::PatternKind;
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Pattern keys and their attribute sets, in declaration order.
///
/// A key may appear more than once after trees are layered or shifted (`A1`
/// and `A01` both shift to `B2`). Later entries win over earlier ones, the
/// same as later declarations within one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeEntries(Vec<(String, AttributeSet)>);

impl ScopeEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, key: impl Into<String>, attrs: AttributeSet) {
        self.0.push((key.into(), attrs));
    }

    /// Attributes of the last entry spelled exactly `key`.
    pub fn get(&self, key: &str) -> Option<&AttributeSet> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, attrs)| attrs)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, AttributeSet)> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ScopeEntries {
    type Item = &'a (String, AttributeSet);
    type IntoIter = std::slice::Iter<'a, (String, AttributeSet)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ScopeEntries {
    type Item = (String, AttributeSet);
    type IntoIter = std::vec::IntoIter<(String, AttributeSet)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, AttributeSet)> for ScopeEntries {
    fn from_iter<I: IntoIterator<Item = (String, AttributeSet)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, AttributeSet)> for ScopeEntries {
    fn extend<I: IntoIterator<Item = (String, AttributeSet)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// The kinds of scope a layout can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Well,
    Block,
    Row,
    Col,
    IRow,
    ICol,
    Global,
}

impl ScopeKind {
    pub const ALL: [ScopeKind; 7] = [
        ScopeKind::Well,
        ScopeKind::Block,
        ScopeKind::Row,
        ScopeKind::Col,
        ScopeKind::IRow,
        ScopeKind::ICol,
        ScopeKind::Global,
    ];

    /// Name of the document section holding this scope.
    pub fn section_name(self) -> &'static str {
        match self {
            ScopeKind::Well => "well",
            ScopeKind::Block => "block",
            ScopeKind::Row => "row",
            ScopeKind::Col => "col",
            ScopeKind::IRow => "irow",
            ScopeKind::ICol => "icol",
            ScopeKind::Global => "expt",
        }
    }

    pub fn from_section(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.section_name() == name)
    }

    /// Token kind used by this scope's keys. `None` for the global scope,
    /// which has no keys.
    pub fn pattern_kind(self) -> Option<PatternKind> {
        match self {
            ScopeKind::Well | ScopeKind::Block => Some(PatternKind::Well),
            ScopeKind::Row | ScopeKind::IRow => Some(PatternKind::Row),
            ScopeKind::Col | ScopeKind::ICol => Some(PatternKind::Col),
            ScopeKind::Global => None,
        }
    }

    pub fn is_interleaved(self) -> bool {
        matches!(self, ScopeKind::IRow | ScopeKind::ICol)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.section_name())
    }
}

/// Width and height of a `[block]` group, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockSize {
    width: usize,
    height: usize,
}

impl BlockSize {
    pub fn new(width: usize, height: usize) -> LayoutResult<Self> {
        let size = Self { width, height };
        if width == 0 {
            return Err(LayoutError::BlockSize(format!(
                "[block.{}] has no width.  No wells defined.",
                size
            )));
        }
        if height == 0 {
            return Err(LayoutError::BlockSize(format!(
                "[block.{}] has no height.  No wells defined.",
                size
            )));
        }
        Ok(size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn block_size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)x(\d+)$").expect("block size pattern is valid"))
}

impl FromStr for BlockSize {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || {
            LayoutError::BlockSize(format!(
                "Unknown [block] size '{}', expected 'WxH' (where W and H are both positive integers).",
                s
            ))
        };

        let caps = block_size_pattern().captures(s).ok_or_else(unknown)?;
        let width = caps[1].parse().map_err(|_| unknown())?;
        let height = caps[2].parse().map_err(|_| unknown())?;
        BlockSize::new(width, height)
    }
}

/// Every scope of one layout, before resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeTree {
    /// `[well]`: single wells or well patterns.
    pub wells: ScopeEntries,

    /// `[block.WxH]`: top-left patterns, one group per size key in
    /// declaration order. `2x1` and `02x1` are separate groups.
    pub blocks: Vec<(BlockSize, ScopeEntries)>,

    /// `[row]`
    pub rows: ScopeEntries,

    /// `[col]`
    pub cols: ScopeEntries,

    /// `[irow]`: interleaved rows.
    pub irows: ScopeEntries,

    /// `[icol]`: interleaved columns.
    pub icols: ScopeEntries,

    /// `[expt]` plus free-form top-level attributes.
    pub global: AttributeSet,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope tree from a parsed layout document.
    ///
    /// Recognized sections are `well`, `block`, `row`, `col`, `irow`, `icol`
    /// and `expt`. Every other top-level key is a global attribute; values in
    /// `[expt]` win over free-form keys of the same name. Callers that give
    /// other sections special meaning (e.g. `meta`) must remove them first.
    pub fn from_document(doc: &Map<String, Value>) -> LayoutResult<Self> {
        let mut tree = ScopeTree::new();
        let mut free_form = AttributeSet::new();

        for (key, value) in doc {
            let Some(kind) = ScopeKind::from_section(key) else {
                free_form.insert(key.clone(), value.clone());
                continue;
            };

            match kind {
                ScopeKind::Global => {
                    let expt = expect_table(value, key)?;
                    recursive_merge(&mut tree.global, expt, true);
                }
                ScopeKind::Block => {
                    for (size_key, group) in expect_table(value, key)? {
                        let size: BlockSize = size_key.parse()?;
                        let label = format!("block.{}", size_key);
                        tree.blocks.push((size, scope_entries(group, &label)?));
                    }
                }
                ScopeKind::Well => tree.wells = scope_entries(value, key)?,
                ScopeKind::Row => tree.rows = scope_entries(value, key)?,
                ScopeKind::Col => tree.cols = scope_entries(value, key)?,
                ScopeKind::IRow => tree.irows = scope_entries(value, key)?,
                ScopeKind::ICol => tree.icols = scope_entries(value, key)?,
            }
        }

        recursive_merge(&mut tree.global, &free_form, false);
        Ok(tree)
    }

    /// Entries of a keyed scope. `None` for the block and global scopes,
    /// which are not a single set of entries.
    pub fn entries(&self, kind: ScopeKind) -> Option<&ScopeEntries> {
        match kind {
            ScopeKind::Well => Some(&self.wells),
            ScopeKind::Row => Some(&self.rows),
            ScopeKind::Col => Some(&self.cols),
            ScopeKind::IRow => Some(&self.irows),
            ScopeKind::ICol => Some(&self.icols),
            ScopeKind::Block | ScopeKind::Global => None,
        }
    }

    /// Whether the tree uses `[irow]` or `[icol]`.
    pub fn is_interleaved(&self) -> bool {
        ScopeKind::ALL
            .into_iter()
            .filter(|kind| kind.is_interleaved())
            .any(|kind| self.entries(kind).is_some_and(|entries| !entries.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        ScopeKind::ALL
            .into_iter()
            .all(|kind| self.entries(kind).map_or(true, ScopeEntries::is_empty))
            && self.blocks.iter().all(|(_, group)| group.is_empty())
            && self.global.is_empty()
    }

    /// Layer another tree on top of this one.
    ///
    /// Every entry of `other` is appended after the entries already here, so
    /// it counts as declared later: it wins ties between `[well]` entries and
    /// between equal-sized blocks, and its global attributes overwrite.
    pub fn overlay(&mut self, other: &ScopeTree) -> &mut Self {
        self.wells.extend(other.wells.iter().cloned());
        self.blocks.extend(other.blocks.iter().cloned());
        self.rows.extend(other.rows.iter().cloned());
        self.cols.extend(other.cols.iter().cloned());
        self.irows.extend(other.irows.iter().cloned());
        self.icols.extend(other.icols.iter().cloned());
        recursive_merge(&mut self.global, &other.global, true);
        self
    }
}

fn expect_table<'a>(value: &'a Value, label: &str) -> LayoutResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        LayoutError::Structure(format!("Expected [{}] to be a table, not: {}", label, value))
    })
}

fn scope_entries(value: &Value, label: &str) -> LayoutResult<ScopeEntries> {
    let mut entries = ScopeEntries::new();
    for (key, attrs) in expect_table(value, label)? {
        let attrs = expect_table(attrs, &format!("{}.{}", label, key))?;
        entries.push(key.clone(), attrs.clone());
    }
    Ok(entries)
}
