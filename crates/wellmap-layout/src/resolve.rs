//! Precedence resolver.
//!
//! Collapses a [`ScopeTree`] into one attribute set per well. Which wells
//! exist is decided first; then every well's attributes are assembled by
//! walking [`PRECEDENCE`] from the most specific scope to the least, merging
//! each contribution into the well's accumulator.

use crate::coord::{block_cells, interleave_offset, WellIndex};
use crate::error::{LayoutError, LayoutResult};
use crate::merge::{recursive_merge, AttributeSet};
use crate::pattern::{col_indices, row_indices, well_indices};
use crate::scope::{ScopeEntries, ScopeKind, ScopeTree};
use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use tracing::{debug, trace};

/// One step of the precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecedenceStep {
    pub scope: ScopeKind,

    /// Whether this scope may replace values set by the steps before it.
    pub overwrite: bool,
}

/// Scopes in the order their attributes are merged into each well.
///
/// Only `[well]` overwrites, and only so that later `[well]` entries beat
/// earlier ones naming the same well. Every later step fills gaps, so each
/// scope wins over all the scopes after it.
pub const PRECEDENCE: [PrecedenceStep; 7] = [
    PrecedenceStep { scope: ScopeKind::Well, overwrite: true },
    PrecedenceStep { scope: ScopeKind::Block, overwrite: false },
    PrecedenceStep { scope: ScopeKind::Row, overwrite: false },
    PrecedenceStep { scope: ScopeKind::Col, overwrite: false },
    PrecedenceStep { scope: ScopeKind::IRow, overwrite: false },
    PrecedenceStep { scope: ScopeKind::ICol, overwrite: false },
    PrecedenceStep { scope: ScopeKind::Global, overwrite: false },
];

/// Fully resolved attributes for every well in a layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLayout {
    wells: IndexMap<WellIndex, AttributeSet>,
}

impl ResolvedLayout {
    pub fn get(&self, index: &WellIndex) -> Option<&AttributeSet> {
        self.wells.get(index)
    }

    /// Attributes of a well by name, e.g. `"A1"`.
    pub fn well(&self, name: &str) -> Option<&AttributeSet> {
        let index = WellIndex::parse(name).ok()?;
        self.wells.get(&index)
    }

    pub fn contains(&self, index: &WellIndex) -> bool {
        self.wells.contains_key(index)
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// Wells in the order they came into existence.
    pub fn indices(&self) -> impl Iterator<Item = &WellIndex> {
        self.wells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WellIndex, &AttributeSet)> {
        self.wells.iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedLayout {
    type Item = (&'a WellIndex, &'a AttributeSet);
    type IntoIter = indexmap::map::Iter<'a, WellIndex, AttributeSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.wells.iter()
    }
}

impl IntoIterator for ResolvedLayout {
    type Item = (WellIndex, AttributeSet);
    type IntoIter = indexmap::map::IntoIter<WellIndex, AttributeSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.wells.into_iter()
    }
}

/// Serialized as a table keyed by well name.
impl Serialize for ResolvedLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.wells.len()))?;
        for (index, attrs) in &self.wells {
            map.serialize_entry(&index.name(), attrs)?;
        }
        map.end()
    }
}

/// Resolve a scope tree, failing if it defines no wells.
pub fn resolve(tree: &ScopeTree) -> LayoutResult<ResolvedLayout> {
    let layout = resolve_wells(tree)?;
    if layout.is_empty() {
        return Err(LayoutError::NoWells);
    }
    Ok(layout)
}

/// Resolve a scope tree. A tree with only global attributes resolves to an
/// empty layout.
pub fn resolve_wells(tree: &ScopeTree) -> LayoutResult<ResolvedLayout> {
    let sources = Sources::collect(tree)?;
    let existing = sources.existing_wells()?;

    let mut wells = IndexMap::with_capacity(existing.len());
    for index in existing {
        let mut attrs = AttributeSet::new();
        for step in PRECEDENCE {
            for contribution in sources.contributions(step.scope, index) {
                recursive_merge(&mut attrs, contribution, step.overwrite);
            }
        }
        wells.insert(index, attrs);
    }

    debug!(wells = wells.len(), "resolved layout");
    Ok(ResolvedLayout { wells })
}

/// A block covering some well.
#[derive(Debug)]
struct BlockCandidate<'a> {
    area: usize,
    rank: usize,
    attrs: &'a AttributeSet,
}

/// Every scope of a tree, expanded to concrete indices.
struct Sources<'a> {
    /// Wells named by `[well]` or covered by a block, in that order.
    named: IndexSet<WellIndex>,
    wells: HashMap<WellIndex, Vec<&'a AttributeSet>>,
    blocks: HashMap<WellIndex, Vec<BlockCandidate<'a>>>,
    rows: IndexMap<usize, AttributeSet>,
    cols: IndexMap<usize, AttributeSet>,
    irows: IndexMap<usize, AttributeSet>,
    icols: IndexMap<usize, AttributeSet>,
    global: &'a AttributeSet,
    declared: [(ScopeKind, usize); 4],
}

impl<'a> Sources<'a> {
    fn collect(tree: &'a ScopeTree) -> LayoutResult<Self> {
        let mut named = IndexSet::new();

        let mut wells: HashMap<WellIndex, Vec<&AttributeSet>> = HashMap::new();
        for (key, attrs) in &tree.wells {
            for index in well_indices(key)? {
                named.insert(index);
                wells.entry(index).or_default().push(attrs);
            }
        }

        let mut blocks: HashMap<WellIndex, Vec<BlockCandidate>> = HashMap::new();
        let mut rank = 0;
        for (size, group) in &tree.blocks {
            for (key, attrs) in group {
                for top_left in well_indices(key)? {
                    trace!(%size, %top_left, rank, "block");
                    for index in block_cells(top_left, size.width(), size.height())? {
                        named.insert(index);
                        blocks.entry(index).or_default().push(BlockCandidate {
                            area: size.area(),
                            rank,
                            attrs,
                        });
                    }
                    rank += 1;
                }
            }
        }

        Ok(Self {
            named,
            wells,
            blocks,
            rows: consolidate(&tree.rows, row_indices)?,
            cols: consolidate(&tree.cols, col_indices)?,
            irows: consolidate(&tree.irows, row_indices)?,
            icols: consolidate(&tree.icols, col_indices)?,
            global: &tree.global,
            declared: [
                (ScopeKind::Row, tree.rows.len()),
                (ScopeKind::Col, tree.cols.len()),
                (ScopeKind::IRow, tree.irows.len()),
                (ScopeKind::ICol, tree.icols.len()),
            ],
        })
    }

    /// Every well that exists, in the order it came into existence.
    ///
    /// Axis scopes create wells across the span of the other axis, where the
    /// span runs from the lowest to the highest index known on that axis.
    /// Interleaved scopes are mapped to real coordinates against the span of
    /// the other axis before they count towards it.
    ///
    /// Spans have no gaps: with wells at `A1` and `A12`, a `[row.B]` fills
    /// all of `B1` through `B12`. Far-apart wells therefore make axis scopes
    /// create every well in between.
    fn existing_wells(&self) -> LayoutResult<IndexSet<WellIndex>> {
        let plain_rows = Span::of(self.named.iter().map(|ij| ij.i).chain(self.rows.keys().copied()));
        let plain_cols = Span::of(self.named.iter().map(|ij| ij.j).chain(self.cols.keys().copied()));

        let occupied_rows = Span::of(plain_rows.iter().chain(
            self.irows.keys().flat_map(|&ii| plain_cols.iter().map(move |j| interleave_offset(ii, j))),
        ));
        let occupied_cols = Span::of(plain_cols.iter().chain(
            self.icols.keys().flat_map(|&jj| plain_rows.iter().map(move |i| interleave_offset(jj, i))),
        ));

        for (kind, declared) in self.declared {
            let (other_axis, span) = match kind {
                ScopeKind::Row | ScopeKind::IRow => ("columns", &occupied_cols),
                _ => ("rows", &occupied_rows),
            };
            if declared > 0 && span.is_empty() {
                return Err(LayoutError::Span(format!(
                    "Found {} {} spec{}, but no {}.  No wells defined.",
                    declared,
                    kind,
                    if declared == 1 { "" } else { "s" },
                    other_axis
                )));
            }
        }

        let mut existing = self.named.clone();
        for &i in self.rows.keys() {
            existing.extend(occupied_cols.iter().map(|j| WellIndex::new(i, j)));
        }
        for i in occupied_rows.iter() {
            existing.extend(self.cols.keys().map(|&j| WellIndex::new(i, j)));
        }
        for &ii in self.irows.keys() {
            existing.extend(occupied_cols.iter().map(|j| WellIndex::new(interleave_offset(ii, j), j)));
        }
        for i in occupied_rows.iter() {
            existing.extend(self.icols.keys().map(|&jj| WellIndex::new(i, interleave_offset(jj, i))));
        }
        Ok(existing)
    }

    /// Attribute sets a scope contributes to one well, in merge order.
    fn contributions(&self, scope: ScopeKind, index: WellIndex) -> Vec<&AttributeSet> {
        let WellIndex { i, j } = index;
        match scope {
            ScopeKind::Well => self.wells.get(&index).cloned().unwrap_or_default(),
            ScopeKind::Block => {
                let Some(candidates) = self.blocks.get(&index) else {
                    return Vec::new();
                };
                // Smaller blocks first; among equal areas, the latest declared.
                let mut ordered: Vec<&BlockCandidate> = candidates.iter().collect();
                ordered.sort_by(|a, b| a.area.cmp(&b.area).then(b.rank.cmp(&a.rank)));
                ordered.into_iter().map(|c| c.attrs).collect()
            }
            ScopeKind::Row => self.rows.get(&i).into_iter().collect(),
            ScopeKind::Col => self.cols.get(&j).into_iter().collect(),
            ScopeKind::IRow => self.irows.get(&interleave_offset(i, j)).into_iter().collect(),
            ScopeKind::ICol => self.icols.get(&interleave_offset(j, i)).into_iter().collect(),
            ScopeKind::Global => vec![self.global],
        }
    }
}

/// Expand every key of an axis scope, merging entries that land on the same
/// index in declaration order.
fn consolidate(
    entries: &ScopeEntries,
    expand: fn(&str) -> LayoutResult<Vec<usize>>,
) -> LayoutResult<IndexMap<usize, AttributeSet>> {
    let mut by_index: IndexMap<usize, AttributeSet> = IndexMap::new();
    for (key, attrs) in entries {
        for index in expand(key)? {
            recursive_merge(by_index.entry(index).or_default(), attrs, true);
        }
    }
    Ok(by_index)
}

/// Inclusive range between the lowest and highest of a set of indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span(Option<(usize, usize)>);

impl Span {
    fn of(indices: impl IntoIterator<Item = usize>) -> Self {
        let bounds = indices.into_iter().fold(None, |bounds, x| match bounds {
            None => Some((x, x)),
            Some((lo, hi)) => Some((usize::min(lo, x), usize::max(hi, x))),
        });
        Span(bounds)
    }

    fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    fn iter(&self) -> impl Iterator<Item = usize> + Clone {
        self.0.map(|(lo, hi)| lo..=hi).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn tree(value: Value) -> ScopeTree {
        match value {
            Value::Object(map) => ScopeTree::from_document(&map).unwrap(),
            other => panic!("expected a table, got {}", other),
        }
    }

    fn attrs(value: Value) -> AttributeSet {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a table, got {}", other),
        }
    }

    fn well_names(layout: &ResolvedLayout) -> Vec<String> {
        let mut names: Vec<_> = layout.indices().copied().collect();
        names.sort();
        names.iter().map(WellIndex::name).collect()
    }

    #[test]
    fn test_one_well() {
        let layout = resolve(&tree(json!({"well": {"A1": {"x": 1}}}))).unwrap();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1}))));
    }

    #[test]
    fn test_multiple_wells() {
        let layout = resolve(&tree(json!({
            "well": {"A1": {"x": 1}, "B2": {"x": 2}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1").unwrap()["x"], 1);
        assert_eq!(layout.well("B2").unwrap()["x"], 2);
        assert_eq!(well_names(&layout), vec!["A1", "B2"]);
    }

    #[test]
    fn test_well_pattern() {
        let layout = resolve(&tree(json!({
            "well": {"A1,A3,...,A7": {"x": 1}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["A1", "A3", "A5", "A7"]);
    }

    #[test]
    fn test_later_well_entries_overwrite() {
        let layout = resolve(&tree(json!({
            "well": {
                "A1,A2": {"x": 1, "y": 1},
                "A01": {"x": 2, "z": 2},
            },
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 2, "y": 1, "z": 2}))));
        assert_eq!(layout.well("A2"), Some(&attrs(json!({"x": 1, "y": 1}))));
    }

    #[test]
    fn test_one_row_col() {
        let layout = resolve(&tree(json!({
            "row": {"A": {"x": 1}},
            "col": {"1": {"y": 1}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["A1"]);
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 1}))));
    }

    #[test]
    fn test_multiple_rows() {
        let layout = resolve(&tree(json!({
            "row": {"A": {"x": 1}, "B": {"x": 2}},
            "col": {"1": {"y": 1}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 1}))));
        assert_eq!(layout.well("B1"), Some(&attrs(json!({"x": 2, "y": 1}))));
    }

    #[test]
    fn test_multiple_cols() {
        let layout = resolve(&tree(json!({
            "row": {"A": {"x": 1}},
            "col": {"1": {"y": 1}, "2": {"y": 2}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 1}))));
        assert_eq!(layout.well("A2"), Some(&attrs(json!({"x": 1, "y": 2}))));
    }

    #[test]
    fn test_row_pattern_consolidates() {
        let layout = resolve(&tree(json!({
            "row": {"A-C": {"x": 1, "y": 1}, "B": {"x": 2}},
            "col": {"1": {}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 1}))));
        assert_eq!(layout.well("B1"), Some(&attrs(json!({"x": 2, "y": 1}))));
        assert_eq!(layout.well("C1"), Some(&attrs(json!({"x": 1, "y": 1}))));
    }

    #[test]
    fn test_interleaved_row() {
        let layout = resolve(&tree(json!({
            "irow": {"A": {"x": 1}},
            "col": {"1": {"y": 1}, "2": {"y": 2}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 1}))));
        assert_eq!(layout.well("B2"), Some(&attrs(json!({"x": 1, "y": 2}))));

        let layout = resolve(&tree(json!({
            "irow": {"B": {"x": 2}},
            "col": {"1": {"y": 1}, "2": {"y": 2}},
        })))
        .unwrap();
        assert_eq!(layout.well("B1"), Some(&attrs(json!({"x": 2, "y": 1}))));
        assert_eq!(layout.well("A2"), Some(&attrs(json!({"x": 2, "y": 2}))));
    }

    #[test]
    fn test_interleaved_col() {
        let layout = resolve(&tree(json!({
            "row": {"A": {"x": 1}, "B": {"x": 2}},
            "icol": {"1": {"y": 1}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 1}))));
        assert_eq!(layout.well("B2"), Some(&attrs(json!({"x": 2, "y": 1}))));

        let layout = resolve(&tree(json!({
            "row": {"A": {"x": 1}, "B": {"x": 2}},
            "icol": {"2": {"y": 2}},
        })))
        .unwrap();
        assert_eq!(layout.well("A2"), Some(&attrs(json!({"x": 1, "y": 2}))));
        assert_eq!(layout.well("B1"), Some(&attrs(json!({"x": 2, "y": 2}))));
    }

    #[test]
    fn test_precedence_per_key() {
        let layout = resolve(&tree(json!({
            "x": 5, "y": 5, "z": 5, "w": 5, "v": 5,
            "well": {"A1": {"x": 1}},
            "block": {"1x1": {"A1": {"x": 2, "y": 2}}},
            "row": {"A": {"x": 3, "y": 3, "z": 3}},
            "col": {"1": {"x": 4, "y": 4, "w": 4}},
        })))
        .unwrap();
        assert_eq!(
            layout.well("A1"),
            Some(&attrs(json!({"x": 1, "y": 2, "z": 3, "w": 4, "v": 5})))
        );
    }

    #[test]
    fn test_axis_precedence() {
        let layout = resolve(&tree(json!({
            "row": {"A": {"a": "row"}},
            "col": {"1": {"a": "col", "b": "col"}},
            "irow": {"A": {"a": "irow", "b": "irow", "c": "irow"}},
            "icol": {"1": {"a": "icol", "b": "icol", "c": "icol", "d": "icol"}},
        })))
        .unwrap();
        assert_eq!(
            layout.well("A1"),
            Some(&attrs(json!({"a": "row", "b": "col", "c": "irow", "d": "icol"})))
        );
    }

    #[test]
    fn test_nested_attributes_merge() {
        let layout = resolve(&tree(json!({
            "reagent": {"name": "buffer", "conc": 1},
            "well": {"A1": {"reagent": {"conc": 2}}},
        })))
        .unwrap();
        assert_eq!(
            layout.well("A1"),
            Some(&attrs(json!({"reagent": {"conc": 2, "name": "buffer"}})))
        );
    }

    #[test]
    fn test_block_covers_rectangle() {
        let layout = resolve(&tree(json!({
            "block": {"2x3": {"A1": {"x": 1}}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["A1", "A2", "B1", "B2", "C1", "C2"]);
        for (_, attrs) in &layout {
            assert_eq!(attrs["x"], 1);
        }
    }

    #[test]
    fn test_empty_block_still_defines_wells() {
        let layout = resolve(&tree(json!({
            "block": {"2x1": {"A1": {}}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["A1", "A2"]);
        assert_eq!(layout.well("A1"), Some(&AttributeSet::new()));
    }

    #[test]
    fn test_smaller_block_wins() {
        let layout = resolve(&tree(json!({
            "block": {
                "1x1": {"A1": {"x": 1}},
                "2x2": {"A1": {"x": 4, "y": 4}},
            },
        })))
        .unwrap();
        assert_eq!(layout.well("A1"), Some(&attrs(json!({"x": 1, "y": 4}))));
        assert_eq!(layout.well("B2"), Some(&attrs(json!({"x": 4, "y": 4}))));
    }

    #[test]
    fn test_later_equal_area_block_wins() {
        let layout = resolve(&tree(json!({
            "block": {
                "2x1": {"A1": {"x": "2x1"}},
                "1x2": {"A1": {"x": "1x2"}},
            },
        })))
        .unwrap();
        assert_eq!(layout.well("A1").unwrap()["x"], "1x2");
        assert_eq!(layout.well("A2").unwrap()["x"], "2x1");
        assert_eq!(layout.well("B1").unwrap()["x"], "1x2");

        // A smaller block beats both, wherever it is declared.
        let layout = resolve(&tree(json!({
            "block": {
                "1x1": {"A1": {"x": "1x1"}},
                "2x1": {"A1": {"x": "2x1"}},
                "1x2": {"A1": {"x": "1x2"}},
            },
        })))
        .unwrap();
        assert_eq!(layout.well("A1").unwrap()["x"], "1x1");
    }

    #[test]
    fn test_later_top_left_in_same_group_wins() {
        let layout = resolve(&tree(json!({
            "block": {"2x1": {"A1": {"x": 1}, "A2": {"x": 2}}},
        })))
        .unwrap();
        assert_eq!(layout.well("A1").unwrap()["x"], 1);
        assert_eq!(layout.well("A2").unwrap()["x"], 2);
        assert_eq!(layout.well("A3").unwrap()["x"], 2);
    }

    #[test]
    fn test_block_pattern_top_lefts() {
        let layout = resolve(&tree(json!({
            "block": {"2x2": {"A1,A3,...,A5": {"x": 1}}},
        })))
        .unwrap();
        assert_eq!(layout.len(), 12);
    }

    #[test]
    fn test_rows_span_existing_wells() {
        let layout = resolve(&tree(json!({
            "well": {"A1": {}, "A3": {}},
            "row": {"B": {"x": 1}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["A1", "A3", "B1", "B2", "B3"]);
        assert_eq!(layout.well("A1"), Some(&AttributeSet::new()));
        assert_eq!(layout.well("B2"), Some(&attrs(json!({"x": 1}))));
    }

    #[test]
    fn test_row_without_cols_is_span_error() {
        let err = resolve(&tree(json!({"row": {"A": {"x": 1}}}))).unwrap_err();
        assert!(matches!(err, LayoutError::Span(_)));
        assert_eq!(err.to_string(), "Found 1 [row] spec, but no columns.  No wells defined.");

        let layout = resolve(&tree(json!({
            "row": {"A": {"x": 1}},
            "col": {"5": {}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["A5"]);
    }

    #[test]
    fn test_cols_without_rows_is_span_error() {
        let err = resolve(&tree(json!({"col": {"1": {}, "2": {}}}))).unwrap_err();
        assert_eq!(err.to_string(), "Found 2 [col] specs, but no rows.  No wells defined.");

        let err = resolve(&tree(json!({"icol": {"1": {}}}))).unwrap_err();
        assert!(err.to_string().contains("[icol]"));

        let err = resolve(&tree(json!({"irow": {"A": {}}}))).unwrap_err();
        assert!(err.to_string().contains("[irow]"));
    }

    #[test]
    fn test_existing_wells_satisfy_span() {
        let layout = resolve(&tree(json!({
            "well": {"C3": {}},
            "col": {"1": {"y": 1}},
        })))
        .unwrap();
        assert_eq!(well_names(&layout), vec!["C1", "C3"]);
    }

    #[test]
    fn test_global_only_has_no_wells() {
        let err = resolve(&tree(json!({"x": 1}))).unwrap_err();
        assert_eq!(err, LayoutError::NoWells);

        let layout = resolve_wells(&tree(json!({"x": 1}))).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn test_bad_pattern_propagates() {
        let err = resolve(&tree(json!({"row": {"A,C,...,D": {}}, "col": {"1": {}}}))).unwrap_err();
        assert!(matches!(err, LayoutError::Pattern(_)));

        let err = resolve(&tree(json!({"well": {"1A": {}}}))).unwrap_err();
        assert!(matches!(err, LayoutError::Address(_)));
    }

    #[test]
    fn test_block_past_last_column_is_address_error() {
        let last = format!("A{}", usize::MAX);
        let err = resolve(&tree(json!({"block": {"3x1": {last: {}}}}))).unwrap_err();
        assert!(matches!(err, LayoutError::Address(_)));
    }

    #[test]
    fn test_serialize_by_well_name() {
        let layout = resolve(&tree(json!({"well": {"B2": {"x": 1}}}))).unwrap();
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value, json!({"B2": {"x": 1}}));
    }

    #[test]
    fn test_precedence_table() {
        let order: Vec<_> = PRECEDENCE.iter().map(|s| s.scope).collect();
        assert_eq!(
            order,
            vec![
                ScopeKind::Well,
                ScopeKind::Block,
                ScopeKind::Row,
                ScopeKind::Col,
                ScopeKind::IRow,
                ScopeKind::ICol,
                ScopeKind::Global,
            ]
        );
        let overwriting: Vec<_> = PRECEDENCE.iter().filter(|s| s.overwrite).map(|s| s.scope).collect();
        assert_eq!(overwriting, vec![ScopeKind::Well]);
    }

    #[test]
    fn test_resolution_does_not_touch_tree() {
        let original = tree(json!({
            "x": {"y": 1},
            "well": {"A1": {"x": {"z": 2}}},
        }));
        let copy = original.clone();
        resolve(&original).unwrap();
        assert_eq!(original, copy);
    }
}
