//! Loading layouts from TOML files.
//!
//! Each file is read into an ordered JSON map, its `[meta]` directives are
//! followed, and the remaining sections become scope trees: one for the top
//! level and one per `[plate.<name>]`. Includes are merged into the tree
//! that asked for them; concatenated files are resolved on their own and
//! their plates appended after this file's.

use crate::error::LoadError;
use crate::meta::{Alert, Concat, Directives, Meta};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wellmap_layout::{
    resolve_wells, shift_tree, LayoutError, LayoutResult, ResolvedLayout, ScopeTree, ShiftVector,
};

/// Knobs for [`load_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Shift applied to the top-level file, and composed into its includes.
    pub shift: ShiftVector,

    /// Return an empty layout instead of failing with "No wells defined."
    pub allow_empty: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift(mut self, shift: ShiftVector) -> Self {
        self.shift = shift;
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

/// The wells of one plate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateLayout {
    /// `None` for a file without `[plate]` sections
    pub name: Option<String>,

    pub wells: ResolvedLayout,
}

/// A fully loaded layout: every plate, plus what was learned on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    /// Plates in file order, followed by concatenated plates
    pub plates: Vec<PlateLayout>,

    pub meta: Meta,
}

impl Layout {
    /// Total number of wells across all plates.
    pub fn len(&self) -> usize {
        self.plates.iter().map(|plate| plate.wells.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first plate with the given name.
    pub fn plate(&self, name: &str) -> Option<&PlateLayout> {
        self.plates
            .iter()
            .find(|plate| plate.name.as_deref() == Some(name))
    }
}

/// Load a layout file with default options.
pub fn load(path: impl AsRef<Path>) -> Result<Layout, LoadError> {
    load_with(path, &LoadOptions::default())
}

/// Load a layout file.
pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Layout, LoadError> {
    let path = path.as_ref();
    let mut loader = Loader::default();
    let plates = loader.load_layout(path, options.shift)?;

    let layout = Layout {
        plates,
        meta: loader.meta,
    };
    debug!(
        path = %path.display(),
        plates = layout.plates.len(),
        wells = layout.len(),
        "loaded layout"
    );

    if layout.is_empty() && !options.allow_empty {
        return Err(LayoutError::NoWells.with_path(path).into());
    }
    Ok(layout)
}

/// The layout sections of one file, after its includes are merged in.
#[derive(Debug, Clone, Default, PartialEq)]
struct Document {
    tree: ScopeTree,
    plates: IndexMap<String, ScopeTree>,
}

impl Document {
    fn from_map(mut doc: Map<String, Value>, shift: ShiftVector) -> LayoutResult<Self> {
        let mut plates = IndexMap::new();

        let section = doc.get("plate").cloned();
        doc.retain(|key, _| key != "plate");

        if let Some(section) = section {
            let section = section.as_object().ok_or_else(|| {
                LayoutError::Structure(format!("Expected [plate] to be a table, not: {}", section))
            })?;
            for (name, plate) in section {
                let plate = plate.as_object().ok_or_else(|| {
                    LayoutError::Structure(format!(
                        "Illegal attribute '{}' within [plate] block but outside of any plates.",
                        name
                    ))
                })?;
                if plate.contains_key("expt") {
                    return Err(LayoutError::Structure(
                        "Cannot use [expt] in [plate] blocks.".to_string(),
                    ));
                }
                let tree = ScopeTree::from_document(plate)?;
                plates.insert(name.clone(), shift_tree(tree, shift)?);
            }
        }

        let tree = shift_tree(ScopeTree::from_document(&doc)?, shift)?;
        Ok(Self { tree, plates })
    }

    /// Layer `top` over this document, so that it wins every tie.
    ///
    /// Plates of `top` come first, each merged over the plate of the same
    /// name already here.
    fn overlay(&mut self, top: &Document) {
        self.tree.overlay(&top.tree);

        let mut plates = IndexMap::with_capacity(self.plates.len() + top.plates.len());
        for (name, plate) in &top.plates {
            let mut merged = self.plates.shift_remove(name).unwrap_or_default();
            merged.overlay(plate);
            plates.insert(name.clone(), merged);
        }
        plates.extend(self.plates.drain(..));
        self.plates = plates;
    }

    /// Resolve every plate. Plates that end up without wells are dropped.
    fn resolve(&self) -> LayoutResult<Vec<PlateLayout>> {
        if self.plates.is_empty() {
            let wells = resolve_wells(&self.tree)?;
            return Ok(if wells.is_empty() {
                Vec::new()
            } else {
                vec![PlateLayout { name: None, wells }]
            });
        }

        let mut plates = Vec::with_capacity(self.plates.len());
        for (name, plate) in &self.plates {
            let mut tree = self.tree.clone();
            tree.overlay(plate);
            let wells = resolve_wells(&tree)?;
            debug!(plate = %name, wells = wells.len(), "resolved plate");
            if !wells.is_empty() {
                plates.push(PlateLayout {
                    name: Some(name.clone()),
                    wells,
                });
            }
        }
        Ok(plates)
    }
}

#[derive(Debug, Default)]
struct Loader {
    /// Files currently being loaded, outermost first
    stack: Vec<PathBuf>,
    meta: Meta,
}

impl Loader {
    /// Load a file as an independent layout, concatenated plates included.
    fn load_layout(&mut self, path: &Path, shift: ShiftVector) -> Result<Vec<PlateLayout>, LoadError> {
        let (path, document, concats) = self.load_document(path, shift)?;
        let mut plates = document.resolve().map_err(|e| e.with_path(&path))?;
        plates.extend(concats);
        Ok(plates)
    }

    fn load_document(
        &mut self,
        path: &Path,
        shift: ShiftVector,
    ) -> Result<(PathBuf, Document, Vec<PlateLayout>), LoadError> {
        let path = fs::canonicalize(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if self.stack.contains(&path) {
            let err = LayoutError::Structure(format!(
                "Layout file includes itself: {}",
                path.display()
            ));
            return Err(err.with_path(&path).into());
        }

        self.stack.push(path.clone());
        let result = self.read_document(&path, shift);
        self.stack.pop();

        let (document, concats) = result?;
        Ok((path, document, concats))
    }

    fn read_document(
        &mut self,
        path: &Path,
        shift: ShiftVector,
    ) -> Result<(Document, Vec<PlateLayout>), LoadError> {
        let mut doc = self.read_toml(path)?;
        debug!(path = %path.display(), %shift, "reading layout file");

        let directives = Directives::parse(doc.get("meta")).map_err(|e| e.with_path(path))?;
        doc.retain(|key, _| key != "meta");
        let own = Document::from_map(doc, shift).map_err(|e| e.with_path(path))?;
        let mut document = Document::default();
        let mut concats = Vec::new();

        // Each include goes over the ones before it, and this file over all.
        for include in &directives.includes {
            let include_path = resolve_path(path, &include.path);
            debug!(path = %include_path.display(), shift = %include.shift, "including layout");
            let (_, included, included_concats) =
                self.load_document(&include_path, shift + include.shift)?;
            document.overlay(&included);
            concats.extend(included_concats);
        }
        document.overlay(&own);

        for Concat { name, path: concat_path } in &directives.concats {
            let concat_path = resolve_path(path, concat_path);
            debug!(path = %concat_path.display(), "concatenating layout");
            let mut plates = self.load_layout(&concat_path, ShiftVector::ZERO)?;
            if let Some(name) = name {
                for plate in &mut plates {
                    plate.name = Some(name.clone());
                }
            }
            concats.extend(plates);
        }

        if let Some(message) = directives.alert {
            warn!(path = %path.display(), "{}", message);
            self.meta.alerts.push(Alert {
                path: path.to_path_buf(),
                message,
            });
        }

        Ok((document, concats))
    }

    /// Read a TOML file into an ordered JSON map, recording its digest.
    fn read_toml(&mut self, path: &Path) -> Result<Map<String, Value>, LoadError> {
        let io_error = |source: io::Error| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let bytes = fs::read(path).map_err(io_error)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());
        self.meta.dependencies.insert(path.to_path_buf(), digest);

        let contents = String::from_utf8(bytes)
            .map_err(|e| io_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let table: toml::Table = toml::from_str(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(table
            .into_iter()
            .map(|(key, value)| (key, toml_to_json(value)))
            .collect())
    }
}

/// Interpret `child` relative to the directory holding `parent`.
fn resolve_path(parent: &Path, child: &Path) -> PathBuf {
    if child.is_absolute() {
        return child.to_path_buf();
    }
    match parent.parent() {
        Some(dir) => dir.join(child),
        None => child.to_path_buf(),
    }
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
