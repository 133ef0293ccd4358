//! The `[meta]` section of a layout file.
//!
//! `[meta]` is not part of the layout. It tells the loader which other files
//! to pull in and what to say about them:
//!
//! ```toml
//! [meta]
//! include = ["standard_curve.toml", {path = "controls.toml", shift = "A1 to A11"}]
//! concat = {second = "plate_2.toml"}
//! alert = "Lane 4 was loaded with the wrong primers."
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use wellmap_layout::{parse_shift, LayoutError, LayoutResult, ShiftVector};

/// A message a layout file wants shown to whoever loads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// File that raised the alert
    pub path: PathBuf,

    pub message: String,
}

/// Information gathered while loading that is not part of the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Alerts in the order they were raised
    pub alerts: Vec<Alert>,

    /// Every layout file read, mapped to the SHA-256 digest of its bytes
    pub dependencies: BTreeMap<PathBuf, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Include {
    pub path: PathBuf,
    pub shift: ShiftVector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Concat {
    /// Plate name given to every plate of the concatenated file
    pub name: Option<String>,
    pub path: PathBuf,
}

/// Parsed `[meta]` directives, with paths still relative to their file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Directives {
    /// In declaration order. Later includes win over earlier ones.
    pub includes: Vec<Include>,
    pub concats: Vec<Concat>,
    pub alert: Option<String>,
}

impl Directives {
    pub(crate) fn parse(meta: Option<&Value>) -> LayoutResult<Self> {
        let Some(meta) = meta else {
            return Ok(Self::default());
        };
        let meta = meta.as_object().ok_or_else(|| {
            LayoutError::Structure(format!("Expected [meta] to be a table, not: {}", meta))
        })?;

        let mut directives = Self::default();
        if let Some(value) = meta.get("include") {
            directives.includes = parse_includes(value)?;
        }
        if let Some(value) = meta.get("concat") {
            directives.concats = parse_concats(value)?;
        }
        if let Some(value) = meta.get("alert") {
            let message = value.as_str().ok_or_else(|| {
                LayoutError::Structure(format!(
                    "Expected 'meta.alert' to be a string, not: {}",
                    value
                ))
            })?;
            directives.alert = Some(message.to_string());
        }
        Ok(directives)
    }
}

fn parse_includes(value: &Value) -> LayoutResult<Vec<Include>> {
    match value {
        Value::Array(items) => {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_include(item, &format!("meta.include[{}]", i)))
                .collect()
        }
        Value::String(_) | Value::Object(_) => Ok(vec![parse_include(value, "meta.include")?]),
        other => Err(LayoutError::Structure(format!(
            "Expected 'meta.include' to be a string, list, or table, not: {}",
            other
        ))),
    }
}

fn parse_include(value: &Value, label: &str) -> LayoutResult<Include> {
    match value {
        Value::String(path) => Ok(Include {
            path: PathBuf::from(path),
            shift: ShiftVector::ZERO,
        }),
        Value::Object(table) => {
            let path = table.get("path").and_then(Value::as_str).ok_or_else(|| {
                LayoutError::Structure(format!(
                    "If '{}' is a table, it must have a 'path' string",
                    label
                ))
            })?;
            let shift = match table.get("shift") {
                None => ShiftVector::ZERO,
                Some(Value::String(text)) => parse_shift(text)?,
                Some(other) => {
                    return Err(LayoutError::Shift(format!(
                        "Expected '{}.shift' to be a string, not: {}",
                        label, other
                    )))
                }
            };
            Ok(Include {
                path: PathBuf::from(path),
                shift,
            })
        }
        other => Err(LayoutError::Structure(format!(
            "Expected '{}' to be a string or table, not: {}",
            label, other
        ))),
    }
}

fn parse_concats(value: &Value) -> LayoutResult<Vec<Concat>> {
    let unnamed = |path: &Value, label: String| -> LayoutResult<Concat> {
        let path = path.as_str().ok_or_else(|| {
            LayoutError::Structure(format!("Expected '{}' to be a string, not: {}", label, path))
        })?;
        Ok(Concat {
            name: None,
            path: PathBuf::from(path),
        })
    };

    match value {
        Value::String(_) => Ok(vec![unnamed(value, "meta.concat".to_string())?]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| unnamed(item, format!("meta.concat[{}]", i)))
            .collect(),
        Value::Object(table) => table
            .iter()
            .map(|(name, path)| {
                let mut concat = unnamed(path, format!("meta.concat.{}", name))?;
                concat.name = Some(name.clone());
                Ok(concat)
            })
            .collect(),
        other => Err(LayoutError::Structure(format!(
            "Expected 'meta.concat' to be a string, list, or table, not: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(meta: Value) -> LayoutResult<Directives> {
        Directives::parse(Some(&meta))
    }

    #[test]
    fn test_no_meta() {
        assert_eq!(Directives::parse(None).unwrap(), Directives::default());
        assert_eq!(parse(json!({})).unwrap(), Directives::default());
    }

    #[test]
    fn test_include_forms() {
        let single = parse(json!({"include": "a.toml"})).unwrap();
        assert_eq!(
            single.includes,
            vec![Include { path: "a.toml".into(), shift: ShiftVector::ZERO }]
        );

        let table = parse(json!({"include": {"path": "a.toml", "shift": "A1 to B2"}})).unwrap();
        assert_eq!(
            table.includes,
            vec![Include { path: "a.toml".into(), shift: ShiftVector::new(1, 1) }]
        );
    }

    #[test]
    fn test_include_list_keeps_order() {
        let directives = parse(json!({
            "include": ["a.toml", {"path": "b.toml", "shift": "A1 to A2"}, "c.toml"],
        }))
        .unwrap();

        let paths: Vec<_> = directives.includes.iter().map(|x| x.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.toml"), "b.toml".into(), "c.toml".into()]);
        assert_eq!(directives.includes[1].shift, ShiftVector::new(0, 1));
    }

    #[test]
    fn test_include_errors() {
        let err = parse(json!({"include": 1})).unwrap_err();
        assert!(matches!(err, LayoutError::Structure(_)));

        let err = parse(json!({"include": [["a.toml"]]})).unwrap_err();
        assert!(err.to_string().contains("'meta.include[0]'"));

        let err = parse(json!({"include": {"shift": "A1 to B2"}})).unwrap_err();
        assert!(err.to_string().contains("'path'"));

        let err = parse(json!({"include": {"path": "a.toml", "shift": "A1 B2"}})).unwrap_err();
        assert!(matches!(err, LayoutError::Shift(_)));
    }

    #[test]
    fn test_concat_forms() {
        let single = parse(json!({"concat": "a.toml"})).unwrap();
        assert_eq!(single.concats, vec![Concat { name: None, path: "a.toml".into() }]);

        let list = parse(json!({"concat": ["a.toml", "b.toml"]})).unwrap();
        assert_eq!(list.concats.len(), 2);
        assert!(list.concats.iter().all(|c| c.name.is_none()));

        let named = parse(json!({"concat": {"x": "a.toml", "y": "b.toml"}})).unwrap();
        assert_eq!(
            named.concats,
            vec![
                Concat { name: Some("x".into()), path: "a.toml".into() },
                Concat { name: Some("y".into()), path: "b.toml".into() },
            ]
        );
    }

    #[test]
    fn test_concat_errors() {
        assert!(parse(json!({"concat": 1})).is_err());
        assert!(parse(json!({"concat": [1]})).is_err());
        assert!(parse(json!({"concat": {"x": true}})).is_err());
    }

    #[test]
    fn test_alert() {
        let directives = parse(json!({"alert": "careful"})).unwrap();
        assert_eq!(directives.alert.as_deref(), Some("careful"));

        assert!(parse(json!({"alert": 1})).is_err());
    }

    #[test]
    fn test_meta_must_be_table() {
        let err = Directives::parse(Some(&json!("x"))).unwrap_err();
        assert!(matches!(err, LayoutError::Structure(_)));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let directives = parse(json!({"path": "data.csv", "style": {"cmap": "viridis"}})).unwrap();
        assert_eq!(directives, Directives::default());
    }
}
