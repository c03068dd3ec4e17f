//! JSON parameter documents (defaults and jobs files).
//!
//! A [`ParameterDocument`] is an ordered mapping from section name to value.
//! Key order is the order of the source file, which the run-name deriver
//! depends on.

use crate::error::{RunsetError, RunsetResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

pub const MODEL: &str = "model";
pub const OPTIMIZER: &str = "optimizer";
pub const SCHEDULER: &str = "scheduler";
pub const DATA: &str = "data";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDocument {
    sections: Map<String, Value>,
}

impl ParameterDocument {
    #[must_use]
    pub fn new(sections: Map<String, Value>) -> Self {
        Self { sections }
    }

    /// Load a document from a JSON file whose top level is an object.
    pub fn load(path: &Path) -> RunsetResult<Self> {
        if !path.exists() {
            return Err(RunsetError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes).map_err(|e| match e {
            RunsetError::Malformed { message, .. } => {
                RunsetError::Malformed { path: path.to_path_buf(), message }
            }
            other => other,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> RunsetResult<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| RunsetError::Malformed {
            path: Default::default(),
            message: e.to_string(),
        })?;
        Self::try_from(value)
    }

    /// Write the document as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> RunsetResult<()> {
        write_pretty_json(path, &self.sections)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }

    pub fn model(&self) -> Option<&Value> {
        self.get(MODEL)
    }

    pub fn optimizer(&self) -> Option<&Value> {
        self.get(OPTIMIZER)
    }

    pub fn scheduler(&self) -> Option<&Value> {
        self.get(SCHEDULER)
    }

    pub fn data(&self) -> Option<&Value> {
        self.get(DATA)
    }

    pub fn update(&mut self, key: impl Into<String>, value: Value) {
        self.sections.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.sections.iter()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.sections
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.sections
    }
}

impl TryFrom<Value> for ParameterDocument {
    type Error = RunsetError;

    fn try_from(value: Value) -> RunsetResult<Self> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            other => Err(RunsetError::Malformed {
                path: Default::default(),
                message: format!("expected a JSON object at the top level, found {}", kind(&other)),
            }),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize `value` with a 4-space indent and write it to `path`.
pub fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RunsetResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.push(b'\n');
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = ParameterDocument::load(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, RunsetError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_json_is_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{ \"model\": ").unwrap();

        match ParameterDocument::load(&path).unwrap_err() {
            RunsetError::Malformed { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = ParameterDocument::from_slice(b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_named_and_generic_access_share_data() {
        let doc = ParameterDocument::try_from(json!({
            "model": {"network": "resnet18"},
            "epochs": 10
        }))
        .unwrap();

        assert_eq!(doc.model(), doc.get("model"));
        assert_eq!(doc.get("epochs"), Some(&json!(10)));
        assert!(doc.optimizer().is_none());
    }

    #[test]
    fn test_save_preserves_order_and_indent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("jobs.json");
        let doc = ParameterDocument::from_slice(br#"{"zeta": 1, "alpha": {"b": 2}}"#).unwrap();

        doc.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        assert!(text.contains("\n    \"zeta\": 1"));
        assert_eq!(ParameterDocument::load(&path).unwrap(), doc);
    }
}
