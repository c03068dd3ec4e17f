use crate::error::{RunsetError, RunsetResult};
use crate::params::ParameterDocument;
use serde_json::Value;

/// Return the first candidate whose `key` entry equals `value`.
///
/// `section` only names the candidate list in the error.
pub fn match_by_value<'a>(
    candidates: &'a [Value],
    section: &str,
    key: &str,
    value: &Value,
) -> RunsetResult<&'a Value> {
    candidates
        .iter()
        .find(|candidate| candidate.get(key) == Some(value))
        .ok_or_else(|| RunsetError::VariantNotFound {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// The list of variants stored under `section` in a defaults document.
pub fn variants<'a>(defaults: &'a ParameterDocument, section: &str) -> RunsetResult<&'a [Value]> {
    match defaults.get(section) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(RunsetError::InvalidSpec(format!(
            "defaults section `{section}` must be a list of variants"
        ))),
        None => Err(RunsetError::InvalidSpec(format!("defaults have no `{section}` section"))),
    }
}
