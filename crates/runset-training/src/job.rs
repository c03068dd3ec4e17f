use crate::error::{RunsetError, RunsetResult};
use crate::params::ParameterDocument;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Component, Path};

/// One experiment's parameter overrides, as authored in the jobs file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSpec(pub Map<String, Value>);

impl RunSpec {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl TryFrom<Value> for RunSpec {
    type Error = RunsetError;

    fn try_from(value: Value) -> RunsetResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RunsetError::InvalidSpec(format!("run spec must be an object, got {other}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobsFields {
    jobname: String,
    experiments: Vec<RunSpec>,
}

/// A batch of experiments sharing one experiment directory.
#[derive(Debug, Clone)]
pub struct JobsDocument {
    pub jobname: String,
    pub experiments: Vec<RunSpec>,
    raw: ParameterDocument,
}

impl JobsDocument {
    pub fn load(path: &Path) -> RunsetResult<Self> {
        let raw = ParameterDocument::load(path)?;
        Self::from_document(raw)
    }

    pub fn from_document(raw: ParameterDocument) -> RunsetResult<Self> {
        let fields: JobsFields = serde_json::from_value(Value::Object(raw.as_map().clone()))
            .map_err(|e| RunsetError::InvalidSpec(format!("jobs document: {e}")))?;
        validate_jobname(&fields.jobname)?;
        Ok(Self { jobname: fields.jobname, experiments: fields.experiments, raw })
    }

    /// The document exactly as loaded, for the provenance snapshot.
    #[must_use]
    pub fn document(&self) -> &ParameterDocument {
        &self.raw
    }
}

/// A jobname names one directory directly under the experiment root.
fn validate_jobname(jobname: &str) -> RunsetResult<()> {
    if jobname.trim().is_empty() {
        return Err(RunsetError::InvalidSpec("jobs document: jobname is empty".to_string()));
    }
    let mut components = Path::new(jobname).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
    if !single_normal || jobname.contains(['/', '\\']) {
        return Err(RunsetError::InvalidSpec(format!(
            "jobs document: jobname `{jobname}` must be a single directory name"
        )));
    }
    Ok(())
}
