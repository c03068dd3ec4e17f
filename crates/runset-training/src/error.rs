use std::path::PathBuf;
use thiserror::Error;

pub type RunsetResult<T> = std::result::Result<T, RunsetError>;

#[derive(Debug, Error)]
pub enum RunsetError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed JSON in {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    #[error("run spec section `{section}` is missing its `{selector}` selector")]
    MissingSelector { section: String, selector: String },

    #[error("no `{section}` default with {key} = {value}")]
    VariantNotFound { section: String, key: String, value: String },

    #[error("dataset {0} meta path not registered")]
    UnknownDataset(String),

    #[error("no meta file found at {} for dataset {dataset}", path.display())]
    MetaFileMissing { dataset: String, path: PathBuf },

    #[error("labels not found in meta file {}", .0.display())]
    LabelsNotFound(PathBuf),

    #[error("label index {label} out of range for {num_classes} classes")]
    LabelOutOfRange { label: i64, num_classes: usize },

    #[error("command `{command}` failed with {status}")]
    Subprocess { command: String, status: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pickle(#[from] serde_pickle::Error),
}
