//! Runset Training
//!
//! Experiment sweep primitives for an external training entry point:
//! - Loading JSON parameter documents (`ParameterDocument`, `JobsDocument`)
//! - Selecting default variants and deriving run directory names
//! - Materializing one `runset.json` per run (`materialize`)
//! - Launching the training entry point per run, fail-fast (`launch`)
//! - Dataset inspection helpers (class names, label counts, grid layout)

pub mod config;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod job;
pub mod launcher;
pub mod layout;
pub mod matcher;
pub mod materialize;
pub mod naming;
pub mod params;
pub mod progress;

pub use config::LauncherConfig;
pub use dataset::{dataset_meta, label_counts, load_class_names, meta_path, DatasetMeta, DiscreteCdf};
pub use error::{RunsetError, RunsetResult};
pub use grid::{plan_label_grids, GridCell, GridPage};
pub use job::{JobsDocument, RunSpec};
pub use launcher::{build_invocation, launch, Invocation, JobExit, JobRunner, LaunchOptions, ProcessRunner, RunMode};
pub use layout::ExperimentLayout;
pub use matcher::{match_by_value, variants};
pub use materialize::{materialize, materialize_all, resolve_run_config};
pub use naming::{run_name, run_name_tokens};
pub use params::ParameterDocument;
pub use progress::{NullProgressSink, ProgressEvent, ProgressSink, StdoutProgressSink};
