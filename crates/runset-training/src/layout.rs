use crate::error::RunsetResult;
use std::path::{Path, PathBuf};

pub const RUNSET_FILE: &str = "runset.json";
pub const JOBS_SNAPSHOT_FILE: &str = "jobs.json";

/// Filesystem layout for one batch of experiments.
///
/// Layout is `<exp_root>/<jobname>/<run_name>/runset.json`, with the jobs
/// snapshot at `<exp_root>/<jobname>/jobs.json`.
#[derive(Debug, Clone)]
pub struct ExperimentLayout {
    root: PathBuf,
}

impl ExperimentLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn for_job(exp_root: &Path, jobname: &str) -> Self {
        Self::new(exp_root.join(jobname))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn run_dir(&self, run_name: &str) -> PathBuf {
        self.root.join(run_name)
    }

    #[must_use]
    pub fn runset_path(run_dir: &Path) -> PathBuf {
        run_dir.join(RUNSET_FILE)
    }

    #[must_use]
    pub fn jobs_snapshot_path(&self) -> PathBuf {
        self.root.join(JOBS_SNAPSHOT_FILE)
    }

    pub fn ensure_root(&self) -> RunsetResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = ExperimentLayout::for_job(temp.path(), "ablation");

        assert!(layout.root().ends_with("ablation"));
        assert_eq!(layout.run_dir("resnet18_SGD"), temp.path().join("ablation").join("resnet18_SGD"));
        assert!(layout.jobs_snapshot_path().ends_with("ablation/jobs.json"));
        assert!(ExperimentLayout::runset_path(&layout.run_dir("a")).ends_with("a/runset.json"));
    }

    #[test]
    fn test_ensure_root_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let layout = ExperimentLayout::for_job(temp.path(), "ablation");
        layout.ensure_root().unwrap();
        layout.ensure_root().unwrap();
        assert!(layout.root().is_dir());
    }
}
