//! Sequential, fail-fast launching of the external training entry point.
//!
//! Every run directory gets one blocking invocation of
//! `<python> <entry_point> --run_dir <dir> --data_dir <dir> --run_mode <mode>`.
//! The first non-zero exit aborts the remaining queue.

use crate::error::{RunsetError, RunsetResult};
use crate::progress::{ProgressEvent, ProgressSink};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

pub const DEFAULT_ENTRY_POINT: &str = "main.py";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Train,
    Test,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Test => f.write_str("test"),
        }
    }
}

impl FromStr for RunMode {
    type Err = RunsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Self::Train),
            "test" => Ok(Self::Test),
            other => Err(RunsetError::Config(format!("unknown run mode `{other}` (expected train or test)"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub python: String,
    pub entry_point: String,
    pub data_dir: PathBuf,
    pub run_mode: RunMode,
}

/// A fully built external command for one run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub run_dir: PathBuf,
}

impl Invocation {
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[must_use]
pub fn build_invocation(run_dir: &Path, options: &LaunchOptions) -> Invocation {
    Invocation {
        program: options.python.clone(),
        args: vec![
            options.entry_point.clone(),
            "--run_dir".to_string(),
            run_dir.display().to_string(),
            "--data_dir".to_string(),
            options.data_dir.display().to_string(),
            "--run_mode".to_string(),
            options.run_mode.to_string(),
        ],
        run_dir: run_dir.to_path_buf(),
    }
}

/// Exit of a launched job. `code` is `None` when the process was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobExit {
    pub code: Option<i32>,
}

impl JobExit {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for JobExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("termination by signal"),
        }
    }
}

#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> RunsetResult<JobExit>;
}

/// Spawns the invocation as a child process and waits for it, no shell involved.
#[derive(Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl JobRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> RunsetResult<JobExit> {
        let status = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .kill_on_drop(true)
            .status()
            .await?;
        Ok(JobExit { code: status.code() })
    }
}

/// Launch every run directory in order, stopping at the first failure.
///
/// Returns the number of jobs that completed.
pub async fn launch(
    run_dirs: &[PathBuf],
    options: &LaunchOptions,
    runner: &dyn JobRunner,
    progress: &dyn ProgressSink,
) -> RunsetResult<usize> {
    let total = run_dirs.len();
    for (index, run_dir) in run_dirs.iter().enumerate() {
        let invocation = build_invocation(run_dir, options);
        let command = invocation.command_line();
        progress.on_event(ProgressEvent::Launching { index, total, command: command.clone() });
        info!(%command, "launching job {}/{total}", index + 1);

        let exit = runner.run(&invocation).await?;
        if !exit.success() {
            error!(%command, %exit, "job failed, aborting remaining queue");
            return Err(RunsetError::Subprocess { command, status: exit.to_string() });
        }
        progress.on_event(ProgressEvent::Finished { index, total, run_dir: run_dir.clone() });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgressSink;
    use std::sync::Mutex;

    struct RecordingRunner {
        calls: Mutex<Vec<Invocation>>,
        fail_on: Option<usize>,
    }

    impl RecordingRunner {
        fn new(fail_on: Option<usize>) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_on }
        }
    }

    #[async_trait]
    impl JobRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> RunsetResult<JobExit> {
            let mut calls = self.calls.lock().unwrap();
            let idx = calls.len();
            calls.push(invocation.clone());
            let code = if self.fail_on == Some(idx) { 1 } else { 0 };
            Ok(JobExit { code: Some(code) })
        }
    }

    fn options() -> LaunchOptions {
        LaunchOptions {
            python: "python3".to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            data_dir: PathBuf::from("./data"),
            run_mode: RunMode::Test,
        }
    }

    #[test]
    fn test_invocation_arguments() {
        let inv = build_invocation(Path::new("exp/run_a"), &options());
        assert_eq!(inv.program, "python3");
        assert_eq!(
            inv.args,
            vec!["main.py", "--run_dir", "exp/run_a", "--data_dir", "./data", "--run_mode", "test"]
        );
        assert_eq!(inv.command_line(), "python3 main.py --run_dir exp/run_a --data_dir ./data --run_mode test");
    }

    #[test]
    fn test_run_mode_parse() {
        assert_eq!("train".parse::<RunMode>().unwrap(), RunMode::Train);
        assert!("eval".parse::<RunMode>().is_err());
    }

    #[tokio::test]
    async fn test_launches_in_order() {
        let runner = RecordingRunner::new(None);
        let dirs = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];

        let done = launch(&dirs, &options(), &runner, &NullProgressSink).await.unwrap();

        assert_eq!(done, 3);
        let calls = runner.calls.lock().unwrap();
        let order: Vec<_> = calls.iter().map(|c| c.run_dir.clone()).collect();
        assert_eq!(order, dirs);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_queue() {
        let runner = RecordingRunner::new(Some(1));
        let dirs = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];

        let err = launch(&dirs, &options(), &runner, &NullProgressSink).await.unwrap_err();

        assert!(matches!(err, RunsetError::Subprocess { .. }));
        assert!(err.to_string().contains("exit code 1"));
        assert_eq!(runner.calls.lock().unwrap().len(), 2);
    }
}
