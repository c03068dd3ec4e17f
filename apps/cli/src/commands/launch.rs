//! Launch command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use runset_training::{
    build_invocation, launch, materialize_all, ExperimentLayout, JobsDocument, LaunchOptions, LauncherConfig,
    ParameterDocument, ProcessRunner, RunMode, StdoutProgressSink,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct LaunchArgs {
    /// Parent directory for all experiments [default: ./experiments/]
    #[arg(long = "exp_dir")]
    pub exp_dir: Option<PathBuf>,

    /// Parent directory for the dataset [default: ./data/imagenet/images/]
    #[arg(long = "data_dir")]
    pub data_dir: Option<PathBuf>,

    /// Directory containing the default parameters.json file [default: ./common/]
    #[arg(long = "default_dir")]
    pub default_dir: Option<PathBuf>,

    /// Directory containing the jobs file [default: ./]
    #[arg(long = "jobs_dir")]
    pub jobs_dir: Option<PathBuf>,

    /// Entry point run mode (train or test) [default: train]
    #[arg(long = "runmode")]
    pub runmode: Option<RunMode>,

    /// Jobs file name inside jobs_dir [default: launch-test.json]
    #[arg(long = "runset")]
    pub runset: Option<String>,

    /// Interpreter used to run the entry point [default: python3]
    #[arg(long)]
    pub python: Option<String>,

    /// Training entry point [default: main.py]
    #[arg(long = "entry-point")]
    pub entry_point: Option<String>,

    /// Create run directories and print the commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

impl LaunchArgs {
    /// Layer the command-line flags over the file/env configuration.
    pub fn resolve(&self, mut config: LauncherConfig) -> LauncherConfig {
        let flags = LauncherConfig {
            python: self.python.clone(),
            entry_point: self.entry_point.clone(),
            exp_dir: self.exp_dir.clone(),
            data_dir: self.data_dir.clone(),
            default_dir: self.default_dir.clone(),
            jobs_dir: self.jobs_dir.clone(),
            runset: self.runset.clone(),
            run_mode: self.runmode,
        };
        config.merge(&flags);
        config
    }
}

pub async fn execute(args: LaunchArgs, file_config: LauncherConfig) -> Result<()> {
    let config = args.resolve(file_config);

    let jobs_path = config.jobs_path();
    let jobs = JobsDocument::load(&jobs_path)
        .with_context(|| format!("Failed to load jobs file: {}", jobs_path.display()))?;
    let defaults_path = config.defaults_path();
    let defaults = ParameterDocument::load(&defaults_path)
        .with_context(|| format!("Failed to load default parameters: {}", defaults_path.display()))?;

    let layout = ExperimentLayout::for_job(&config.exp_dir(), &jobs.jobname);
    let runs = materialize_all(&jobs, &defaults, &layout, &StdoutProgressSink)
        .with_context(|| format!("Failed to create run directories for job `{}`", jobs.jobname))?;

    let options = LaunchOptions {
        python: config.python().to_string(),
        entry_point: config.entry_point().to_string(),
        data_dir: config.data_dir(),
        run_mode: config.run_mode(),
    };

    if args.dry_run {
        println!();
        println!("{}", format!("Dry run: {} job(s) not launched", runs.len()).bold().yellow());
        for run_dir in &runs {
            println!("  {}", build_invocation(run_dir, &options).command_line());
        }
        return Ok(());
    }

    let completed = launch(&runs, &options, &ProcessRunner, &StdoutProgressSink).await?;

    println!();
    println!("{}", format!("Completed {completed} job(s) for `{}`", jobs.jobname).bold().green());
    println!("  Experiments: {}", layout.root().display().to_string().dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_config() {
        let file = LauncherConfig {
            python: Some("/opt/python".to_string()),
            runset: Some("sweep.json".to_string()),
            ..Default::default()
        };
        let args = LaunchArgs { python: Some("python3.11".to_string()), ..Default::default() };

        let config = args.resolve(file);

        assert_eq!(config.python(), "python3.11");
        assert_eq!(config.jobs_path(), PathBuf::from("./sweep.json"));
    }
}
