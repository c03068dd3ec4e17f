//! Launcher configuration file support.
//!
//! Precedence, highest first:
//! 1. CLI arguments (applied by the binary)
//! 2. Environment variables (`RUNSET_PYTHON`, `RUNSET_ENTRY_POINT`)
//! 3. Local config file (`./runset.toml`)
//! 4. Global config file (`~/.runset/config.toml`)
//! 5. Built-in defaults

use crate::error::{RunsetError, RunsetResult};
use crate::launcher::{RunMode, DEFAULT_ENTRY_POINT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_EXP_DIR: &str = "./experiments/";
pub const DEFAULT_DATA_DIR: &str = "./data/imagenet/images/";
pub const DEFAULT_DEFAULTS_DIR: &str = "./common/";
pub const DEFAULT_JOBS_DIR: &str = "./";
pub const DEFAULT_RUNSET: &str = "launch-test.json";
pub const DEFAULTS_FILE: &str = "parameters.json";

/// Every field is optional so that files can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Interpreter used to run the training entry point
    #[serde(default)]
    pub python: Option<String>,

    /// Training entry point passed as the first argument
    #[serde(default)]
    pub entry_point: Option<String>,

    #[serde(default)]
    pub exp_dir: Option<PathBuf>,

    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding `parameters.json`
    #[serde(default)]
    pub default_dir: Option<PathBuf>,

    #[serde(default)]
    pub jobs_dir: Option<PathBuf>,

    /// Jobs file name inside `jobs_dir`
    #[serde(default)]
    pub runset: Option<String>,

    #[serde(default)]
    pub run_mode: Option<RunMode>,
}

impl LauncherConfig {
    pub fn load_from_file(path: &Path) -> RunsetResult<Self> {
        if !path.exists() {
            return Err(RunsetError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| RunsetError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save_to_file(&self, path: &Path) -> RunsetResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| RunsetError::Config(format!("failed to serialize: {e}")))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".runset")
            .join("config.toml")
    }

    pub fn default_local_path() -> PathBuf {
        PathBuf::from("runset.toml")
    }

    /// Load the global then the local config file, then apply environment
    /// overrides. Missing files are skipped; unreadable ones are errors.
    pub fn discover_and_load() -> RunsetResult<Self> {
        let mut config = Self::default();
        for path in [Self::default_global_path(), Self::default_local_path()] {
            match Self::load_from_file(&path) {
                Ok(file) => config.merge(&file),
                Err(RunsetError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Values set in `other` override values in `self`.
    pub fn merge(&mut self, other: &Self) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.python, &other.python);
        take(&mut self.entry_point, &other.entry_point);
        take(&mut self.exp_dir, &other.exp_dir);
        take(&mut self.data_dir, &other.data_dir);
        take(&mut self.default_dir, &other.default_dir);
        take(&mut self.jobs_dir, &other.jobs_dir);
        take(&mut self.runset, &other.runset);
        take(&mut self.run_mode, &other.run_mode);
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(python) = lookup("RUNSET_PYTHON").filter(|v| !v.is_empty()) {
            self.python = Some(python);
        }
        if let Some(entry) = lookup("RUNSET_ENTRY_POINT").filter(|v| !v.is_empty()) {
            self.entry_point = Some(entry);
        }
    }

    pub fn python(&self) -> &str {
        self.python.as_deref().unwrap_or(DEFAULT_PYTHON)
    }

    pub fn entry_point(&self) -> &str {
        self.entry_point.as_deref().unwrap_or(DEFAULT_ENTRY_POINT)
    }

    pub fn exp_dir(&self) -> PathBuf {
        self.exp_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_EXP_DIR))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn defaults_path(&self) -> PathBuf {
        self.default_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DEFAULTS_DIR)).join(DEFAULTS_FILE)
    }

    pub fn jobs_path(&self) -> PathBuf {
        let dir = self.jobs_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_JOBS_DIR));
        dir.join(self.runset.as_deref().unwrap_or(DEFAULT_RUNSET))
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("runset.toml");
        std::fs::write(
            &config_path,
            r#"
python = "/opt/venv/bin/python"
data_dir = "/datasets"
run_mode = "test"
"#,
        )
        .unwrap();

        let config = LauncherConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.python(), "/opt/venv/bin/python");
        assert_eq!(config.data_dir(), PathBuf::from("/datasets"));
        assert_eq!(config.run_mode(), RunMode::Test);
        assert_eq!(config.entry_point(), "main.py");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("runset.toml");
        std::fs::write(&config_path, "run_mode = \"eval\"").unwrap();
        assert!(matches!(LauncherConfig::load_from_file(&config_path), Err(RunsetError::Config(_))));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = LauncherConfig { python: Some("python3.10".to_string()), ..Default::default() };
        let local = LauncherConfig { runset: Some("sweep.json".to_string()), ..Default::default() };
        base.merge(&local);
        assert_eq!(base.python(), "python3.10");
        assert_eq!(base.jobs_path(), PathBuf::from("./sweep.json"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = LauncherConfig { python: Some("python3.10".to_string()), ..Default::default() };
        config.apply_env(|key| (key == "RUNSET_PYTHON").then(|| "/usr/bin/python3".to_string()));
        assert_eq!(config.python(), "/usr/bin/python3");
    }

    #[test]
    fn test_defaults() {
        let config = LauncherConfig::default();
        assert_eq!(config.defaults_path(), PathBuf::from("./common/parameters.json"));
        assert_eq!(config.exp_dir(), PathBuf::from("./experiments/"));
        assert_eq!(config.run_mode(), RunMode::Train);
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let config = LauncherConfig { entry_point: Some("train.py".to_string()), ..Default::default() };
        config.save_to_file(&path).unwrap();
        assert_eq!(LauncherConfig::load_from_file(&path).unwrap(), config);
    }
}
