//! Launcher configuration loading and merging.

use anyhow::Context;
use runset_training::LauncherConfig;

/// Load and merge launcher configuration.
///
/// Configuration precedence:
/// 1. CLI arguments (applied by `launch::LaunchArgs::resolve`)
/// 2. Environment variables
/// 3. Local config file (./runset.toml)
/// 4. Global config file (~/.runset/config.toml)
/// 5. Defaults
pub fn load_config() -> anyhow::Result<LauncherConfig> {
    LauncherConfig::discover_and_load().context("Failed to load launcher configuration")
}
