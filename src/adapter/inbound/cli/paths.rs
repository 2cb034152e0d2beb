//! Default file locations.

use std::path::PathBuf;

/// Environment variable naming the config file.
pub const CONFIG_VAR: &str = "CONFIG";

/// Returns the default config path: `$CONFIG`, or `config.toml` in the
/// working directory.
pub fn default_config() -> PathBuf {
    std::env::var_os(CONFIG_VAR)
        .filter(|path| !path.is_empty())
        .map_or_else(|| PathBuf::from("config.toml"), PathBuf::from)
}
