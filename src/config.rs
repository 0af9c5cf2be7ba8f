//! Configuration loading and data directory resolution

use std::path::{Path, PathBuf};

use clap::Parser;

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Fallback data directory when nothing else is configured
pub const DEFAULT_DATA_DIR: &str = "./audio-data";

/// Command-line options
#[derive(Debug, Parser)]
#[command(name = "audioshelf", about = "Audio file upload and retrieval service")]
pub struct Cli {
    /// Data directory holding uploads and metadata indexes
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Port to listen on (loopback only)
    #[arg(long, env = "AUDIOSHELF_PORT", default_value_t = 5740)]
    pub port: u16,
}

/// Data directory resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `DATA_DIR` environment variable
/// 3. `data_dir` key in the user config file
/// 4. Compiled default (`./audio-data`)
pub fn resolve_data_dir(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = config_file_data_dir() {
        return path;
    }

    // Priority 4: Compiled default
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Read `data_dir` from `<config dir>/audioshelf/config.toml` if present
fn config_file_data_dir() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("audioshelf").join("config.toml");
    let content = std::fs::read_to_string(path).ok()?;
    let config: toml::Value = toml::from_str(&content).ok()?;
    config
        .get("data_dir")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}
