//! Save directory resolution.

use std::path::PathBuf;

use storage_runtime::RuntimeConfig;

/// Resolves the record directory: an explicit `--dir` wins, then
/// `STORAGE_SAVE_DIR`, then the platform data directory.
pub fn save_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| RuntimeConfig::from_env().save_dir)
        .unwrap_or_else(default_save_dir)
}

/// Platform data directory for node records
///
/// - macOS: `~/Library/Application Support/storage-network/nodes`
/// - Linux: `~/.local/share/storage-network/nodes`
/// - Windows: `%APPDATA%\storage-network\nodes`
/// - Fallback: `./save_data/nodes`
pub fn default_save_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "storage-network")
        .map(|dirs| dirs.data_dir().join("nodes"))
        .unwrap_or_else(|| PathBuf::from("./save_data/nodes"))
}
