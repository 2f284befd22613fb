//! Runtime tunables.

use std::env;
use std::path::PathBuf;

use storage_core::Capacity;

/// Configuration shared by the host and its repository.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity given to nodes placed without an explicit one.
    pub capacity: Capacity,
    /// Frames between two maintenance ticks.
    pub maintenance_interval: u32,
    /// Directory for node records. `None` keeps records in memory.
    pub save_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const DEFAULT_MAINTENANCE_INTERVAL: u32 = 20;

    /// Builds a configuration from `STORAGE_*` environment variables,
    /// falling back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(max_bins) = read_env::<usize>("STORAGE_MAX_BINS") {
            config.capacity.max_bins = max_bins;
        }

        if let Some(max_bin_size) = read_env::<u32>("STORAGE_MAX_BIN_SIZE") {
            config.capacity.max_bin_size = max_bin_size;
        }

        if let Some(max_items) = read_env::<u32>("STORAGE_MAX_ITEMS") {
            config.capacity.max_items = max_items;
        }

        if let Some(interval) = read_env::<u32>("STORAGE_MAINTENANCE_INTERVAL") {
            config.maintenance_interval = interval.max(1);
        }

        if let Ok(dir) = env::var("STORAGE_SAVE_DIR")
            && !dir.is_empty()
        {
            config.save_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            capacity: Capacity::default(),
            maintenance_interval: Self::DEFAULT_MAINTENANCE_INTERVAL,
            save_dir: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
