//! Runtime configuration with compiled-in defaults.
//!
//! The collector is meant to run unattended on a fixed schedule, so every
//! knob has a default and can be overridden through the environment
//! (a `.env` file is loaded by the binary before settings are read).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Directory page listing every scrapeable lot.
pub const DEFAULT_DIRECTORY_URL: &str = "http://www.ahuzot.co.il/Parking/All/";

/// Local directory standing in for the storage bucket.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Blob path of the dataset inside the bucket.
pub const DEFAULT_BLOB_PATH: &str = "data.feather";

/// Size of the status-fetch worker pool.
pub const DEFAULT_WORKERS: usize = 10;

/// Per-request timeout. A stalled site must not hang the cycle; expiry
/// is recorded as that lot being unreachable.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Collector settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub directory_url: String,
    pub data_dir: PathBuf,
    pub blob_path: String,
    pub workers: usize,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            blob_path: DEFAULT_BLOB_PATH.to_string(),
            workers: DEFAULT_WORKERS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults.
    ///
    /// Recognized variables: `LOTWATCH_DIRECTORY_URL`, `LOTWATCH_DATA_DIR`,
    /// `LOTWATCH_BLOB_PATH`, `LOTWATCH_WORKERS`,
    /// `LOTWATCH_FETCH_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(url) = env::var("LOTWATCH_DIRECTORY_URL") {
            settings.directory_url = url;
        }
        if let Ok(dir) = env::var("LOTWATCH_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("LOTWATCH_BLOB_PATH") {
            settings.blob_path = path;
        }
        if let Ok(workers) = env::var("LOTWATCH_WORKERS") {
            if let Ok(n) = workers.parse::<usize>() {
                if n > 0 {
                    settings.workers = n;
                }
            }
        }
        if let Ok(secs) = env::var("LOTWATCH_FETCH_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse::<u64>() {
                if n > 0 {
                    settings.fetch_timeout = Duration::from_secs(n);
                }
            }
        }
        settings
    }
}
