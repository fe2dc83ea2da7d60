//! Centralized application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/aide/` | `~/.local/share/aide/` |
//! | Config | `~/Library/Application Support/aide/` | `~/.config/aide/` |
//!
//! Environment overrides:
//! - `AIDE_DATA_DIR`: overrides [`data_dir`]
//! - `AIDE_CONFIG_DIR`: overrides [`config_dir`]

use std::ffi::OsString;
use std::path::PathBuf;

/// Application data root directory.
///
/// Holds the reminder database and log files. Resolves to
/// `dirs::data_dir()/aide/` unless `AIDE_DATA_DIR` is set.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("AIDE_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/aide-data",
    )
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/aide/` unless `AIDE_CONFIG_DIR` is set.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("AIDE_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/aide-config",
    )
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default reminder database path (`data_dir()/assistant.db`).
#[must_use]
pub fn reminder_db_file() -> PathBuf {
    data_dir().join(crate::store::DB_FILENAME)
}

fn resolve(override_dir: Option<OsString>, base: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }
    base.map(|d| d.join("aide"))
        .unwrap_or_else(|| PathBuf::from(fallback))
}
