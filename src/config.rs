use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{CalError, ConflictPolicy, Result, SyncSettings, DEFAULT_LOCALE};

/// Environment variable overriding `remote_url`.
pub const REMOTE_URL_ENV: &str = "LOVECAL_REMOTE_URL";
/// Environment variable overriding `remote_api_key`.
pub const REMOTE_KEY_ENV: &str = "LOVECAL_REMOTE_KEY";

const DEFAULT_ACCESS_CODE: &str = "AMOR2024";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Directory holding the local storage slots
    pub data_dir: PathBuf,

    /// Shared passphrase that unlocks the calendar
    pub access_code: String,

    /// Base URL of the PostgREST endpoint; no remote sync when unset
    pub remote_url: Option<String>,

    /// API key for the remote endpoint
    pub remote_api_key: Option<String>,

    /// Table holding the events
    pub remote_table: String,

    /// Upper bound for a single remote call, in seconds
    pub remote_timeout_secs: u64,

    /// Extra attempts after a failed background push
    pub sync_retries: u32,

    /// How `load` settles a cached edit of a remote event
    pub conflict_policy: ConflictPolicy,

    /// Show the built-in sample events when nothing else is available
    pub sample_events: bool,

    /// Locale for long dates, e.g. `es_ES`
    pub locale: String,

    /// Day the relationship started, `YYYY-MM-DD`; enables the countdown
    pub anniversary_date: Option<String>,

    /// Name recorded as the author of new events
    pub author: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            access_code: DEFAULT_ACCESS_CODE.to_string(),
            remote_url: None,
            remote_api_key: None,
            remote_table: crate::EVENTS_TABLE.to_string(),
            remote_timeout_secs: 10,
            sync_retries: 2,
            conflict_policy: ConflictPolicy::RemoteWins,
            sample_events: true,
            locale: DEFAULT_LOCALE.to_string(),
            anniversary_date: None,
            author: None,
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads configuration from `path` (or the default location), then
    /// applies environment overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => {
                debug!("Reading configuration from {}", p.display());
                let content = fs::read_to_string(p)?;
                serde_json::from_str::<Config>(&content).map_err(|e| CalError::ConfigError {
                    message: format!("{}: {}", p.display(), e),
                })?
            }
            Some(ref p) => {
                info!("No configuration at {}, using defaults", p.display());
                Config::default()
            }
            None => Config::default(),
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(REMOTE_URL_ENV) {
            if !url.trim().is_empty() {
                self.remote_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var(REMOTE_KEY_ENV) {
            if !key.trim().is_empty() {
                self.remote_api_key = Some(key);
            }
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs.max(1))
    }

    /// Background sync behaviour derived from this configuration
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            timeout: self.remote_timeout(),
            retries: self.sync_retries,
            retry_backoff: Duration::from_millis(250),
            conflict_policy: self.conflict_policy,
            sample_fallback: self.sample_events,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "lovecal")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".lovecal"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.access_code, "AMOR2024");
        assert_eq!(config.remote_table, "love_calendar");
        assert!(config.sample_events);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"access_code": "SECRETO", "sync_retries": 0, "conflict_policy": "last_writer_wins"}"#,
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.access_code, "SECRETO");
        assert_eq!(config.sync_retries, 0);
        assert_eq!(config.conflict_policy, ConflictPolicy::LastWriterWins);
        assert_eq!(config.locale, "es_ES");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(CalError::ConfigError { .. })
        ));
    }
}
