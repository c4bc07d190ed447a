//! Runtime settings. Values are layered: built-in defaults, then an optional
//! `config.toml`, then `TEACHER_DESK_*` environment variables, and finally
//! whatever the command line overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;

/// Name of the configuration file inside the platform config directory.
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "teacher-desk.log";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scheme, host and port of the teacher API.
    pub base_url: String,
    /// Where downloaded exports land.
    pub export_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Log destination while the TUI owns the terminal.
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let project = project_dirs();
        let export_dir = UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = project
            .as_ref()
            .map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            export_dir,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Apply `TEACHER_DESK_*` variables taken from `lookup`.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("TEACHER_DESK_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("TEACHER_DESK_EXPORT_DIR") {
            self.export_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TEACHER_DESK_LOG_FILE") {
            self.log_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("TEACHER_DESK_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!("ignoring invalid TEACHER_DESK_TIMEOUT_SECS={v}"),
            }
        }
    }
}

/// Load settings from `path` (or the platform config file when `None`) and
/// the environment. A missing file is fine; a malformed one is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME)),
    };

    let mut settings = match path {
        Some(path) if path.exists() => read_settings_file(&path)?,
        _ => Settings::default(),
    };
    settings.apply_env(|key| env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "teacher-desk")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "base_url = \"http://teachers.internal:9000\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.base_url, "http://teachers.internal:9000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.export_dir, Settings::default().export_dir);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = load_settings(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn environment_overrides_file() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TEACHER_DESK_BASE_URL", "http://10.0.0.5:8000"),
            ("TEACHER_DESK_EXPORT_DIR", "/tmp/exports"),
            ("TEACHER_DESK_TIMEOUT_SECS", "not-a-number"),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.base_url, "http://10.0.0.5:8000");
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(settings.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let settings = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    }
}
