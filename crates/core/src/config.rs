use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::Deserialize;

static CONFIG_FILE_NAME: &str = "config.toml";
static LOG_FILE_NAME: &str = "kanban.log";
static DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
static DEFAULT_TASKS_PATH: &str = "/api/kanban_tasks";
static DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

static ENV_DATA_DIR: &str = "KANBAN_DATA_DIR";
static ENV_BASE_URL: &str = "KANBAN_BASE_URL";
static ENV_LOG: &str = "KANBAN_LOG";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "kanban-sync", "kanban"));

/// Values supplied on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub log_filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    tasks_path: Option<String>,
    log_filter: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    base_url: Url,
    tasks_path: String,
    log_filter: String,
    timeout: Duration,
}

impl AppConfig {
    /// Resolves the data directory, creates it if needed, then layers the
    /// config file, environment, and overrides on top of the defaults.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let data_dir = resolve_data_dir(overrides.data_dir.clone())?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        Self::resolve(data_dir, overrides, |key| env::var(key).ok())
    }

    /// Builds a config for an already resolved data directory.
    pub fn resolve<F>(data_dir: PathBuf, overrides: ConfigOverrides, lookup_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = load_file_config(&data_dir.join(CONFIG_FILE_NAME))?;

        let base_url = overrides
            .base_url
            .or_else(|| lookup_env(ENV_BASE_URL))
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid backend URL '{}'", base_url))?;

        let log_filter = overrides
            .log_filter
            .or_else(|| lookup_env(ENV_LOG))
            .or(file.log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let tasks_path = file
            .tasks_path
            .map(|path| normalize_path(&path))
            .unwrap_or_else(|| DEFAULT_TASKS_PATH.to_string());

        let timeout_secs = file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }

        Ok(Self {
            data_dir,
            base_url,
            tasks_path,
            log_filter,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tasks_path(&self) -> &str {
        &self.tasks_path
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        return Ok(manifest_dir.join("..").join("tmp").join("dev-kanban"));
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".kanban"));
    }

    Ok(env::current_dir()?.join(".kanban"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let dir = TempDir::new().expect("temp dir");
        let config =
            AppConfig::resolve(dir.path().to_path_buf(), ConfigOverrides::default(), no_env)
                .expect("config");

        assert_eq!(config.base_url().as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.tasks_path(), "/api/kanban_tasks");
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn file_then_env_then_override() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "base_url = \"http://file:8000\"\ntasks_path = \"filter_tasks\"\nlog_filter = \"warn\"\ntimeout_secs = 5\n",
        )
        .expect("write config");

        let from_file =
            AppConfig::resolve(dir.path().to_path_buf(), ConfigOverrides::default(), no_env)
                .expect("config");
        assert_eq!(from_file.base_url().as_str(), "http://file:8000/");
        assert_eq!(from_file.tasks_path(), "/filter_tasks");
        assert_eq!(from_file.log_filter(), "warn");
        assert_eq!(from_file.timeout(), Duration::from_secs(5));

        let env = |key: &str| (key == ENV_BASE_URL).then(|| "http://env:9000".to_string());
        let from_env =
            AppConfig::resolve(dir.path().to_path_buf(), ConfigOverrides::default(), env)
                .expect("config");
        assert_eq!(from_env.base_url().as_str(), "http://env:9000/");

        let overrides = ConfigOverrides {
            base_url: Some("http://cli:7000".into()),
            log_filter: Some("debug".into()),
            ..ConfigOverrides::default()
        };
        let from_cli =
            AppConfig::resolve(dir.path().to_path_buf(), overrides, env).expect("config");
        assert_eq!(from_cli.base_url().as_str(), "http://cli:7000/");
        assert_eq!(from_cli.log_filter(), "debug");
    }

    #[test]
    fn invalid_url_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let overrides = ConfigOverrides {
            base_url: Some("not a url".into()),
            ..ConfigOverrides::default()
        };
        let err = AppConfig::resolve(dir.path().to_path_buf(), overrides, no_env).unwrap_err();
        assert!(err.to_string().contains("Invalid backend URL"));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "colour = \"blue\"\n").expect("write");
        assert!(
            AppConfig::resolve(dir.path().to_path_buf(), ConfigOverrides::default(), no_env)
                .is_err()
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "timeout_secs = 0\n").expect("write");
        let err = AppConfig::resolve(dir.path().to_path_buf(), ConfigOverrides::default(), no_env)
            .unwrap_err();
        assert!(err.to_string().contains("timeout_secs must be at least 1"));

        fs::write(dir.path().join(CONFIG_FILE_NAME), "timeout_secs = 5\n").expect("write");
        let config =
            AppConfig::resolve(dir.path().to_path_buf(), ConfigOverrides::default(), no_env)
                .expect("config");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
