use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CONFIG: &str = include_str!("../.config/config.json5");

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
}

/// Runtime settings.
///
/// Layered, later wins: the embedded defaults, the user file (`--config` or
/// `~/.insightview-config.json5`), then `INSIGHTVIEW_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub theme: String,
    #[serde(default)]
    pub keybindings_path: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Config {
    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self, json5::Error> {
        json5::from_str(CONFIG)
    }

    /// Load the layered configuration. Without an explicit path the home
    /// config file is used, and written from the defaults if it is missing.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let (selected, required) = match config_path {
            Some(p) => (expand_tilde(p), true),
            None => {
                let home_cfg = default_home_config_path();
                if !home_cfg.exists() {
                    if let Err(e) = write_defaults(&home_cfg) {
                        warn!("Could not write default config to {}: {e}", home_cfg.display());
                    }
                }
                (home_cfg, false)
            }
        };
        Self::layered(Some(&selected), required)
    }

    /// Embedded defaults, then `file` if given, then the environment.
    pub fn layered(file: Option<&Path>, required: bool) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        if let Some(path) = file {
            debug!("Reading config from {}", path.display());
            builder = builder.add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Json5)
                    .required(required),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str())
                .try_parsing(true),
        );

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.keybindings_path = cfg.keybindings_path.as_ref().map(expand_tilde);
        cfg.export_dir = expand_tilde(&cfg.export_dir);
        cfg.validate()?;
        Ok(cfg)
    }

    /// `--server` wins over every config layer
    pub fn with_server_override(mut self, server: Option<String>) -> Self {
        if let Some(url) = server {
            self.server_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let url = self.server_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(config::ConfigError::Message(format!(
                "server_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn write_defaults(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG)
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix('~')) {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(rest.trim_start_matches(['/', '\\']));
        }
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    let name = format!(".{}-config.json5", env!("CARGO_PKG_NAME"));
    match BaseDirs::new() {
        Some(base) => base.home_dir().join(name),
        None => env::current_dir().unwrap_or_default().join(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.server_url, "http://127.0.0.1:5013");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.search_debounce(), Duration::from_millis(300));
        assert_eq!(cfg.theme, "dark");
        assert_eq!(cfg.keybindings_path, None);
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json5");
        fs::write(&path, "{ theme: 'light', search_debounce_ms: 150 }").unwrap();

        let cfg = Config::layered(Some(&path), true).unwrap();
        assert_eq!(cfg.theme, "light");
        assert_eq!(cfg.search_debounce_ms, 150);
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json5");
        assert!(Config::layered(Some(&path), true).is_err());
        assert!(Config::layered(Some(&path), false).is_ok());
    }

    #[test]
    fn test_invalid_server_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json5");
        fs::write(&path, "{ server_url: 'localhost:5013' }").unwrap();
        assert!(Config::layered(Some(&path), true).is_err());
    }

    #[test]
    fn test_server_override() {
        let cfg = Config::embedded()
            .unwrap()
            .with_server_override(Some("https://insights.example".into()));
        assert_eq!(cfg.server_url, "https://insights.example");
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(base) = BaseDirs::new() {
            let expanded = expand_tilde(&PathBuf::from("~/exports"));
            assert_eq!(expanded, base.home_dir().join("exports"));
        }
        assert_eq!(expand_tilde(&PathBuf::from("/tmp/x")), PathBuf::from("/tmp/x"));
    }
}
