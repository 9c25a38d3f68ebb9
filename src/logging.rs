use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// `insightview.log` in the working directory. The terminal is owned by the
/// UI, so logs always go to a file.
pub fn default_log_path() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(LOG_FILE.as_str()))
}

/// Initialize logging at WARN
pub fn init() -> Result<()> {
    init_with(None, None)
}

/// Initialize logging with a custom path and/or level.
///
/// `RUST_LOG` still applies; `level` only replaces the WARN default.
pub fn init_with(custom_log_path: Option<PathBuf>, level: Option<tracing::Level>) -> Result<()> {
    let log_path = match custom_log_path {
        Some(path) => path,
        None => default_log_path()?,
    };
    let file = open_log_file(&log_path)?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
        .from_env_lossy();

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        assert_eq!(LOG_FILE.as_str(), "insightview.log");
    }

    #[test]
    fn test_open_log_file_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("insightview.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
