//! Debug log sink.
//!
//! Logging is off unless [`EngineConfig::debug`] is set. The subscriber writes plain text to
//! the configured file, or to stderr when no file is configured, so it never interleaves
//! escape sequences with the host's screen output.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::error::LoggingError;

pub const LOG_FILTER_ENV: &str = "STREAM_VIEW_LOG_FILTER";
pub const DEFAULT_LOG_FILTER: &str = "stream_view=debug";

/// Installs the global subscriber. Returns `Ok(false)` when debug logging is disabled.
pub fn init(config: &EngineConfig) -> Result<bool, LoggingError> {
    if !config.debug {
        return Ok(false);
    }

    let filter = build_filter(std::env::var(LOG_FILTER_ENV).ok().as_deref())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true);

    let installed = match config.log_path.as_deref() {
        Some(path) => builder
            .with_writer(Mutex::new(open_log_file(path)?))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| LoggingError::Subscriber {
        message: err.to_string(),
    })?;

    tracing::debug!(log_path = ?config.log_path, "debug logging enabled");
    Ok(true)
}

fn build_filter(raw: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let filter = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER);
    EnvFilter::try_new(filter).map_err(|err| LoggingError::Filter {
        filter: filter.to_string(),
        message: err.to_string(),
    })
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::{build_filter, init, open_log_file};
    use crate::config::EngineConfig;
    use crate::error::LoggingError;

    #[test]
    fn disabled_config_installs_nothing() {
        let installed = init(&EngineConfig::default()).expect("disabled init");
        assert!(!installed);
    }

    #[test]
    fn default_and_custom_filters_parse() {
        assert!(build_filter(None).is_ok());
        assert!(build_filter(Some("  ")).is_ok());
        assert!(build_filter(Some("stream_view=trace,warn")).is_ok());
    }

    #[test]
    fn log_file_is_created_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stream_view.log");
        open_log_file(&path).expect("open log");
        assert!(path.exists());
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("stream_view.log");
        let err = open_log_file(&path).expect_err("missing parent");
        match err {
            LoggingError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
