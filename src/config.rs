//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::runtime::resize::DEFAULT_RESIZE_DEBOUNCE;
use crate::runtime::viewport::DEFAULT_OVERSCAN;
use crate::stream::buffer::DEFAULT_FLUSH_INTERVAL;
use crate::stream::classifier::DEFAULT_REASONING_WINDOW;

pub const FLUSH_MS_ENV: &str = "STREAM_VIEW_FLUSH_MS";
pub const RESIZE_DEBOUNCE_MS_ENV: &str = "STREAM_VIEW_RESIZE_DEBOUNCE_MS";
pub const REASONING_LINES_ENV: &str = "STREAM_VIEW_REASONING_LINES";
pub const OVERSCAN_ENV: &str = "STREAM_VIEW_OVERSCAN";
pub const DEBUG_ENV: &str = "STREAM_VIEW_DEBUG";
pub const LOG_PATH_ENV: &str = "STREAM_VIEW_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub flush_interval: Duration,
    pub resize_debounce: Duration,
    /// Reasoning lines kept visible while a turn streams.
    pub reasoning_lines: usize,
    pub overscan: usize,
    pub debug: bool,
    pub log_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
            reasoning_lines: DEFAULT_REASONING_WINDOW,
            overscan: DEFAULT_OVERSCAN,
            debug: false,
            log_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            flush_interval: env_millis(FLUSH_MS_ENV)?.unwrap_or(defaults.flush_interval),
            resize_debounce: env_millis(RESIZE_DEBOUNCE_MS_ENV)?
                .unwrap_or(defaults.resize_debounce),
            reasoning_lines: env_usize(REASONING_LINES_ENV)?.unwrap_or(defaults.reasoning_lines),
            overscan: env_usize(OVERSCAN_ENV)?.unwrap_or(defaults.overscan),
            debug: env_flag(DEBUG_ENV),
            log_path: env_string_opt(LOG_PATH_ENV).map(PathBuf::from),
        })
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_usize(key: &'static str) -> Result<Option<usize>, ConfigError> {
    let Some(value) = env_string_opt(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { key, value })
}

fn env_millis(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    Ok(env_usize(key)?.map(|ms| Duration::from_millis(ms as u64)))
}
