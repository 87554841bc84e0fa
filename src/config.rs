//! Executor configuration
//!
//! Settings are read from the process environment:
//!
//! - `PLUMB_GIT_BINARY`: program to run (default `git`, resolved through `PATH`)
//! - `PLUMB_GIT_TIMEOUT_SECS`: default deadline for every run, `0` or unset means none

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

pub const GIT_BINARY_ENV: &str = "PLUMB_GIT_BINARY";
pub const GIT_TIMEOUT_ENV: &str = "PLUMB_GIT_TIMEOUT_SECS";
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Oldest git whose `cat-file -p` and `ls-tree` layouts the parsers are written against.
pub const MIN_GIT_VERSION: (u32, u32, u32) = (1, 8, 3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub git_binary: PathBuf,
    pub default_timeout: Option<Duration>,
    /// Name recorded on the executor's tracing span.
    pub log_target: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            git_binary: PathBuf::from(DEFAULT_GIT_BINARY),
            default_timeout: None,
            log_target: "git".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Ok(binary) = std::env::var(GIT_BINARY_ENV)
            && !binary.trim().is_empty()
        {
            config.git_binary = PathBuf::from(binary);
        }

        if let Ok(seconds) = std::env::var(GIT_TIMEOUT_ENV) {
            let seconds = seconds
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{GIT_TIMEOUT_ENV} must be a whole number of seconds"))?;
            config.default_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        }

        Ok(config)
    }

    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }
}
