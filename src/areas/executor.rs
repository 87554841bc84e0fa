//! Git executor
//!
//! Holds what every git invocation shares: the binary to run, a default
//! deadline and the tracing span runs are logged under. Handles are cheap to
//! clone and carry no mutable state.

use crate::areas::command::Command;
use crate::config::{Config, MIN_GIT_VERSION};
use crate::errors::{GitError, Result};
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Span;

const VERSION_REGEX: &str = r"git version (\d+)\.(\d+)(?:\.(\d+))?";

#[derive(Debug, Clone)]
pub struct Executor {
    program: PathBuf,
    default_timeout: Option<Duration>,
    span: Span,
}

/// Installed git version as `major.minor.patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    pub fn parse(output: &str) -> Result<Self> {
        let re = Regex::new(VERSION_REGEX)
            .map_err(|e| GitError::parse("git version pattern", e.to_string()))?;
        let captures = re
            .captures(output)
            .ok_or_else(|| GitError::parse("git version", output.trim()))?;

        let number = |index: usize| -> Result<u32> {
            captures
                .get(index)
                .map_or(Ok(0), |m| m.as_str().parse::<u32>())
                .map_err(|e| GitError::parse("git version", e.to_string()))
        };

        Ok(GitVersion {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
        })
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Executor {
    pub fn new(config: &Config) -> Self {
        Executor {
            program: config.git_binary.clone(),
            default_timeout: config.default_timeout,
            span: tracing::debug_span!("git", executor = %config.log_target),
        }
    }

    /// Log every run of this executor under `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Start a git command with trusted literal arguments.
    pub fn command(&self, args: &[&'static str]) -> Command {
        Command::new(self.program.as_os_str(), args)
            .with_span(self.span.clone())
            .with_default_timeout(self.default_timeout)
    }

    pub async fn version(&self) -> Result<GitVersion> {
        let output = self.command(&["version"]).run().await?;
        GitVersion::parse(&output)
    }

    /// Fail with `UnsupportedVersion` when git is older than the parsers expect.
    pub async fn check_version(&self) -> Result<GitVersion> {
        let version = self.version().await?;
        let (major, minor, patch) = MIN_GIT_VERSION;
        let required = GitVersion {
            major,
            minor,
            patch,
        };

        if version < required {
            return Err(GitError::UnsupportedVersion {
                found: version.to_string(),
                required: required.to_string(),
            });
        }

        Ok(version)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Executor::new(&Config::default())
    }
}
