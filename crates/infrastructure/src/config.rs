//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use medhist_application::PollPolicy;
use medhist_application::report::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use thiserror::Error;
use url::Url;

use crate::adapters::DEFAULT_TIMEOUT;

/// Base URL of the records API (required).
pub const API_URL_VAR: &str = "MEDHIST_API_URL";
/// Delay between report status checks, in milliseconds.
pub const POLL_INTERVAL_VAR: &str = "MEDHIST_POLL_INTERVAL_MS";
/// Maximum number of status checks; `0` means no bound.
pub const POLL_MAX_ATTEMPTS_VAR: &str = "MEDHIST_POLL_MAX_ATTEMPTS";
/// Per-request timeout, in seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "MEDHIST_REQUEST_TIMEOUT_SECS";
/// Where finished reports are saved.
pub const DOWNLOAD_DIR_VAR: &str = "MEDHIST_DOWNLOAD_DIR";
/// Session file location.
pub const SESSION_FILE_VAR: &str = "MEDHIST_SESSION_FILE";

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The API URL does not parse.
    #[error("{var} is not a valid URL: {message}")]
    InvalidUrl {
        /// Variable name
        var: &'static str,
        /// Parser message
        message: String,
    },

    /// A numeric variable does not parse.
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// Runtime settings of the console client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub api_url: Url,
    /// Delay between report status checks
    pub poll_interval: Duration,
    /// Bound on status checks; `None` polls until a terminal answer
    pub poll_max_attempts: Option<u32>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Override for the download directory
    pub download_dir: Option<PathBuf>,
    /// Override for the session file
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is missing or any value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is missing or any value is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_url = get(API_URL_VAR).ok_or(ConfigError::Missing(API_URL_VAR))?;
        let api_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            var: API_URL_VAR,
            message: e.to_string(),
        })?;

        let poll_interval = parse_number(POLL_INTERVAL_VAR, get(POLL_INTERVAL_VAR))?
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis);
        let poll_max_attempts = match parse_number(POLL_MAX_ATTEMPTS_VAR, get(POLL_MAX_ATTEMPTS_VAR))? {
            None => Some(DEFAULT_MAX_ATTEMPTS),
            Some(0) => None,
            Some(n) => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        };
        let request_timeout = parse_number(REQUEST_TIMEOUT_VAR, get(REQUEST_TIMEOUT_VAR))?
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Ok(Self {
            api_url,
            poll_interval,
            poll_max_attempts,
            request_timeout,
            download_dir: get(DOWNLOAD_DIR_VAR).map(PathBuf::from),
            session_file: get(SESSION_FILE_VAR).map(PathBuf::from),
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }

    /// Polling policy for report jobs.
    #[must_use]
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_attempts: self.poll_max_attempts,
        }
    }
}

fn parse_number(var: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber { var, value: v })
        })
        .transpose()
}
