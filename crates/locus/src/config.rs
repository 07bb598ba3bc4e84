//! Runtime configuration.
//!
//! The only setting every suite needs is the base URL relative paths are
//! resolved against. It comes from `LOCUS_BASE_URL` when set and falls back
//! to [`DEFAULT_BASE_URL`].

use crate::result::{LocusError, LocusResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Base URL used when `LOCUS_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default timeout for engine actions (5 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for engine auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Environment variable holding the base URL
pub const ENV_BASE_URL: &str = "LOCUS_BASE_URL";

/// Environment variable holding the action timeout in milliseconds
pub const ENV_ACTION_TIMEOUT_MS: &str = "LOCUS_ACTION_TIMEOUT_MS";

/// Environment variable toggling headless browsers
pub const ENV_HEADLESS: &str = "LOCUS_HEADLESS";

/// Configuration shared by engines and fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocusConfig {
    /// Base address relative paths resolve against
    pub base_url: String,
    /// How long an action waits for its element
    pub action_timeout_ms: u64,
    /// Polling interval while waiting
    pub poll_interval_ms: u64,
    /// Run browsers headless
    pub headless: bool,
}

impl Default for LocusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            headless: true,
        }
    }
}

impl LocusConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> LocusResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function
    ///
    /// # Errors
    ///
    /// Returns error if a numeric or boolean variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> LocusResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_ACTION_TIMEOUT_MS) {
            config.action_timeout_ms = raw.trim().parse().map_err(|_| LocusError::Config {
                message: format!("{ENV_ACTION_TIMEOUT_MS} must be a number of milliseconds, got '{raw}'"),
            })?;
        }

        if let Some(raw) = lookup(ENV_HEADLESS) {
            config.headless = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(LocusError::Config {
                        message: format!("{ENV_HEADLESS} must be a boolean, got '{raw}'"),
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse config from YAML; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or the values are invalid.
    pub fn from_yaml_str(yaml: &str) -> LocusResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> LocusResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the action timeout
    #[must_use]
    pub const fn with_action_timeout_ms(mut self, ms: u64) -> Self {
        self.action_timeout_ms = ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Resolve a path against the base URL; absolute URLs pass through.
    ///
    /// Follows browser link resolution (see [`join_url`]): a base URL with a
    /// path only keeps it for relative paths, and only up to its last `/`.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn validate(&self) -> LocusResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LocusError::Config {
                message: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(LocusError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolve `path` against `base` the way a browser resolves a link.
///
/// Absolute URLs (including `about:`) pass through. A leading `/` replaces
/// the base's whole path, so `https://h/app` joined with `/login` is
/// `https://h/login`; a relative `login` keeps everything up to the base's
/// last `/`.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if Url::parse(path).is_ok() {
        return path.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(path)) {
        Ok(url) => url.into(),
        Err(e) => {
            tracing::warn!(base, path, error = %e, "cannot resolve URL against base");
            path.to_string()
        }
    }
}

/// Path component of a URL, without query or fragment (`/` when empty).
///
/// Relative references are cut at their query or fragment. URLs without a
/// hierarchical path (`about:blank`) come back unchanged.
#[must_use]
pub fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.cannot_be_a_base() => url.to_string(),
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            match &url[..end] {
                "" => "/".to_string(),
                path => path.to_string(),
            }
        }
    }
}
