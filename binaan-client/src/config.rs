//! Client configuration
//!
//! The base URL is baked in at build time from `BINAAN_API_URL` (falling
//! back to a local development server) and can be overridden at run time
//! through the same environment variable or the CLI.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = match option_env!("BINAAN_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000/api",
};

/// Uploads get a longer timeout than plain requests
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "BINAAN_API_URL";
pub const ENV_TOKEN: &str = "BINAAN_TOKEN";
pub const ENV_INIT_POLICY: &str = "BINAAN_INIT_POLICY";
pub const ENV_LOG_ACTIONS: &str = "BINAAN_LOG_ACTIONS";
pub const ENV_LOG_FILTER: &str = "BINAAN_LOG_FILTER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("base URL `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("unknown init policy `{0}` (expected `best-effort` or `fail-fast`)")]
    UnknownPolicy(String),
}

/// How a page initializer treats a failed filter-options prerequisite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitPolicy {
    /// Log the failure and fetch the list anyway
    #[default]
    BestEffort,
    /// Abort initialization on the first failed prerequisite
    FailFast,
}

impl InitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitPolicy::BestEffort => "best-effort",
            InitPolicy::FailFast => "fail-fast",
        }
    }
}

impl FromStr for InitPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(InitPolicy::BestEffort),
            "fail-fast" | "fail_fast" => Ok(InitPolicy::FailFast),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Always ends with `/` so request paths join underneath it
    pub base_url: Url,
    pub token: Option<String>,
    pub request_timeout: Option<Duration>,
    pub upload_timeout: Duration,
    pub init_policy: InitPolicy,
    pub log_actions: bool,
    /// Comma-separated action name globs kept by the action log; all
    /// actions when unset
    pub action_filter: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: None,
            request_timeout: None,
            upload_timeout: UPLOAD_TIMEOUT,
            init_policy: InitPolicy::default(),
            log_actions: false,
            action_filter: None,
        })
    }

    /// Build from the compiled-in default plus whatever `lookup` provides
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        config.token = lookup(ENV_TOKEN).filter(|t| !t.trim().is_empty());
        if let Some(policy) = lookup(ENV_INIT_POLICY) {
            config.init_policy = policy.parse()?;
        }
        config.action_filter = lookup(ENV_LOG_FILTER).filter(|f| !f.trim().is_empty());
        config.log_actions = config.action_filter.is_some()
            || lookup(ENV_LOG_ACTIONS).is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_init_policy(mut self, policy: InitPolicy) -> Self {
        self.init_policy = policy;
        self
    }

    /// Keep an action log, restricted to `filter` when given
    pub fn with_action_log(mut self, filter: Option<&str>) -> Self {
        self.log_actions = true;
        self.action_filter = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}
