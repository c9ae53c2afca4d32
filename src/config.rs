//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a .env file). They choose
//! the issues API host, the optional access token, and the query shown before the user edits it.

use crate::query::{QueryParameters, DEFAULT_LOOKBACK_DAYS, DEFAULT_OWNER, DEFAULT_REPOSITORY};
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Host of the issues API. Requests go to `https://api.<host>`.
    #[serde(default = "default_api_host")]
    pub github_api_host: String,

    /// Repository name the query starts with.
    #[serde(default = "default_repository")]
    pub default_repository: String,

    /// Repository owner the query starts with.
    #[serde(default = "default_owner")]
    pub default_owner: String,

    /// Lookback window, in days, the query starts with.
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: i64,

    /// Optional GitHub Personal Access Token for higher rate limits.
    pub github_token: Option<String>,
}

fn default_api_host() -> String {
    "github.com".to_string()
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_api_host: default_api_host(),
            default_repository: default_repository(),
            default_owner: default_owner(),
            default_lookback_days: default_lookback_days(),
            github_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Base URL of the issues API, e.g. `https://api.github.com`.
    pub fn api_base_url(&self) -> String {
        format!("https://api.{}", self.github_api_host.trim().trim_end_matches('/'))
    }

    pub fn initial_query(&self) -> QueryParameters {
        QueryParameters {
            repository: self.default_repository.clone(),
            owner: self.default_owner.clone(),
            lookback_days: self.default_lookback_days,
        }
    }
}
