use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::affinity::{DEFAULT_MAX_API_CALLS, DEFAULT_TOP_USERS};
use crate::services::rate_limit::RetryPolicy;
use crate::services::recommender::DEFAULT_RECOMMENDATION_LIMIT;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Account used to authenticate against the API
    #[serde(default)]
    pub github_user: Option<String>,

    /// API token for `github_user`
    #[serde(default)]
    pub github_token: Option<String>,

    /// GitHub REST API base URL
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// User to compute recommendations for, defaults to the API user
    #[serde(default)]
    pub subject: Option<String>,

    /// Pause after a rate-limit response before retrying
    #[serde(default = "default_rate_limit_cooldown_secs")]
    pub rate_limit_cooldown_secs: u64,

    /// Total attempts per remote call, including the first
    #[serde(default = "default_rate_limit_max_attempts")]
    pub rate_limit_max_attempts: u32,

    /// Ceiling on per-user fetches while scoring the cohort
    #[serde(default = "default_max_api_calls")]
    pub max_api_calls: usize,

    /// Number of similar users whose watch lists feed the recommendation
    #[serde(default = "default_top_similar_users")]
    pub top_similar_users: usize,

    /// Number of repositories printed
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Pages fetched per listing
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_rate_limit_cooldown_secs() -> u64 {
    RetryPolicy::default().cooldown.as_secs()
}

fn default_rate_limit_max_attempts() -> u32 {
    RetryPolicy::default().max_attempts
}

fn default_max_api_calls() -> usize {
    DEFAULT_MAX_API_CALLS
}

fn default_top_similar_users() -> usize {
    DEFAULT_TOP_USERS
}

fn default_recommendation_limit() -> usize {
    DEFAULT_RECOMMENDATION_LIMIT
}

fn default_max_pages() -> u32 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Fills unset credentials from `github.user`, `user.name` and `github.token`
    pub fn with_git_fallback(mut self, git: &impl ConfigSource) -> Self {
        if self.github_user.is_none() {
            self.github_user = git.get("github.user").or_else(|| git.get("user.name"));
        }
        if self.github_token.is_none() {
            self.github_token = git.get("github.token");
        }
        self
    }

    /// The user recommendations are computed for
    pub fn subject(&self) -> AppResult<String> {
        self.subject
            .clone()
            .or_else(|| self.github_user.clone())
            .ok_or_else(|| {
                AppError::InvalidInput(
                    "No subject: set SUBJECT, GITHUB_USER or git config github.user".to_string(),
                )
            })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            cooldown: Duration::from_secs(self.rate_limit_cooldown_secs),
            max_attempts: self.rate_limit_max_attempts,
        }
    }
}

/// Key/value lookup for ambient settings; a missing key is not an error
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads values with `git config --get`
#[derive(Debug, Default, Clone, Copy)]
pub struct GitConfig;

impl ConfigSource for GitConfig {
    fn get(&self, key: &str) -> Option<String> {
        let output = match Command::new("git").args(["config", "--get", key]).output() {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "git config unavailable");
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}
