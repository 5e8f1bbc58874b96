/// GitHub REST API provider
///
/// API Flow:
/// 1. Watched repositories: /users/{user}/subscriptions
/// 2. Watchers of a repository: /repos/{owner}/{repo}/subscribers
///
/// Both listings are paginated with `per_page`/`page`; pages are fetched until
/// a short page comes back or `max_pages` is reached.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{ApiAccount, ApiRepository, RepoId, UserId},
    services::{providers::WatchProvider, rate_limit::RATE_LIMIT_MARKER},
};

const PER_PAGE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("watchmates/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct GitHubProvider {
    http_client: HttpClient,
    api_url: String,
    api_user: Option<String>,
    api_token: Option<String>,
    max_pages: u32,
}

impl GitHubProvider {
    pub fn new(
        api_url: String,
        api_user: Option<String>,
        api_token: Option<String>,
        max_pages: u32,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_user,
            api_token,
            max_pages: max_pages.max(1),
        })
    }

    /// Fetches every page of a listing endpoint
    async fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> AppResult<Vec<T>> {
        let url = format!("{}{}", self.api_url, path);
        let mut items = Vec::new();

        for page in 1..=self.max_pages {
            let mut request = self
                .http_client
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);

            if let Some(token) = &self.api_token {
                let user = self.api_user.as_deref().unwrap_or_default();
                request = request.basic_auth(user, Some(token));
            }

            let response = request.send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(
                    url = %url,
                    status = %status,
                    body = %body,
                    "GitHub API request failed"
                );
                return Err(classify_failure(status, body));
            }

            let response_text = response.text().await?;
            let batch: Vec<T> = serde_json::from_str(&response_text).map_err(|e| {
                tracing::error!(
                    error = %e,
                    url = %url,
                    "Failed to deserialize GitHub response"
                );
                AppError::Internal(format!("Failed to parse GitHub response: {}", e))
            })?;

            let fetched = batch.len();
            items.extend(batch);

            if fetched < PER_PAGE {
                break;
            }
            if page == self.max_pages {
                tracing::warn!(
                    url = %url,
                    pages = page,
                    items = items.len(),
                    "Listing truncated at page limit"
                );
            }
        }

        Ok(items)
    }
}

/// Maps a non-success response to an error, separating throttling from the rest
fn classify_failure(status: StatusCode, body: String) -> AppError {
    let marker = RATE_LIMIT_MARKER.to_lowercase();
    if status == StatusCode::FORBIDDEN && body.to_lowercase().contains(&marker) {
        AppError::RateLimited {
            status: status.as_u16(),
            body,
        }
    } else {
        AppError::ExternalApi(format!("GitHub API returned status {}: {}", status, body))
    }
}

#[async_trait::async_trait]
impl WatchProvider for GitHubProvider {
    async fn list_watched_repositories(&self, user: &UserId) -> AppResult<Vec<RepoId>> {
        let path = format!("/users/{}/subscriptions", user);
        let repos: Vec<ApiRepository> = self.get_paginated(&path).await?;

        tracing::debug!(
            user = %user,
            repos = repos.len(),
            provider = self.name(),
            "Watched repositories fetched"
        );

        Ok(repos.into_iter().map(RepoId::from).collect())
    }

    async fn list_watchers(&self, repo: &RepoId) -> AppResult<Vec<UserId>> {
        let path = format!("/repos/{}/{}/subscribers", repo.owner(), repo.name());
        let accounts: Vec<ApiAccount> = self.get_paginated(&path).await?;

        tracing::debug!(
            repo = %repo,
            watchers = accounts.len(),
            provider = self.name(),
            "Watchers fetched"
        );

        Ok(accounts.into_iter().map(UserId::from).collect())
    }

    fn name(&self) -> &'static str {
        "github"
    }
}
