/// Watch-data provider abstraction
///
/// The recommendation pipeline only needs two capabilities from the remote
/// service: who a user watches, and who watches a repository. Providers return
/// raw listings; deduplication and pacing happen in the pipeline.
use crate::{
    error::AppResult,
    models::{RepoId, UserId},
};

pub mod github;

pub use github::GitHubProvider;

/// Trait for watch-data providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchProvider: Send + Sync {
    /// Repositories watched by `user`, in the order the service lists them
    async fn list_watched_repositories(&self, user: &UserId) -> AppResult<Vec<RepoId>>;

    /// Users watching `repo`
    async fn list_watchers(&self, repo: &RepoId) -> AppResult<Vec<UserId>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
