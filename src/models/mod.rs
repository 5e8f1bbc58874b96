use serde::Deserialize;

mod repo;
mod tally;
mod user;

pub use repo::{RepoId, WatchSet};
pub use tally::Tally;
pub use user::UserId;

/// Shared-repository counts per cohort member
pub type AffinityScores = Tally<UserId>;

/// Number of distinct similar users watching each repository
pub type RepoPopularity = Tally<RepoId>;

// ============================================================================
// GitHub API Types
// ============================================================================

/// Repository entry from `/users/{user}/subscriptions`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    pub owner: ApiAccount,
}

/// Account entry, either a repository owner or a `/subscribers` item
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAccount {
    pub login: String,
}

impl From<ApiRepository> for RepoId {
    fn from(repo: ApiRepository) -> Self {
        RepoId::new(repo.owner.login, repo.name)
    }
}

impl From<ApiAccount> for UserId {
    fn from(account: ApiAccount) -> Self {
        UserId::new(account.login)
    }
}
