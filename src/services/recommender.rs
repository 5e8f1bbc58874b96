use crate::{
    error::AppResult,
    models::{RepoPopularity, UserId},
    services::{cohort::fetch_watch_set, providers::WatchProvider, rate_limit::RateLimitedCaller},
};

/// Default number of recommended repositories
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

/// Counts how many of `similar_users` watch each repository
///
/// Repositories the subject already watches are counted like any other.
pub async fn tally_popularity<P>(
    provider: &P,
    caller: &RateLimitedCaller,
    similar_users: &[UserId],
) -> AppResult<RepoPopularity>
where
    P: WatchProvider + ?Sized,
{
    let mut popularity = RepoPopularity::new();

    for user in similar_users {
        let watched = fetch_watch_set(provider, caller, user).await?;
        for repo in &watched {
            popularity.increment(repo.clone());
        }
    }

    tracing::info!(
        similar_users = similar_users.len(),
        repositories = popularity.len(),
        "Repository popularity tallied"
    );

    Ok(popularity)
}
