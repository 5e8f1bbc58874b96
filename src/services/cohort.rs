use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{UserId, WatchSet},
    services::{providers::WatchProvider, rate_limit::RateLimitedCaller},
};

/// Fetches the repositories `user` watches through the rate limiter
pub async fn fetch_watch_set<P>(
    provider: &P,
    caller: &RateLimitedCaller,
    user: &UserId,
) -> AppResult<WatchSet>
where
    P: WatchProvider + ?Sized,
{
    let label = format!("watched_repositories({})", user);
    let repos = caller
        .call(&label, || provider.list_watched_repositories(user))
        .await?;
    Ok(WatchSet::new(repos))
}

/// Finds every other user watching at least one of the subject's repositories
///
/// Issues one watcher listing per watched repository. Users come back in the
/// order they were first discovered; the subject is never included. Any failed
/// listing aborts the whole discovery.
pub async fn discover_cohort<P>(
    provider: &P,
    caller: &RateLimitedCaller,
    subject: &UserId,
    watched: &WatchSet,
) -> AppResult<Vec<UserId>>
where
    P: WatchProvider + ?Sized,
{
    let mut seen = HashSet::new();
    let mut cohort = Vec::new();

    for repo in watched {
        let label = format!("watchers({})", repo);
        let watchers = caller.call(&label, || provider.list_watchers(repo)).await?;

        for user in watchers {
            if &user != subject && seen.insert(user.clone()) {
                cohort.push(user);
            }
        }
    }

    tracing::info!(
        subject = %subject,
        watched = watched.len(),
        cohort = cohort.len(),
        "Cohort discovered"
    );

    Ok(cohort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::RepoId;
    use crate::services::providers::MockWatchProvider;
    use crate::services::rate_limit::RetryPolicy;
    use mockall::predicate::eq;

    fn caller() -> RateLimitedCaller {
        RateLimitedCaller::new(RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_fetch_watch_set_dedupes() {
        let mut provider = MockWatchProvider::new();
        provider
            .expect_list_watched_repositories()
            .with(eq(UserId::new("octocat")))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    RepoId::new("a", "x"),
                    RepoId::new("a", "x"),
                    RepoId::new("a", "y"),
                ])
            });

        let set = fetch_watch_set(&provider, &caller(), &UserId::new("octocat"))
            .await
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_cohort_excludes_subject_and_keeps_discovery_order() {
        let subject = UserId::new("me");
        let watched = WatchSet::new(vec![RepoId::new("a", "x"), RepoId::new("a", "y")]);

        let mut provider = MockWatchProvider::new();
        provider
            .expect_list_watchers()
            .with(eq(RepoId::new("a", "x")))
            .times(1)
            .returning(|_| Ok(vec![UserId::new("me"), UserId::new("carol"), UserId::new("alice")]));
        provider
            .expect_list_watchers()
            .with(eq(RepoId::new("a", "y")))
            .times(1)
            .returning(|_| Ok(vec![UserId::new("alice"), UserId::new("bob"), UserId::new("me")]));

        let cohort = discover_cohort(&provider, &caller(), &subject, &watched)
            .await
            .unwrap();

        assert_eq!(
            cohort,
            vec![UserId::new("carol"), UserId::new("alice"), UserId::new("bob")]
        );
    }

    #[tokio::test]
    async fn test_cohort_aborts_on_remote_failure() {
        let subject = UserId::new("me");
        let watched = WatchSet::new(vec![RepoId::new("a", "x"), RepoId::new("a", "y")]);

        let mut provider = MockWatchProvider::new();
        provider
            .expect_list_watchers()
            .with(eq(RepoId::new("a", "x")))
            .returning(|_| Ok(vec![UserId::new("alice")]));
        provider
            .expect_list_watchers()
            .with(eq(RepoId::new("a", "y")))
            .returning(|_| Err(AppError::ExternalApi("status 502".to_string())));

        let result = discover_cohort(&provider, &caller(), &subject, &watched).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_empty_watch_set_makes_no_calls() {
        let provider = MockWatchProvider::new();
        let cohort = discover_cohort(&provider, &caller(), &UserId::new("me"), &WatchSet::default())
            .await
            .unwrap();
        assert!(cohort.is_empty());
    }
}
