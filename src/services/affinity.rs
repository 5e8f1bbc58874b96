use crate::{
    error::AppResult,
    models::{AffinityScores, UserId, WatchSet},
    services::{cohort::fetch_watch_set, providers::WatchProvider, rate_limit::RateLimitedCaller},
};

/// Default ceiling on per-user fetches while scoring
pub const DEFAULT_MAX_API_CALLS: usize = 200;

/// Default shortlist size
pub const DEFAULT_TOP_USERS: usize = 10;

/// Scores cohort members by how many of the subject's repositories they watch
///
/// Members are visited in cohort order and at most `max_api_calls` watch lists
/// are fetched; members beyond the budget are left unscored. Scores of zero
/// are recorded.
pub async fn score_cohort<P>(
    provider: &P,
    caller: &RateLimitedCaller,
    subject: &UserId,
    subject_watched: &WatchSet,
    cohort: &[UserId],
    max_api_calls: usize,
) -> AppResult<AffinityScores>
where
    P: WatchProvider + ?Sized,
{
    let mut scores = AffinityScores::new();
    let mut api_calls = 0;

    for (i, user) in cohort.iter().enumerate() {
        if api_calls >= max_api_calls {
            tracing::info!(
                max_api_calls,
                skipped = cohort.len() - i,
                "API call budget reached, skipping remaining cohort"
            );
            break;
        }
        if user == subject {
            continue;
        }

        let watched = fetch_watch_set(provider, caller, user).await?;
        api_calls += 1;
        scores.add(user.clone(), subject_watched.overlap(&watched));
    }

    tracing::info!(
        scored = scores.len(),
        api_calls,
        "Cohort affinity computed"
    );

    Ok(scores)
}

/// Users by descending affinity, dropping those who share nothing
pub fn similar_users(scores: &AffinityScores) -> Vec<UserId> {
    scores
        .ranked()
        .into_iter()
        .filter(|user| scores.get(user).unwrap_or(0) > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepoId;
    use crate::services::providers::MockWatchProvider;
    use crate::services::rate_limit::RetryPolicy;

    fn caller() -> RateLimitedCaller {
        RateLimitedCaller::new(RetryPolicy::default())
    }

    fn users(names: &[&str]) -> Vec<UserId> {
        names.iter().map(|n| UserId::new(*n)).collect()
    }

    fn mock_with(lists: Vec<(&'static str, Vec<RepoId>)>) -> MockWatchProvider {
        let mut provider = MockWatchProvider::new();
        provider
            .expect_list_watched_repositories()
            .returning(move |user| {
                Ok(lists
                    .iter()
                    .find(|(name, _)| *name == user.as_str())
                    .map(|(_, repos)| repos.clone())
                    .unwrap_or_default())
            });
        provider
    }

    #[tokio::test]
    async fn test_score_is_intersection_size() {
        let subject_watched = WatchSet::new(vec![RepoId::new("a", "x"), RepoId::new("a", "y")]);
        let provider = mock_with(vec![
            ("both", vec![RepoId::new("a", "y"), RepoId::new("a", "x"), RepoId::new("b", "w")]),
            ("one", vec![RepoId::new("a", "x")]),
            ("none", vec![RepoId::new("c", "z")]),
        ]);

        let scores = score_cohort(
            &provider,
            &caller(),
            &UserId::new("me"),
            &subject_watched,
            &users(&["one", "none", "both"]),
            DEFAULT_MAX_API_CALLS,
        )
        .await
        .unwrap();

        assert_eq!(scores.get(&UserId::new("both")), Some(2));
        assert_eq!(scores.get(&UserId::new("one")), Some(1));
        assert_eq!(scores.get(&UserId::new("none")), Some(0));
        assert_eq!(similar_users(&scores), users(&["both", "one"]));
    }

    #[tokio::test]
    async fn test_budget_is_a_hard_ceiling() {
        let subject_watched = WatchSet::new(vec![RepoId::new("a", "x")]);
        let mut provider = MockWatchProvider::new();
        provider
            .expect_list_watched_repositories()
            .times(2)
            .returning(|_| Ok(vec![RepoId::new("a", "x")]));

        let scores = score_cohort(
            &provider,
            &caller(),
            &UserId::new("me"),
            &subject_watched,
            &users(&["u1", "u2", "u3", "u4"]),
            2,
        )
        .await
        .unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(similar_users(&scores), users(&["u1", "u2"]));
    }

    #[tokio::test]
    async fn test_zero_budget_fetches_nothing() {
        let provider = MockWatchProvider::new();
        let scores = score_cohort(
            &provider,
            &caller(),
            &UserId::new("me"),
            &WatchSet::default(),
            &users(&["u1"]),
            0,
        )
        .await
        .unwrap();
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_cohort_order() {
        let subject_watched = WatchSet::new(vec![RepoId::new("a", "x"), RepoId::new("a", "y")]);
        let provider = mock_with(vec![
            ("zed", vec![RepoId::new("a", "x")]),
            ("amy", vec![RepoId::new("a", "y")]),
            ("top", vec![RepoId::new("a", "x"), RepoId::new("a", "y")]),
        ]);

        let scores = score_cohort(
            &provider,
            &caller(),
            &UserId::new("me"),
            &subject_watched,
            &users(&["zed", "amy", "top"]),
            DEFAULT_MAX_API_CALLS,
        )
        .await
        .unwrap();

        assert_eq!(similar_users(&scores), users(&["top", "zed", "amy"]));
    }

    #[tokio::test]
    async fn test_subject_is_never_scored() {
        let subject_watched = WatchSet::new(vec![RepoId::new("a", "x")]);
        let provider = mock_with(vec![
            ("me", vec![RepoId::new("a", "x")]),
            ("u1", vec![RepoId::new("a", "x")]),
        ]);

        let scores = score_cohort(
            &provider,
            &caller(),
            &UserId::new("me"),
            &subject_watched,
            &users(&["me", "u1"]),
            DEFAULT_MAX_API_CALLS,
        )
        .await
        .unwrap();

        assert_eq!(scores.get(&UserId::new("me")), None);
        assert_eq!(similar_users(&scores), users(&["u1"]));
    }

    #[tokio::test]
    async fn test_budget_with_subject_in_cohort() {
        let subject_watched = WatchSet::new(vec![RepoId::new("a", "x")]);
        let mut provider = MockWatchProvider::new();
        provider
            .expect_list_watched_repositories()
            .times(2)
            .returning(|_| Ok(vec![RepoId::new("a", "x")]));

        let scores = score_cohort(
            &provider,
            &caller(),
            &UserId::new("me"),
            &subject_watched,
            &users(&["me", "u1", "u2", "u3"]),
            2,
        )
        .await
        .unwrap();

        // the subject costs no fetch, so the budget covers u1 and u2
        assert_eq!(scores.get(&UserId::new("me")), None);
        assert_eq!(similar_users(&scores), users(&["u1", "u2"]));
    }
}
