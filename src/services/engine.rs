use tokio::sync::OnceCell;

use crate::{
    error::{AppError, AppResult},
    models::{AffinityScores, RepoId, UserId, WatchSet},
    services::{
        affinity::{self, DEFAULT_MAX_API_CALLS, DEFAULT_TOP_USERS},
        cohort,
        providers::WatchProvider,
        rate_limit::RateLimitedCaller,
        recommender,
    },
};

/// Budgets used when `recommend` ranks similar users on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_api_calls: usize,
    pub top_similar_users: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_api_calls: DEFAULT_MAX_API_CALLS,
            top_similar_users: DEFAULT_TOP_USERS,
        }
    }
}

/// Recommends repositories watched by users with similar interests
///
/// Each pipeline stage (subject watch set, cohort, affinity scores, ranked
/// repositories) is computed on first access and cached for the lifetime of
/// the engine. A failed stage caches nothing. Build a new engine to refresh.
pub struct RecommendationEngine<P> {
    provider: P,
    caller: RateLimitedCaller,
    subject: UserId,
    settings: EngineSettings,
    watched: OnceCell<WatchSet>,
    cohort: OnceCell<Vec<UserId>>,
    affinity: OnceCell<AffinityScores>,
    recommended: OnceCell<Vec<RepoId>>,
}

impl<P: WatchProvider> RecommendationEngine<P> {
    pub fn new(provider: P, caller: RateLimitedCaller, subject: UserId) -> Self {
        Self::with_settings(provider, caller, subject, EngineSettings::default())
    }

    pub fn with_settings(
        provider: P,
        caller: RateLimitedCaller,
        subject: UserId,
        settings: EngineSettings,
    ) -> Self {
        Self {
            provider,
            caller,
            subject,
            settings,
            watched: OnceCell::new(),
            cohort: OnceCell::new(),
            affinity: OnceCell::new(),
            recommended: OnceCell::new(),
        }
    }

    pub fn subject(&self) -> &UserId {
        &self.subject
    }

    pub fn caller(&self) -> &RateLimitedCaller {
        &self.caller
    }

    /// Repositories the subject watches
    pub async fn watched_repos(&self) -> AppResult<&WatchSet> {
        self.watched
            .get_or_try_init(|| async {
                let watched =
                    cohort::fetch_watch_set(&self.provider, &self.caller, &self.subject).await?;
                tracing::info!(
                    subject = %self.subject,
                    watched = watched.len(),
                    provider = self.provider.name(),
                    "Subject watch set fetched"
                );
                Ok::<_, AppError>(watched)
            })
            .await
    }

    /// Other users watching at least one of the subject's repositories,
    /// in first-discovered order
    pub async fn cohort(&self) -> AppResult<&[UserId]> {
        let cohort = self
            .cohort
            .get_or_try_init(|| async {
                let watched = self.watched_repos().await?;
                cohort::discover_cohort(&self.provider, &self.caller, &self.subject, watched).await
            })
            .await?;
        Ok(cohort.as_slice())
    }

    /// Shared-repository counts for the scored part of the cohort
    ///
    /// `max_api_calls` only applies to the call that computes the scores.
    pub async fn affinity_scores(&self, max_api_calls: usize) -> AppResult<&AffinityScores> {
        self.affinity
            .get_or_try_init(|| async {
                let watched = self.watched_repos().await?;
                let cohort = self.cohort().await?;
                affinity::score_cohort(
                    &self.provider,
                    &self.caller,
                    &self.subject,
                    watched,
                    cohort,
                    max_api_calls,
                )
                .await
            })
            .await
    }

    /// Up to `top_n` users with the most repositories in common with the subject
    pub async fn ranked_similar_users(
        &self,
        max_api_calls: usize,
        top_n: usize,
    ) -> AppResult<Vec<UserId>> {
        let scores = self.affinity_scores(max_api_calls).await?;
        let mut ranked = affinity::similar_users(scores);
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// Up to `limit` repositories most watched among the similar users
    pub async fn recommend(&self, limit: usize) -> AppResult<Vec<RepoId>> {
        let ranked = self
            .recommended
            .get_or_try_init(|| async {
                let similar = self
                    .ranked_similar_users(
                        self.settings.max_api_calls,
                        self.settings.top_similar_users,
                    )
                    .await?;
                let popularity =
                    recommender::tally_popularity(&self.provider, &self.caller, &similar).await?;
                Ok::<_, AppError>(popularity.ranked())
            })
            .await?;

        Ok(ranked.iter().take(limit).cloned().collect())
    }
}
