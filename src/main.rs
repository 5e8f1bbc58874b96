use tracing_subscriber::EnvFilter;

use watchmates::config::{Config, GitConfig};
use watchmates::models::UserId;
use watchmates::services::{
    EngineSettings, GitHubProvider, RateLimitedCaller, RecommendationEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the recommendations
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?.with_git_fallback(&GitConfig);
    let subject = UserId::new(config.subject()?);

    let provider = GitHubProvider::new(
        config.github_api_url.clone(),
        config.github_user.clone(),
        config.github_token.clone(),
        config.max_pages,
    )?;
    let caller = RateLimitedCaller::new(config.retry_policy());
    let settings = EngineSettings {
        max_api_calls: config.max_api_calls,
        top_similar_users: config.top_similar_users,
    };

    let engine = RecommendationEngine::with_settings(provider, caller, subject, settings);

    tracing::info!(
        subject = %engine.subject(),
        api_url = %config.github_api_url,
        "Computing recommendations"
    );

    let recommended = engine.recommend(config.recommendation_limit).await?;

    tracing::info!(
        recommended = recommended.len(),
        api_attempts = engine.caller().attempts(),
        "Done"
    );

    for repo in recommended {
        println!("{}", repo);
    }

    Ok(())
}
