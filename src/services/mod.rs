pub mod affinity;
pub mod cohort;
pub mod engine;
pub mod providers;
pub mod rate_limit;
pub mod recommender;

pub use engine::{EngineSettings, RecommendationEngine};
pub use providers::{GitHubProvider, WatchProvider};
pub use rate_limit::{RateLimitedCaller, RetryPolicy, Sleeper, TokioSleeper};
