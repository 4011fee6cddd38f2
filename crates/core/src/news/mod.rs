//! News sentiment aggregation and price-history summaries that accompany a
//! recommendation.

pub mod analysis;
pub mod sentiment;
pub mod technical;

pub use analysis::{analyze_recommendations, RecommendationAnalysis, TechnicalOutcome};
pub use sentiment::{classify_text, NewsDigest, TickerSentimentStats};
pub use technical::{TechnicalSummary, Trend};
