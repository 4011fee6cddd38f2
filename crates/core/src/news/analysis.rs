use crate::ingest::alphavantage::MarketDataClient;
use crate::news::sentiment::NewsDigest;
use crate::news::technical::TechnicalSummary;
use serde::{Deserialize, Serialize};

/// Articles fetched for the quotes menu option.
pub const QUOTES_NEWS_LIMIT: usize = 10;
/// Articles fetched for the sentiment section of a recommendation.
pub const ANALYSIS_NEWS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TechnicalOutcome {
    Available { summary: TechnicalSummary },
    Unavailable { reason: String },
}

impl TechnicalOutcome {
    pub fn summary(&self) -> Option<&TechnicalSummary> {
        match self {
            TechnicalOutcome::Available { summary } => Some(summary),
            TechnicalOutcome::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationAnalysis {
    /// One entry per requested symbol, in request order.
    pub technical: Vec<(String, TechnicalOutcome)>,
    pub news: Option<NewsDigest>,
    pub news_error: Option<String>,
}

/// Fetches price history for each symbol and one shared news feed. A failed
/// lookup is recorded in the result; it never aborts the other symbols.
pub async fn analyze_recommendations(
    client: &dyn MarketDataClient,
    symbols: &[String],
    news_limit: usize,
) -> RecommendationAnalysis {
    let mut technical = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let outcome = match client.fetch_daily_series(symbol).await {
            Ok(bars) => match TechnicalSummary::from_bars(symbol, &bars) {
                Some(summary) => TechnicalOutcome::Available { summary },
                None => TechnicalOutcome::Unavailable {
                    reason: format!("not enough price history ({} days)", bars.len()),
                },
            },
            Err(err) => {
                tracing::warn!(%symbol, provider = client.provider_name(), error = %err, "daily series unavailable");
                TechnicalOutcome::Unavailable {
                    reason: err.to_string(),
                }
            }
        };
        technical.push((symbol.clone(), outcome));
    }

    let (news, news_error) = if symbols.is_empty() {
        (None, None)
    } else {
        match client.fetch_news(symbols, news_limit).await {
            Ok(articles) => (Some(NewsDigest::from_articles(articles)), None),
            Err(err) => {
                tracing::warn!(provider = client.provider_name(), error = %err, "news feed unavailable");
                (None, Some(err.to_string()))
            }
        }
    };

    RecommendationAnalysis {
        technical,
        news,
        news_error,
    }
}
