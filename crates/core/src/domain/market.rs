use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-ticker sentiment label as reported by the news provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bearish,
    SomewhatBearish,
    Neutral,
    SomewhatBullish,
    Bullish,
}

impl SentimentLabel {
    /// Parses provider labels such as `Somewhat-Bullish`; unknown labels map to neutral.
    pub fn parse(s: &str) -> Self {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "bearish" => Self::Bearish,
            "somewhatbearish" => Self::SomewhatBearish,
            "somewhatbullish" => Self::SomewhatBullish,
            "bullish" => Self::Bullish,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearish => "Bearish",
            Self::SomewhatBearish => "Somewhat-Bearish",
            Self::Neutral => "Neutral",
            Self::SomewhatBullish => "Somewhat-Bullish",
            Self::Bullish => "Bullish",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the local keyword scan over an article's title and summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSentiment {
    pub ticker: String,
    pub relevance: f64,
    pub score: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: Option<NaiveDateTime>,
    pub overall_label: SentimentLabel,
    pub keyword_sentiment: KeywordSentiment,
    pub tickers: Vec<TickerSentiment>,
}

/// One day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_labels() {
        assert_eq!(SentimentLabel::parse("Somewhat-Bullish"), SentimentLabel::SomewhatBullish);
        assert_eq!(SentimentLabel::parse("somewhat_bearish"), SentimentLabel::SomewhatBearish);
        assert_eq!(SentimentLabel::parse("Bullish"), SentimentLabel::Bullish);
        assert_eq!(SentimentLabel::parse("???"), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::SomewhatBullish.to_string(), "Somewhat-Bullish");
    }
}
