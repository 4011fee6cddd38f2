//! Raw Alpha Vantage response shapes and their conversion into domain values.

use crate::domain::market::{DailyBar, NewsArticle, SentimentLabel, TickerSentiment};
use crate::news::sentiment::classify_text;
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct NewsSentimentResponse {
    #[serde(default)]
    pub feed: Vec<FeedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub time_published: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub overall_sentiment_label: String,
    #[serde(default)]
    pub ticker_sentiment: Vec<TickerSentimentItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerSentimentItem {
    #[serde(default)]
    pub ticker: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub relevance_score: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ticker_sentiment_score: f64,
    #[serde(default)]
    pub ticker_sentiment_label: String,
}

impl FeedItem {
    pub fn into_article(self) -> NewsArticle {
        let keyword_sentiment = classify_text(&format!("{} {}", self.title, self.summary));
        let tickers = self
            .ticker_sentiment
            .into_iter()
            .filter(|t| !t.ticker.trim().is_empty())
            .map(|t| TickerSentiment {
                ticker: t.ticker.trim().to_string(),
                relevance: t.relevance_score,
                score: t.ticker_sentiment_score,
                label: SentimentLabel::parse(&t.ticker_sentiment_label),
            })
            .collect();

        NewsArticle {
            published_at: parse_published(&self.time_published),
            overall_label: SentimentLabel::parse(&self.overall_sentiment_label),
            title: self.title,
            summary: self.summary,
            source: self.source,
            url: self.url,
            keyword_sentiment,
            tickers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesDailyResponse {
    #[serde(rename = "Meta Data", default)]
    pub meta: Option<TimeSeriesMeta>,
    #[serde(rename = "Time Series (Daily)")]
    pub series: BTreeMap<String, DailyBarItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesMeta {
    #[serde(rename = "2. Symbol", default)]
    pub symbol: String,
    #[serde(rename = "3. Last Refreshed", default)]
    pub last_refreshed: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyBarItem {
    #[serde(rename = "1. open", deserialize_with = "lenient_f64")]
    pub open: f64,
    #[serde(rename = "2. high", deserialize_with = "lenient_f64")]
    pub high: f64,
    #[serde(rename = "3. low", deserialize_with = "lenient_f64")]
    pub low: f64,
    #[serde(rename = "4. close", deserialize_with = "lenient_f64")]
    pub close: f64,
    #[serde(rename = "5. volume", default, deserialize_with = "lenient_f64")]
    pub volume: f64,
}

impl TimeSeriesDailyResponse {
    /// Bars newest first.
    pub fn into_bars(self) -> anyhow::Result<Vec<DailyBar>> {
        let mut out = Vec::with_capacity(self.series.len());
        for (date, bar) in self.series {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid series date: {date}"))?;
            out.push(DailyBar {
                date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume.max(0.0) as u64,
            });
        }
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }
}

/// Provider timestamps look like `20240131T154500`.
fn parse_published(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    NaiveDateTime::parse_from_str(t, "%Y%m%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y%m%dT%H%M"))
        .ok()
}

// Alpha Vantage sends most numbers as strings; anything unparseable becomes zero.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::KeywordSentiment;
    use serde_json::json;

    #[test]
    fn parses_news_feed_into_articles() {
        let v = json!({
            "items": "1",
            "feed": [{
                "title": "Apple shares rally on record growth",
                "url": "https://news.example/a",
                "time_published": "20240131T154500",
                "summary": "",
                "source": "Example Wire",
                "overall_sentiment_score": 0.31,
                "overall_sentiment_label": "Somewhat-Bullish",
                "ticker_sentiment": [
                    {"ticker": "AAPL", "relevance_score": "0.81", "ticker_sentiment_score": "0.42", "ticker_sentiment_label": "Bullish"},
                    {"ticker": "", "relevance_score": "0.1", "ticker_sentiment_score": "0", "ticker_sentiment_label": "Neutral"}
                ]
            }]
        });

        let parsed: NewsSentimentResponse = serde_json::from_value(v).unwrap();
        let article = parsed.feed.into_iter().next().unwrap().into_article();

        assert_eq!(article.overall_label, SentimentLabel::SomewhatBullish);
        assert_eq!(article.keyword_sentiment, KeywordSentiment::Positive);
        assert_eq!(article.tickers.len(), 1);
        assert_eq!(article.tickers[0].relevance, 0.81);
        assert_eq!(article.tickers[0].label, SentimentLabel::Bullish);
        assert_eq!(
            article.published_at.unwrap().to_string(),
            "2024-01-31 15:45:00"
        );
    }

    #[test]
    fn parses_daily_series_newest_first() {
        let v = json!({
            "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": "IBM", "3. Last Refreshed": "2024-01-31"},
            "Time Series (Daily)": {
                "2024-01-30": {"1. open": "10.0", "2. high": "11.0", "3. low": "9.5", "4. close": "10.5", "5. volume": "1000"},
                "2024-01-31": {"1. open": "10.5", "2. high": "12.0", "3. low": "10.0", "4. close": "11.5", "5. volume": "2000"}
            }
        });

        let parsed: TimeSeriesDailyResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.meta.as_ref().unwrap().symbol, "IBM");
        let bars = parsed.into_bars().unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(bars[0].close, 11.5);
        assert_eq!(bars[1].volume, 1000);
    }

    #[test]
    fn series_without_time_series_key_fails() {
        let v = json!({"Meta Data": {}});
        assert!(serde_json::from_value::<TimeSeriesDailyResponse>(v).is_err());
    }
}
