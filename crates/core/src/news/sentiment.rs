use crate::domain::market::{KeywordSentiment, NewsArticle, SentimentLabel};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const POSITIVE_WORDS: &[&str] = &[
    "high", "up", "rise", "gain", "bull", "positive", "strong", "growth", "profit", "win",
    "success", "better", "record", "surge", "rally",
];

const NEGATIVE_WORDS: &[&str] = &[
    "low", "down", "fall", "drop", "bear", "negative", "weak", "decline", "loss", "fail",
    "worse", "risk", "warning", "slump", "crash",
];

/// Keyword vote over free text: each listed word found anywhere in the text
/// counts once. Ties are neutral.
pub fn classify_text(text: &str) -> KeywordSentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => KeywordSentiment::Positive,
        std::cmp::Ordering::Less => KeywordSentiment::Negative,
        std::cmp::Ordering::Equal => KeywordSentiment::Neutral,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSentimentStats {
    pub article_count: usize,
    pub mean_score: f64,
    pub mean_relevance: f64,
    pub dominant_label: SentimentLabel,
    pub distribution: BTreeMap<SentimentLabel, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDigest {
    pub processed_at: NaiveDateTime,
    pub articles: Vec<NewsArticle>,
    pub by_ticker: BTreeMap<String, TickerSentimentStats>,
}

impl NewsDigest {
    pub fn from_articles(articles: Vec<NewsArticle>) -> Self {
        // (scores, relevances, labels in first-seen order)
        let mut grouped: BTreeMap<String, (Vec<f64>, Vec<f64>, Vec<SentimentLabel>)> =
            BTreeMap::new();

        for article in &articles {
            for ts in &article.tickers {
                if ts.ticker.trim().is_empty() {
                    continue;
                }
                let entry = grouped.entry(ts.ticker.clone()).or_default();
                entry.0.push(ts.score);
                entry.1.push(ts.relevance);
                entry.2.push(ts.label);
            }
        }

        let by_ticker = grouped
            .into_iter()
            .map(|(ticker, (scores, relevances, labels))| {
                let mut distribution = BTreeMap::new();
                for label in &labels {
                    *distribution.entry(*label).or_insert(0usize) += 1;
                }
                let stats = TickerSentimentStats {
                    article_count: scores.len(),
                    mean_score: mean(&scores),
                    mean_relevance: mean(&relevances),
                    dominant_label: dominant(&labels, &distribution),
                    distribution,
                };
                (ticker, stats)
            })
            .collect();

        Self {
            processed_at: Utc::now().naive_utc(),
            articles,
            by_ticker,
        }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.by_ticker.keys().map(String::as_str)
    }

    pub fn stats(&self, ticker: &str) -> Option<&TickerSentimentStats> {
        self.by_ticker.get(ticker)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// Most frequent label; the earliest seen wins a tie.
fn dominant(labels: &[SentimentLabel], distribution: &BTreeMap<SentimentLabel, usize>) -> SentimentLabel {
    let mut best = SentimentLabel::Neutral;
    let mut best_count = 0usize;
    for label in labels {
        let count = distribution.get(label).copied().unwrap_or(0);
        if count > best_count {
            best = *label;
            best_count = count;
        }
    }
    best
}
