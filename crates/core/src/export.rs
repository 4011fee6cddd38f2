//! File exports of news digests and recommendations.

use crate::domain::market::KeywordSentiment;
use crate::domain::recommendation::Recommendation;
use crate::news::sentiment::NewsDigest;
use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writes `<prefix>_news.json`, `<prefix>_articles.csv` and
/// `<prefix>_tickers.csv` into `dir`, creating it if needed.
pub fn write_news_digest(dir: &Path, prefix: &str, digest: &NewsDigest) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let json_path = dir.join(format!("{prefix}_news.json"));
    write_json(&json_path, digest)?;

    let articles_path = dir.join(format!("{prefix}_articles.csv"));
    let mut writer = csv_writer(&articles_path)?;
    writer.write_record([
        "title",
        "source",
        "url",
        "published_at",
        "overall_sentiment",
        "keyword_sentiment",
        "tickers",
    ])?;
    for a in &digest.articles {
        let tickers = a
            .tickers
            .iter()
            .map(|t| t.ticker.as_str())
            .collect::<Vec<_>>()
            .join(";");
        writer.write_record([
            a.title.clone(),
            a.source.clone(),
            a.url.clone(),
            a.published_at.map(|t| t.to_string()).unwrap_or_default(),
            a.overall_label.to_string(),
            keyword_label(a.keyword_sentiment).to_string(),
            tickers,
        ])?;
    }
    writer.flush()?;

    let tickers_path = dir.join(format!("{prefix}_tickers.csv"));
    let mut writer = csv_writer(&tickers_path)?;
    writer.write_record([
        "ticker",
        "article_count",
        "mean_score",
        "mean_relevance",
        "dominant_label",
    ])?;
    for (ticker, stats) in &digest.by_ticker {
        writer.write_record([
            ticker.clone(),
            stats.article_count.to_string(),
            format!("{:.4}", stats.mean_score),
            format!("{:.4}", stats.mean_relevance),
            stats.dominant_label.to_string(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(dir = %dir.display(), %prefix, articles = digest.articles.len(), "news digest exported");
    Ok(vec![json_path, articles_path, tickers_path])
}

/// Writes `<prefix>_recommendation.json` into `dir`.
pub fn write_recommendation(dir: &Path, prefix: &str, rec: &Recommendation) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{prefix}_recommendation.json"));
    write_json(&path, rec)?;
    tracing::info!(path = %path.display(), client_id = %rec.client_id, items = rec.len(), "recommendation exported");
    Ok(path)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir {}", dir.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn csv_writer(path: &Path) -> Result<Writer<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Writer::from_writer(file))
}

fn keyword_label(s: KeywordSentiment) -> &'static str {
    match s {
        KeywordSentiment::Positive => "positive",
        KeywordSentiment::Negative => "negative",
        KeywordSentiment::Neutral => "neutral",
    }
}
