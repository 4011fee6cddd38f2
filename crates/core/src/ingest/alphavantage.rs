use crate::config::Settings;
use crate::domain::market::{DailyBar, NewsArticle};
use crate::ingest::error::{is_retryable, MarketDataError};
use crate::ingest::types::{NewsSentimentResponse, TimeSeriesDailyResponse};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const PROVIDER: &str = "alphavantage";
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;

#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Recent news mentioning any of `tickers`, with per-ticker sentiment.
    async fn fetch_news(&self, tickers: &[String], limit: usize) -> Result<Vec<NewsArticle>>;

    /// Daily bars for `symbol`, newest first.
    async fn fetch_daily_series(&self, symbol: &str) -> Result<Vec<DailyBar>>;
}

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_alphavantage_api_key()?.to_string();
        let base_url = settings
            .alphavantage_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("ALPHAVANTAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("ALPHAVANTAGE_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES)
            .max(1);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            retries,
        })
    }

    fn url(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }

    async fn query_once(&self, params: &[(&str, String)]) -> Result<Value> {
        let res = self
            .http
            .get(self.url())
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;

        if !status.is_success() {
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            return Err(MarketDataError {
                provider: PROVIDER,
                stage: "http",
                detail: format!("status={status}"),
                retryable,
                raw_response_json: serde_json::from_str(&text).ok(),
            }
            .into());
        }

        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("market data response is not valid JSON: {text}"))?;
        check_api_payload(&raw_json)?;
        Ok(raw_json)
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.query_once(params).await {
                Ok(v) => return Ok(v),
                Err(err) => {
                    if attempt >= self.retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "market data request failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl MarketDataClient for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_news(&self, tickers: &[String], limit: usize) -> Result<Vec<NewsArticle>> {
        anyhow::ensure!(!tickers.is_empty(), "at least one ticker is required for news");

        let params = [
            ("function", "NEWS_SENTIMENT".to_string()),
            ("tickers", tickers.join(",")),
            ("limit", limit.to_string()),
        ];
        let raw = self.query(&params).await?;
        let articles = parse_news(raw)?;

        tracing::info!(tickers = %tickers.join(","), articles = articles.len(), "news feed loaded");
        Ok(articles)
    }

    async fn fetch_daily_series(&self, symbol: &str) -> Result<Vec<DailyBar>> {
        let params = [
            ("function", "TIME_SERIES_DAILY".to_string()),
            ("symbol", symbol.to_string()),
        ];
        let raw = self.query(&params).await?;
        let bars = parse_daily_series(raw)
            .with_context(|| format!("invalid daily series for {symbol}"))?;

        tracing::info!(%symbol, days = bars.len(), "daily series loaded");
        Ok(bars)
    }
}

/// Alpha Vantage reports quota and usage problems with HTTP 200 and a
/// message body instead of data.
fn check_api_payload(raw: &Value) -> Result<()> {
    for (key, stage) in [("Information", "rate_limit"), ("Note", "rate_limit"), ("Error Message", "api_error")] {
        if let Some(msg) = raw.get(key).and_then(Value::as_str) {
            return Err(MarketDataError {
                provider: PROVIDER,
                stage,
                detail: msg.to_string(),
                retryable: false,
                raw_response_json: Some(raw.clone()),
            }
            .into());
        }
    }
    Ok(())
}

pub fn parse_news(raw: Value) -> Result<Vec<NewsArticle>> {
    anyhow::ensure!(raw.get("feed").is_some(), "news response has no feed");
    let parsed = serde_json::from_value::<NewsSentimentResponse>(raw)
        .context("failed to parse news response into NewsSentimentResponse")?;
    Ok(parsed.feed.into_iter().map(|f| f.into_article()).collect())
}

pub fn parse_daily_series(raw: Value) -> Result<Vec<DailyBar>> {
    let parsed = serde_json::from_value::<TimeSeriesDailyResponse>(raw)
        .context("failed to parse daily series into TimeSeriesDailyResponse")?;
    parsed.into_bars()
}
