use serde_json::Value;
use std::fmt;

/// Failure talking to the market data provider, with enough context to log
/// and to decide whether another attempt makes sense.
#[derive(Debug, Clone)]
pub struct MarketDataError {
    pub provider: &'static str,
    pub stage: &'static str,
    pub detail: String,
    pub retryable: bool,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "market data error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for MarketDataError {}

pub fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<MarketDataError>() {
        Some(e) => e.retryable,
        None => true,
    }
}
