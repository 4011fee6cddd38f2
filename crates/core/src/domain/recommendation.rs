use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub client_id: String,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<RecommendationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub rank: usize,
    pub ticker: String,
    pub score: f64,
}

impl Recommendation {
    pub fn empty(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            generated_at: Utc::now(),
            items: Vec::new(),
        }
    }

    /// Ranked symbols, most similar first.
    pub fn symbols(&self) -> Vec<String> {
        self.items.iter().map(|i| i.ticker.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
