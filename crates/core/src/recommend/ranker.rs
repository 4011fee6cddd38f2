use crate::domain::client::Client;
use crate::domain::instrument::{InstrumentRecord, InstrumentUniverse, NumericAttr};
use crate::domain::recommendation::{Recommendation, RecommendationItem};
use crate::recommend::aggregate::{aggregate, is_zero};
use crate::recommend::encoder::{encode_with_vocabulary, Vocabulary};
use crate::recommend::similarity::score;
use chrono::Utc;
use std::cmp::Ordering;

/// Which instruments may be recommended at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Eligibility {
    /// Positive recent percent change. Skipped when the universe has no
    /// percent-change attribute.
    #[default]
    PositiveChange,
    Any,
}

impl Eligibility {
    fn filter(self, universe: &InstrumentUniverse) -> Vec<InstrumentRecord> {
        let records = universe.records();
        match self {
            Eligibility::PositiveChange
                if universe.schema().has_numeric(NumericAttr::PercentChange) =>
            {
                records
                    .iter()
                    .filter(|r| r.numeric(NumericAttr::PercentChange) > 0.0)
                    .cloned()
                    .collect()
            }
            Eligibility::PositiveChange => {
                tracing::info!("percent change not available; using every instrument");
                records.to_vec()
            }
            Eligibility::Any => records.to_vec(),
        }
    }
}

/// Where the one-hot columns come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VocabularyScope {
    /// Values seen among the eligible instruments of the current call.
    #[default]
    Batch,
    /// Values seen across the whole universe, before eligibility filtering.
    Universe,
}

impl std::str::FromStr for VocabularyScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "universe" => Ok(Self::Universe),
            other => anyhow::bail!("unknown vocabulary scope: {other} (expected batch|universe)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendOptions {
    pub eligibility: Eligibility,
    pub vocabulary: VocabularyScope,
}

/// Content-based recommender. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    opts: RecommendOptions,
}

impl Recommender {
    pub fn new(opts: RecommendOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> RecommendOptions {
        self.opts
    }

    /// Ranks eligible instruments by similarity to the client's portfolio.
    ///
    /// Never fails: every degenerate case (nothing eligible, no features,
    /// no held instrument in the candidate set, everything already held)
    /// yields an empty recommendation.
    pub fn recommend(
        &self,
        client: &Client,
        universe: &InstrumentUniverse,
        top_n: usize,
    ) -> Recommendation {
        let mut out = Recommendation::empty(client.id.clone());
        if top_n == 0 {
            return out;
        }

        let candidates = self.opts.eligibility.filter(universe);
        if candidates.is_empty() {
            tracing::info!(client_id = %client.id, "no eligible instruments");
            return out;
        }

        let vocabulary = match self.opts.vocabulary {
            VocabularyScope::Batch => Vocabulary::observe(&candidates, universe.schema()),
            VocabularyScope::Universe => Vocabulary::observe(universe.records(), universe.schema()),
        };
        let matrix = encode_with_vocabulary(&candidates, universe.schema(), &vocabulary);
        if matrix.is_empty() {
            tracing::info!(client_id = %client.id, "no features available for recommendation");
            return out;
        }

        let query = aggregate(&matrix, &client.portfolio);
        if is_zero(&query) {
            tracing::info!(
                client_id = %client.id,
                holdings = client.portfolio.len(),
                "no portfolio holding found among eligible instruments"
            );
            return out;
        }

        let scores = score(&query, &matrix);

        let mut ranked: Vec<(&str, f64)> = matrix
            .symbols()
            .iter()
            .zip(scores)
            .filter(|(symbol, _)| !client.portfolio.holds(symbol))
            .map(|(symbol, s)| (symbol.as_str(), s))
            .collect();

        if ranked.is_empty() {
            tracing::info!(client_id = %client.id, "every eligible instrument is already held");
            return out;
        }

        // Stable: ties keep universe order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        out.items = ranked
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(i, (ticker, score))| RecommendationItem {
                rank: i + 1,
                ticker: ticker.to_string(),
                score,
            })
            .collect();
        out.generated_at = Utc::now();

        tracing::info!(
            client_id = %client.id,
            candidates = matrix.len(),
            recommendations = out.items.len(),
            "recommendations generated"
        );
        out
    }
}
