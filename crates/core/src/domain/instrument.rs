use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Placeholder used for categorical attributes a data source left blank.
pub const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalAttr {
    Country,
    Sector,
    Industry,
}

impl CategoricalAttr {
    pub const ALL: [CategoricalAttr; 3] = [Self::Country, Self::Sector, Self::Industry];

    pub fn key(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Sector => "sector",
            Self::Industry => "industry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericAttr {
    PercentChange,
    LastSale,
    MarketCap,
}

impl NumericAttr {
    pub const ALL: [NumericAttr; 3] = [Self::PercentChange, Self::LastSale, Self::MarketCap];

    pub fn key(self) -> &'static str {
        match self {
            Self::PercentChange => "pct_change",
            Self::LastSale => "last_sale",
            Self::MarketCap => "market_cap",
        }
    }
}

/// Which optional attributes a data source actually carries.
///
/// Resolved once when a universe is loaded; the feature pipeline only ever
/// looks at the attributes listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseSchema {
    pub categorical: Vec<CategoricalAttr>,
    pub numeric: Vec<NumericAttr>,
}

impl UniverseSchema {
    pub fn full() -> Self {
        Self {
            categorical: CategoricalAttr::ALL.to_vec(),
            numeric: NumericAttr::ALL.to_vec(),
        }
    }

    pub fn has_categorical(&self, attr: CategoricalAttr) -> bool {
        self.categorical.contains(&attr)
    }

    pub fn has_numeric(&self, attr: NumericAttr) -> bool {
        self.numeric.contains(&attr)
    }

    pub fn is_empty(&self) -> bool {
        self.categorical.is_empty() && self.numeric.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub percent_change: Option<f64>,
    #[serde(default)]
    pub last_sale: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl InstrumentRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, attr: CategoricalAttr, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match attr {
            CategoricalAttr::Country => self.country = value,
            CategoricalAttr::Sector => self.sector = value,
            CategoricalAttr::Industry => self.industry = value,
        }
        self
    }

    pub fn with_numeric(mut self, attr: NumericAttr, value: f64) -> Self {
        match attr {
            NumericAttr::PercentChange => self.percent_change = Some(value),
            NumericAttr::LastSale => self.last_sale = Some(value),
            NumericAttr::MarketCap => self.market_cap = Some(value),
        }
        self
    }

    /// Categorical value with blanks normalized to [`UNKNOWN_CATEGORY`].
    pub fn category(&self, attr: CategoricalAttr) -> &str {
        let raw = match attr {
            CategoricalAttr::Country => self.country.as_deref(),
            CategoricalAttr::Sector => self.sector.as_deref(),
            CategoricalAttr::Industry => self.industry.as_deref(),
        };
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// Numeric value with missing and non-finite values normalized to zero.
    pub fn numeric(&self, attr: NumericAttr) -> f64 {
        let raw = match attr {
            NumericAttr::PercentChange => self.percent_change,
            NumericAttr::LastSale => self.last_sale,
            NumericAttr::MarketCap => self.market_cap,
        };
        raw.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Read-only snapshot of every candidate instrument plus its schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentUniverse {
    schema: UniverseSchema,
    records: Vec<InstrumentRecord>,
}

impl InstrumentUniverse {
    /// Builds a universe, dropping rows without a symbol and repeated symbols
    /// (first occurrence wins). Symbols are stored normalized, see [`normalize_symbol`].
    pub fn new(schema: UniverseSchema, records: Vec<InstrumentRecord>) -> Self {
        let total = records.len();
        let mut seen = HashSet::with_capacity(total);
        let mut kept = Vec::with_capacity(total);
        let mut duplicates = 0usize;

        for mut record in records {
            let symbol = normalize_symbol(&record.symbol);
            if symbol.is_empty() {
                continue;
            }
            if !seen.insert(symbol.clone()) {
                duplicates += 1;
                continue;
            }
            record.symbol = symbol;
            kept.push(record);
        }

        let missing_symbol = total - kept.len() - duplicates;
        if missing_symbol > 0 || duplicates > 0 {
            tracing::warn!(
                total,
                kept = kept.len(),
                missing_symbol,
                duplicates,
                "dropped unusable instrument rows"
            );
        }

        Self {
            schema,
            records: kept,
        }
    }

    pub fn schema(&self) -> &UniverseSchema {
        &self.schema
    }

    pub fn records(&self) -> &[InstrumentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentRecord> {
        let symbol = normalize_symbol(symbol);
        self.records.iter().find(|r| r.symbol == symbol)
    }
}

/// Canonical ticker form shared by universes and portfolios: trimmed, ASCII uppercase.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_and_duplicate_symbols() {
        let universe = InstrumentUniverse::new(
            UniverseSchema::full(),
            vec![
                InstrumentRecord::new("AAPL").with_numeric(NumericAttr::LastSale, 1.0),
                InstrumentRecord::new("  "),
                InstrumentRecord::new(" MSFT "),
                InstrumentRecord::new("AAPL").with_numeric(NumericAttr::LastSale, 2.0),
            ],
        );

        assert_eq!(universe.len(), 2);
        assert_eq!(universe.records()[1].symbol, "MSFT");
        assert_eq!(
            universe.get("AAPL").map(|r| r.numeric(NumericAttr::LastSale)),
            Some(1.0)
        );
    }

    #[test]
    fn symbols_are_case_insensitive() {
        let universe = InstrumentUniverse::new(
            UniverseSchema::full(),
            vec![
                InstrumentRecord::new(" aapl ").with_numeric(NumericAttr::LastSale, 1.0),
                InstrumentRecord::new("AAPL").with_numeric(NumericAttr::LastSale, 2.0),
                InstrumentRecord::new("brk.b"),
            ],
        );

        assert_eq!(universe.len(), 2);
        assert_eq!(universe.records()[0].symbol, "AAPL");
        assert_eq!(universe.records()[1].symbol, "BRK.B");
        assert_eq!(
            universe.get("aapl").map(|r| r.numeric(NumericAttr::LastSale)),
            Some(1.0)
        );
    }

    #[test]
    fn normalizes_missing_values() {
        let r = InstrumentRecord::new("X")
            .with_category(CategoricalAttr::Sector, "   ")
            .with_numeric(NumericAttr::MarketCap, f64::NAN);

        assert_eq!(r.category(CategoricalAttr::Sector), UNKNOWN_CATEGORY);
        assert_eq!(r.category(CategoricalAttr::Country), UNKNOWN_CATEGORY);
        assert_eq!(r.numeric(NumericAttr::MarketCap), 0.0);
        assert_eq!(r.numeric(NumericAttr::PercentChange), 0.0);
    }
}
