use crate::domain::instrument::normalize_symbol;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    /// Relative weight of the position; only its ratio to the other holdings matters.
    pub quantity: f64,
}

impl Holding {
    /// The ticker is normalized the same way universe symbols are.
    pub fn new(ticker: impl AsRef<str>, quantity: f64) -> Self {
        Self {
            ticker: normalize_symbol(ticker.as_ref()),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    pub fn holds(&self, ticker: &str) -> bool {
        self.holdings.iter().any(|h| h.ticker == ticker)
    }

    /// Combined weight of every holding for `ticker`.
    pub fn weight_of(&self, ticker: &str) -> f64 {
        self.holdings
            .iter()
            .filter(|h| h.ticker == ticker)
            .map(|h| h.quantity)
            .sum()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.holdings.iter().map(|h| h.ticker.as_str())
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    /// Free-form investor profile label ("moderado", "arrojado", ...).
    pub profile: String,
    pub portfolio: Portfolio,
}

/// On-disk shape of a client entry; validated before it becomes a [`Client`].
#[derive(Debug, Clone, Deserialize)]
struct ClientFileEntry {
    id: String,
    name: String,
    #[serde(default)]
    profile: String,
    #[serde(default)]
    holdings: Vec<Holding>,
}

impl ClientFileEntry {
    fn validate_and_into_client(self, seen_ids: &mut BTreeSet<String>) -> anyhow::Result<Client> {
        let id = self.id.trim().to_string();
        ensure!(!id.is_empty(), "client id must be non-empty");
        ensure!(seen_ids.insert(id.clone()), "duplicate client id: {id}");

        let name = self.name.trim().to_string();
        ensure!(!name.is_empty(), "client {id}: name must be non-empty");

        let mut holdings = Vec::with_capacity(self.holdings.len());
        for h in self.holdings {
            let ticker = normalize_symbol(&h.ticker);
            ensure!(!ticker.is_empty(), "client {id}: holding ticker must be non-empty");
            ensure!(
                h.quantity.is_finite() && h.quantity > 0.0,
                "client {id}: quantity for {ticker} must be positive (got {})",
                h.quantity
            );
            holdings.push(Holding::new(ticker, h.quantity));
        }

        Ok(Client {
            id,
            name,
            profile: self.profile.trim().to_string(),
            portfolio: Portfolio::new(holdings),
        })
    }
}

/// Clients registered for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Vec<Client>,
}

impl ClientRegistry {
    /// The two demonstration clients the bot serves when no client file is configured.
    pub fn demo() -> Self {
        let mut registry = Self::default();
        registry.register(
            "0001",
            "Luis Felipe Vamo",
            "moderado",
            vec![
                Holding::new("AAPL", 50.0),
                Holding::new("MSFT", 30.0),
                Holding::new("JNJ", 15.0),
            ],
        );
        registry.register(
            "0002",
            "Gustavo Cuca",
            "arrojado",
            vec![
                Holding::new("NVDA", 15.0),
                Holding::new("GOOGL", 35.0),
                Holding::new("TSLA", 20.0),
            ],
        );
        registry
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let entries: Vec<ClientFileEntry> =
            serde_json::from_str(s).context("clients file is not a valid JSON array of clients")?;

        let mut seen = BTreeSet::new();
        let mut clients = Vec::with_capacity(entries.len());
        for entry in entries {
            clients.push(entry.validate_and_into_client(&mut seen)?);
        }
        Ok(Self { clients })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read clients file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("invalid clients file {}", path.display()))
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        profile: impl Into<String>,
        holdings: Vec<Holding>,
    ) -> &Client {
        let client = Client {
            id: id.into(),
            name: name.into(),
            profile: profile.into(),
            portfolio: Portfolio::new(holdings),
        };
        tracing::info!(client_id = %client.id, holdings = client.portfolio.len(), "client registered");
        self.clients.push(client);
        &self.clients[self.clients.len() - 1]
    }

    pub fn find(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn demo_registry_has_both_clients() {
        let registry = ClientRegistry::demo();
        assert_eq!(registry.len(), 2);
        let c = registry.find("0001").unwrap();
        assert_eq!(c.profile, "moderado");
        assert!(c.portfolio.holds("JNJ"));
        assert!(registry.find("0003").is_none());
    }

    #[test]
    fn weight_of_sums_repeated_tickers() {
        let p = Portfolio::new(vec![
            Holding::new("AAPL", 10.0),
            Holding::new("MSFT", 5.0),
            Holding::new("AAPL", 2.5),
        ]);
        assert_eq!(p.weight_of("AAPL"), 12.5);
        assert_eq!(p.weight_of("TSLA"), 0.0);
    }

    #[test]
    fn parses_and_normalizes_client_file() {
        let s = json!([
            {
                "id": " 0009 ",
                "name": "Ana",
                "profile": "conservador",
                "holdings": [{"ticker": "aapl", "quantity": 3.0}]
            },
            {"id": "0010", "name": "Bia"}
        ])
        .to_string();

        let registry = ClientRegistry::from_json_str(&s).unwrap();
        let ana = registry.find("0009").unwrap();
        assert_eq!(ana.portfolio.holdings[0].ticker, "AAPL");
        assert!(registry.find("0010").unwrap().portfolio.is_empty());
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let s = json!([
            {"id": "1", "name": "A", "holdings": [{"ticker": "AAPL", "quantity": 0.0}]}
        ])
        .to_string();
        assert!(ClientRegistry::from_json_str(&s).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let s = json!([
            {"id": "1", "name": "A"},
            {"id": "1", "name": "B"}
        ])
        .to_string();
        assert!(ClientRegistry::from_json_str(&s).is_err());
    }
}
