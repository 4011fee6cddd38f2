pub mod chat;
pub mod domain;
pub mod export;
pub mod ingest;
pub mod news;
pub mod recommend;

pub mod config {
    use crate::domain::client::ClientRegistry;
    use crate::domain::instrument::InstrumentUniverse;
    use crate::ingest::screener::{load_screener_csv, sample_universe};
    use crate::recommend::VocabularyScope;
    use anyhow::Context;

    pub const DEFAULT_CLIENT_ID: &str = "0001";
    pub const DEFAULT_TOP_N: usize = 5;
    pub const DEFAULT_QUOTE_TICKERS: &str = "AAPL,MSFT,GOOGL";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub alphavantage_api_key: Option<String>,
        pub alphavantage_base_url: Option<String>,
        pub evolution_api_url: Option<String>,
        pub evolution_api_key: Option<String>,
        pub evolution_instance: Option<String>,
        pub universe_csv: Option<String>,
        pub clients_json: Option<String>,
        pub default_client_id: Option<String>,
        pub recommend_top_n: Option<String>,
        pub recommend_vocabulary: Option<String>,
        pub quote_tickers: Option<String>,
        pub export_dir: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                alphavantage_api_key: std::env::var("ALPHAVANTAGE_API_KEY").ok(),
                alphavantage_base_url: std::env::var("ALPHAVANTAGE_BASE_URL").ok(),
                evolution_api_url: std::env::var("EVOLUTION_API_URL").ok(),
                evolution_api_key: std::env::var("EVOLUTION_API_KEY").ok(),
                evolution_instance: std::env::var("EVOLUTION_INSTANCE").ok(),
                universe_csv: std::env::var("UNIVERSE_CSV").ok(),
                clients_json: std::env::var("CLIENTS_JSON").ok(),
                default_client_id: std::env::var("DEFAULT_CLIENT_ID").ok(),
                recommend_top_n: std::env::var("RECOMMEND_TOP_N").ok(),
                recommend_vocabulary: std::env::var("RECOMMEND_VOCABULARY").ok(),
                quote_tickers: std::env::var("QUOTE_TICKERS").ok(),
                export_dir: std::env::var("EXPORT_DIR").ok(),
            })
        }

        pub fn require_alphavantage_api_key(&self) -> anyhow::Result<&str> {
            self.alphavantage_api_key
                .as_deref()
                .context("ALPHAVANTAGE_API_KEY is required")
        }

        pub fn require_evolution_api_url(&self) -> anyhow::Result<&str> {
            self.evolution_api_url
                .as_deref()
                .context("EVOLUTION_API_URL is required")
        }

        pub fn require_evolution_api_key(&self) -> anyhow::Result<&str> {
            self.evolution_api_key
                .as_deref()
                .context("EVOLUTION_API_KEY is required")
        }

        pub fn require_evolution_instance(&self) -> anyhow::Result<&str> {
            self.evolution_instance
                .as_deref()
                .context("EVOLUTION_INSTANCE is required")
        }

        pub fn default_client_id(&self) -> &str {
            non_blank(&self.default_client_id).unwrap_or(DEFAULT_CLIENT_ID)
        }

        pub fn top_n(&self) -> anyhow::Result<usize> {
            match non_blank(&self.recommend_top_n) {
                Some(s) => s
                    .parse::<usize>()
                    .with_context(|| format!("RECOMMEND_TOP_N must be a non-negative integer (got {s})")),
                None => Ok(DEFAULT_TOP_N),
            }
        }

        pub fn vocabulary_scope(&self) -> anyhow::Result<VocabularyScope> {
            match non_blank(&self.recommend_vocabulary) {
                Some(s) => s.parse().context("invalid RECOMMEND_VOCABULARY"),
                None => Ok(VocabularyScope::default()),
            }
        }

        pub fn quote_tickers(&self) -> Vec<String> {
            let raw = non_blank(&self.quote_tickers).unwrap_or(DEFAULT_QUOTE_TICKERS);
            parse_ticker_list(raw)
        }

        /// Screener CSV from `UNIVERSE_CSV`, or the built-in sample universe.
        pub fn load_universe(&self) -> anyhow::Result<InstrumentUniverse> {
            match non_blank(&self.universe_csv) {
                Some(path) => load_screener_csv(path),
                None => {
                    tracing::info!("UNIVERSE_CSV not set; using sample universe");
                    Ok(sample_universe())
                }
            }
        }

        /// Clients from `CLIENTS_JSON`, or the demo clients.
        pub fn load_registry(&self) -> anyhow::Result<ClientRegistry> {
            match non_blank(&self.clients_json) {
                Some(path) => ClientRegistry::from_json_file(path),
                None => {
                    tracing::info!("CLIENTS_JSON not set; using demo clients");
                    Ok(ClientRegistry::demo())
                }
            }
        }
    }

    /// `"aapl, msft,,GOOGL"` -> `["AAPL", "MSFT", "GOOGL"]`.
    pub fn parse_ticker_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn non_blank(v: &Option<String>) -> Option<&str> {
        v.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

}
