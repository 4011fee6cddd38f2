use crate::chat::conversation::{Action, ConversationStore};
use crate::chat::evolution::MessageSender;
use crate::chat::reply::{self, split_message, MAX_MESSAGE_CHARS};
use crate::chat::webhook::IncomingText;
use crate::domain::client::ClientRegistry;
use crate::domain::instrument::InstrumentUniverse;
use crate::domain::recommendation::Recommendation;
use crate::ingest::alphavantage::MarketDataClient;
use crate::news::analysis::analyze_recommendations;
use crate::news::sentiment::NewsDigest;
use crate::recommend::Recommender;
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Client served to every WhatsApp sender.
    pub default_client_id: String,
    pub top_n: usize,
    pub quote_tickers: Vec<String>,
    pub quotes_news_limit: usize,
    pub analysis_news_limit: usize,
}

/// Routes incoming WhatsApp text through the conversation state machine and
/// sends the replies.
pub struct Bot {
    universe: Arc<InstrumentUniverse>,
    registry: Arc<ClientRegistry>,
    recommender: Recommender,
    conversations: ConversationStore,
    sender: Arc<dyn MessageSender>,
    market: Option<Arc<dyn MarketDataClient>>,
    config: BotConfig,
}

impl Bot {
    pub fn new(
        universe: Arc<InstrumentUniverse>,
        registry: Arc<ClientRegistry>,
        recommender: Recommender,
        sender: Arc<dyn MessageSender>,
        market: Option<Arc<dyn MarketDataClient>>,
        config: BotConfig,
    ) -> Self {
        Self {
            universe,
            registry,
            recommender,
            conversations: ConversationStore::new(),
            sender,
            market,
            config,
        }
    }

    pub fn universe(&self) -> &InstrumentUniverse {
        &self.universe
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn recommend_for(&self, client_id: &str, top_n: usize) -> Option<Recommendation> {
        let client = self.registry.find(client_id)?;
        Some(self.recommender.recommend(client, &self.universe, top_n))
    }

    pub async fn handle(&self, msg: &IncomingText) -> Result<Action> {
        let action = self.conversations.advance(&msg.sender, &msg.text).await;
        let to = msg.sender.as_str();

        match action {
            Action::Ignore => {}
            Action::ShowMenu => self.reply(to, reply::MENU).await?,
            Action::Greet => self.reply(to, reply::GREETING).await?,
            Action::InvalidOption => self.reply(to, reply::INVALID_OPTION).await?,
            Action::ShowQuotes => self.show_quotes(to).await?,
            Action::ShowPortfolio => self.show_portfolio(to).await?,
            Action::ShowRecommendations => self.show_recommendations(to).await?,
        }

        tracing::info!(sender = %msg.sender, ?action, "message handled");
        Ok(action)
    }

    /// Best-effort apology after a failed `handle`.
    pub async fn send_fallback(&self, to: &str) {
        if let Err(err) = self.sender.send_text(to, reply::INTERNAL_ERROR).await {
            tracing::warn!(%to, error = %err, "fallback reply failed");
        }
    }

    async fn reply(&self, to: &str, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.sender.send_text(to, &chunk).await?;
        }
        Ok(())
    }

    async fn show_quotes(&self, to: &str) -> Result<()> {
        let tickers = &self.config.quote_tickers;
        self.reply(to, &reply::quotes_intro(tickers)).await?;

        let Some(market) = &self.market else {
            return self
                .reply(to, &reply::news_unavailable("fonte de dados de mercado não configurada"))
                .await;
        };

        match market.fetch_news(tickers, self.config.quotes_news_limit).await {
            Ok(articles) => {
                let digest = NewsDigest::from_articles(articles);
                let focus = tickers.first().map(String::as_str);
                self.reply(to, &reply::news_summary(&digest, focus)).await
            }
            Err(err) => {
                tracing::warn!(error = %err, "news lookup failed");
                self.reply(to, &reply::news_unavailable(&err.to_string())).await
            }
        }
    }

    async fn show_portfolio(&self, to: &str) -> Result<()> {
        let id = &self.config.default_client_id;
        match self.registry.find(id) {
            Some(client) => self.reply(to, &reply::portfolio(client)).await,
            None => self.reply(to, &reply::client_not_found(id)).await,
        }
    }

    async fn show_recommendations(&self, to: &str) -> Result<()> {
        let id = &self.config.default_client_id;
        let Some(client) = self.registry.find(id) else {
            return self.reply(to, &reply::client_not_found(id)).await;
        };

        self.reply(to, reply::RECOMMENDATIONS_WAIT).await?;

        let rec = self.recommender.recommend(client, &self.universe, self.config.top_n);
        let analysis = match &self.market {
            Some(market) if !rec.is_empty() => Some(
                analyze_recommendations(
                    market.as_ref(),
                    &rec.symbols(),
                    self.config.analysis_news_limit,
                )
                .await,
            ),
            _ => None,
        };

        self.reply(to, &reply::recommendations(client, &rec, analysis.as_ref()))
            .await
    }
}
