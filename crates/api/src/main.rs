use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use investbot_core::chat::{Bot, BotConfig, EvolutionClient, MessageSender, WebhookEvent};
use investbot_core::config::Settings;
use investbot_core::domain::recommendation::Recommendation;
use investbot_core::ingest::alphavantage::{AlphaVantageClient, MarketDataClient};
use investbot_core::news::analysis::{ANALYSIS_NEWS_LIMIT, QUOTES_NEWS_LIMIT};
use investbot_core::recommend::{RecommendOptions, Recommender};

mod disabled;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let universe = Arc::new(settings.load_universe()?);
    let registry = Arc::new(settings.load_registry()?);
    let recommender = Recommender::new(RecommendOptions {
        vocabulary: settings.vocabulary_scope()?,
        ..Default::default()
    });

    let sender: Arc<dyn MessageSender> = match EvolutionClient::from_settings(&settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "evolution api not configured; replies will only be logged");
            Arc::new(disabled::LogOnlySender)
        }
    };

    let market: Option<Arc<dyn MarketDataClient>> = match AlphaVantageClient::from_settings(&settings) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "market data client not configured; news and technical analysis disabled");
            None
        }
    };

    let bot = Bot::new(
        universe,
        registry,
        recommender,
        sender,
        market,
        BotConfig {
            default_client_id: settings.default_client_id().to_string(),
            top_n: settings.top_n()?,
            quote_tickers: settings.quote_tickers(),
            quotes_news_limit: QUOTES_NEWS_LIMIT,
            analysis_news_limit: ANALYSIS_NEWS_LIMIT,
        },
    );

    tracing::info!(
        instruments = bot.universe().len(),
        clients = bot.registry().len(),
        "bot ready"
    );

    let state = AppState { bot: Arc::new(bot) };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/webhook", post(webhook))
        .route("/clients/:client_id/recommendations", get(get_recommendations))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    bot: Arc<Bot>,
}

#[derive(Debug, Serialize)]
struct WebhookAck {
    status: &'static str,
}

/// Acknowledges immediately; the reply work runs in its own task so the
/// Evolution API never waits on market data lookups.
async fn webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookEvent>, JsonRejection>,
) -> Result<Json<WebhookAck>, StatusCode> {
    let Json(event) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "webhook without a valid JSON body");
        StatusCode::BAD_REQUEST
    })?;

    let Some(msg) = event.incoming_text() else {
        tracing::debug!(event = %event.event, "webhook event ignored");
        return Ok(Json(WebhookAck { status: "ok" }));
    };

    let bot = state.bot.clone();
    tokio::spawn(async move {
        if let Err(err) = bot.handle(&msg).await {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(sender = %msg.sender, error = %err, "failed to handle message");
            bot.send_fallback(&msg.sender).await;
        }
    });

    Ok(Json(WebhookAck { status: "ok" }))
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    top_n: Option<usize>,
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(q): Query<RecommendationQuery>,
) -> Result<Json<Recommendation>, StatusCode> {
    let top_n = q.top_n.unwrap_or(state.bot.config().top_n);
    state
        .bot
        .recommend_for(&client_id, top_n)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
