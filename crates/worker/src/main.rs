use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use investbot_core::chat::reply;
use investbot_core::config::Settings;
use investbot_core::domain::client::ClientRegistry;
use investbot_core::ingest::alphavantage::AlphaVantageClient;
use investbot_core::ingest::screener::load_screener_csv;
use investbot_core::news::analysis::{analyze_recommendations, ANALYSIS_NEWS_LIMIT};
use investbot_core::recommend::{Eligibility, RecommendOptions, Recommender, VocabularyScope};

#[derive(Debug, Parser)]
#[command(name = "investbot_worker")]
struct Args {
    /// Client to recommend for. Defaults to DEFAULT_CLIENT_ID.
    #[arg(long)]
    client_id: Option<String>,

    /// Number of recommendations. Defaults to RECOMMEND_TOP_N.
    #[arg(long)]
    top_n: Option<usize>,

    /// Screener CSV. Defaults to UNIVERSE_CSV, then the sample universe.
    #[arg(long)]
    universe_csv: Option<PathBuf>,

    /// Clients JSON. Defaults to CLIENTS_JSON, then the demo clients.
    #[arg(long)]
    clients_json: Option<PathBuf>,

    /// One-hot vocabulary scope: batch or universe.
    #[arg(long)]
    vocabulary: Option<VocabularyScope>,

    /// Consider every instrument, not only those with a positive change.
    #[arg(long)]
    include_negative: bool,

    /// Fetch price history and news for the recommended symbols.
    #[arg(long)]
    with_news: bool,

    /// Write JSON/CSV exports here. Defaults to EXPORT_DIR.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

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

    let args = Args::parse();

    if let Err(err) = run(&settings, args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "recommendation run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let universe = match &args.universe_csv {
        Some(path) => load_screener_csv(path)?,
        None => settings.load_universe()?,
    };
    let registry = match &args.clients_json {
        Some(path) => ClientRegistry::from_json_file(path)?,
        None => settings.load_registry()?,
    };

    let client_id = args
        .client_id
        .unwrap_or_else(|| settings.default_client_id().to_string());
    let top_n = match args.top_n {
        Some(n) => n,
        None => settings.top_n()?,
    };
    let vocabulary = match args.vocabulary {
        Some(v) => v,
        None => settings.vocabulary_scope()?,
    };

    let client = registry
        .find(&client_id)
        .ok_or_else(|| anyhow::anyhow!("client {client_id} not found"))?;

    let recommender = Recommender::new(RecommendOptions {
        eligibility: if args.include_negative {
            Eligibility::Any
        } else {
            Eligibility::PositiveChange
        },
        vocabulary,
    });
    let rec = recommender.recommend(client, &universe, top_n);

    tracing::info!(
        %client_id,
        top_n,
        instruments = universe.len(),
        recommendations = rec.len(),
        "recommendation run finished"
    );

    let analysis = if args.with_news && !rec.is_empty() {
        let market = AlphaVantageClient::from_settings(settings)?;
        Some(analyze_recommendations(&market, &rec.symbols(), ANALYSIS_NEWS_LIMIT).await)
    } else {
        None
    };

    println!("{}", reply::recommendations(client, &rec, analysis.as_ref()));

    let export_dir = args
        .export_dir
        .or_else(|| settings.export_dir.as_deref().map(PathBuf::from));
    if let Some(dir) = export_dir {
        let prefix = format!("{}_{}", client_id, chrono::Utc::now().format("%Y%m%d_%H%M%S"));
        let path = investbot_core::export::write_recommendation(&dir, &prefix, &rec)?;
        tracing::info!(path = %path.display(), "recommendation written");

        if let Some(digest) = analysis.as_ref().and_then(|a| a.news.as_ref()) {
            investbot_core::export::write_news_digest(&dir, &prefix, digest)?;
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&rec)?);
    }

    Ok(())
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
