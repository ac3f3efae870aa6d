use alerter::{run_alerter_service, LogNotifier, Notifier, TelegramAlerter};
use anyhow::{Context, Result};
use api_client::{BarFeed, ForexFactoryCalendar};
use clap::{Parser, Subcommand};
use configuration::{load_config, Config};
use engine::{NewsBlockSet, NewsRefresher, SignalEngine, SystemClock, TokioScheduler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The main entry point for the Confluence signal engine.
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; credentials may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref())?;

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::CheckConfig(args) => check_config(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Live multi-rule signal detection and confirmation for currency pairs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Also write logs to daily-rolling files in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream bars from the feed and emit alerts.
    Run(ConfigArgs),
    /// Load and validate the configuration, then exit.
    CheckConfig(ConfigArgs),
}

#[derive(Parser)]
struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

fn init_tracing(log_dir: Option<&std::path::Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "confluence.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}

fn load(path: &std::path::Path) -> Result<Config> {
    let path = path
        .to_str()
        .context("Configuration path is not valid UTF-8")?;
    let mut config = load_config(path).context("Failed to load configuration")?;

    // Plain TELEGRAM_* variables are accepted as a fallback to the config file.
    if config.telegram.token.is_empty() {
        config.telegram.token = std::env::var("TELEGRAM_TOKEN").unwrap_or_default();
    }
    if config.telegram.chat_id.is_empty() {
        config.telegram.chat_id = std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default();
    }
    Ok(config)
}

fn check_config(args: ConfigArgs) -> Result<()> {
    let config = load(&args.config)?;
    tracing::info!(
        rules = ?config.strategies.enabled,
        sessions = config.session.windows.len(),
        instruments = ?config.feed.instruments,
        "Configuration is valid."
    );
    Ok(())
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

async fn run(args: ConfigArgs) -> Result<()> {
    let config = load(&args.config)?;
    if config.feed.url.is_empty() {
        anyhow::bail!("feed.url must be set to stream bars");
    }

    let clock = Arc::new(SystemClock);
    let blocks = NewsBlockSet::new();
    let (scheduler, checks) = TokioScheduler::new();

    let engine = Arc::new(
        SignalEngine::new(&config, blocks.clone(), Arc::new(scheduler), clock.clone())
            .context("Failed to build signal engine")?,
    );

    // --- Background tasks ---
    let notifier: Arc<dyn Notifier> = match TelegramAlerter::new(&config.telegram) {
        Some(telegram) => Arc::new(telegram),
        None => Arc::new(LogNotifier),
    };
    let notifications = engine.subscribe();
    let alerter_task = tokio::spawn(async move {
        run_alerter_service(notifier.as_ref(), notifications).await;
    });

    if config.news.enabled {
        let calendar = Arc::new(ForexFactoryCalendar::new(config.news.calendar_url.clone()));
        let refresher = NewsRefresher::new(calendar, blocks, config.news.clone(), clock);
        tokio::spawn(refresher.start());
    }

    let feed = BarFeed::new(&config.feed.url, config.feed.instruments.clone())
        .context("Invalid feed URL")?;
    let bars = feed.subscribe();

    engine.announce();
    tracing::info!(
        instruments = config.feed.instruments.len(),
        "--- Engine is running. Waiting for market data... ---"
    );

    tokio::select! {
        _ = engine.clone().run(bars, checks) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested.");
        }
    }

    let stats = engine.stats();
    tracing::info!(
        total = stats.total,
        wins = stats.wins,
        losses = stats.losses,
        win_rate = %stats.win_rate(),
        "Session statistics."
    );

    // Dropping the engine closes the notification channel so the alerter can drain.
    drop(engine);
    if let Err(e) = alerter_task.await {
        tracing::error!(error = %e, "Alerter task failed.");
    }
    Ok(())
}
