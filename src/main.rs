//! gagstock - GrowAGarden stock reporter and weather relay
//!
//! A CLI and small HTTP service that polls the GrowAGarden shop and weather
//! APIs. The stock pipeline aggregates five shop categories into a chat
//! report; the weather pipeline normalizes timestamps and serves the result.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (upstream failure, config, bind failure, etc.)

mod chat;
mod cli;
mod config;
mod error;
mod fetch;
mod server;
mod stock;
mod weather;

use anyhow::{Context, Result};
use chat::{ChatEvent, ConsoleChat, StockCommand};
use cli::{Args, Command};
use config::{Config, DEFAULT_CONFIG_FILE};
use fetch::{stock_headers, weather_headers, HttpFetcher};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use weather::NormalizeOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if args.command() == Command::InitConfig {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("gagstock v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Command failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .gagstock.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let normalize = NormalizeOptions {
        traverse_arrays: config.weather.traverse_arrays,
    };

    match args.command() {
        Command::Stock { json } => run_stock(&config, json, args.quiet).await,
        Command::Weather => {
            let fetcher = weather_fetcher(&config)?;
            let spinner = spinner("Fetching weather...", args.quiet);
            let result = weather::fetch_weather(&fetcher, normalize).await;
            spinner.finish_and_clear();

            let weather = result?;
            println!("{}", serde_json::to_string_pretty(&weather)?);
            Ok(())
        }
        Command::Serve { .. } => {
            let state = server::AppState {
                weather: Arc::new(weather_fetcher(&config)?),
                normalize,
            };
            server::serve(config.server.bind, state).await
        }
        Command::InitConfig => handle_init_config(),
    }
}

async fn run_stock(config: &Config, json: bool, quiet: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(
        config.stock.base_url.clone(),
        stock_headers(),
        config.http.timeout(),
    )
    .context("Failed to create HTTP client")?;

    if json {
        let spinner = spinner("Fetching stock...", quiet);
        let result = stock::fetch_all(&fetcher, &stock::Category::ALL, config.stock.policy).await;
        spinner.finish_and_clear();

        println!("{}", serde_json::to_string_pretty(&result?.to_json())?);
        return Ok(());
    }

    // Terminal delivery: the process exits before the delayed unsend fires.
    let command = StockCommand::new(Arc::new(fetcher))
        .with_policy(config.stock.policy)
        .with_unsend_delay(Duration::from_secs(config.chat.unsend_delay_seconds));
    let event = ChatEvent {
        thread_id: "console".to_string(),
        message_id: "console.0".to_string(),
    };

    info!("Running {}", StockCommand::INFO);
    command.run(Arc::new(ConsoleChat::new()), &event).await?;
    Ok(())
}

fn weather_fetcher(config: &Config) -> Result<HttpFetcher> {
    HttpFetcher::new(
        config.weather.base_url.clone(),
        weather_headers(),
        config.http.timeout(),
    )
    .context("Failed to create HTTP client")
}

/// Spinner on stderr, hidden in quiet mode.
fn spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
