//! # Directory Search Server Main Driver
//!
//! ## Purpose
//! Main entry point for the member directory search server. Orchestrates
//! initialization of storage and search components and starts the web
//! server for handling search requests.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Open the directory store and wire up the search components
//! 4. Start the web API server
//! 5. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use directory_search::{
    api::ApiServer,
    config::Config,
    errors::{DirectoryError, Result},
    search::SearchEngine,
    storage::{DirectoryStore, SledDirectoryStore},
    suggest::SuggestionMiner,
    AppState, SearchHistoryLog,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("directory-search-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Directory Platform Team")
        .about("Member directory search service with autocomplete and search history")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Run a storage health check and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").expect("has default");
    let mut config = Config::from_file(config_path)?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    init_logging(&config)?;

    info!("Starting directory search server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    if matches.get_flag("check-health") {
        return run_health_check(&config).await;
    }

    let app_state = initialize_components(config.clone())?;
    app_state.store.health_check().await?;
    info!("Directory store is healthy");

    // The bound handle is Send, unlike the future of ApiServer::run
    let server = ApiServer::new(app_state).bind()?;
    let server_handle = tokio::spawn(server);

    info!(
        "Directory search server listening on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        result = server_handle => {
            if let Ok(Err(e)) = result {
                error!("Server error: {}", e);
            }
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Directory search server shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

/// Open the store and wire up the search components
fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Opening directory store at {:?}", config.storage.db_path);
    let store: Arc<dyn DirectoryStore> =
        Arc::new(SledDirectoryStore::open(config.storage.clone())?);

    let search_engine = Arc::new(SearchEngine::new(config.clone(), store.clone()));
    let suggestions = Arc::new(SuggestionMiner::new(config.clone(), store.clone()));
    let history = Arc::new(SearchHistoryLog::new(config.clone(), store.clone()));

    Ok(AppState {
        config,
        store,
        search_engine,
        suggestions,
        history,
    })
}

/// Open the store, run the health check and exit
async fn run_health_check(config: &Arc<Config>) -> Result<()> {
    let store = SledDirectoryStore::open(config.storage.clone())?;
    store
        .health_check()
        .await
        .map_err(|e| DirectoryError::StoreUnavailable {
            reason: format!("health check failed: {}", e),
        })?;
    info!("Health check passed");
    Ok(())
}
