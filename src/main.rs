use std::sync::Arc;

use tracing::{error, info, warn};

use sharebox::web::{AppState, WebServer};
use sharebox::{Config, ContentStore, Database, RemoteFetcher};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = sharebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        sharebox::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Sharebox stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> sharebox::Result<()> {
    config.validate()?;

    info!("Sharebox - file sharing with content deduplication");

    let db = Database::open_with_config(&config.database).await?;
    info!("Catalog database opened at {}", config.database.path);

    let store = ContentStore::new(&config.files.storage_path)?;
    match store.cleanup_staging() {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Removed leftover staged uploads"),
        Err(e) => warn!(error = %e, "Failed to clean staging area"),
    }
    info!("Content store at {}", config.files.storage_path);

    let fetcher = RemoteFetcher::new(&config.fetch)?;

    let app_state = AppState::new(Arc::new(db), store)
        .with_fetcher(fetcher)
        .with_max_upload_size(config.files.max_upload_bytes());

    let server = WebServer::new(&config.server, &config.web, app_state)?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    server.run().await?;
    Ok(())
}
