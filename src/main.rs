//! DealerChat Server: dealership chat and notification realtime core.
//!
//! Main entry point that wires all crates together and starts the server.

use dealerchat_core::config::AppConfig;
use dealerchat_core::error::AppError;
use dealerchat_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    dealerchat_api::init_logging(&config.logging);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration: `DEALERCHAT_CONFIG` names an explicit file,
/// otherwise `config/default.toml` is merged with `config/{DEALERCHAT_ENV}.toml`.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("DEALERCHAT_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => {
            let env =
                std::env::var("DEALERCHAT_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DealerChat v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let database = DatabasePool::connect(&config.database).await?;
    database.migrate().await?;

    // ── Step 2: HTTP + WebSocket server ──────────────────────────
    dealerchat_api::run_server(config, database).await
}
