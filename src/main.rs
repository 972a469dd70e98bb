use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gbvmis::config;
use gbvmis::database::{seed, DatabaseManager};
use gbvmis::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gbvmis=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting GBVMIS API in {:?} mode", config.environment);
    if gbvmis::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("Using built-in development JWT secrets; set JWT_SECRET and REFRESH_SECRET outside development");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("migrations failed")?;
    }
    if config.database.seed {
        seed::seed(&pool).await.context("seeding failed")?;
    }

    let router = app(AppState::new(pool, config), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("GBVMIS API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
