use tracing_subscriber::EnvFilter;

use autismedu_api::config;
use autismedu_api::database::DatabaseManager;
use autismedu_api::routes;
use autismedu_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autismedu_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting AutismEdu API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    if config.database.run_migrations {
        // A database that is down at startup only degrades /health
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            tracing::error!("Migrations were not applied: {}", e);
        }
    }

    let app = routes::app(AppState::new(pool));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("AutismEdu API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
