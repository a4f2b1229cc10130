//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use mhe_inspection::{
    app,
    config::{AppState, Config},
    db,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    db::run_migrations(&app_state.db_pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("✅ Database migrations applied");

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
