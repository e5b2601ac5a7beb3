use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use logistics_api::handlers::AppServices;
use logistics_api::{app, config, db, events, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(config.log_level(), config.log_json);

    info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "starting logistics-api"
    );

    let pool = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to database")?;
    if config.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }
    let db_pool = Arc::new(pool);

    let event_sender = events::spawn_event_processor(config.event_channel_capacity);

    let base_logger = logging::setup_logger();
    let services = AppServices::new(
        db_pool.clone(),
        Arc::new(event_sender.clone()),
        &base_logger,
    );

    let state = AppState {
        db: db_pool,
        config: config.clone(),
        event_sender,
        services,
    };

    let router = app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
