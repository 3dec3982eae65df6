mod api;
mod middleware;
mod scheduler;
mod store;

use std::sync::Arc;

use folio_stats::{Aggregator, StatsClient};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_refresh_throttle, AppState},
    middleware::AuthState,
    store::{spawn_refresh, AchievementsStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = folio_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let registry = Arc::new(folio_core::load_platforms(&config.platforms_path)?);
    tracing::info!(
        platforms = registry.platforms.len(),
        path = %config.platforms_path.display(),
        "loaded platform registry"
    );

    let client = StatsClient::from_config(&config)?;
    let store = Arc::new(AchievementsStore::new(Aggregator::new(client)));

    // Serve fallbacks immediately; the first live sweep publishes when it settles.
    spawn_refresh(&store, Arc::clone(&registry));

    let _scheduler = scheduler::build_scheduler(
        config.refresh_cron.as_deref(),
        Arc::clone(&store),
        Arc::clone(&registry),
    )
    .await?;

    let auth = AuthState::from_config(&config)?;
    let app = build_app(
        AppState {
            registry,
            achievements: store,
        },
        auth,
        default_refresh_throttle(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
