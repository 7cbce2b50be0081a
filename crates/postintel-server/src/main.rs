mod api;
mod middleware;
mod scheduler;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::build_app;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(postintel_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = postintel_db::PoolConfig::from_app_config(&config);
    let pool = postintel_db::connect_pool(&config.database_url, pool_config).await?;
    postintel_db::run_migrations(&pool).await?;

    let keys = Arc::new(postintel_core::KeyStore::new(
        postintel_core::ApiKeys::from_env(),
    ));
    // Persisted key rows take precedence over the environment.
    postintel_db::reload_keys(&pool, &keys).await?;

    let state = AppState {
        pool,
        config: Arc::clone(&config),
        keys,
    };

    let _scheduler = scheduler::build_scheduler(state.clone()).await?;

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
