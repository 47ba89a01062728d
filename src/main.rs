use std::net::SocketAddr;

use quiz_adaptive_backend::config::Config;
use quiz_adaptive_backend::quiz::store::UserRecordStore;
use quiz_adaptive_backend::state::AppState;
use quiz_adaptive_backend::{build_app, logging, open_store};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log);

    let store = match open_store(&config.store).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "failed to open quiz record store");
            std::process::exit(1);
        }
    };
    tracing::info!(backend = store.backend(), "quiz record store ready");

    let engine = AppState::create_engine(store, config.rng_seed);
    let app = build_app(AppState::new(engine), config.route_prefix.as_deref());

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "bind listener failed");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, route_prefix = ?config.route_prefix, "quiz-adaptive-backend listening");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        tracing::error!(error = %err, "server error");
    }
    tracing::info!("quiz-adaptive-backend stopped");
}

/// Resolves on Ctrl+C or SIGTERM. A handler that fails to install never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, draining connections"),
        _ = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
