//! Linkshelf server entry point.
//!
//! Loads settings, opens the bookmark store and serves the HTTP API until
//! Ctrl-C or SIGTERM.

use linkshelf::app::App;
use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkshelf::types::errors::ServerError;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    init_tracing();

    let mut engine = SettingsEngine::from_env();
    engine.load()?;
    engine.apply_env_overrides()?;
    let settings = engine.get_settings().clone();

    let app = App::new(settings)?;
    let addr = app.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, config = %engine.get_config_path(), "serving Linkshelf API");

    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");

    app.shutdown()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linkshelf=info,tower_http=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
