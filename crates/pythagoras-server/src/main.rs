use tracing_subscriber::EnvFilter;

use pythagoras_server::build_app;
use pythagoras_server::config::ServerConfig;
use pythagoras_server::store::RankingBackend;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("PYTHAGORAS_LOG_JSON")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match ServerConfig::load().and_then(|cfg| cfg.validate().map(|()| cfg)) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            std::process::exit(1);
        },
    };
    // validate() has already checked the address
    let Ok(addr) = config.listen_addr() else {
        std::process::exit(1);
    };

    let (app, state) = match build_app(config) {
        Ok(built) => built,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open ranking store");
            std::process::exit(1);
        },
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        },
    };

    tracing::info!(
        %addr,
        backend = state.ranking.store().kind().as_str(),
        "Pythagoras ranking server listening"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
