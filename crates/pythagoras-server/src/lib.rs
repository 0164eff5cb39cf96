pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod service;
pub mod state;
pub mod store;

use axum::Router;
use axum::routing::{delete, get};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use pythagoras_core::api::{CHECK_NAME_PATH, RANKING_PATH, RESET_PATH};

use config::ServerConfig;
use state::AppState;
use store::StoreError;

/// Open the configured store and build the router around it.
pub fn build_app(config: ServerConfig) -> Result<(Router<()>, AppState), StoreError> {
    let state = AppState::new(config)?;
    Ok((build_router(state.clone()), state))
}

/// Ranking API, health endpoint, and static client files.
pub fn build_router(state: AppState) -> Router<()> {
    let web_root = state.config.web_root.clone();

    Router::new()
        .route(
            RANKING_PATH,
            get(api::list_ranking).post(api::submit_score),
        )
        .route(RESET_PATH, delete(api::reset_ranking))
        .route(&format!("{CHECK_NAME_PATH}/{{name}}"), get(api::check_name))
        .route(CHECK_NAME_PATH, get(api::missing_name))
        .route(&format!("{CHECK_NAME_PATH}/"), get(api::missing_name))
        .route("/health", get(health::health_check))
        .fallback_service(ServeDir::new(&web_root))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
