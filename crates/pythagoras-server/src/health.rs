use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;
use crate::store::RankingBackend;

/// Structured health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
    /// Persisted entry count; absent when the store could not be read.
    pub entries: Option<usize>,
}

/// GET /health - server version, active backend, and whether the store
/// answers.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ranking = Arc::clone(&state.ranking);
    let count = tokio::task::spawn_blocking(move || ranking.store().count()).await;

    let entries = match count {
        Ok(Ok(n)) => Some(n),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health check could not read the ranking store");
            None
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check task failed");
            None
        },
    };

    Json(HealthResponse {
        status: if entries.is_some() {
            "healthy"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        backend: state.ranking.store().kind().as_str(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResetSecret, ServerConfig};
    use crate::store::{JsonFileStore, RankingStore, SqliteStore};

    fn config() -> ServerConfig {
        ServerConfig {
            reset_password: ResetSecret::new("x"),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn healthy_when_store_answers() {
        let store = RankingStore::Sqlite(SqliteStore::open_in_memory().unwrap());
        let Json(resp) = health_check(State(AppState::with_store(config(), store))).await;
        assert_eq!(resp.status, "healthy");
        assert_eq!(resp.backend, "sqlite");
        assert_eq!(resp.entries, Some(0));
    }

    #[tokio::test]
    async fn degraded_when_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RankingStore::JsonFile(JsonFileStore::new(dir.path()));
        let Json(resp) = health_check(State(AppState::with_store(config(), store))).await;
        assert_eq!(resp.status, "degraded");
        assert_eq!(resp.backend, "file");
        assert!(resp.entries.is_none());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            backend: "sqlite",
            entries: Some(3),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\""));
        assert!(json.contains("\"entries\":3"));
    }
}
