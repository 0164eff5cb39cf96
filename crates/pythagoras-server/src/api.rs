use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use pythagoras_core::api::{
    MessageResponse, NameCheckResponse, ResetRequest, SubmitScoreRequest,
};
use pythagoras_core::ranking::RankingEntry;

use crate::error::AppError;
use crate::service::{RankingError, RankingService};
use crate::state::AppState;

/// Run a blocking ranking operation off the async executor.
async fn with_ranking<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    F: FnOnce(&RankingService) -> Result<T, RankingError> + Send + 'static,
    T: Send + 'static,
{
    let ranking = Arc::clone(&state.ranking);
    match tokio::task::spawn_blocking(move || op(ranking.as_ref())).await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => {
            tracing::error!(error = %e, "Ranking task did not complete");
            Err(AppError::internal())
        },
    }
}

/// POST /api/ranking - record a score.
pub async fn submit_score(
    State(state): State<AppState>,
    body: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = body?;
    let (name, score) = request.fields().map_err(RankingError::from)?;
    let name = name.to_owned();
    with_ranking(&state, move |ranking| ranking.submit_score(&name, score)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Score saved".to_string(),
        }),
    ))
}

/// GET /api/ranking - the leaderboard, best first.
pub async fn list_ranking(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    let entries = with_ranking(&state, |ranking| ranking.get_top()).await?;
    Ok(Json(entries))
}

/// DELETE /api/ranking/reset - clear the leaderboard. A request without a
/// JSON body counts as an empty password.
pub async fn reset_ranking(
    State(state): State<AppState>,
    body: Result<Option<Json<ResetRequest>>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let request = body?.map(|Json(r)| r).unwrap_or_default();
    with_ranking(&state, move |ranking| ranking.reset_all(&request.password)).await?;
    Ok(Json(MessageResponse {
        message: "Ranking reset".to_string(),
    }))
}

/// GET /api/ranking/checkName/{name} - is this name already on the board?
pub async fn check_name(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<NameCheckResponse>, AppError> {
    let Path(name) = name?;
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    let is_taken = with_ranking(&state, move |ranking| ranking.is_name_taken(&name)).await?;
    Ok(Json(NameCheckResponse { is_taken }))
}

/// GET /api/ranking/checkName/ with no name segment.
pub async fn missing_name() -> AppError {
    AppError::BadRequest("name is required".to_string())
}
