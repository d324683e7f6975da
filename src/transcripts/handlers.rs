use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    error::{bad_request, internal, not_found, ApiError},
    state::AppState,
};

use super::dto::CreateTranscriptRequest;
use super::repo::{self, Transcript};

/// Listing is capped; clients always get the newest rows first.
const LIST_LIMIT: i64 = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transcripts", get(list_transcripts).post(create_transcript))
        .route("/transcripts/:id", get(get_transcript))
}

#[instrument(skip(state, payload))]
pub async fn create_transcript(
    State(state): State<AppState>,
    payload: Result<Json<CreateTranscriptRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transcript>), ApiError> {
    // A body that fails JSON extraction counts as an empty payload; the
    // missing-field check below answers with 400 either way.
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let text = payload.text.as_deref().unwrap_or("").trim();
    if text.is_empty() {
        warn!("transcript rejected: blank text");
        return Err(bad_request("text is required"));
    }

    let item = repo::insert(&state.db, text, payload.language.as_deref())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn list_transcripts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transcript>>, ApiError> {
    let items = repo::list_latest(&state.db, LIST_LIMIT)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transcript>, ApiError> {
    match repo::find_by_id(&state.db, id).await.map_err(internal)? {
        Some(item) => Ok(Json(item)),
        None => Err(not_found("not found")),
    }
}
