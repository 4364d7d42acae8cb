use axum::extract::{rejection::JsonRejection, Extension, State};
use axum::Json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Note, NotePayload};
use crate::types::Operation;

use super::read_payload;

/// POST /api/notes - Create a note owned by the caller
///
/// Expected Input:
/// ```json
/// { "title": "string", "content": "string (optional)", "description": "string" }
/// ```
///
/// Responds 201 with the stored note, 400 when title or description is
/// missing, 500 when the store fails.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<Note> {
    let payload = read_payload(payload)?;

    let note = state
        .notes
        .create(&user.user_id, payload)
        .await
        .map_err(|e| ApiError::from_note_error(e, Operation::Create))?;

    Ok(ApiResponse::created(note))
}

/// GET /api/notes - All notes owned by the caller
pub async fn get(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Note>> {
    let notes = state
        .notes
        .list(&user.user_id)
        .await
        .map_err(|e| ApiError::from_note_error(e, Operation::Select))?;

    Ok(ApiResponse::success(notes))
}
