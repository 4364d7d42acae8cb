use axum::extract::{rejection::JsonRejection, Extension, Path, State};
use axum::Json;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Note, NotePayload};
use crate::types::Operation;

use super::read_payload;

#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub message: &'static str,
}

/// PUT /api/notes/:id - Replace title, content and description of a note
///
/// Fields missing from the body are cleared. Only the owner may update;
/// other callers get 403.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<Note> {
    let payload = read_payload(payload)?;

    let note = state
        .notes
        .update(&user.user_id, &id, payload)
        .await
        .map_err(|e| ApiError::from_note_error(e, Operation::Update))?;

    Ok(ApiResponse::success(note))
}

/// DELETE /api/notes/:id - Permanently remove a note owned by the caller
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<DeleteConfirmation> {
    state
        .notes
        .delete(&user.user_id, &id)
        .await
        .map_err(|e| ApiError::from_note_error(e, Operation::Delete))?;

    Ok(ApiResponse::success(DeleteConfirmation {
        message: "Note deleted successfully.",
    }))
}
