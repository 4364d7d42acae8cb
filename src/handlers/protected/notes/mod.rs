pub mod collection;
pub mod record;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;
use crate::models::NotePayload;

// Re-export handler functions for use in routing
pub use collection::get as notes_get;
pub use collection::post as notes_post;
pub use record::delete as note_delete;
pub use record::put as note_put;

/// Resolve the request body of POST/PUT.
///
/// A request without a JSON content type carries no fields. Fields of the
/// wrong JSON type are a validation error; anything else unreadable (syntax
/// errors, oversized bodies) goes to the plain-text fallback.
pub(crate) fn read_payload(payload: Result<Json<NotePayload>, JsonRejection>) -> Result<NotePayload, ApiError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(NotePayload::default()),
        Err(JsonRejection::JsonDataError(e)) => Err(ApiError::validation_error(e.body_text(), None)),
        Err(e) => {
            tracing::error!("Unreadable request body: {}", e.body_text());
            Err(ApiError::Unhandled)
        }
    }
}
