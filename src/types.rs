//! Shared types used across the codebase

use axum::http::StatusCode;

/// Note operations exposed over HTTP
/// Used by the handlers to pick the failure response for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Select,
    Update,
    Delete,
}

impl Operation {
    /// Status returned when the document store fails during this operation.
    /// Listing reports 400 while the others report 500.
    pub fn store_failure_status(&self) -> StatusCode {
        match self {
            Operation::Select => StatusCode::BAD_REQUEST,
            Operation::Create | Operation::Update | Operation::Delete => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create => "Failed to create note.",
            Operation::Select => "Failed to fetch notes.",
            Operation::Update => "Failed to update note.",
            Operation::Delete => "Failed to delete note.",
        }
    }

    /// Bare verb, e.g. "update"
    pub fn action(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Select => "list",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Verb used in server-side log lines
    pub fn log_verb(&self) -> &'static str {
        match self {
            Operation::Create => "creating note",
            Operation::Select => "fetching notes",
            Operation::Update => "updating note",
            Operation::Delete => "deleting note",
        }
    }
}
