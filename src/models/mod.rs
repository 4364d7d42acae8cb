pub mod note;

use chrono::{SecondsFormat, Utc};

pub use note::{Note, NotePayload};

/// Current time as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
