use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Document;

/// A note as returned to clients.
///
/// `title` and `description` are optional here because an update may clear
/// them; creation always sets both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

impl TryFrom<Document> for Note {
    type Error = serde_json::Error;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let mut fields = document.data;
        fields.insert("id".to_string(), Value::String(document.id));
        serde_json::from_value(Value::Object(fields))
    }
}

/// Body of POST and PUT requests
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
}

impl NotePayload {
    /// Required fields that are absent or empty
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.as_deref().map_or(true, str::is_empty) {
            missing.push("title");
        }
        if self.description.as_deref().map_or(true, str::is_empty) {
            missing.push("description");
        }
        missing
    }

    /// Attributes written on update. Absent fields are written as null.
    pub fn into_update(self, updated_at: &str) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("title".to_string(), self.title.map_or(Value::Null, Value::String));
        data.insert("content".to_string(), self.content.map_or(Value::Null, Value::String));
        data.insert("description".to_string(), self.description.map_or(Value::Null, Value::String));
        data.insert("updatedAt".to_string(), Value::String(updated_at.to_string()));
        data
    }
}
