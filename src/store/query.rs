use serde::Serialize;
use serde_json::Value;

use super::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryMethod {
    Equal,
}

/// A filter passed to `list_documents`.
///
/// Serializes to the JSON query form the document service accepts in its
/// `queries[]` parameter, e.g.
/// `{"method":"equal","attribute":"userId","values":["user_1"]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub method: QueryMethod,
    pub attribute: String,
    pub values: Vec<Value>,
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            method: QueryMethod::Equal,
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    /// Wire form for the `queries[]` parameter
    pub fn to_query_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Evaluate the query against a document held in process
    pub fn matches(&self, document: &Document) -> bool {
        let actual = if self.attribute == "$id" {
            Value::String(document.id.clone())
        } else {
            match document.get(&self.attribute) {
                Some(v) => v.clone(),
                None => return false,
            }
        };

        match self.method {
            QueryMethod::Equal => self.values.iter().any(|v| *v == actual),
        }
    }
}
