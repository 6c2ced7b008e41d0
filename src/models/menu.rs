use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::MessType;

/// A single document read from a mess collection.
///
/// The payload is owned by the store and passed through untouched; this
/// service never looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDocument {
    pub id: String,
    pub data: Value,
}

impl MenuDocument {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Menu of one mess, flattened to document id -> document data
#[derive(Debug, Clone, PartialEq)]
pub struct MessMenu {
    pub mess_type: MessType,
    pub documents: Map<String, Value>,
}

impl MessMenu {
    /// Flatten documents into one map keyed by id. A repeated id keeps the
    /// last document read.
    pub fn from_documents(mess_type: MessType, documents: Vec<MenuDocument>) -> Self {
        let documents = documents
            .into_iter()
            .map(|document| (document.id, document.data))
            .collect();

        Self {
            mess_type,
            documents,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn to_response(&self) -> MenuResponse {
        MenuResponse {
            status: 200,
            message: format!("Menu for {} fetched successfully", self.mess_type),
            data: self.documents.clone(),
        }
    }
}

/// Successful body of `GET /messtype={messType}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuResponse {
    pub status: u16,
    pub message: String,
    pub data: Map<String, Value>,
}

/// Body shared by every JSON error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
