//! # Document Model
//!
//! Wire shapes shared with the documents API and the live feed. Field names
//! are Pascal-case on the wire (`Title`, `CreatedAt`, `UserID`, ...).

use serde::{Deserialize, Serialize};

/// A person who edited a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Contributor identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// A document as returned by `GET /documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    /// Document identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Free-form version label, e.g. `"1.0"`.
    pub version: String,
    /// Attachment file names.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last update timestamp.
    pub updated_at: String,
    /// Contributors, when the server reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<Contributor>>,
}

/// Body of `POST /documents` and input of the creation path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDocumentRequest {
    /// Title; required.
    pub title: String,
    /// Version label; required.
    pub version: String,
    /// Attachment file names.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl CreateDocumentRequest {
    /// Builds a request with no attachments.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            attachments: Vec::new(),
        }
    }

    /// Returns one message per missing required field; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        }
        if self.version.trim().is_empty() {
            errors.push("Version is required".to_string());
        }
        errors
    }
}

/// A live-feed event announcing activity on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    /// ISO-8601 time of the event.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Acting user.
    #[serde(rename = "UserID")]
    pub user_id: String,
    /// Acting user's display name.
    #[serde(rename = "UserName")]
    pub user_name: String,
    /// Affected document.
    #[serde(rename = "DocumentID")]
    pub document_id: String,
    /// Affected document's title.
    #[serde(rename = "DocumentTitle")]
    pub document_title: String,
}
