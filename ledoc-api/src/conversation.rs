use std::fmt;

use crate::{ChatMessage, DocumentVersion, SharePermissions, SharedUser};

/// Shared key of the REST document record and of its WebSocket room
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn stub() -> DocumentId {
        DocumentId(String::from("stub"))
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> DocumentId {
        DocumentId(String::from(s))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Conversation {
    pub id: DocumentId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Ordered by increasing `version_number`
    #[serde(default)]
    pub document_versions: Vec<DocumentVersion>,

    #[serde(default)]
    pub shared_with_users: Vec<SharedUser>,

    #[serde(default)]
    pub share_permissions: Option<SharePermissions>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewConversation {
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub initial_document_content: String,
}

/// Body of `PUT /api/documents/conversations/<id>/`, only the present fields
/// are changed. Setting `new_document_content` creates a new version.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ConversationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_document_content: Option<String>,
}

impl ConversationUpdate {
    pub fn rename(title: String) -> ConversationUpdate {
        ConversationUpdate {
            title: Some(title),
            ..ConversationUpdate::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rename_only_sends_title() {
        assert_eq!(
            serde_json::to_value(ConversationUpdate::rename(String::from("NDA"))).unwrap(),
            json!({"title": "NDA"})
        );
    }

    #[test]
    fn sparse_record_parses() {
        let c: Conversation = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(c.id, DocumentId::from("abc"));
        assert!(c.document_versions.is_empty());
        assert_eq!(c.share_permissions, None);
    }
}
