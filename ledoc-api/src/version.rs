use crate::Time;

/// Immutable full-content snapshot of a document
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DocumentVersion {
    pub version_number: i64,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub created_at: Option<Time>,
}
