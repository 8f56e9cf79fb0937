use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Please provide a title for the document")]
    EmptyTitle,

    #[error("Please enter a username")]
    EmptyUsername,

    #[error("Message cannot be empty")]
    EmptyMessage,
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::EmptyComment => StatusCode::BAD_REQUEST,
            Error::EmptyTitle => StatusCode::BAD_REQUEST,
            Error::EmptyUsername => StatusCode::BAD_REQUEST,
            Error::EmptyMessage => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether this error is caught client-side, before any request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyComment | Error::EmptyTitle | Error::EmptyUsername | Error::EmptyMessage
        )
    }

    pub fn contents(&self) -> Vec<u8> {
        let msg = self.to_string();
        serde_json::to_vec(&match self {
            Error::Unknown(m) => json!({
                "error": m,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "error": msg,
                "type": "permission-denied",
            }),
            Error::NotFound(what) => json!({
                "error": msg,
                "type": "not-found",
                "what": what,
            }),
            Error::InvalidRequest(why) => json!({
                "error": msg,
                "type": "invalid-request",
                "why": why,
            }),
            Error::EmptyComment => json!({
                "error": msg,
                "type": "empty-comment",
            }),
            Error::EmptyTitle => json!({
                "error": msg,
                "type": "empty-title",
            }),
            Error::EmptyUsername => json!({
                "error": msg,
                "type": "empty-username",
            }),
            Error::EmptyMessage => json!({
                "error": msg,
                "type": "empty-message",
            }),
        })
        .expect("serializing error")
    }

    /// Parses an error body. Bodies from a backend that only sends
    /// `{"error": "..."}` are mapped from the status code.
    pub fn parse(status: http::StatusCode, body: &[u8]) -> anyhow::Result<Error> {
        use http::StatusCode;
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = data
            .get("error")
            .and_then(|m| m.as_str())
            .or_else(|| data.get("detail").and_then(|m| m.as_str()))
            .unwrap_or("");
        let field = |name: &str| {
            data.get(name)
                .and_then(|f| f.as_str())
                .map(String::from)
                .ok_or_else(|| anyhow!("error has no {name} field"))
        };
        Ok(match data.get("type").and_then(|t| t.as_str()) {
            Some("unknown") => Error::Unknown(String::from(message)),
            Some("permission-denied") => Error::PermissionDenied,
            Some("not-found") => Error::NotFound(field("what")?),
            Some("invalid-request") => Error::InvalidRequest(field("why")?),
            Some("empty-comment") => Error::EmptyComment,
            Some("empty-title") => Error::EmptyTitle,
            Some("empty-username") => Error::EmptyUsername,
            Some("empty-message") => Error::EmptyMessage,
            Some(t) => return Err(anyhow!("error contents has unknown type {t:?}")),
            None => match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied,
                StatusCode::NOT_FOUND => Error::NotFound(String::from(message)),
                s if s.is_client_error() => Error::InvalidRequest(String::from(message)),
                _ => Error::Unknown(String::from(message)),
            },
        })
    }
}
