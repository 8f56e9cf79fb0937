use chrono::Utc;

mod analysis;
pub use analysis::{
    AnalysisAnswer, AnalysisHistory, AnalysisId, AnalysisInfo, AnalysisMessage,
    AnalysisQuestion, AnalysisSession, AnalysisSessions, UploadReply,
};

mod auth;
pub use auth::AuthToken;

mod chat;
pub use chat::{
    ChatConversation, ChatMessage, ChatParticipant, ChatReply, ChatRequest, LastMessage, Sender,
};

mod comment;
pub use comment::{Comment, CommentId, NewComment};

mod conversation;
pub use conversation::{Conversation, ConversationUpdate, DocumentId, NewConversation};

mod error;
pub use error::Error;

mod feed;
pub use feed::FeedMessage;

mod share;
pub use share::{
    PermissionLevel, ShareLink, ShareLinkRequest, SharePermissions, ShareWithUser, SharedUser,
};

mod version;
pub use version::DocumentVersion;

pub type Time = chrono::DateTime<Utc>;

// The `validate` functions below are run by the client before any request is
// issued, and by the mock server on receipt. Whitespace-only input counts as
// empty.

pub fn validate_comment(content: &str) -> Result<(), Error> {
    match content.trim().is_empty() {
        true => Err(Error::EmptyComment),
        false => Ok(()),
    }
}

pub fn validate_title(title: &str) -> Result<(), Error> {
    match title.trim().is_empty() {
        true => Err(Error::EmptyTitle),
        false => Ok(()),
    }
}

pub fn validate_username(username: &str) -> Result<(), Error> {
    match username.trim().is_empty() {
        true => Err(Error::EmptyUsername),
        false => Ok(()),
    }
}

pub fn validate_message(message: &str) -> Result<(), Error> {
    match message.trim().is_empty() {
        true => Err(Error::EmptyMessage),
        false => Ok(()),
    }
}
