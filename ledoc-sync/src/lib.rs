//! Native client for collaboratively edited documents: one socket per open
//! document, comment threads kept in sync with pushes, version history, a
//! polled conversation list, and question-and-answer over uploaded documents.

mod analyzer;
pub use analyzer::{
    Analyzer, GREETING, NO_SUMMARY, SEND_FAILED, SESSION_LOAD_FAILED, UPLOADED_WITHOUT_SUMMARY,
    UPLOAD_FAILED,
};

mod api;
pub use api::ApiClient;

mod autosave;
pub use autosave::Debouncer;

pub mod channel;
pub use channel::{Channel, ChannelEvent, ReadyState};

mod comments;
pub use comments::{CommentEvent, CommentForm, CommentView, LOAD_FAILED, POST_FAILED};

mod config;
pub use config::{ClientConfig, OfflineEdits, AUTOSAVE_DELAY, HIGHLIGHT_DURATION, POLL_INTERVAL};

mod document;
pub use document::{Deletion, DocumentSession, Loaded, SaveOutcome, SessionEvent, CHAT_FAILED};

mod error;
pub use error::Error;

mod poller;
pub use poller::ConversationPoller;

mod session;
pub use session::{AuthContext, FileTokenStore, MemoryTokenStore, TokenStore};

mod tests;
