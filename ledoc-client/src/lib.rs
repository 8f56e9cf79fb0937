mod comment;
pub use comment::{CommentThread, LoadState, ThreadView};

mod document;
pub use document::DocumentState;

mod endpoint;
pub use endpoint::{Endpoint, DEFAULT_WS_PORT};

mod versions;
pub use versions::{DeleteCheck, Selection, VersionHistory};

pub mod api {
    pub use ledoc_api::*;
}
