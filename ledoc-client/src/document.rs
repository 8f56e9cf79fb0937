use crate::api::FeedMessage;

/// Local copy of a document's content.
///
/// Content changes come from two paths. `edit` is a change made here and
/// yields the message to broadcast. `replace` is a change someone else made
/// (a socket push, a version being loaded) and must never be broadcast back.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DocumentState {
    content: String,

    /// Content as of the last successful save or fetch
    saved: String,
}

impl DocumentState {
    /// State right after fetching `content` from the backend
    pub fn loaded(content: String) -> DocumentState {
        DocumentState {
            saved: content.clone(),
            content,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.content != self.saved
    }

    /// Applies a local edit. Returns the message to send to peers, or `None`
    /// if the content did not actually change.
    pub fn edit(&mut self, content: String) -> Option<FeedMessage> {
        if content == self.content {
            return None;
        }
        self.content = content.clone();
        Some(FeedMessage::DocumentContentChange { content })
    }

    /// Replaces the content without producing anything to broadcast.
    /// Returns whether the content changed.
    pub fn replace(&mut self, content: String) -> bool {
        if content == self.content {
            return false;
        }
        self.content = content;
        true
    }

    /// Replaces both the content and the saved baseline, as after a fetch
    pub fn reload(&mut self, content: String) {
        self.saved = content.clone();
        self.content = content;
    }

    pub fn mark_saved(&mut self, content: String) {
        self.saved = content;
    }
}
