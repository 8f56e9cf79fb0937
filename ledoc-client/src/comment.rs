use std::collections::HashSet;

use crate::api::{Comment, CommentId, DocumentId};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadState {
    /// No response received yet
    Loading,
    Failed(String),
    Ready,
}

/// What a comment list should currently display
#[derive(Debug, Eq, PartialEq)]
pub enum ThreadView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Comments(&'a [Comment]),
}

/// Comment list of one document.
///
/// The list keeps the backend's order, and `ids` holds every id present in the
/// tree (replies included) so that merging a pushed comment is a set union.
#[derive(Clone, Debug)]
pub struct CommentThread {
    pub document: DocumentId,
    comments: Vec<Comment>,
    ids: HashSet<CommentId>,
    state: LoadState,
    highlighted: Option<CommentId>,
}

fn collect_ids(comments: &[Comment], ids: &mut HashSet<CommentId>) {
    for c in comments {
        ids.insert(c.id.clone());
        collect_ids(&c.replies, ids);
    }
}

impl CommentThread {
    pub fn new(document: DocumentId) -> CommentThread {
        CommentThread {
            document,
            comments: Vec::new(),
            ids: HashSet::new(),
            state: LoadState::Loading,
            highlighted: None,
        }
    }

    /// Replaces the whole list with a freshly fetched one
    pub fn set_fetched(&mut self, fetched: Vec<Comment>) {
        self.comments = Vec::with_capacity(fetched.len());
        self.ids.clear();
        for c in fetched {
            // the backend is not expected to send duplicates, but the
            // invariant that ids are unique must hold regardless
            self.merge(c);
        }
        self.state = LoadState::Ready;
    }

    pub fn set_fetch_failed(&mut self, message: String) {
        self.state = LoadState::Failed(message);
    }

    /// Appends a comment unless one with the same id is already known.
    /// Returns whether the comment was added.
    pub fn merge(&mut self, comment: Comment) -> bool {
        if self.ids.contains(&comment.id) {
            tracing::debug!(id = %comment.id, "comment already known, not adding duplicate");
            return false;
        }
        collect_ids(std::slice::from_ref(&comment), &mut self.ids);
        self.comments.push(comment);
        true
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.ids.contains(id)
    }

    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        Comment::find_in(&self.comments, id)
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Number of comments in the whole tree
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn view(&self) -> ThreadView<'_> {
        match &self.state {
            LoadState::Loading => ThreadView::Loading,
            LoadState::Failed(msg) => ThreadView::Error(msg),
            LoadState::Ready if self.comments.is_empty() => ThreadView::Empty,
            LoadState::Ready => ThreadView::Comments(&self.comments),
        }
    }

    pub fn highlight(&mut self, id: CommentId) {
        self.highlighted = Some(id);
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    pub fn highlighted(&self) -> Option<&CommentId> {
        self.highlighted.as_ref()
    }

    pub fn is_highlighted(&self, id: &CommentId) -> bool {
        self.highlighted.as_ref() == Some(id)
    }
}
