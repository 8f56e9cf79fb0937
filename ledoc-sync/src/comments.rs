use futures::{pin_mut, select, FutureExt};
use ledoc_api::{Comment, CommentId, DocumentId, NewComment};
use ledoc_client::{CommentThread, ThreadView};

use crate::{
    channel::{self, Channel, ChannelEvent, ReadyState},
    ApiClient, ClientConfig, Debouncer, Error, OfflineEdits,
};

pub const LOAD_FAILED: &str = "Failed to load comments.";
pub const POST_FAILED: &str = "Failed to post comment. Please try again.";

/// Input box for a new comment, or for a reply to `parent`
#[derive(Clone, Debug)]
pub struct CommentForm {
    document: DocumentId,
    parent: Option<CommentId>,
    input: String,
    error: Option<&'static str>,
}

impl CommentForm {
    pub fn new(document: DocumentId) -> CommentForm {
        CommentForm {
            document,
            parent: None,
            input: String::new(),
            error: None,
        }
    }

    pub fn reply(document: DocumentId, parent: CommentId) -> CommentForm {
        CommentForm {
            parent: Some(parent),
            ..CommentForm::new(document)
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn error(&self) -> Option<&str> {
        self.error
    }

    /// Posts the input. Blank input does nothing and returns `Ok(None)`; the
    /// input is cleared only once the backend accepted the comment.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Option<Comment>, Error> {
        let comment = NewComment {
            document_id: self.document.clone(),
            content: self.input.clone(),
            parent_comment: self.parent.clone(),
        };
        if comment.validate().is_err() {
            return Ok(None);
        }
        match api.post_comment(&comment).await {
            Ok(c) => {
                self.input.clear();
                self.error = None;
                Ok(Some(c))
            }
            Err(err) => {
                tracing::warn!(?err, document = %self.document, "failed posting comment");
                self.error = Some(POST_FAILED);
                Err(err)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommentEvent {
    Connected,
    Disconnected,

    /// A pushed comment was added to the thread
    Added(CommentId),

    /// A pushed comment was already known
    Duplicate(CommentId),

    HighlightCleared,
}

/// Live comment thread of one document
pub struct CommentView {
    api: ApiClient,
    thread: CommentThread,
    form: CommentForm,
    channel: Option<Channel>,
    highlight: Debouncer,
}

impl CommentView {
    /// Connects to the document's socket, highlights `highlight` if set, and
    /// fetches the thread
    pub async fn open(
        config: &ClientConfig,
        api: ApiClient,
        document: DocumentId,
        highlight: Option<CommentId>,
    ) -> CommentView {
        let url = api.endpoint().socket_url(&document, api.token().as_ref());
        let mut this = CommentView {
            channel: Some(Channel::connect(url, OfflineEdits::Drop)),
            thread: CommentThread::new(document.clone()),
            form: CommentForm::new(document),
            highlight: Debouncer::new(config.highlight_duration),
            api,
        };
        if let Some(id) = highlight {
            this.highlight(id);
        }
        // failures are reflected in the thread's state
        let _ = this.refresh().await;
        this
    }

    pub fn document(&self) -> &DocumentId {
        &self.thread.document
    }

    pub fn thread(&self) -> &CommentThread {
        &self.thread
    }

    pub fn view(&self) -> ThreadView<'_> {
        self.thread.view()
    }

    pub fn form(&mut self) -> &mut CommentForm {
        &mut self.form
    }

    pub fn ready_state(&self) -> ReadyState {
        self.channel
            .as_ref()
            .map(Channel::ready_state)
            .unwrap_or(ReadyState::Closed)
    }

    /// Re-fetches the whole thread
    pub async fn refresh(&mut self) -> Result<(), Error> {
        match self.api.list_comments(&self.thread.document).await {
            Ok(comments) => {
                self.thread.set_fetched(comments);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(?err, document = %self.thread.document, "failed fetching comments");
                self.thread.set_fetch_failed(String::from(LOAD_FAILED));
                Err(err)
            }
        }
    }

    /// Submits the view's own form, then refreshes the thread on success
    pub async fn submit(&mut self) -> Result<Option<Comment>, Error> {
        let posted = self.form.submit(&self.api).await?;
        if posted.is_some() {
            let _ = self.refresh().await;
        }
        Ok(posted)
    }

    /// Submits a reply form, then refreshes the thread on success
    pub async fn submit_reply(&mut self, form: &mut CommentForm) -> Result<Option<Comment>, Error> {
        let posted = form.submit(&self.api).await?;
        if posted.is_some() {
            let _ = self.refresh().await;
        }
        Ok(posted)
    }

    pub fn highlight(&mut self, id: CommentId) {
        self.thread.highlight(id);
        self.highlight.touch();
    }

    /// Waits for the next thing that changes the view. Returns `None` once the
    /// socket is gone and nothing is pending anymore.
    pub async fn next_event(&mut self) -> Option<CommentEvent> {
        loop {
            if self.channel.is_none() && !self.highlight.is_armed() {
                return None;
            }
            let event = {
                let chan = channel::next_event_of(self.channel.as_mut()).fuse();
                let timer = self.highlight.fired().fuse();
                pin_mut!(chan, timer);
                select! {
                    e = chan => Some(e),
                    _ = timer => None,
                }
            };
            match event {
                None => {
                    self.thread.clear_highlight();
                    return Some(CommentEvent::HighlightCleared);
                }
                Some(None) => self.channel = None,
                Some(Some(ChannelEvent::Opened)) => return Some(CommentEvent::Connected),
                Some(Some(ChannelEvent::Closed)) => return Some(CommentEvent::Disconnected),
                Some(Some(ChannelEvent::ContentChange(_))) => (),
                Some(Some(ChannelEvent::NewComment(c))) => {
                    let id = c.id.clone();
                    return Some(match self.thread.merge(c) {
                        true => CommentEvent::Added(id),
                        false => CommentEvent::Duplicate(id),
                    });
                }
            }
        }
    }

    /// Closes the socket; only the first call does anything
    pub fn close(&mut self) -> bool {
        self.highlight.cancel();
        self.channel.as_mut().map(Channel::close).unwrap_or(false)
    }
}
