use futures::{pin_mut, select, FutureExt};
use ledoc_api::{
    ChatMessage, ChatRequest, Comment, ConversationUpdate, DocumentId, FeedMessage,
    NewConversation, PermissionLevel, ShareLinkRequest, SharePermissions, ShareWithUser,
    SharedUser,
};
use ledoc_client::{DeleteCheck, DocumentState, Selection, VersionHistory};

use crate::{
    channel::{self, Channel, ChannelEvent, ReadyState},
    ApiClient, ClientConfig, Debouncer, Error,
};

pub const CHAT_FAILED: &str = "Error: Could not get a response from the AI.";

/// Which version `reload` put in the editor
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Loaded {
    Version(i64),

    /// The requested version does not exist, the latest one was loaded
    Fallback { requested: i64, latest: i64 },

    /// The document has no version
    Empty,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaveOutcome {
    Created(DocumentId),
    Updated,
    NoChanges,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Deletion {
    Deleted,

    /// The only version was deleted, and the document with it
    DocumentDeleted,
    Cancelled,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    Connected,
    Disconnected,

    /// Someone else's edit replaced the content
    RemoteEdit,

    NewComment(Comment),
    Autosaved(SaveOutcome),
    AutosaveFailed(String),
}

/// One open document: its content, title, assistant transcript, versions
/// and sharing state, kept in sync with the backend and with the other
/// editors of the document.
pub struct DocumentSession {
    config: ClientConfig,
    api: ApiClient,
    id: Option<DocumentId>,
    title: String,
    messages: Vec<ChatMessage>,
    document: DocumentState,
    history: VersionHistory,
    current_version: Option<i64>,
    shared_with: Vec<SharedUser>,
    share_permissions: Option<SharePermissions>,
    channel: Option<Channel>,
    closed: bool,
    autosave: Debouncer,
}

impl DocumentSession {
    /// A new document, that exists only locally until saved
    pub fn create(config: ClientConfig, api: ApiClient) -> DocumentSession {
        DocumentSession {
            autosave: Debouncer::new(config.autosave_delay),
            config,
            api,
            id: None,
            title: String::new(),
            messages: Vec::new(),
            document: DocumentState::default(),
            history: VersionHistory::default(),
            current_version: None,
            shared_with: Vec::new(),
            share_permissions: None,
            channel: None,
            closed: false,
        }
    }

    /// Loads document `id` at `version` (the latest if `None`) and connects
    /// to its socket
    pub async fn open(
        config: ClientConfig,
        api: ApiClient,
        id: DocumentId,
        version: Option<i64>,
    ) -> Result<(DocumentSession, Loaded), Error> {
        let mut this = DocumentSession::create(config, api);
        this.id = Some(id);
        let loaded = this.reload(version).await?;
        this.connect();
        Ok((this, loaded))
    }

    /// Takes on the id the backend just gave this document
    fn adopt(&mut self, id: DocumentId) {
        self.id = Some(id);
        self.closed = false;
        self.connect();
    }

    fn connect(&mut self) {
        if let Some(id) = &self.id {
            let url = self.api.endpoint().socket_url(id, self.api.token().as_ref());
            self.channel = Some(Channel::connect(url, self.config.offline_edits));
        }
    }

    fn require_id(&self) -> Result<DocumentId, Error> {
        self.id.clone().ok_or_else(|| {
            Error::Api(ledoc_api::Error::InvalidRequest(String::from(
                "Please save the document first",
            )))
        })
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        self.document.content()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn versions(&self) -> &VersionHistory {
        &self.history
    }

    pub fn current_version(&self) -> Option<i64> {
        self.current_version
    }

    pub fn shared_with(&self) -> &[SharedUser] {
        &self.shared_with
    }

    pub fn share_permissions(&self) -> Option<&SharePermissions> {
        self.share_permissions.as_ref()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.channel
            .as_ref()
            .map(Channel::ready_state)
            .unwrap_or(ReadyState::Closed)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_armed()
    }

    /// Re-fetches the record and loads `version` (the latest if `None`)
    /// without broadcasting it. Unsaved local changes are lost.
    pub async fn reload(&mut self, version: Option<i64>) -> Result<Loaded, Error> {
        let id = self.require_id()?;
        let c = self.api.fetch_conversation(&id).await?;
        self.title = c.title;
        self.messages = c.messages;
        self.shared_with = c.shared_with_users;
        self.share_permissions = c.share_permissions;
        self.history = VersionHistory::new(c.document_versions);
        let (loaded, content) = match self.history.select(version) {
            Selection::Found(v) => (Loaded::Version(v.version_number), v.content.clone()),
            Selection::Fallback { requested, latest } => {
                tracing::warn!(%id, requested, "version not found, loading the latest one");
                (
                    Loaded::Fallback {
                        requested,
                        latest: latest.version_number,
                    },
                    latest.content.clone(),
                )
            }
            Selection::Empty => (Loaded::Empty, String::new()),
        };
        self.current_version = match loaded {
            Loaded::Version(n) | Loaded::Fallback { latest: n, .. } => Some(n),
            Loaded::Empty => None,
        };
        self.document.reload(content);
        self.autosave.cancel();
        Ok(loaded)
    }

    /// Local edit: mirrored to the other editors and re-arms the autosave.
    /// Returns whether the change was sent to the socket.
    pub fn edit(&mut self, content: String) -> bool {
        let Some(FeedMessage::DocumentContentChange { content }) = self.document.edit(content)
        else {
            return false;
        };
        if self.id.is_some() && !self.closed {
            self.autosave.touch();
        }
        match &self.channel {
            Some(c) => c.send_content(content),
            None => false,
        }
    }

    /// Re-fetches the record and displays version `n`, without broadcasting.
    /// The version becomes the saved baseline, and a pending autosave of
    /// earlier edits is dropped.
    pub async fn select_version(&mut self, n: i64) -> Result<(), Error> {
        let id = self.require_id()?;
        let c = self.api.fetch_conversation(&id).await?;
        self.history = VersionHistory::new(c.document_versions);
        let content = self
            .history
            .get(n)
            .map(|v| v.content.clone())
            .ok_or_else(|| ledoc_api::Error::NotFound(format!("version {n} of {id}")))?;
        self.autosave.cancel();
        self.document.reload(content);
        self.current_version = Some(n);
        tracing::info!(%id, version = n, "loaded version");
        Ok(())
    }

    /// Deletes version `n`. If it is the only version, the whole document
    /// goes with it, and `confirm` is asked first.
    pub async fn delete_version(
        &mut self,
        n: i64,
        confirm: impl FnOnce() -> bool,
    ) -> Result<Deletion, Error> {
        let id = self.require_id()?;
        let c = self.api.fetch_conversation(&id).await?;
        self.history = VersionHistory::new(c.document_versions);
        let deletes_document = self.history.delete_check(n) == DeleteCheck::ConfirmDeletesDocument;
        if deletes_document && !confirm() {
            tracing::info!(%id, version = n, "deletion cancelled");
            return Ok(Deletion::Cancelled);
        }
        self.api.delete_version(&id, n).await?;
        if deletes_document {
            tracing::info!(%id, "document deleted along with its last version");
            self.close();
            self.id = None;
            self.history = VersionHistory::default();
            self.current_version = None;
            return Ok(Deletion::DocumentDeleted);
        }
        let keep = self.current_version.filter(|v| *v != n);
        self.reload(keep).await?;
        Ok(Deletion::Deleted)
    }

    /// Creates the document, or saves the current content as a new version
    pub async fn save(&mut self) -> Result<SaveOutcome, Error> {
        ledoc_api::validate_title(&self.title)?;
        self.autosave.cancel();
        let content = String::from(self.document.content());
        let outcome = match self.id.clone() {
            Some(_) if !self.document.is_dirty() => return Ok(SaveOutcome::NoChanges),
            Some(id) => {
                let update = ConversationUpdate {
                    title: Some(self.title.clone()),
                    messages: Some(self.messages.clone()),
                    new_document_content: Some(content.clone()),
                };
                self.api.update_conversation(&id, &update).await?;
                tracing::info!(%id, "saved new version");
                SaveOutcome::Updated
            }
            None => {
                let c = self
                    .api
                    .create_conversation(&NewConversation {
                        title: self.title.clone(),
                        messages: self.messages.clone(),
                        initial_document_content: content.clone(),
                    })
                    .await?;
                tracing::info!(id = %c.id, "created document");
                self.adopt(c.id.clone());
                SaveOutcome::Created(c.id)
            }
        };
        self.reload(None).await?;
        self.document.mark_saved(content);
        Ok(outcome)
    }

    /// Returns whether the title changed
    pub async fn rename(&mut self, title: String) -> Result<bool, Error> {
        ledoc_api::validate_title(&title)?;
        if title == self.title {
            return Ok(false);
        }
        if let Some(id) = &self.id {
            self.api
                .update_conversation(id, &ConversationUpdate::rename(title.clone()))
                .await?;
        }
        self.title = title;
        Ok(true)
    }

    /// Asks the assistant, and applies its rewrite of the document as a local
    /// edit. Blank messages are ignored. Returns the assistant's answer.
    pub async fn send_chat(&mut self, message: String) -> Result<Option<String>, Error> {
        if ledoc_api::validate_message(&message).is_err() {
            return Ok(None);
        }
        self.messages.push(ChatMessage::user(message.clone()));
        let req = ChatRequest {
            message,
            document_content: String::from(self.document.content()),
        };
        let reply = match self.api.chat(self.id.as_ref(), &req).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(?err, "assistant request failed");
                self.messages.push(ChatMessage::bot(String::from(CHAT_FAILED)));
                return Err(err);
            }
        };
        let created = match (self.id.is_none(), reply.conversation_id) {
            (true, Some(id)) => {
                tracing::info!(%id, "assistant created the document");
                self.adopt(id);
                true
            }
            _ => false,
        };
        self.messages.push(ChatMessage::bot(reply.response.clone()));
        let content = reply.updated_document_content;
        self.edit(content.clone());
        if created {
            // the backend stored the rewrite as the first version
            self.document.mark_saved(content);
            self.autosave.cancel();
            if let Err(err) = self.refresh_record().await {
                tracing::warn!(?err, "failed fetching the new document's record");
            }
        }
        Ok(Some(reply.response))
    }

    /// Re-fetches title, versions and sharing, leaving the content and the
    /// transcript alone
    async fn refresh_record(&mut self) -> Result<(), Error> {
        let id = self.require_id()?;
        let c = self.api.fetch_conversation(&id).await?;
        self.title = c.title;
        self.shared_with = c.shared_with_users;
        self.share_permissions = c.share_permissions;
        self.history = VersionHistory::new(c.document_versions);
        self.current_version = self.history.latest().map(|v| v.version_number);
        Ok(())
    }

    /// Makes the document reachable by link, returns the absolute URL
    pub async fn share_link(&self, level: PermissionLevel) -> Result<String, Error> {
        let req = ShareLinkRequest {
            document_id: self.require_id()?,
            permission_level: level,
        };
        self.api.generate_share_link(&req).await
    }

    /// Grants `level` to `username`, or revokes their access if `None`
    pub async fn share_with_user(
        &mut self,
        username: String,
        level: Option<PermissionLevel>,
    ) -> Result<(), Error> {
        let req = ShareWithUser {
            username,
            permission_level: level,
        };
        req.validate()?;
        let id = self.require_id()?;
        self.api.share_with_user(&id, &req).await?;
        let c = self.api.fetch_conversation(&id).await?;
        self.shared_with = c.shared_with_users;
        self.share_permissions = c.share_permissions;
        Ok(())
    }

    /// Waits for the next socket message or autosave, and applies it. Returns
    /// `None` once the socket is gone and no autosave is pending.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if self.channel.is_none() && !self.autosave.is_armed() {
                return None;
            }
            let event = {
                let chan = channel::next_event_of(self.channel.as_mut()).fuse();
                let timer = self.autosave.fired().fuse();
                pin_mut!(chan, timer);
                select! {
                    e = chan => Some(e),
                    _ = timer => None,
                }
            };
            match event {
                None => {
                    if !self.document.is_dirty() {
                        continue;
                    }
                    return Some(match self.save().await {
                        Ok(outcome) => SessionEvent::Autosaved(outcome),
                        Err(err) => {
                            tracing::warn!(?err, "autosave failed");
                            SessionEvent::AutosaveFailed(err.to_string())
                        }
                    });
                }
                Some(None) => self.channel = None,
                Some(Some(ChannelEvent::Opened)) => return Some(SessionEvent::Connected),
                Some(Some(ChannelEvent::Closed)) => return Some(SessionEvent::Disconnected),
                Some(Some(ChannelEvent::ContentChange(content))) => {
                    if self.document.replace(content) {
                        return Some(SessionEvent::RemoteEdit);
                    }
                }
                Some(Some(ChannelEvent::NewComment(c))) => {
                    return Some(SessionEvent::NewComment(c))
                }
            }
        }
    }

    /// Closes the socket and drops the pending autosave; only the first call
    /// does anything
    pub fn close(&mut self) -> bool {
        self.closed = true;
        self.autosave.cancel();
        self.channel.as_mut().map(Channel::close).unwrap_or(false)
    }
}
