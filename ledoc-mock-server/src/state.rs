use std::collections::{btree_map, BTreeMap};

use chrono::Utc;
use ledoc_api::{
    AnalysisAnswer, AnalysisHistory, AnalysisId, AnalysisInfo, AnalysisMessage, AnalysisSession,
    AuthToken, ChatConversation, ChatMessage, ChatParticipant, ChatReply, ChatRequest, Comment,
    CommentId, Conversation, ConversationUpdate, DocumentId, DocumentVersion, Error, LastMessage,
    NewComment, NewConversation, PermissionLevel, ShareLink, ShareLinkRequest, SharePermissions,
    ShareWithUser, SharedUser, Time, UploadReply,
};
use uuid::Uuid;

/// In-memory stand-in for the document backend
pub struct MockServer {
    users: BTreeMap<String, DbUser>,
    documents: BTreeMap<DocumentId, DbDocument>,
    chats: Vec<ChatConversation>,
    analyses: BTreeMap<AnalysisId, DbAnalysis>,
    next_user_id: i64,
    next_comment_id: i64,
}

#[derive(Debug)]
struct DbUser {
    id: i64,
    sessions: Vec<AuthToken>,
}

#[derive(Debug)]
struct DbDocument {
    owner: String,
    title: String,
    messages: Vec<ChatMessage>,
    versions: Vec<DocumentVersion>,
    comments: Vec<Comment>,
    shared: BTreeMap<String, PermissionLevel>,
    public: Option<PermissionLevel>,
}

#[derive(Debug)]
struct DbAnalysis {
    owner: String,
    file_name: String,
    summary: String,
    created_at: Time,
    messages: Vec<AnalysisMessage>,
}

impl DbDocument {
    fn to_conversation(&self, id: &DocumentId) -> Conversation {
        Conversation {
            id: id.clone(),
            title: self.title.clone(),
            messages: self.messages.clone(),
            document_versions: self.versions.clone(),
            shared_with_users: self
                .shared
                .iter()
                .map(|(username, permission_level)| SharedUser {
                    username: username.clone(),
                    permission_level: *permission_level,
                })
                .collect(),
            share_permissions: self.public.map(|permission_level| SharePermissions {
                permission_level,
            }),
        }
    }

    fn permission(&self, user: &str) -> Option<PermissionLevel> {
        match self.owner == user {
            true => Some(PermissionLevel::Edit),
            false => self.shared.get(user).copied(),
        }
    }

    fn push_version(&mut self, content: String) {
        let version_number = self.versions.last().map(|v| v.version_number + 1).unwrap_or(0);
        self.versions.push(DocumentVersion {
            version_number,
            content,
            created_at: Some(Utc::now()),
        });
    }
}

// Gives the reply back if its parent is not in the tree
fn insert_reply(
    comments: &mut [Comment],
    parent: &CommentId,
    mut reply: Comment,
) -> Result<(), Comment> {
    for c in comments.iter_mut() {
        if c.id == *parent {
            c.replies.push(reply);
            return Ok(());
        }
        match insert_reply(&mut c.replies, parent, reply) {
            Ok(()) => return Ok(()),
            Err(r) => reply = r,
        }
    }
    Err(reply)
}

fn assistant_reply(message: &str) -> String {
    format!("Added a clause covering: {message}")
}

/// First sentence of the document, at most 200 characters of it
fn summarize(file_name: &str, text: &str) -> String {
    let text = text.trim();
    let end = text.find(['.', '\n']).map(|i| i + 1).unwrap_or(text.len());
    let first: String = text[..end].trim().chars().take(200).collect();
    format!("{file_name}: {first}")
}

fn analysis_message(sender: &str, text: String) -> AnalysisMessage {
    AnalysisMessage {
        sender: String::from(sender),
        text,
        timestamp: Some(Utc::now()),
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            documents: BTreeMap::new(),
            chats: Vec::new(),
            analyses: BTreeMap::new(),
            next_user_id: 1,
            next_comment_id: 1,
        }
    }

    /// Creates a user and returns a session token for them
    pub fn admin_create_user(&mut self, name: &str) -> Result<AuthToken, Error> {
        ledoc_api::validate_username(name)?;
        match self.users.entry(String::from(name)) {
            btree_map::Entry::Occupied(_) => Err(Error::InvalidRequest(format!(
                "user {name} already exists"
            ))),
            btree_map::Entry::Vacant(entry) => {
                let tok = AuthToken(Uuid::new_v4().simple().to_string());
                entry.insert(DbUser {
                    id: self.next_user_id,
                    sessions: vec![tok.clone()],
                });
                self.next_user_id += 1;
                Ok(tok)
            }
        }
    }

    pub fn admin_user_id(&self, name: &str) -> Option<i64> {
        self.users.get(name).map(|u| u.id)
    }

    pub fn admin_add_chat(
        &mut self,
        client: &str,
        lawyer: &str,
        last: Option<&str>,
    ) -> Result<i64, Error> {
        let participant = |name: &str| {
            self.users
                .get(name)
                .map(|u| ChatParticipant {
                    id: u.id,
                    username: String::from(name),
                })
                .ok_or_else(|| Error::NotFound(format!("user {name}")))
        };
        let client = participant(client)?;
        let lawyer = participant(lawyer)?;
        let id = self.chats.len() as i64 + 1;
        self.chats.push(ChatConversation {
            id,
            client: Some(client),
            lawyer: Some(lawyer),
            last_message: last.map(|l| LastMessage {
                content: String::from(l),
                created_at: Some(Utc::now()),
            }),
            unread_count: 0,
        });
        Ok(id)
    }

    /// Number of comments in the whole tree of `doc`, for tests
    pub fn test_num_comments(&self, doc: &DocumentId) -> usize {
        self.documents
            .get(doc)
            .map(|d| d.comments.iter().map(Comment::count).sum())
            .unwrap_or(0)
    }

    pub fn test_has_document(&self, doc: &DocumentId) -> bool {
        self.documents.contains_key(doc)
    }

    pub fn resolve(&self, tok: &AuthToken) -> Result<&str, Error> {
        for (name, u) in self.users.iter() {
            if u.sessions.contains(tok) {
                return Ok(name);
            }
        }
        Err(Error::PermissionDenied)
    }

    fn document(&self, tok: &AuthToken, doc: &DocumentId) -> Result<&DbDocument, Error> {
        let user = self.resolve(tok)?;
        let d = self
            .documents
            .get(doc)
            .ok_or_else(|| Error::NotFound(format!("document {doc}")))?;
        match d.permission(user) {
            Some(_) => Ok(d),
            None => Err(Error::PermissionDenied),
        }
    }

    fn document_mut(
        &mut self,
        tok: &AuthToken,
        doc: &DocumentId,
        needed: PermissionLevel,
    ) -> Result<&mut DbDocument, Error> {
        let user = String::from(self.resolve(tok)?);
        let d = self
            .documents
            .get_mut(doc)
            .ok_or_else(|| Error::NotFound(format!("document {doc}")))?;
        match (d.permission(&user), needed) {
            (Some(PermissionLevel::Edit), _)
            | (Some(PermissionLevel::View), PermissionLevel::View) => Ok(d),
            _ => Err(Error::PermissionDenied),
        }
    }

    pub fn list_comments(&self, tok: &AuthToken, doc: &DocumentId) -> Result<Vec<Comment>, Error> {
        Ok(self.document(tok, doc)?.comments.clone())
    }

    /// Viewers may comment too
    pub fn post_comment(
        &mut self,
        tok: &AuthToken,
        doc: &DocumentId,
        c: NewComment,
    ) -> Result<Comment, Error> {
        c.validate()?;
        let user = String::from(self.resolve(tok)?);
        let id = CommentId::Int(self.next_comment_id);
        let d = self.document_mut(tok, doc, PermissionLevel::View)?;
        let comment = Comment {
            id,
            user,
            content: c.content,
            created_at: Some(Utc::now()),
            replies: Vec::new(),
        };
        match &c.parent_comment {
            None => d.comments.push(comment.clone()),
            Some(parent) => {
                if insert_reply(&mut d.comments, parent, comment.clone()).is_err() {
                    return Err(Error::NotFound(format!("comment {parent}")));
                }
            }
        }
        self.next_comment_id += 1;
        Ok(comment)
    }

    pub fn fetch_conversation(
        &self,
        tok: &AuthToken,
        doc: &DocumentId,
    ) -> Result<Conversation, Error> {
        Ok(self.document(tok, doc)?.to_conversation(doc))
    }

    pub fn create_conversation(
        &mut self,
        tok: &AuthToken,
        c: NewConversation,
    ) -> Result<Conversation, Error> {
        ledoc_api::validate_title(&c.title)?;
        let owner = String::from(self.resolve(tok)?);
        let id = DocumentId(Uuid::new_v4().simple().to_string());
        let mut d = DbDocument {
            owner,
            title: c.title,
            messages: c.messages,
            versions: Vec::new(),
            comments: Vec::new(),
            shared: BTreeMap::new(),
            public: None,
        };
        d.push_version(c.initial_document_content);
        let res = d.to_conversation(&id);
        self.documents.insert(id, d);
        Ok(res)
    }

    pub fn update_conversation(
        &mut self,
        tok: &AuthToken,
        doc: &DocumentId,
        u: ConversationUpdate,
    ) -> Result<Conversation, Error> {
        if let Some(title) = &u.title {
            ledoc_api::validate_title(title)?;
        }
        let d = self.document_mut(tok, doc, PermissionLevel::Edit)?;
        if let Some(title) = u.title {
            d.title = title;
        }
        if let Some(messages) = u.messages {
            d.messages = messages;
        }
        if let Some(content) = u.new_document_content {
            d.push_version(content);
        }
        Ok(d.to_conversation(doc))
    }

    /// Deleting the last remaining version deletes the document
    pub fn delete_version(
        &mut self,
        tok: &AuthToken,
        doc: &DocumentId,
        version_number: i64,
    ) -> Result<(), Error> {
        let d = self.document_mut(tok, doc, PermissionLevel::Edit)?;
        let idx = d
            .versions
            .iter()
            .position(|v| v.version_number == version_number)
            .ok_or_else(|| Error::NotFound(format!("version {version_number} of {doc}")))?;
        d.versions.remove(idx);
        if d.versions.is_empty() {
            tracing::info!(%doc, "last version deleted, deleting document");
            self.documents.remove(doc);
        }
        Ok(())
    }

    pub fn chat(
        &mut self,
        tok: &AuthToken,
        doc: Option<&DocumentId>,
        req: ChatRequest,
    ) -> Result<ChatReply, Error> {
        ledoc_api::validate_message(&req.message)?;
        let response = assistant_reply(&req.message);
        let updated = match req.document_content.is_empty() {
            true => format!("<p>{}</p>", req.message),
            false => format!("{}<p>{}</p>", req.document_content, req.message),
        };
        let transcript = [
            ChatMessage::user(req.message.clone()),
            ChatMessage::bot(response.clone()),
        ];
        let conversation_id = match doc {
            Some(doc) => {
                let d = self.document_mut(tok, doc, PermissionLevel::Edit)?;
                d.messages.extend(transcript);
                None
            }
            None => {
                let c = self.create_conversation(
                    tok,
                    NewConversation {
                        title: String::from("Untitled document"),
                        messages: transcript.to_vec(),
                        initial_document_content: updated.clone(),
                    },
                )?;
                Some(c.id)
            }
        };
        Ok(ChatReply {
            response,
            updated_document_content: updated,
            conversation_id,
        })
    }

    pub fn generate_share_link(
        &mut self,
        tok: &AuthToken,
        req: ShareLinkRequest,
    ) -> Result<ShareLink, Error> {
        let d = self.document_mut(tok, &req.document_id, PermissionLevel::Edit)?;
        d.public = Some(req.permission_level);
        Ok(ShareLink {
            share_url: format!("/shared/{}/", req.document_id),
        })
    }

    pub fn share_with_user(
        &mut self,
        tok: &AuthToken,
        doc: &DocumentId,
        req: ShareWithUser,
    ) -> Result<(), Error> {
        req.validate()?;
        if !self.users.contains_key(&req.username) {
            return Err(Error::InvalidRequest(String::from("User not found")));
        }
        let d = self.document_mut(tok, doc, PermissionLevel::Edit)?;
        if d.owner == req.username {
            return Err(Error::InvalidRequest(String::from(
                "Cannot change the owner's access",
            )));
        }
        match req.permission_level {
            Some(p) => {
                d.shared.insert(req.username, p);
            }
            None => {
                d.shared.remove(&req.username);
            }
        }
        Ok(())
    }

    pub fn list_chat_conversations(
        &self,
        tok: &AuthToken,
    ) -> Result<Vec<ChatConversation>, Error> {
        let user = self.resolve(tok)?;
        let me = self.users.get(user).map(|u| u.id);
        let is_me = |p: &Option<ChatParticipant>| p.as_ref().map(|p| p.id) == me;
        Ok(self
            .chats
            .iter()
            .filter(|c| is_me(&c.client) || is_me(&c.lawyer))
            .cloned()
            .collect())
    }

    /// Whether `tok` may join the socket room of `doc`
    pub fn can_join(&self, tok: &AuthToken, doc: &DocumentId) -> bool {
        self.document(tok, doc).is_ok()
    }
}

impl MockServer {
    /// Summarizes an uploaded document and opens an analysis session on it
    pub fn analyze_document(
        &mut self,
        tok: &AuthToken,
        file_name: &str,
        data: &[u8],
    ) -> Result<UploadReply, Error> {
        let owner = String::from(self.resolve(tok)?);
        let text = String::from_utf8_lossy(data);
        if text.trim().is_empty() {
            return Err(Error::InvalidRequest(String::from("The uploaded file is empty")));
        }
        let summary = summarize(file_name, &text);
        let id = AnalysisId(Uuid::new_v4().simple().to_string());
        tracing::info!(%id, file_name, "analyzed document");
        self.analyses.insert(
            id.clone(),
            DbAnalysis {
                owner,
                file_name: String::from(file_name),
                summary: summary.clone(),
                created_at: Utc::now(),
                messages: Vec::new(),
            },
        );
        Ok(UploadReply {
            session_id: Some(id),
            summary: Some(summary),
            summary_preview: None,
        })
    }

    fn analysis(&mut self, tok: &AuthToken, id: &AnalysisId) -> Result<&mut DbAnalysis, Error> {
        let user = String::from(self.resolve(tok)?);
        let a = self
            .analyses
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("analysis session {id}")))?;
        match a.owner == user {
            true => Ok(a),
            false => Err(Error::PermissionDenied),
        }
    }

    /// Newest first
    pub fn list_analyses(&self, tok: &AuthToken) -> Result<Vec<AnalysisSession>, Error> {
        let user = self.resolve(tok)?;
        let mut res = self
            .analyses
            .iter()
            .filter(|(_, a)| a.owner == user)
            .map(|(id, a)| AnalysisSession {
                id: id.clone(),
                title: Some(a.file_name.clone()),
                summary_preview: Some(a.summary.chars().take(80).collect()),
                created_at: Some(a.created_at),
            })
            .collect::<Vec<_>>();
        res.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(res)
    }

    pub fn analysis_history(
        &mut self,
        tok: &AuthToken,
        id: &AnalysisId,
    ) -> Result<AnalysisHistory, Error> {
        let a = self.analysis(tok, id)?;
        Ok(AnalysisHistory {
            session: Some(AnalysisInfo {
                summary: Some(a.summary.clone()),
            }),
            messages: a.messages.clone(),
        })
    }

    pub fn ask_analysis(
        &mut self,
        tok: &AuthToken,
        id: &AnalysisId,
        message: &str,
    ) -> Result<AnalysisAnswer, Error> {
        ledoc_api::validate_message(message)?;
        let a = self.analysis(tok, id)?;
        let response = format!(
            "About \"{}\": {} says nothing more than its summary.",
            message.trim(),
            a.file_name
        );
        a.messages.push(analysis_message("user", String::from(message.trim())));
        a.messages.push(analysis_message("ai", response.clone()));
        Ok(AnalysisAnswer { response })
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}
