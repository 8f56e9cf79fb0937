use ledoc_api::{AnalysisId, AnalysisSession, ChatMessage};

use crate::{ApiClient, Error};

pub const GREETING: &str = "Hi! I've analyzed your document. Feel free to ask me any questions \
                            about the terms, risks, or anything else you'd like to understand \
                            better.";
pub const UPLOADED_WITHOUT_SUMMARY: &str =
    "Document uploaded successfully. Ask a question to start the analysis.";
pub const NO_SUMMARY: &str = "No summary available";
pub const UPLOAD_FAILED: &str = "Failed to upload document";
pub const SEND_FAILED: &str = "Failed to send message";
pub const SESSION_LOAD_FAILED: &str = "Failed to load session";

/// What the backend said went wrong, or `fallback` when it said nothing
fn notice(err: &Error, fallback: &str) -> String {
    match err {
        Error::Api(e) => e.to_string(),
        _ => String::from(fallback),
    }
}

/// Question-and-answer over one uploaded document, plus the list of past
/// analysis sessions.
///
/// Failures never lose the current session: they are returned, and kept
/// as `error()` until the next action.
pub struct Analyzer {
    api: ApiClient,
    id: Option<AnalysisId>,
    file_name: Option<String>,
    summary: String,
    history: Vec<ChatMessage>,
    sessions: Vec<AnalysisSession>,
    error: Option<String>,
}

impl Analyzer {
    pub fn new(api: ApiClient) -> Analyzer {
        Analyzer {
            api,
            id: None,
            file_name: None,
            summary: String::new(),
            history: Vec::new(),
            sessions: Vec::new(),
            error: None,
        }
    }

    pub fn id(&self) -> Option<&AnalysisId> {
        self.id.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn sessions(&self) -> &[AnalysisSession] {
        &self.sessions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Back to the upload step
    pub fn reset(&mut self) {
        self.id = None;
        self.file_name = None;
        self.summary.clear();
        self.history.clear();
        self.error = None;
    }

    /// Re-fetches the session list. On failure the previous list is kept.
    pub async fn refresh_sessions(&mut self) -> Result<(), Error> {
        match self.api.list_analyses().await {
            Ok(sessions) => {
                self.sessions = sessions;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(?err, "failed fetching analysis sessions");
                Err(err)
            }
        }
    }

    /// Uploads a document and starts a session on it. A backend that does
    /// not hand out a session id gets a local one.
    pub async fn upload(&mut self, file_name: &str, data: Vec<u8>) -> Result<(), Error> {
        self.reset();
        self.file_name = Some(String::from(file_name));
        let reply = match self.api.upload_document(file_name, data).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(?err, file_name, "upload failed");
                self.error = Some(notice(&err, UPLOAD_FAILED));
                self.file_name = None;
                return Err(err);
            }
        };
        let id = reply.session_id.unwrap_or_else(|| {
            AnalysisId(format!("local-{}", chrono::Utc::now().timestamp_millis()))
        });
        tracing::info!(%id, file_name, "document analyzed");
        self.id = Some(id);
        match reply.summary.filter(|s| !s.is_empty()) {
            Some(summary) => {
                self.summary = summary;
                self.history.push(ChatMessage::bot(String::from(GREETING)));
            }
            None => {
                self.summary = reply
                    .summary_preview
                    .unwrap_or_else(|| String::from(NO_SUMMARY));
                self.history
                    .push(ChatMessage::bot(String::from(UPLOADED_WITHOUT_SUMMARY)));
            }
        }
        Ok(())
    }

    /// Asks about the current document. Blank messages, or no open session,
    /// are ignored. On failure the question is taken back out of the history.
    pub async fn send(&mut self, message: &str) -> Result<Option<String>, Error> {
        let message = message.trim();
        let Some(id) = self.id.clone() else {
            return Ok(None);
        };
        if message.is_empty() {
            return Ok(None);
        }
        self.error = None;
        self.history.push(ChatMessage::user(String::from(message)));
        match self.api.ask_analysis(&id, message).await {
            Ok(answer) => {
                if !answer.response.is_empty() {
                    self.history.push(ChatMessage::bot(answer.response.clone()));
                }
                Ok(Some(answer.response))
            }
            Err(err) => {
                tracing::warn!(?err, %id, "analysis question failed");
                self.history.pop();
                self.error = Some(notice(&err, SEND_FAILED));
                Err(err)
            }
        }
    }

    /// Switches to a past session and loads what was said in it
    pub async fn open_session(&mut self, id: AnalysisId) -> Result<(), Error> {
        self.error = None;
        self.id = Some(id.clone());
        self.file_name = None;
        let h = match self.api.analysis_history(&id).await {
            Ok(h) => h,
            Err(err) => {
                tracing::warn!(?err, %id, "failed loading analysis session");
                self.error = Some(notice(&err, SESSION_LOAD_FAILED));
                return Err(err);
            }
        };
        self.history = h
            .messages
            .into_iter()
            .map(|m| match m.is_user() {
                true => ChatMessage::user(m.text),
                false => ChatMessage::bot(m.text),
            })
            .collect();
        let listed = self.sessions.iter().find(|s| s.id == id);
        let summary = h
            .session
            .and_then(|s| s.summary)
            .or_else(|| listed.and_then(|s| s.summary_preview.clone()))
            .unwrap_or_default();
        if !summary.is_empty() {
            self.summary = summary;
        }
        self.file_name = listed.and_then(|s| s.title.clone());
        Ok(())
    }
}
