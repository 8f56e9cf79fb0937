use ledoc_api::{
    AnalysisAnswer, AnalysisHistory, AnalysisId, AnalysisQuestion, AnalysisSession,
    AnalysisSessions, AuthToken, ChatConversation, ChatReply, ChatRequest, Comment, Conversation,
    ConversationUpdate, DocumentId, NewComment, NewConversation, ShareLink, ShareLinkRequest,
    ShareWithUser, UploadReply,
};
use ledoc_client::Endpoint;
use reqwest::Method;

use crate::{session::SharedToken, AuthContext, Error};

/// Typed access to the backend's HTTP API, authenticated as whoever its
/// `AuthContext` is currently logged in as
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    endpoint: Endpoint,
    token: SharedToken,
}

impl ApiClient {
    pub fn new(endpoint: Endpoint, auth: &AuthContext) -> ApiClient {
        ApiClient {
            client: reqwest::Client::new(),
            endpoint,
            token: auth.shared_token(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token.read().clone()
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.request(method, self.endpoint.url(path));
        match self.token() {
            Some(tok) => req.bearer_auth(tok.as_str()),
            None => req,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await?;
        let err = ledoc_api::Error::parse(status, &body)?;
        tracing::debug!(%status, ?err, "backend returned an error");
        Err(Error::Api(err))
    }

    async fn fetch<R>(&self, req: reqwest::RequestBuilder) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        Ok(Self::check(req.send().await?).await?.json().await?)
    }

    async fn run(&self, req: reqwest::RequestBuilder) -> Result<(), Error> {
        Self::check(req.send().await?).await?;
        Ok(())
    }

    pub async fn list_comments(&self, doc: &DocumentId) -> Result<Vec<Comment>, Error> {
        self.fetch(self.request(Method::GET, &format!("/api/documents/{doc}/comments/")))
            .await
    }

    pub async fn post_comment(&self, comment: &NewComment) -> Result<Comment, Error> {
        comment.validate()?;
        let path = format!("/api/documents/{}/comments/", comment.document_id);
        self.fetch(self.request(Method::POST, &path).json(comment))
            .await
    }

    pub async fn fetch_conversation(&self, doc: &DocumentId) -> Result<Conversation, Error> {
        self.fetch(self.request(Method::GET, &format!("/api/documents/conversations/{doc}/")))
            .await
    }

    pub async fn create_conversation(&self, c: &NewConversation) -> Result<Conversation, Error> {
        ledoc_api::validate_title(&c.title)?;
        self.fetch(
            self.request(Method::POST, "/api/documents/conversations/")
                .json(c),
        )
        .await
    }

    pub async fn update_conversation(
        &self,
        doc: &DocumentId,
        u: &ConversationUpdate,
    ) -> Result<(), Error> {
        if let Some(title) = &u.title {
            ledoc_api::validate_title(title)?;
        }
        self.run(
            self.request(Method::PUT, &format!("/api/documents/conversations/{doc}/"))
                .json(u),
        )
        .await
    }

    pub async fn delete_version(&self, doc: &DocumentId, version_number: i64) -> Result<(), Error> {
        let path = format!("/api/documents/conversations/{doc}/versions/{version_number}/");
        self.run(self.request(Method::DELETE, &path)).await
    }

    /// Asks the assistant, in the context of `doc` or of a new document
    pub async fn chat(&self, doc: Option<&DocumentId>, req: &ChatRequest) -> Result<ChatReply, Error> {
        ledoc_api::validate_message(&req.message)?;
        let path = match doc {
            Some(doc) => format!("/api/documents/conversations/{doc}/chat/"),
            None => String::from("/api/documents/conversations/chat/"),
        };
        self.fetch(self.request(Method::POST, &path).json(req)).await
    }

    /// Returns the absolute share URL
    pub async fn generate_share_link(&self, req: &ShareLinkRequest) -> Result<String, Error> {
        let link: ShareLink = self
            .fetch(
                self.request(Method::POST, "/api/documents/generate-share-link/")
                    .json(req),
            )
            .await?;
        Ok(match link.share_url.starts_with('/') {
            true => self.endpoint.url(&link.share_url),
            false => link.share_url,
        })
    }

    pub async fn share_with_user(&self, doc: &DocumentId, req: &ShareWithUser) -> Result<(), Error> {
        req.validate()?;
        let path = format!("/api/documents/conversations/{doc}/share-with-user/");
        self.run(self.request(Method::POST, &path).json(req)).await
    }

    pub async fn list_chat_conversations(&self) -> Result<Vec<ChatConversation>, Error> {
        self.fetch(self.request(Method::GET, "/api/auth/chat/conversations/"))
            .await
    }

    /// Sends a document to be summarized, opening an analysis session
    pub async fn upload_document(&self, file_name: &str, data: Vec<u8>) -> Result<UploadReply, Error> {
        let part = reqwest::multipart::Part::bytes(data).file_name(String::from(file_name));
        let form = reqwest::multipart::Form::new().part("file", part);
        self.fetch(
            self.request(Method::POST, "/api/analyzer/upload/")
                .multipart(form),
        )
        .await
    }

    pub async fn list_analyses(&self) -> Result<Vec<AnalysisSession>, Error> {
        let sessions: AnalysisSessions = self
            .fetch(self.request(Method::GET, "/api/analyzer/sessions/"))
            .await?;
        Ok(sessions.into_vec())
    }

    pub async fn analysis_history(&self, id: &AnalysisId) -> Result<AnalysisHistory, Error> {
        self.fetch(self.request(Method::GET, &format!("/api/analyzer/sessions/{id}/")))
            .await
    }

    pub async fn ask_analysis(&self, id: &AnalysisId, message: &str) -> Result<AnalysisAnswer, Error> {
        ledoc_api::validate_message(message)?;
        let q = AnalysisQuestion {
            message: String::from(message),
        };
        let path = format!("/api/analyzer/sessions/{id}/chat/");
        self.fetch(self.request(Method::POST, &path).json(&q)).await
    }
}
