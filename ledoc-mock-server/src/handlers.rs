use axum::{
    extract::{
        multipart::MultipartError, ws::Message, Multipart, Path, Query, State, WebSocketUpgrade,
    },
    Json,
};
use futures::StreamExt;
use ledoc_api::{
    AnalysisAnswer, AnalysisHistory, AnalysisId, AnalysisQuestion, AnalysisSession, AuthToken,
    ChatConversation, ChatReply, ChatRequest, Comment, Conversation, ConversationUpdate,
    DocumentId, FeedMessage, NewComment, NewConversation, ShareLink, ShareLinkRequest,
    ShareWithUser, UploadReply,
};

use crate::{extractors::*, DocumentFeeds, Error};

pub async fn list_comments(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(doc): Path<String>,
) -> Result<Json<Vec<Comment>>, Error> {
    Ok(Json(db.lock().list_comments(&tok, &DocumentId(doc))?))
}

pub async fn post_comment(
    Auth(tok): Auth,
    State(db): State<Db>,
    State(feeds): State<DocumentFeeds>,
    Path(doc): Path<String>,
    Json(data): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    let doc = DocumentId(doc);
    if data.document_id != doc {
        return Err(Error::Api(ledoc_api::Error::InvalidRequest(String::from(
            "document id in body does not match url",
        ))));
    }
    let comment = db.lock().post_comment(&tok, &doc, data)?;
    feeds
        .relay(
            &doc,
            &FeedMessage::NewComment {
                comment: comment.clone(),
            },
            None,
        )
        .await;
    Ok(Json(comment))
}

pub async fn create_conversation(
    Auth(tok): Auth,
    State(db): State<Db>,
    Json(data): Json<NewConversation>,
) -> Result<Json<Conversation>, Error> {
    Ok(Json(db.lock().create_conversation(&tok, data)?))
}

pub async fn fetch_conversation(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(doc): Path<String>,
) -> Result<Json<Conversation>, Error> {
    Ok(Json(db.lock().fetch_conversation(&tok, &DocumentId(doc))?))
}

pub async fn update_conversation(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(doc): Path<String>,
    Json(data): Json<ConversationUpdate>,
) -> Result<Json<Conversation>, Error> {
    Ok(Json(
        db.lock()
            .update_conversation(&tok, &DocumentId(doc), data)?,
    ))
}

pub async fn delete_version(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path((doc, version)): Path<(String, i64)>,
) -> Result<(), Error> {
    db.lock().delete_version(&tok, &DocumentId(doc), version)?;
    Ok(())
}

pub async fn chat_new(
    Auth(tok): Auth,
    State(db): State<Db>,
    Json(data): Json<ChatRequest>,
) -> Result<Json<ChatReply>, Error> {
    Ok(Json(db.lock().chat(&tok, None, data)?))
}

pub async fn chat(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(doc): Path<String>,
    Json(data): Json<ChatRequest>,
) -> Result<Json<ChatReply>, Error> {
    Ok(Json(db.lock().chat(&tok, Some(&DocumentId(doc)), data)?))
}

pub async fn generate_share_link(
    Auth(tok): Auth,
    State(db): State<Db>,
    Json(data): Json<ShareLinkRequest>,
) -> Result<Json<ShareLink>, Error> {
    Ok(Json(db.lock().generate_share_link(&tok, data)?))
}

pub async fn share_with_user(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(doc): Path<String>,
    Json(data): Json<ShareWithUser>,
) -> Result<(), Error> {
    db.lock().share_with_user(&tok, &DocumentId(doc), data)?;
    Ok(())
}

pub async fn list_chat_conversations(
    Auth(tok): Auth,
    State(db): State<Db>,
) -> Result<Json<Vec<ChatConversation>>, Error> {
    Ok(Json(db.lock().list_chat_conversations(&tok)?))
}

fn bad_upload(err: MultipartError) -> Error {
    Error::Api(ledoc_api::Error::InvalidRequest(err.to_string()))
}

pub async fn upload_document(
    Auth(tok): Auth,
    State(db): State<Db>,
    mut multipart: Multipart,
) -> Result<Json<UploadReply>, Error> {
    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = String::from(field.file_name().unwrap_or("document"));
        let data = field.bytes().await.map_err(bad_upload)?;
        return Ok(Json(db.lock().analyze_document(&tok, &file_name, &data)?));
    }
    Err(Error::Api(ledoc_api::Error::InvalidRequest(String::from(
        "no file in upload",
    ))))
}

pub async fn list_analyses(
    Auth(tok): Auth,
    State(db): State<Db>,
) -> Result<Json<Vec<AnalysisSession>>, Error> {
    Ok(Json(db.lock().list_analyses(&tok)?))
}

pub async fn analysis_history(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisHistory>, Error> {
    Ok(Json(db.lock().analysis_history(&tok, &AnalysisId(id))?))
}

pub async fn ask_analysis(
    Auth(tok): Auth,
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(data): Json<AnalysisQuestion>,
) -> Result<Json<AnalysisAnswer>, Error> {
    Ok(Json(db.lock().ask_analysis(&tok, &AnalysisId(id), &data.message)?))
}

#[derive(serde::Deserialize)]
pub struct FeedParams {
    token: Option<String>,
}

pub async fn document_feed(
    ws: WebSocketUpgrade,
    State(db): State<Db>,
    State(feeds): State<DocumentFeeds>,
    Path(doc): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<axum::response::Response, Error> {
    let doc = DocumentId(doc);
    // anonymous sockets are let in, like on the real backend; bad tokens are not
    if let Some(token) = params.token {
        if !db.lock().can_join(&AuthToken(token), &doc) {
            tracing::debug!(%doc, "document feed websocket auth failure");
            return Err(Error::permission_denied());
        }
    }
    Ok(ws.on_upgrade(move |sock| {
        let (write, read) = sock.split();
        document_feed_impl(write, read, doc, feeds)
    }))
}

async fn document_feed_impl<W, R>(write: W, read: R, doc: DocumentId, feeds: DocumentFeeds)
where
    W: 'static + Send + Unpin + futures::Sink<Message>,
    <W as futures::Sink<Message>>::Error: Send,
    R: 'static + Send + Unpin + futures::Stream<Item = Result<Message, axum::Error>>,
{
    tracing::debug!(%doc, "document feed websocket connected");
    feeds.join(doc, write, read).await;
}
