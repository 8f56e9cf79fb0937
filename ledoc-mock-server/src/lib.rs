//! In-memory stand-in for the document backend: the HTTP API and the
//! per-document socket rooms, enough to run the sync client against.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};

mod error;
pub use error::Error;

mod extractors;
pub use extractors::{AppState, Db};

mod feeds;
pub use feeds::DocumentFeeds;

mod handlers;

mod state;
pub use state::MockServer;

pub fn app(state: AppState) -> Router {
    use handlers::*;
    Router::new()
        .route(
            "/api/documents/:id/comments/",
            get(list_comments).post(post_comment),
        )
        .route("/api/documents/conversations/", post(create_conversation))
        .route("/api/documents/conversations/chat/", post(chat_new))
        .route(
            "/api/documents/conversations/:id/",
            get(fetch_conversation).put(update_conversation),
        )
        .route("/api/documents/conversations/:id/chat/", post(chat))
        .route(
            "/api/documents/conversations/:id/versions/:version/",
            delete(delete_version),
        )
        .route(
            "/api/documents/conversations/:id/share-with-user/",
            post(share_with_user),
        )
        .route(
            "/api/documents/generate-share-link/",
            post(generate_share_link),
        )
        .route("/api/auth/chat/conversations/", get(list_chat_conversations))
        .route("/api/analyzer/upload/", post(upload_document))
        .route("/api/analyzer/sessions/", get(list_analyses))
        .route("/api/analyzer/sessions/:id/", get(analysis_history))
        .route("/api/analyzer/sessions/:id/chat/", post(ask_analysis))
        .route("/ws/document/:id/", get(document_feed))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `server` on `addr` in a background task, returning the bound
/// address and a handle on the server's state
pub async fn spawn(
    addr: SocketAddr,
    server: MockServer,
) -> anyhow::Result<(SocketAddr, AppState)> {
    let state = AppState {
        db: Db::new(server),
        feeds: DocumentFeeds::new(),
    };
    let server = axum::Server::try_bind(&addr)
        .with_context(|| format!("binding to {addr}"))?
        .serve(app(state.clone()).into_make_service());
    let addr = server.local_addr();
    tracing::info!("mock server listening on {addr}");
    tokio::spawn(async move {
        if let Err(err) = server.await {
            tracing::error!(?err, "mock server stopped");
        }
    });
    Ok((addr, state))
}
