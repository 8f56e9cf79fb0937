#![cfg(test)]

use std::{future::Future, net::SocketAddr, time::Duration};

use ledoc_api::{
    AnalysisId, AuthToken, Comment, CommentId, DocumentId, FeedMessage, NewConversation, PermissionLevel,
};
use ledoc_client::ThreadView;
use ledoc_mock_server::{AppState, MockServer};

use crate::*;

const TIMEOUT: Duration = Duration::from_secs(5);

struct TestEnv {
    state: AppState,
    config: ClientConfig,
    alice: AuthToken,
    bob: AuthToken,
}

impl TestEnv {
    async fn new() -> TestEnv {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut server = MockServer::new();
        let alice = server.admin_create_user("alice").unwrap();
        let bob = server.admin_create_user("bob").unwrap();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (addr, state) = ledoc_mock_server::spawn(addr, server).await.unwrap();
        let mut config = ClientConfig::new(format!("http://{addr}"));
        config.ws_port = addr.port();
        config.autosave_delay = Duration::from_millis(300);
        config.highlight_duration = Duration::from_millis(200);
        config.poll_interval = Duration::from_millis(50);
        TestEnv {
            state,
            config,
            alice,
            bob,
        }
    }

    fn api(&self, tok: &AuthToken) -> ApiClient {
        ApiClient::new(
            self.config.endpoint().unwrap(),
            &AuthContext::with_token(tok.clone()),
        )
    }

    async fn new_document(&self, content: &str) -> DocumentId {
        let doc = self
            .api(&self.alice)
            .create_conversation(&NewConversation {
                title: String::from("Lease agreement"),
                messages: Vec::new(),
                initial_document_content: String::from(content),
            })
            .await
            .unwrap()
            .id;
        self.state
            .db
            .lock()
            .share_with_user(
                &self.alice,
                &doc,
                ledoc_api::ShareWithUser {
                    username: String::from("bob"),
                    permission_level: Some(PermissionLevel::Edit),
                },
            )
            .unwrap();
        doc
    }

    async fn open(&self, tok: &AuthToken, doc: &DocumentId) -> DocumentSession {
        let (mut s, loaded) =
            DocumentSession::open(self.config.clone(), self.api(tok), doc.clone(), None)
                .await
                .unwrap();
        assert!(matches!(loaded, Loaded::Version(_)));
        assert_eq!(
            within(s.next_event()).await,
            Some(SessionEvent::Connected)
        );
        s
    }

    /// The server joins a socket to its room after the handshake answer, so
    /// wait for it before relying on fan-out
    async fn wait_listeners(&self, doc: &DocumentId, n: usize) {
        for _ in 0..500 {
            if self.state.feeds.num_listeners(doc).await == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("room {doc} never reached {n} listeners");
    }
}

async fn within<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(TIMEOUT, f)
        .await
        .expect("timed out waiting")
}

async fn nothing_within<F: Future>(d: Duration, f: F)
where
    F::Output: std::fmt::Debug,
{
    if let Ok(res) = tokio::time::timeout(d, f).await {
        panic!("expected nothing, got {res:?}");
    }
}

fn comment(id: i64, content: &str) -> Comment {
    serde_json::from_value(serde_json::json!({"id": id, "text": content})).unwrap()
}

#[tokio::test]
async fn posting_a_comment_clears_the_input_and_refreshes() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>lease</p>").await;
    let mut view = CommentView::open(&env.config, env.api(&env.alice), doc.clone(), None).await;
    assert_eq!(view.view(), ThreadView::Empty);

    view.form().set_input("Great clause");
    let posted = view.submit().await.unwrap().unwrap();
    assert_eq!(posted.content, "Great clause");
    assert_eq!(view.form().input(), "");
    assert_eq!(view.form().error(), None);
    assert!(view.thread().contains(&posted.id));
    assert_eq!(env.state.db.lock().test_num_comments(&doc), 1);
}

#[tokio::test]
async fn blank_comments_are_never_posted() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut view = CommentView::open(&env.config, env.api(&env.alice), doc.clone(), None).await;
    for blank in ["", "   ", "\n\t"] {
        view.form().set_input(blank);
        assert_eq!(view.submit().await.unwrap(), None);
    }
    assert_eq!(view.form().error(), None);
    assert_eq!(env.state.db.lock().test_num_comments(&doc), 0);
}

#[tokio::test]
async fn failed_post_keeps_the_input() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut view = CommentView::open(&env.config, env.api(&env.alice), doc.clone(), None).await;
    let mut reply = CommentForm::reply(doc.clone(), CommentId::Int(999));
    reply.set_input("Agreed");
    assert!(view.submit_reply(&mut reply).await.is_err());
    assert_eq!(reply.input(), "Agreed");
    assert_eq!(reply.error(), Some(POST_FAILED));
    assert_eq!(env.state.db.lock().test_num_comments(&doc), 0);
}

#[tokio::test]
async fn replies_are_part_of_the_thread() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut view = CommentView::open(&env.config, env.api(&env.alice), doc.clone(), None).await;
    view.form().set_input("Top");
    let top = view.submit().await.unwrap().unwrap();
    let mut reply = CommentForm::reply(doc.clone(), top.id.clone());
    reply.set_input("Reply");
    let r = view.submit_reply(&mut reply).await.unwrap().unwrap();
    assert_eq!(view.thread().comments().len(), 1);
    assert_eq!(view.thread().len(), 2);
    assert!(view.thread().contains(&r.id));
    assert_eq!(reply.input(), "");
}

#[tokio::test]
async fn failed_fetch_shows_an_error() {
    let env = TestEnv::new().await;
    let view = CommentView::open(
        &env.config,
        env.api(&env.alice),
        DocumentId::from("nope"),
        None,
    )
    .await;
    assert_eq!(view.view(), ThreadView::Error(LOAD_FAILED));
}

#[tokio::test]
async fn pushed_comments_are_merged_once() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut view = CommentView::open(&env.config, env.api(&env.bob), doc.clone(), None).await;
    assert_eq!(within(view.next_event()).await, Some(CommentEvent::Connected));
    env.wait_listeners(&doc, 1).await;

    let msg = FeedMessage::NewComment {
        comment: comment(7, "X"),
    };
    env.state.feeds.relay(&doc, &msg, None).await;
    env.state.feeds.relay(&doc, &msg, None).await;
    assert_eq!(
        within(view.next_event()).await,
        Some(CommentEvent::Added(CommentId::Int(7)))
    );
    assert_eq!(
        within(view.next_event()).await,
        Some(CommentEvent::Duplicate(CommentId::Int(7)))
    );
    assert_eq!(view.thread().len(), 1);
    assert_eq!(view.thread().comments()[0].content, "X");
}

#[tokio::test]
async fn comments_posted_elsewhere_are_pushed() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut bob = CommentView::open(&env.config, env.api(&env.bob), doc.clone(), None).await;
    assert_eq!(within(bob.next_event()).await, Some(CommentEvent::Connected));
    env.wait_listeners(&doc, 1).await;

    let mut form = CommentForm::new(doc.clone());
    form.set_input("Please review section 2");
    let posted = form.submit(&env.api(&env.alice)).await.unwrap().unwrap();
    assert_eq!(
        within(bob.next_event()).await,
        Some(CommentEvent::Added(posted.id.clone()))
    );
    assert_eq!(
        bob.thread().find(&posted.id).map(|c| c.content.as_str()),
        Some("Please review section 2")
    );
}

#[tokio::test]
async fn highlight_is_cleared_after_a_while() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let id = CommentId::Int(3);
    let mut view =
        CommentView::open(&env.config, env.api(&env.alice), doc.clone(), Some(id.clone())).await;
    assert!(view.thread().is_highlighted(&id));
    loop {
        match within(view.next_event()).await {
            Some(CommentEvent::HighlightCleared) => break,
            Some(CommentEvent::Connected) => (),
            e => panic!("unexpected event {e:?}"),
        }
    }
    assert_eq!(view.thread().highlighted(), None);
}

#[tokio::test]
async fn closing_the_view_closes_the_socket_once() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut view = CommentView::open(&env.config, env.api(&env.alice), doc.clone(), None).await;
    assert_eq!(within(view.next_event()).await, Some(CommentEvent::Connected));
    env.wait_listeners(&doc, 1).await;
    assert!(view.close());
    assert!(!view.close());
    assert_eq!(
        within(view.next_event()).await,
        Some(CommentEvent::Disconnected)
    );
    assert_eq!(within(view.next_event()).await, None);
    assert_eq!(view.ready_state(), ReadyState::Closed);
    env.wait_listeners(&doc, 0).await;
}

#[tokio::test]
async fn bad_token_cannot_join_the_room() {
    let env = TestEnv::new().await;
    let doc = env.new_document("").await;
    let mut view = CommentView::open(
        &env.config,
        env.api(&AuthToken(String::from("forged"))),
        doc.clone(),
        None,
    )
    .await;
    assert_eq!(
        within(view.next_event()).await,
        Some(CommentEvent::Disconnected)
    );
    assert_eq!(env.state.feeds.num_listeners(&doc).await, 0);
}

#[tokio::test]
async fn edits_reach_other_editors_without_echo() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut alice = env.open(&env.alice, &doc).await;
    let mut bob = env.open(&env.bob, &doc).await;
    env.wait_listeners(&doc, 2).await;

    assert!(alice.edit(String::from("<p>from alice</p>")));
    assert_eq!(within(bob.next_event()).await, Some(SessionEvent::RemoteEdit));
    assert_eq!(bob.content(), "<p>from alice</p>");
    // a remote edit is not a local one: nothing goes back, nothing autosaves
    assert!(!bob.autosave_pending());
    nothing_within(Duration::from_millis(100), alice.next_event()).await;

    assert!(bob.edit(String::from("<p>from bob</p>")));
    assert_eq!(within(alice.next_event()).await, Some(SessionEvent::RemoteEdit));
    assert_eq!(alice.content(), "<p>from bob</p>");
}

#[tokio::test]
async fn edits_after_close_are_dropped() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut alice = env.open(&env.alice, &doc).await;
    let mut bob = env.open(&env.bob, &doc).await;
    env.wait_listeners(&doc, 2).await;

    assert!(alice.close());
    assert!(!alice.close());
    assert_eq!(
        within(alice.next_event()).await,
        Some(SessionEvent::Disconnected)
    );
    assert!(!alice.edit(String::from("<p>offline</p>")));
    assert_eq!(alice.content(), "<p>offline</p>");
    env.wait_listeners(&doc, 1).await;
    nothing_within(Duration::from_millis(100), bob.next_event()).await;
    assert_eq!(bob.content(), "<p>v0</p>");
}

#[tokio::test]
async fn edits_while_connecting_follow_the_offline_policy() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut bob = env.open(&env.bob, &doc).await;
    env.wait_listeners(&doc, 1).await;

    let mut config = env.config.clone();
    config.offline_edits = OfflineEdits::QueueLatest;
    let (mut alice, _) = DocumentSession::open(config, env.api(&env.alice), doc.clone(), None)
        .await
        .unwrap();
    assert_eq!(alice.ready_state(), ReadyState::Connecting);
    assert!(alice.edit(String::from("<p>one</p>")));
    assert!(alice.edit(String::from("<p>two</p>")));
    assert_eq!(within(alice.next_event()).await, Some(SessionEvent::Connected));
    assert_eq!(within(bob.next_event()).await, Some(SessionEvent::RemoteEdit));
    assert_eq!(bob.content(), "<p>two</p>");

    let (mut carol, _) = DocumentSession::open(env.config.clone(), env.api(&env.alice), doc, None)
        .await
        .unwrap();
    assert!(!carol.edit(String::from("<p>lost</p>")));
    assert_eq!(within(carol.next_event()).await, Some(SessionEvent::Connected));
    nothing_within(Duration::from_millis(100), bob.next_event()).await;
}

#[tokio::test]
async fn autosave_fires_once_edits_settle() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut alice = env.open(&env.alice, &doc).await;
    for i in 0..5 {
        alice.edit(format!("<p>draft {i}</p>"));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(alice.autosave_pending());
    assert_eq!(
        within(alice.next_event()).await,
        Some(SessionEvent::Autosaved(SaveOutcome::Updated))
    );
    assert!(!alice.is_dirty());
    assert_eq!(alice.versions().len(), 2);
    assert_eq!(
        alice.versions().latest().map(|v| v.content.as_str()),
        Some("<p>draft 4</p>")
    );
    nothing_within(Duration::from_millis(400), alice.next_event()).await;
    assert_eq!(alice.versions().len(), 2);
}

#[tokio::test]
async fn saving_creates_then_versions_the_document() {
    let env = TestEnv::new().await;
    let mut s = DocumentSession::create(env.config.clone(), env.api(&env.alice));
    s.edit(String::from("<p>draft</p>"));
    assert!(s.save().await.unwrap_err().is_validation());
    assert!(s.rename(String::from("NDA")).await.unwrap());

    let id = match s.save().await.unwrap() {
        SaveOutcome::Created(id) => id,
        o => panic!("unexpected outcome {o:?}"),
    };
    assert_eq!(s.id(), Some(&id));
    assert_eq!(s.current_version(), Some(0));
    assert_eq!(s.save().await.unwrap(), SaveOutcome::NoChanges);
    assert_eq!(within(s.next_event()).await, Some(SessionEvent::Connected));

    s.edit(String::from("<p>final</p>"));
    assert_eq!(s.save().await.unwrap(), SaveOutcome::Updated);
    assert_eq!(s.versions().len(), 2);
    assert_eq!(s.current_version(), Some(1));

    assert!(!s.rename(String::from("NDA")).await.unwrap());
    assert!(s.rename(String::from("Mutual NDA")).await.unwrap());
    assert!(s.rename(String::from("  ")).await.unwrap_err().is_validation());
    let (s2, _) = DocumentSession::open(env.config.clone(), env.api(&env.alice), id, None)
        .await
        .unwrap();
    assert_eq!(s2.title(), "Mutual NDA");
    assert_eq!(s2.content(), "<p>final</p>");
}

#[tokio::test]
async fn versions_fall_back_to_the_latest() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut s = env.open(&env.alice, &doc).await;
    s.edit(String::from("<p>v1</p>"));
    s.save().await.unwrap();

    let (s2, loaded) =
        DocumentSession::open(env.config.clone(), env.api(&env.alice), doc.clone(), Some(7))
            .await
            .unwrap();
    assert_eq!(
        loaded,
        Loaded::Fallback {
            requested: 7,
            latest: 1
        }
    );
    assert_eq!(s2.content(), "<p>v1</p>");

    s.select_version(0).await.unwrap();
    assert_eq!(s.content(), "<p>v0</p>");
    assert_eq!(s.current_version(), Some(0));
    assert!(s.select_version(9).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn selecting_a_version_is_not_an_edit() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut s = env.open(&env.alice, &doc).await;
    s.edit(String::from("<p>v1</p>"));
    s.save().await.unwrap();

    s.select_version(0).await.unwrap();
    assert!(!s.is_dirty());

    s.edit(String::from("<p>draft</p>"));
    assert!(s.autosave_pending());
    s.select_version(0).await.unwrap();
    assert!(!s.autosave_pending());
    assert!(!s.is_dirty());
    assert_eq!(s.content(), "<p>v0</p>");
    nothing_within(Duration::from_millis(600), s.next_event()).await;

    let versions = env
        .api(&env.alice)
        .fetch_conversation(&doc)
        .await
        .unwrap()
        .document_versions;
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].content, "<p>v1</p>");
}

#[tokio::test]
async fn deleting_the_last_version_needs_confirmation() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut s = env.open(&env.alice, &doc).await;
    s.edit(String::from("<p>v1</p>"));
    s.save().await.unwrap();

    let res = s
        .delete_version(1, || panic!("only the last version needs confirmation"))
        .await;
    assert_eq!(res.unwrap(), Deletion::Deleted);
    assert_eq!(s.versions().len(), 1);
    assert_eq!(s.content(), "<p>v0</p>");

    assert_eq!(s.delete_version(0, || false).await.unwrap(), Deletion::Cancelled);
    assert!(env.state.db.lock().test_has_document(&doc));

    assert_eq!(
        s.delete_version(0, || true).await.unwrap(),
        Deletion::DocumentDeleted
    );
    assert!(!env.state.db.lock().test_has_document(&doc));
    assert_eq!(s.id(), None);

    // saving again recreates the document, which autosaves like any other
    s.edit(String::from("<p>again</p>"));
    assert!(!s.autosave_pending());
    let id = match s.save().await.unwrap() {
        SaveOutcome::Created(id) => id,
        o => panic!("unexpected outcome {o:?}"),
    };
    assert_ne!(id, doc);
    s.edit(String::from("<p>again and again</p>"));
    assert!(s.autosave_pending());
}

#[tokio::test]
async fn assistant_chat_rewrites_the_document() {
    let env = TestEnv::new().await;
    let mut s = DocumentSession::create(env.config.clone(), env.api(&env.alice));
    assert_eq!(s.send_chat(String::from("   ")).await.unwrap(), None);
    assert!(s.messages().is_empty());

    let answer = s
        .send_chat(String::from("Draft a lease"))
        .await
        .unwrap()
        .unwrap();
    assert!(answer.contains("Draft a lease"));
    let id = s.id().cloned().unwrap();
    assert_eq!(s.messages().len(), 2);
    assert_eq!(s.messages()[1].text, answer);
    assert_eq!(s.content(), "<p>Draft a lease</p>");
    assert!(!s.is_dirty());
    assert!(!s.autosave_pending());
    assert_eq!(s.versions().len(), 1);
    assert_eq!(s.current_version(), Some(0));
    assert_eq!(s.title(), "Untitled document");
    assert_eq!(within(s.next_event()).await, Some(SessionEvent::Connected));

    s.send_chat(String::from("Add a deposit")).await.unwrap();
    assert_eq!(s.messages().len(), 4);
    assert_eq!(s.content(), "<p>Draft a lease</p><p>Add a deposit</p>");
    assert!(s.is_dirty());
    assert!(s.autosave_pending());
    assert!(env.state.db.lock().test_has_document(&id));
}

#[tokio::test]
async fn failed_chat_leaves_an_error_message() {
    let env = TestEnv::new().await;
    let mut s = DocumentSession::create(
        env.config.clone(),
        env.api(&AuthToken(String::from("forged"))),
    );
    assert!(s.send_chat(String::from("Hello")).await.is_err());
    assert_eq!(s.messages().len(), 2);
    assert_eq!(
        s.messages()[1].text,
        "Error: Could not get a response from the AI."
    );
    assert_eq!(s.id(), None);
}

#[tokio::test]
async fn sharing() {
    let env = TestEnv::new().await;
    let doc = env.new_document("<p>v0</p>").await;
    let mut s = env.open(&env.alice, &doc).await;

    let url = s.share_link(PermissionLevel::View).await.unwrap();
    assert!(url.starts_with("http://127.0.0.1:"));
    assert!(url.ends_with(&format!("/shared/{doc}/")));

    assert!(s
        .share_with_user(String::from(""), Some(PermissionLevel::View))
        .await
        .unwrap_err()
        .is_validation());
    assert!(s
        .share_with_user(String::from("mallory"), Some(PermissionLevel::View))
        .await
        .is_err());

    s.share_with_user(String::from("bob"), Some(PermissionLevel::View))
        .await
        .unwrap();
    assert_eq!(s.shared_with().len(), 1);
    assert_eq!(s.shared_with()[0].permission_level, PermissionLevel::View);
    s.share_with_user(String::from("bob"), None).await.unwrap();
    assert!(s.shared_with().is_empty());
    assert!(env.api(&env.bob).fetch_conversation(&doc).await.is_err());
}

#[tokio::test]
async fn poller_refreshes_the_conversation_list() {
    let env = TestEnv::new().await;
    env.state
        .db
        .lock()
        .admin_add_chat("alice", "bob", Some("Hello"))
        .unwrap();
    let mut poller = ConversationPoller::new(env.api(&env.alice), env.config.poll_interval);
    let first = within(poller.next()).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(
        first[0]
            .other_party(env.state.db.lock().admin_user_id("alice").unwrap())
            .map(|p| p.username.as_str()),
        Some("bob")
    );

    env.state
        .db
        .lock()
        .admin_add_chat("bob", "alice", None)
        .unwrap();
    assert_eq!(within(poller.next()).await.unwrap().len(), 2);

    let mut denied = ConversationPoller::new(
        env.api(&AuthToken(String::from("forged"))),
        env.config.poll_interval,
    );
    for _ in 0..2 {
        assert!(within(denied.next()).await.is_err());
    }
}

#[tokio::test]
async fn analyzer_upload_then_questions() {
    let env = TestEnv::new().await;
    let mut a = Analyzer::new(env.api(&env.alice));
    a.upload("lease.txt", b"Twelve month lease. Deposit of one month.".to_vec())
        .await
        .unwrap();
    let id = a.id().cloned().unwrap();
    assert_eq!(a.file_name(), Some("lease.txt"));
    assert_eq!(a.summary(), "lease.txt: Twelve month lease.");
    assert_eq!(a.history().len(), 1);
    assert_eq!(a.history()[0].text, GREETING);

    assert_eq!(a.send("   ").await.unwrap(), None);
    let answer = a.send("Is there a deposit?").await.unwrap().unwrap();
    assert!(answer.contains("Is there a deposit?"));
    assert_eq!(a.history().len(), 3);
    assert_eq!(a.history()[1].sender, ledoc_api::Sender::User);
    assert_eq!(a.history()[2].text, answer);

    let mut b = Analyzer::new(env.api(&env.alice));
    b.refresh_sessions().await.unwrap();
    assert_eq!(b.sessions().len(), 1);
    b.open_session(id).await.unwrap();
    assert_eq!(b.history().len(), 2);
    assert_eq!(b.history()[0].text, "Is there a deposit?");
    assert_eq!(b.summary(), "lease.txt: Twelve month lease.");
    assert_eq!(b.file_name(), Some("lease.txt"));

    let mut c = Analyzer::new(env.api(&env.bob));
    c.refresh_sessions().await.unwrap();
    assert!(c.sessions().is_empty());
}

#[tokio::test]
async fn analyzer_failures_are_reported() {
    let env = TestEnv::new().await;
    let mut a = Analyzer::new(env.api(&env.alice));
    assert_eq!(a.send("Anything?").await.unwrap(), None);

    assert!(a.upload("empty.txt", b" \n".to_vec()).await.is_err());
    assert_eq!(a.id(), None);
    assert_eq!(a.file_name(), None);
    assert_eq!(
        a.error(),
        Some("Invalid request: The uploaded file is empty")
    );

    assert!(a.open_session(AnalysisId::from("nope")).await.is_err());
    assert!(a.error().is_some());
    assert!(a.send("Still there?").await.unwrap_err().is_not_found());
    assert!(a.history().is_empty());
    assert!(a.error().is_some());

    let mut anonymous = Analyzer::new(env.api(&AuthToken(String::from("forged"))));
    assert!(anonymous.refresh_sessions().await.is_err());
    assert!(anonymous.upload("lease.txt", b"Lease.".to_vec()).await.is_err());
    assert_eq!(anonymous.error(), Some("Permission denied"));
}

