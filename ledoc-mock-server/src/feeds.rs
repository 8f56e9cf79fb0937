use std::{collections::HashMap, sync::Arc};

use axum::extract::ws::Message;
use futures::{channel::mpsc, select, SinkExt, StreamExt};
use ledoc_api::{DocumentId, FeedMessage};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Socket rooms, one per document
#[derive(Clone, Debug)]
pub struct DocumentFeeds(
    Arc<RwLock<HashMap<DocumentId, HashMap<Uuid, mpsc::UnboundedSender<String>>>>>,
);

impl DocumentFeeds {
    pub fn new() -> DocumentFeeds {
        DocumentFeeds(Arc::new(RwLock::new(HashMap::new())))
    }

    pub async fn num_listeners(&self, doc: &DocumentId) -> usize {
        self.0.read().await.get(doc).map(|r| r.len()).unwrap_or(0)
    }

    pub async fn join<W, R>(self, doc: DocumentId, mut write: W, read: R)
    where
        W: 'static + Send + Unpin + futures::Sink<Message>,
        <W as futures::Sink<Message>>::Error: Send,
        R: 'static + Send + Unpin + futures::Stream<Item = Result<Message, axum::Error>>,
    {
        // Note: if this were bounded, there would be a deadlock between the write-lock to remove
        // a channel and the read-lock to relay a message to all the room's sockets
        let (sender, mut receiver) = mpsc::unbounded();
        let sender_id = Uuid::new_v4();

        self.0
            .write()
            .await
            .entry(doc.clone())
            .or_insert_with(HashMap::new)
            .insert(sender_id, sender);
        tracing::debug!(%doc, %sender_id, "socket joined document room");

        let this = self.clone();
        let mut read = read.fuse();
        tokio::spawn(async move {
            macro_rules! remove_self {
                () => {{
                    let mut rooms = this.0.write().await;
                    if let Some(room) = rooms.get_mut(&doc) {
                        room.remove(&sender_id);
                        if room.is_empty() {
                            rooms.remove(&doc);
                        }
                    }
                    tracing::debug!(%doc, %sender_id, "socket left document room");
                    return;
                }};
            }
            macro_rules! handle_frame {
                ( $frame:expr ) => {{
                    match FeedMessage::parse($frame) {
                        Ok(Some(msg @ FeedMessage::DocumentContentChange { .. })) => {
                            this.relay(&doc, &msg, Some(sender_id)).await;
                        }
                        Ok(Some(msg)) => {
                            tracing::warn!(?msg, "clients may only send content changes, ignoring");
                        }
                        Ok(None) => (),
                        Err(err) => tracing::warn!(?err, "received malformed frame from client"),
                    }
                }};
            }
            loop {
                select! {
                    msg = receiver.next() => match msg {
                        None => remove_self!(),
                        Some(json) => {
                            if write.send(Message::Text(json)).await.is_err() {
                                remove_self!();
                            }
                        }
                    },
                    msg = read.next() => match msg {
                        None | Some(Err(_)) | Some(Ok(Message::Close(_))) => remove_self!(),
                        Some(Ok(Message::Text(t))) => handle_frame!(t.as_bytes()),
                        Some(Ok(Message::Binary(b))) => handle_frame!(&b),
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => (),
                    },
                }
            }
        });
    }

    /// Sends `msg` to every socket of the room, except `except` if set
    pub async fn relay(&self, doc: &DocumentId, msg: &FeedMessage, except: Option<Uuid>) {
        let json = msg.to_json();
        if let Some(room) = self.0.read().await.get(doc) {
            for (id, s) in room.iter() {
                if Some(*id) != except {
                    let _ = s.unbounded_send(json.clone());
                }
            }
        }
    }
}

impl Default for DocumentFeeds {
    fn default() -> DocumentFeeds {
        DocumentFeeds::new()
    }
}
