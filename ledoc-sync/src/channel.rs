use futures::{
    channel::{mpsc, oneshot},
    pin_mut, select, FutureExt, SinkExt, StreamExt,
};
use ledoc_api::{Comment, FeedMessage};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

use crate::OfflineEdits;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChannelEvent {
    Opened,
    ContentChange(String),
    NewComment(Comment),
    Closed,
}

/// One socket connection to a document's room.
///
/// The socket is owned by a spawned task. There is no reconnection: once
/// `Closed`, the channel stays closed.
pub struct Channel {
    state: watch::Receiver<ReadyState>,
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    cancel: Option<oneshot::Sender<()>>,
    offline_edits: OfflineEdits,
}

impl Channel {
    pub fn connect(url: String, offline_edits: OfflineEdits) -> Channel {
        let (state_tx, state) = watch::channel(ReadyState::Connecting);
        let (outbound, outbound_rx) = mpsc::unbounded();
        let (events_tx, events) = mpsc::unbounded();
        let (cancel, cancel_rx) = oneshot::channel();
        tokio::spawn(run_channel(url, state_tx, outbound_rx, events_tx, cancel_rx));
        Channel {
            state,
            outbound,
            events,
            cancel: Some(cancel),
            offline_edits,
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        *self.state.borrow()
    }

    /// Mirrors a local edit to the room. Returns whether it was sent (or
    /// queued for sending).
    pub fn send_content(&self, content: String) -> bool {
        let send = match (self.ready_state(), self.offline_edits) {
            (ReadyState::Open, _) => true,
            (ReadyState::Connecting, OfflineEdits::QueueLatest) => true,
            (ReadyState::Connecting, OfflineEdits::Drop) | (ReadyState::Closed, _) => false,
        };
        if !send || self.cancel.is_none() {
            tracing::debug!(state = ?self.ready_state(), "socket not open, dropping local edit");
            return false;
        }
        self.outbound.unbounded_send(content).is_ok()
    }

    /// Next message from the socket task, `None` once it stopped and all its
    /// events were consumed
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.next().await
    }

    /// Waits until the channel reaches `state`, or closes
    pub async fn wait_for(&mut self, state: ReadyState) -> ReadyState {
        loop {
            let current = *self.state.borrow_and_update();
            if current == state || current == ReadyState::Closed {
                return current;
            }
            if self.state.changed().await.is_err() {
                return *self.state.borrow();
            }
        }
    }

    /// Closes the socket. Only the first call does anything, and returns
    /// `true`.
    pub fn close(&mut self) -> bool {
        match self.cancel.take() {
            Some(cancel) => {
                let _ = cancel.send(());
                true
            }
            None => false,
        }
    }

    pub fn is_closing(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Next event of `channel`, pending forever if there is none
pub(crate) async fn next_event_of(channel: Option<&mut Channel>) -> Option<ChannelEvent> {
    match channel {
        Some(c) => c.next_event().await,
        None => futures::future::pending().await,
    }
}

fn handle_frame(frame: &[u8], events: &mpsc::UnboundedSender<ChannelEvent>) {
    match FeedMessage::parse(frame) {
        Ok(Some(FeedMessage::DocumentContentChange { content })) => {
            let _ = events.unbounded_send(ChannelEvent::ContentChange(content));
        }
        Ok(Some(FeedMessage::NewComment { comment })) => {
            tracing::debug!(id = %comment.id, "new comment pushed");
            let _ = events.unbounded_send(ChannelEvent::NewComment(comment));
        }
        Ok(None) => tracing::trace!("ignoring socket message of unknown type"),
        Err(err) => tracing::warn!(?err, "received malformed socket message"),
    }
}

async fn run_channel(
    url: String,
    state: watch::Sender<ReadyState>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    cancel: oneshot::Receiver<()>,
) {
    let mut cancel = cancel.fuse();
    let connect = tokio_tungstenite::connect_async(url.as_str()).fuse();
    pin_mut!(connect);
    let sock = select! {
        _ = cancel => None,
        res = connect => match res {
            Ok((sock, _)) => Some(sock),
            Err(err) => {
                tracing::warn!(?err, %url, "failed connecting to document socket");
                None
            }
        },
    };
    let Some(sock) = sock else {
        state.send_replace(ReadyState::Closed);
        let _ = events.unbounded_send(ChannelEvent::Closed);
        return;
    };
    tracing::info!(%url, "document socket connected");
    let (mut write, read) = sock.split();
    let mut read = read.fuse();

    // anything queued while connecting; only the latest content matters
    let mut latest = None;
    while let Ok(content) = outbound.try_recv() {
        latest = Some(content);
    }
    state.send_replace(ReadyState::Open);
    let _ = events.unbounded_send(ChannelEvent::Opened);
    if let Some(content) = latest {
        let msg = FeedMessage::DocumentContentChange { content };
        if let Err(err) = write.send(Message::Text(msg.to_json())).await {
            tracing::warn!(?err, "failed flushing queued edit");
        }
    }

    loop {
        select! {
            _ = cancel => {
                if let Err(err) = write.send(Message::Close(None)).await {
                    tracing::debug!(?err, "failed sending close frame");
                }
                tracing::info!(%url, "document socket closed");
                break;
            }
            content = outbound.next() => match content {
                None => break,
                Some(content) => {
                    let msg = FeedMessage::DocumentContentChange { content };
                    if let Err(err) = write.send(Message::Text(msg.to_json())).await {
                        tracing::warn!(?err, "failed sending on document socket");
                        break;
                    }
                }
            },
            msg = read.next() => match msg {
                None => {
                    tracing::info!(%url, "document socket disconnected");
                    break;
                }
                Some(Err(err)) => {
                    tracing::warn!(?err, "document socket error");
                    break;
                }
                Some(Ok(Message::Text(t))) => handle_frame(t.as_bytes(), &events),
                Some(Ok(Message::Binary(b))) => handle_frame(&b, &events),
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "document socket closed by server");
                    break;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => (),
            },
        }
    }
    state.send_replace(ReadyState::Closed);
    let _ = events.unbounded_send(ChannelEvent::Closed);
}
