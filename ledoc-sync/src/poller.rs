use std::time::Duration;

use ledoc_api::ChatConversation;
use tokio::time::{Interval, MissedTickBehavior};

use crate::{ApiClient, Error};

/// Keeps the chat conversation list fresh. The first `next` loads
/// immediately, later ones every `period`. Dropping the poller stops it.
pub struct ConversationPoller {
    api: ApiClient,
    interval: Interval,
}

impl ConversationPoller {
    pub fn new(api: ApiClient, period: Duration) -> ConversationPoller {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ConversationPoller { api, interval }
    }

    /// Waits for the next tick and fetches the list. Errors only concern
    /// this tick.
    pub async fn next(&mut self) -> Result<Vec<ChatConversation>, Error> {
        self.interval.tick().await;
        let res = self.api.list_chat_conversations().await;
        if let Err(err) = &res {
            tracing::warn!(?err, "failed refreshing the conversation list");
        }
        res
    }
}
