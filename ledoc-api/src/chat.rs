use crate::{DocumentId, Time};

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of a document's assistant transcript
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: String) -> ChatMessage {
        ChatMessage {
            sender: Sender::User,
            text,
        }
    }

    pub fn bot(text: String) -> ChatMessage {
        ChatMessage {
            sender: Sender::Bot,
            text,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub document_content: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChatReply {
    pub response: String,
    pub updated_document_content: String,

    /// Only set when the chat created a new document
    #[serde(default)]
    pub conversation_id: Option<DocumentId>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChatParticipant {
    pub id: i64,

    #[serde(default)]
    pub username: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LastMessage {
    #[serde(alias = "text")]
    pub content: String,

    #[serde(default)]
    pub created_at: Option<Time>,
}

/// Entry of the lawyer/client chat list
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChatConversation {
    pub id: i64,

    #[serde(default)]
    pub client: Option<ChatParticipant>,

    #[serde(default)]
    pub lawyer: Option<ChatParticipant>,

    #[serde(default)]
    pub last_message: Option<LastMessage>,

    #[serde(default)]
    pub unread_count: u64,
}

impl ChatConversation {
    /// The participant that is not `me`
    pub fn other_party(&self, me: i64) -> Option<&ChatParticipant> {
        match &self.client {
            Some(c) if c.id == me => self.lawyer.as_ref(),
            _ => self.client.as_ref(),
        }
    }
}
