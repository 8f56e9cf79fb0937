use crate::Comment;

/// Envelope of every frame exchanged on a document socket
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    DocumentContentChange { content: String },
    NewComment { comment: Comment },
}

impl FeedMessage {
    const KNOWN_TYPES: [&'static str; 2] = ["document_content_change", "new_comment"];

    /// Parses a frame. Frames with an unknown `type` are not an error and
    /// return `Ok(None)`.
    pub fn parse(frame: &[u8]) -> Result<Option<FeedMessage>, serde_json::Error> {
        let data: serde_json::Value = serde_json::from_slice(frame)?;
        let known = data
            .get("type")
            .and_then(|t| t.as_str())
            .map(|t| Self::KNOWN_TYPES.contains(&t))
            .unwrap_or(false);
        if !known {
            tracing::trace!(?data, "ignoring frame of unknown type");
            return Ok(None);
        }
        serde_json::from_value(data).map(Some)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serializing feed message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommentId;
    use serde_json::json;

    #[test]
    fn content_change_wire_format() {
        let msg = FeedMessage::DocumentContentChange {
            content: String::from("<p>hi</p>"),
        };
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&msg.to_json()).unwrap(),
            json!({"type": "document_content_change", "content": "<p>hi</p>"})
        );
    }

    #[test]
    fn parses_new_comment() {
        let msg = FeedMessage::parse(br#"{"type":"new_comment","comment":{"id":7,"text":"X"}}"#)
            .unwrap()
            .unwrap();
        match msg {
            FeedMessage::NewComment { comment } => {
                assert_eq!(comment.id, CommentId::Int(7));
                assert_eq!(comment.content, "X");
            }
            m => panic!("unexpected message {m:?}"),
        }
    }

    #[test]
    fn unknown_types_are_ignored() {
        assert_eq!(FeedMessage::parse(br#"{"type":"presence","user":"a"}"#).unwrap(), None);
        assert_eq!(FeedMessage::parse(br#"{"content":"no type"}"#).unwrap(), None);
        assert_eq!(FeedMessage::parse(br#"[1, 2]"#).unwrap(), None);
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(FeedMessage::parse(b"not json").is_err());
        // known type, missing payload
        assert!(FeedMessage::parse(br#"{"type":"document_content_change"}"#).is_err());
    }
}
