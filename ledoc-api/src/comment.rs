use std::{fmt, str::FromStr};

use crate::{DocumentId, Time};

/// Comment identifier, sent by the backend either as a number or as a string
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(untagged)]
pub enum CommentId {
    Int(i64),
    Str(String),
}

impl FromStr for CommentId {
    type Err = std::convert::Infallible;

    /// Numeric strings become `Int`, so that an id taken from a query
    /// parameter matches the id the backend sent as a number
    fn from_str(s: &str) -> Result<CommentId, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(i) => CommentId::Int(i),
            Err(_) => CommentId::Str(String::from(s)),
        })
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentId::Int(i) => write!(f, "{i}"),
            CommentId::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,

    #[serde(default)]
    pub user: String,

    // socket pushes have been observed to carry the body under `text`
    #[serde(alias = "text")]
    pub content: String,

    #[serde(default)]
    pub created_at: Option<Time>,

    /// Child comments, in the order the backend returned them
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn find_in<'a>(comments: &'a [Comment], id: &CommentId) -> Option<&'a Comment> {
        for c in comments {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in(&c.replies, id) {
                return Some(res);
            }
        }
        None
    }

    /// Number of comments in this subtree, self included
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(Comment::count).sum::<usize>()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub document_id: DocumentId,
    pub content: String,
    pub parent_comment: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_comment(&self.content)
    }
}
