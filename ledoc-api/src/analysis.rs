use std::fmt;

use crate::Time;

/// Identifier of an analysis session, as handed out on upload
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct AnalysisId(pub String);

impl From<&str> for AnalysisId {
    fn from(s: &str) -> AnalysisId {
        AnalysisId(String::from(s))
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answer to an uploaded document
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UploadReply {
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<AnalysisId>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default, alias = "summaryPreview")]
    pub summary_preview: Option<String>,
}

/// Entry of the analysis session list
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AnalysisSession {
    #[serde(alias = "_id")]
    pub id: AnalysisId,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub summary_preview: Option<String>,

    #[serde(default)]
    pub created_at: Option<Time>,
}

impl AnalysisSession {
    pub fn label(&self) -> &str {
        self.summary_preview
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("Document Analysis")
    }
}

/// The session list comes either bare or wrapped in `{"sessions": [...]}`
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum AnalysisSessions {
    List(Vec<AnalysisSession>),
    Wrapped { sessions: Vec<AnalysisSession> },
}

impl AnalysisSessions {
    pub fn into_vec(self) -> Vec<AnalysisSession> {
        match self {
            AnalysisSessions::List(l) | AnalysisSessions::Wrapped { sessions: l } => l,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AnalysisMessage {
    /// `user`, anything else is the assistant
    #[serde(alias = "role")]
    pub sender: String,

    #[serde(alias = "message")]
    pub text: String,

    #[serde(default)]
    pub timestamp: Option<Time>,
}

impl AnalysisMessage {
    pub fn is_user(&self) -> bool {
        self.sender.eq_ignore_ascii_case("user")
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AnalysisInfo {
    #[serde(default)]
    pub summary: Option<String>,
}

/// Everything said in an analysis session so far
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AnalysisHistory {
    #[serde(default)]
    pub session: Option<AnalysisInfo>,

    #[serde(default, alias = "messages_list")]
    pub messages: Vec<AnalysisMessage>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AnalysisQuestion {
    pub message: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AnalysisAnswer {
    #[serde(alias = "message", alias = "text")]
    pub response: String,
}
