use crate::DocumentId;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    View,
    Edit,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SharePermissions {
    pub permission_level: PermissionLevel,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SharedUser {
    pub username: String,
    pub permission_level: PermissionLevel,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ShareLinkRequest {
    pub document_id: DocumentId,
    pub permission_level: PermissionLevel,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ShareLink {
    /// Path relative to the site origin
    pub share_url: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ShareWithUser {
    pub username: String,

    /// `None` revokes the user's access
    pub permission_level: Option<PermissionLevel>,
}

impl ShareWithUser {
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_username(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn revocation_sends_null_permission() {
        let s = ShareWithUser {
            username: String::from("alice"),
            permission_level: None,
        };
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"username": "alice", "permission_level": null})
        );
        let s = ShareWithUser {
            username: String::from("alice"),
            permission_level: Some(PermissionLevel::Edit),
        };
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"username": "alice", "permission_level": "edit"})
        );
    }
}
