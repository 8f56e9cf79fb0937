/// Bearer token as issued by the backend on login
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn stub() -> AuthToken {
        AuthToken(String::from("stub-token"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
