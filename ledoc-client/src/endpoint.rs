use anyhow::{anyhow, Context};

use crate::api::{AuthToken, DocumentId};

pub const DEFAULT_WS_PORT: u16 = 8000;

/// Where the backend lives, derived from the base URL of its HTTP API.
///
/// Sockets use `wss` exactly when the API is served over `https`, and always
/// target the API host on `ws_port`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    base: String,
    secure: bool,
    hostname: String,
    ws_port: u16,
}

impl Endpoint {
    pub fn parse(base: &str, ws_port: u16) -> anyhow::Result<Endpoint> {
        let uri: http::Uri = base
            .parse()
            .with_context(|| format!("parsing API base url {base:?}"))?;
        let secure = match uri.scheme_str() {
            Some("https") => true,
            Some("http") => false,
            s => return Err(anyhow!("unsupported scheme {s:?} in API base url {base:?}")),
        };
        let hostname = uri
            .host()
            .ok_or_else(|| anyhow!("API base url {base:?} has no host"))?
            .to_string();
        Ok(Endpoint {
            base: String::from(base.trim_end_matches('/')),
            secure,
            hostname,
            ws_port,
        })
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// URL of an API path, `path` starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn socket_url(&self, document: &DocumentId, token: Option<&AuthToken>) -> String {
        let scheme = match self.secure {
            true => "wss",
            false => "ws",
        };
        let mut url = format!(
            "{scheme}://{}:{}/ws/document/{}/",
            self.hostname, self.ws_port, document
        );
        if let Some(token) = token {
            url.push_str("?token=");
            url.push_str(token.as_str());
        }
        url
    }
}
