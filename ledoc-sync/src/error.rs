use ledoc_api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error was caught locally, before any request was made
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(ApiError::NotFound(_)))
    }
}
