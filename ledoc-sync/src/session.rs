use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use ledoc_api::AuthToken;
use parking_lot::{Mutex, RwLock};

/// Token shared by a context and every client built from it
pub(crate) type SharedToken = Arc<RwLock<Option<AuthToken>>>;

/// Where the bearer token survives between runs
pub trait TokenStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<AuthToken>>;
    fn save(&self, token: &AuthToken) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore(Mutex<Option<AuthToken>>);

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> anyhow::Result<Option<AuthToken>> {
        Ok(self.0.lock().clone())
    }

    fn save(&self, token: &AuthToken) -> anyhow::Result<()> {
        *self.0.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.0.lock() = None;
        Ok(())
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
struct StoredToken {
    access_token: AuthToken,
}

/// Token kept as `{"access_token": ...}` in a JSON file
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> FileTokenStore {
        FileTokenStore { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> anyhow::Result<Option<AuthToken>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading token file {:?}", self.path))
            }
        };
        let stored: StoredToken = serde_json::from_slice(&data)
            .with_context(|| format!("parsing token file {:?}", self.path))?;
        Ok(Some(stored.access_token))
    }

    fn save(&self, token: &AuthToken) -> anyhow::Result<()> {
        let data = serde_json::to_vec(&StoredToken {
            access_token: token.clone(),
        })
        .context("serializing token")?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing token file {:?}", self.path))
    }

    fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing token file {:?}", self.path))
            }
            _ => Ok(()),
        }
    }
}

/// Who the client is acting as. Everything that needs the token (HTTP bearer
/// header, socket query parameter) reads it from here, so that logging out
/// also logs out the clients created earlier.
pub struct AuthContext {
    store: Box<dyn TokenStore>,
    token: SharedToken,
}

impl AuthContext {
    pub fn anonymous() -> AuthContext {
        AuthContext {
            store: Box::new(MemoryTokenStore::default()),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Context logged in as `token`, not persisted anywhere
    pub fn with_token(token: AuthToken) -> AuthContext {
        AuthContext {
            store: Box::new(MemoryTokenStore(Mutex::new(Some(token.clone())))),
            token: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Context resumed from whatever `store` remembers
    pub fn restore(store: Box<dyn TokenStore>) -> anyhow::Result<AuthContext> {
        let token = store.load().context("restoring auth token")?;
        Ok(AuthContext {
            store,
            token: Arc::new(RwLock::new(token)),
        })
    }

    pub fn login(&mut self, token: AuthToken) -> anyhow::Result<()> {
        self.store.save(&token).context("persisting auth token")?;
        *self.token.write() = Some(token);
        tracing::info!("logged in");
        Ok(())
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        *self.token.write() = None;
        self.store.clear().context("forgetting auth token")?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.read().is_some()
    }

    pub(crate) fn shared_token(&self) -> SharedToken {
        self.token.clone()
    }
}
