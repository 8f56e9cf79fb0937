use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};
use ledoc_api::AuthToken;
use parking_lot::{Mutex, MutexGuard};

use crate::{DocumentFeeds, Error, MockServer};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: Db,
    pub feeds: DocumentFeeds,
}

/// Shared handle on the in-memory backend
#[derive(Clone)]
pub struct Db(Arc<Mutex<MockServer>>);

impl Db {
    pub fn new(server: MockServer) -> Db {
        Db(Arc::new(Mutex::new(server)))
    }

    pub fn lock(&self) -> MutexGuard<'_, MockServer> {
        self.0.lock()
    }
}

pub struct Auth(pub AuthToken);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Auth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<Auth, Error> {
        match req.headers.get(http::header::AUTHORIZATION) {
            None => Err(Error::permission_denied()),
            Some(auth) => {
                let auth = auth.to_str().map_err(|_| Error::permission_denied())?;
                let mut auth = auth.split(' ');
                if !auth
                    .next()
                    .ok_or(Error::permission_denied())?
                    .eq_ignore_ascii_case("bearer")
                {
                    return Err(Error::permission_denied());
                }
                let token = auth.next().ok_or(Error::permission_denied())?;
                if auth.next().is_some() || token.is_empty() {
                    return Err(Error::permission_denied());
                }
                Ok(Auth(AuthToken(String::from(token))))
            }
        }
    }
}
