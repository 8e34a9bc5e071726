//! Server-side admin sessions.
//!
//! Session tokens are opaque 32-byte random values held only in process
//! memory; restarting the daemon logs every admin out. The cookie carries
//! nothing but the token.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::RngCore;

use switchboard_core::UserId;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "switchboard_session";

/// In-memory session token -> admin user map.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, UserId>>,
}

impl SessionStore {
    /// An empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a user, returning the token.
    pub fn create(&self, user_id: UserId) -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(token.clone(), user_id);
        }
        token
    }

    /// The user behind a token, if the session is live.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<UserId> {
        self.sessions.read().ok()?.get(token).copied()
    }

    /// Drop a session.
    pub fn remove(&self, token: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(token);
        }
    }
}

/// Extract the session token from a `Cookie` header value.
#[must_use]
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}
