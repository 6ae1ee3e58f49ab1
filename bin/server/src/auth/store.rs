//! Session persistence.
//!
//! Sessions are stored server-side and looked up by the ID in the signed
//! session cookie. Two backends implement [`SessionStore`]: the in-memory
//! [`MemorySessionStore`] and the PostgreSQL-backed
//! [`PgSessionStore`](super::db::PgSessionStore).

use async_trait::async_trait;
use log_gateway_access::Session;
use log_gateway_core::SessionId;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

/// Keyed session persistence with absolute expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session if it exists and has not expired.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;

    /// Inserts or replaces the session.
    async fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Removes the session. Removing an unknown session is not an error.
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Removes every expired session, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, SessionStoreError>;
}

/// Session storage errors.
#[derive(Debug)]
pub enum SessionStoreError {
    /// The backend could not be reached or rejected the operation.
    Backend { details: String },
    /// A stored session could not be decoded.
    Corrupt { session_id: String, details: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { details } => write!(f, "session backend error: {}", details),
            Self::Corrupt {
                session_id,
                details,
            } => write!(f, "session '{}' is corrupt: {}", session_id, details),
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Process-local session store.
///
/// Sessions are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored session, expired ones included.
    #[cfg(test)]
    pub async fn sessions(&self) -> Vec<Session> {
        self.sessions.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).filter(|s| !s.is_expired()).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}
