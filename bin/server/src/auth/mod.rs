//! Authentication module for the log gateway.
//!
//! This module provides:
//! - OIDC authentication against an external identity provider
//! - Server-side session management (in-memory or PostgreSQL)
//! - Readiness and authentication extractors for Axum routes
//!
//! # Gating model
//!
//! Two extractors sit in front of handlers:
//! - [`RequireIdentityClient`] rejects with 503 until provider discovery has
//!   completed and the client is installed in [`IdentityClientSlot`].
//! - [`CurrentAuth`] computes the caller's [`AuthStatus`] from the session
//!   alone. It never denies a request; handlers decide what to enforce.
//!
//! [`AuthStatus`]: log_gateway_access::AuthStatus

pub mod cookies;
pub mod db;
pub mod middleware;
pub mod oidc;
pub mod routes;
pub mod store;

use crate::config::{LogsConfig, SessionConfig};
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use log_gateway_access::OidcConfig;
use log_gateway_logstore::LogStore;
use std::sync::Arc;

pub use db::PgSessionStore;
pub use middleware::{CurrentAuth, RequireIdentityClient};
pub use oidc::{IdentityClientSlot, IdentityProvider, OidcClient};
pub use routes::{callback, login, logout};
pub use store::{MemorySessionStore, SessionStore, SessionStoreError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Identity client, installed once discovery succeeds.
    pub identity: IdentityClientSlot,
    /// Session persistence.
    pub sessions: Arc<dyn SessionStore>,
    /// Log store the `/api/logs` route reads from.
    pub logs: Arc<dyn LogStore>,
    /// OIDC settings, used for logout URL construction.
    pub oidc_config: Arc<OidcConfig>,
    /// Session configuration.
    pub session_config: Arc<SessionConfig>,
    /// Log retrieval configuration.
    pub logs_config: Arc<LogsConfig>,
    /// Key the session cookie is signed with.
    pub cookie_key: Key,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        identity: IdentityClientSlot,
        sessions: Arc<dyn SessionStore>,
        logs: Arc<dyn LogStore>,
        oidc_config: OidcConfig,
        session_config: SessionConfig,
        logs_config: LogsConfig,
        cookie_key: Key,
    ) -> Self {
        Self {
            identity,
            sessions,
            logs,
            oidc_config: Arc::new(oidc_config),
            session_config: Arc::new(session_config),
            logs_config: Arc::new(logs_config),
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
