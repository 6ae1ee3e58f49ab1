//! Server-side session records.
//!
//! A session is keyed by the opaque ID carried in the browser's signed
//! cookie. It moves through the login flow via explicit transitions:
//!
//! - [`Session::begin_login`] stores a fresh state/nonce pair before the
//!   authorization redirect, overwriting any earlier pair and dropping any
//!   identity from an earlier login.
//! - [`Session::take_pending_login`] removes that pair when the callback
//!   arrives, so it can be checked exactly once.
//! - [`Session::complete_login`] records the profile and tokens after a
//!   successful exchange.
//! - [`Session::reissue`] moves the record to a new ID once the identity
//!   changes, leaving its expiry untouched.
//!
//! Sessions expire at a fixed instant set on creation; activity never
//! extends them.

use chrono::{DateTime, Duration, Utc};
use log_gateway_core::SessionId;
use serde::{Deserialize, Serialize};

use crate::auth::PendingLogin;
use crate::profile::{TokenSet, UserProfile};

/// Represents one browser's server-side session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// When the session expires, regardless of activity.
    expires_at: DateTime<Utc>,
    /// Anti-CSRF token awaiting its callback.
    pending_state: Option<String>,
    /// Anti-replay token awaiting its callback.
    pending_nonce: Option<String>,
    /// Claims from the provider, present only after a successful callback.
    user_profile: Option<UserProfile>,
    /// Tokens from the provider, present only after a successful callback.
    token_set: Option<TokenSet>,
}

impl Session {
    /// Creates an empty session that lives for `ttl`.
    #[must_use]
    pub fn new(id: SessionId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            expires_at: now + ttl,
            pending_state: None,
            pending_nonce: None,
            user_profile: None,
            token_set: None,
        }
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the time left before expiry, zero once expired.
    #[must_use]
    pub fn remaining_lifetime(&self) -> Duration {
        (self.expires_at - Utc::now()).max(Duration::zero())
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns the anti-CSRF token awaiting a callback, if any.
    #[must_use]
    pub fn pending_state(&self) -> Option<&str> {
        self.pending_state.as_deref()
    }

    /// Returns the anti-replay token awaiting a callback, if any.
    #[must_use]
    pub fn pending_nonce(&self) -> Option<&str> {
        self.pending_nonce.as_deref()
    }

    /// Returns the authenticated user's profile, if any.
    #[must_use]
    pub fn user_profile(&self) -> Option<&UserProfile> {
        self.user_profile.as_ref()
    }

    /// Returns the provider tokens, if any.
    #[must_use]
    pub fn token_set(&self) -> Option<&TokenSet> {
        self.token_set.as_ref()
    }

    /// Returns true when a profile is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_profile.is_some()
    }

    /// Records a new login attempt, replacing any earlier pending pair.
    ///
    /// The session is anonymous until the matching callback succeeds.
    pub fn begin_login(&mut self, pending: PendingLogin) {
        let (state, nonce) = pending.into_parts();
        self.pending_state = Some(state);
        self.pending_nonce = Some(nonce);
        self.user_profile = None;
        self.token_set = None;
    }

    /// Removes and returns the pending state/nonce pair.
    ///
    /// Both fields are cleared even when only one of them was present; a
    /// pair is returned only when both were.
    pub fn take_pending_login(&mut self) -> Option<PendingLogin> {
        let state = self.pending_state.take();
        let nonce = self.pending_nonce.take();
        match (state, nonce) {
            (Some(state), Some(nonce)) => Some(PendingLogin::new(state, nonce)),
            _ => None,
        }
    }

    /// Moves the session to `id`. Creation and expiry times are kept.
    pub fn reissue(&mut self, id: SessionId) {
        self.id = id;
    }

    /// Records the identity established by a successful callback.
    pub fn complete_login(&mut self, profile: UserProfile, tokens: TokenSet) {
        self.pending_state = None;
        self.pending_nonce = None;
        self.user_profile = Some(profile);
        self.token_set = Some(tokens);
    }
}
