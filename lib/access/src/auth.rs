//! Authentication status and login-flow values.

use crate::profile::UserProfile;
use crate::session::Session;

/// The state/nonce pair generated for one login attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingLogin {
    state: String,
    nonce: String,
}

impl PendingLogin {
    /// Creates a pending login from its anti-CSRF and anti-replay tokens.
    #[must_use]
    pub fn new(state: String, nonce: String) -> Self {
        Self { state, nonce }
    }

    /// Returns the anti-CSRF token.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the anti-replay token.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns whether `returned` is exactly the stored state.
    #[must_use]
    pub fn state_matches(&self, returned: &str) -> bool {
        self.state == returned
    }

    pub(crate) fn into_parts(self) -> (String, String) {
        (self.state, self.nonce)
    }
}

impl std::fmt::Debug for PendingLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLogin").finish_non_exhaustive()
    }
}

/// Per-request authentication status.
///
/// Computed from session contents alone; it never calls the provider and
/// never denies a request on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// No session, or a session without a profile.
    #[default]
    Anonymous,
    /// The session holds a profile from a successful callback.
    Authenticated(Box<UserProfile>),
}

impl AuthStatus {
    /// Derives the status from an optional session.
    #[must_use]
    pub fn from_session(session: Option<&Session>) -> Self {
        match session.and_then(Session::user_profile) {
            Some(profile) => Self::Authenticated(Box::new(profile.clone())),
            None => Self::Anonymous,
        }
    }

    /// Returns true for [`AuthStatus::Authenticated`].
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the profile when authenticated.
    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(profile) => Some(profile),
            Self::Anonymous => None,
        }
    }
}
