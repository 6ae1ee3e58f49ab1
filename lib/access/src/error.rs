//! Error types for the access crate.
//!
//! `AuthFlowError` names every way a callback can fail. Its `Display` text
//! goes to the server log only; clients see a generic failure indicator.

use std::fmt;

/// Failures while completing an OIDC callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowError {
    /// The provider redirected back with an `error` parameter.
    ProviderRejected { error: String },
    /// The session held no pending login to match against.
    NoPendingLogin,
    /// The callback query string could not be parsed.
    MalformedCallback { details: String },
    /// The callback carried no `state` parameter.
    MissingState,
    /// The returned `state` differs from the stored one.
    StateMismatch,
    /// The callback carried no authorization code.
    MissingCode,
    /// The token endpoint rejected the code or the ID token failed validation.
    TokenExchange { details: String },
    /// The userinfo endpoint call failed.
    ProfileFetch { details: String },
    /// Reading or writing the session failed.
    SessionStorage { details: String },
}

impl fmt::Display for AuthFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderRejected { error } => {
                write!(f, "provider returned error: {error}")
            }
            Self::NoPendingLogin => write!(f, "no pending login in session"),
            Self::MalformedCallback { details } => {
                write!(f, "callback query is malformed: {details}")
            }
            Self::MissingState => write!(f, "callback is missing the state parameter"),
            Self::StateMismatch => write!(f, "callback state does not match session"),
            Self::MissingCode => write!(f, "callback is missing the authorization code"),
            Self::TokenExchange { details } => {
                write!(f, "token exchange failed: {details}")
            }
            Self::ProfileFetch { details } => {
                write!(f, "profile fetch failed: {details}")
            }
            Self::SessionStorage { details } => {
                write!(f, "session storage failed: {details}")
            }
        }
    }
}

impl std::error::Error for AuthFlowError {}
