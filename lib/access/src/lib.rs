//! Identity-side domain types for log-gateway.
//!
//! This crate provides:
//! - OIDC provider configuration (`OidcConfig`) and logout URL construction
//! - The server-side session record (`Session`) and its login transitions
//! - The identity established by a callback (`UserProfile`, `TokenSet`)
//! - Per-request authentication status (`AuthStatus`)
//! - The callback failure taxonomy (`AuthFlowError`)
//!
//! # Example
//!
//! ```
//! use chrono::Duration;
//! use log_gateway_access::{AuthStatus, PendingLogin, Session, TokenSet, UserProfile};
//! use log_gateway_core::SessionId;
//!
//! let mut session = Session::new(SessionId::new(), Duration::hours(24));
//! session.begin_login(PendingLogin::new("S1".to_string(), "N1".to_string()));
//!
//! let pending = session.take_pending_login().expect("login in progress");
//! assert!(pending.state_matches("S1"));
//!
//! session.complete_login(
//!     UserProfile::new("u1").with_email(Some("a@b.com".to_string())),
//!     TokenSet { access_token: "at".to_string(), id_token: None, refresh_token: None },
//! );
//! assert!(AuthStatus::from_session(Some(&session)).is_authenticated());
//! ```

pub mod auth;
pub mod error;
pub mod oidc;
pub mod profile;
pub mod session;

pub use auth::{AuthStatus, PendingLogin};
pub use error::AuthFlowError;
pub use oidc::{InvalidOidcUrl, OidcConfig, OidcConfigBuilder};
pub use profile::{TokenSet, UserProfile};
pub use session::Session;
