//! Readiness and authentication extractors for Axum.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use log_gateway_access::AuthStatus;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::warn;

use super::{AppState, cookies, oidc::IdentityProvider};

/// Extractor for routes that need the identity client.
///
/// Rejects with 503 until provider discovery has completed.
pub struct RequireIdentityClient(pub Arc<dyn IdentityProvider>);

impl<S> FromRequestParts<S> for RequireIdentityClient
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = NotReady;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        app_state.identity.get().map(Self).ok_or(NotReady)
    }
}

/// Rejection for [`RequireIdentityClient`].
#[derive(Debug)]
pub struct NotReady;

impl IntoResponse for NotReady {
    fn into_response(self) -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Authentication service not ready" })),
        )
            .into_response()
    }
}

/// Extractor for the caller's authentication status.
///
/// Reads the session named by the signed cookie and reports whether it holds
/// a profile. Never rejects: a missing, forged, or expired cookie and an
/// unreachable session store all yield [`AuthStatus::Anonymous`].
pub struct CurrentAuth(pub AuthStatus);

impl<S> FromRequestParts<S> for CurrentAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = SignedCookieJar::from_headers(&parts.headers, app_state.cookie_key.clone());

        let Some(session_id) = cookies::session_id(&jar) else {
            return Ok(Self(AuthStatus::Anonymous));
        };

        match app_state.sessions.load(&session_id).await {
            Ok(session) => Ok(Self(AuthStatus::from_session(session.as_ref()))),
            Err(e) => {
                warn!(error = %e, "failed to load session, treating caller as anonymous");
                Ok(Self(AuthStatus::Anonymous))
            }
        }
    }
}
