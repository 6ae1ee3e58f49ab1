//! Authentication routes for login, callback, and logout.
//!
//! The login flow is a small state machine stored in the session:
//! `/login` records a fresh state/nonce pair and redirects to the provider,
//! `/callback` consumes that pair exactly once and, if everything checks out,
//! records the user's profile and tokens under a freshly issued session ID.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use log_gateway_access::{AuthFlowError, PendingLogin, Session, TokenSet, UserProfile};
use log_gateway_core::SessionId;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{
    AppState, RequireIdentityClient, cookies,
    oidc::{IdentityProvider, new_pending_login},
    store::SessionStoreError,
};
use crate::error::AppError;

/// Where a failed callback sends the browser.
pub const FAILURE_REDIRECT: &str = "/?error=authentication_failed";

/// Query parameters for the OIDC callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Builds a 302 redirect.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

async fn load_session(
    state: &AppState,
    jar: &SignedCookieJar,
) -> Result<Option<Session>, SessionStoreError> {
    match cookies::session_id(jar) {
        Some(id) => state.sessions.load(&id).await,
        None => Ok(None),
    }
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
pub async fn login(
    RequireIdentityClient(provider): RequireIdentityClient,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let mut session = match load_session(&state, &jar).await? {
        Some(session) => session,
        None => Session::new(SessionId::new(), state.session_config.ttl()),
    };

    let pending = new_pending_login();
    let auth_url = provider.authorization_url(&pending);
    session.begin_login(pending);
    state.sessions.save(&session).await?;

    debug!(session_id = %session.id(), "redirecting to identity provider");

    let cookie = cookies::session_cookie(&session, state.session_config.secure_cookies);
    Ok((jar.add(cookie), found(&auth_url)))
}

/// Handles the OIDC callback after the user authenticates with the identity provider.
pub async fn callback(
    RequireIdentityClient(provider): RequireIdentityClient,
    State(state): State<AppState>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    jar: SignedCookieJar,
) -> Response {
    let query = query
        .map(|Query(query)| query)
        .map_err(|e| AuthFlowError::MalformedCallback {
            details: e.body_text(),
        });

    match complete_callback(&state, provider.as_ref(), query, &jar).await {
        Ok(session) => {
            if let Some(profile) = session.user_profile() {
                info!(user = %profile.log_identity(), session_id = %session.id(), "user logged in");
            }
            let cookie = cookies::session_cookie(&session, state.session_config.secure_cookies);
            (jar.add(cookie), found("/")).into_response()
        }
        Err(report) => {
            warn!(error = %report, "authentication failed");
            found(FAILURE_REDIRECT)
        }
    }
}

fn storage_failure(e: SessionStoreError) -> AuthFlowError {
    AuthFlowError::SessionStorage {
        details: e.to_string(),
    }
}

/// Consumes the session's pending login and, on success, records the identity
/// and moves the session to a new ID.
async fn complete_callback(
    state: &AppState,
    provider: &dyn IdentityProvider,
    query: Result<CallbackQuery, AuthFlowError>,
    jar: &SignedCookieJar,
) -> log_gateway_core::Result<Session, AuthFlowError> {
    let mut session = load_session(state, jar)
        .await
        .map_err(storage_failure)?
        .ok_or(AuthFlowError::NoPendingLogin)?;

    // The pair is spent before the provider is contacted.
    let pending = session.take_pending_login();
    state.sessions.save(&session).await.map_err(storage_failure)?;

    let query = query?;
    let (profile, tokens) = authenticate(provider, &query, pending).await?;

    let anonymous_id = session.id();
    session.complete_login(profile, tokens);
    session.reissue(SessionId::new());
    state.sessions.save(&session).await.map_err(storage_failure)?;

    if let Err(e) = state.sessions.destroy(&anonymous_id).await {
        warn!(error = %e, session_id = %anonymous_id, "failed to destroy pre-login session");
    }

    Ok(session)
}

/// Validates the callback against the pending login, then exchanges the code
/// and fetches the profile bound to the ID token's subject.
async fn authenticate(
    provider: &dyn IdentityProvider,
    query: &CallbackQuery,
    pending: Option<PendingLogin>,
) -> log_gateway_core::Result<(UserProfile, TokenSet), AuthFlowError> {
    if let Some(error) = &query.error {
        debug!(description = ?query.error_description, "provider returned an error");
        return Err(AuthFlowError::ProviderRejected {
            error: error.clone(),
        }
        .into());
    }

    let pending = pending.ok_or(AuthFlowError::NoPendingLogin)?;
    let returned_state = query.state.as_deref().ok_or(AuthFlowError::MissingState)?;
    if !pending.state_matches(returned_state) {
        return Err(AuthFlowError::StateMismatch.into());
    }
    let code = query.code.as_deref().ok_or(AuthFlowError::MissingCode)?;

    let exchange = provider
        .exchange_code(code, pending.nonce())
        .await
        .map_err(|e| AuthFlowError::TokenExchange {
            details: e.to_string(),
        })?;

    let profile = provider
        .user_info(&exchange.tokens.access_token, &exchange.subject)
        .await
        .map_err(|e| AuthFlowError::ProfileFetch {
            details: e.to_string(),
        })?;

    Ok((profile, exchange.tokens))
}

/// Logs out the user by destroying their session and redirecting to the
/// provider's logout endpoint.
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(session_id) = cookies::session_id(&jar) {
        match state.sessions.destroy(&session_id).await {
            Ok(()) => info!(session_id = %session_id, "session destroyed"),
            Err(e) => warn!(error = %e, session_id = %session_id, "failed to destroy session"),
        }
    }

    let logout_url = state.oidc_config.logout_url()?;
    Ok((jar.remove(cookies::removal_cookie()), found(logout_url.as_str())))
}
