//! Landing state, health check, and the not-found responder.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use log_gateway_access::UserProfile;
use log_gateway_core::iso_timestamp;
use serde::{Deserialize, Serialize};

use crate::auth::{AppState, CurrentAuth};

/// Query parameters accepted by the landing route.
#[derive(Debug, Deserialize)]
pub struct LandingQuery {
    pub error: Option<String>,
}

/// What the landing page renders from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    pub is_authenticated: bool,
    /// The profile when authenticated, an empty object otherwise.
    pub user_info: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /`: the caller's authentication status.
pub async fn landing(
    CurrentAuth(auth): CurrentAuth,
    Query(query): Query<LandingQuery>,
) -> Json<LandingView> {
    let user_info = auth
        .profile()
        .and_then(|p: &UserProfile| serde_json::to_value(p).ok())
        .unwrap_or_else(|| serde_json::json!({}));

    Json(LandingView {
        is_authenticated: auth.is_authenticated(),
        user_info,
        error: query.error,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub oidc_client_ready: bool,
}

/// `GET /health`: liveness plus identity client readiness.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: iso_timestamp(),
        oidc_client_ready: state.identity.is_ready(),
    })
}

#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub error: &'static str,
    pub path: String,
    pub timestamp: String,
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> Response {
    let body = NotFoundBody {
        error: "Not Found",
        path: uri.path().to_string(),
        timestamp: iso_timestamp(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
