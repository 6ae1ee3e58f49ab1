//! `/api/logs`: one page from the log store under a fixed query.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log_gateway_core::iso_timestamp;
use log_gateway_logstore::{LogPage, LogStoreError};
use serde::Serialize;
use tracing::{error, info};

use crate::auth::{AppState, CurrentAuth};

/// Successful `/api/logs` body.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub timestamp: String,
    #[serde(flatten)]
    pub page: LogPage,
}

/// Failed `/api/logs` body.
#[derive(Debug, Serialize)]
pub struct LogsErrorBody {
    pub error: String,
    pub timestamp: String,
    pub details: LogsErrorDetails,
}

/// Provider metadata attached to a failure. Only what the provider supplied
/// is present.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cf_id: Option<String>,
}

impl From<&LogStoreError> for LogsErrorBody {
    fn from(e: &LogStoreError) -> Self {
        Self {
            error: e.message().to_string(),
            timestamp: iso_timestamp(),
            details: LogsErrorDetails {
                code: e.code().map(str::to_string),
                request_id: e.request_id().map(str::to_string),
                cf_id: e.cf_id().map(str::to_string),
            },
        }
    }
}

/// Body of a 401 from an enforcing `/api/logs`.
#[derive(Debug, Serialize)]
pub struct UnauthorizedBody {
    pub error: &'static str,
    pub timestamp: String,
}

/// Fetches one page of log events.
///
/// Anonymous callers are served unless `logs.require_auth` is set.
pub async fn fetch_logs(State(state): State<AppState>, CurrentAuth(auth): CurrentAuth) -> Response {
    if state.logs_config.require_auth && !auth.is_authenticated() {
        let body = UnauthorizedBody {
            error: "Unauthorized",
            timestamp: iso_timestamp(),
        };
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let query = state.logs_config.query();
    info!(log_group = %query.log_group, log_stream = %query.log_stream, limit = query.limit, "fetching logs");

    match state.logs.get_log_events(&query).await {
        Ok(page) => {
            let page = page.capped(query.limit);
            info!(events = page.events.len(), "fetched logs");
            Json(LogsResponse {
                timestamp: iso_timestamp(),
                page,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to fetch logs");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(LogsErrorBody::from(&e))).into_response()
        }
    }
}
