//! HTTP router.

use axum::{Router, routing::get};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::error::handle_panic;
use crate::{logs, pages};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::landing))
        .route("/health", get(pages::health))
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/api/logs", get(logs::fetch_logs))
        .fallback(pages::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::routes::FAILURE_REDIRECT;
    use crate::auth::{MemorySessionStore, SessionStore};
    use crate::config::LogsConfig;
    use crate::test_support::{AUTHORIZE_ENDPOINT, FakeLogStore, TestState, UndestroyableSessionStore};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use log_gateway_logstore::{LogEvent, LogPage, LogQuery, LogStoreError};
    use std::sync::Arc;
    use tower::ServiceExt;
    use url::Url;

    async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("infallible")
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("location header")
            .to_string()
    }

    /// The `name=value` part of the response's session cookie.
    fn session_cookie(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("session="))
            .and_then(|v| v.split(';').next())
            .expect("session cookie")
            .to_string()
    }

    fn query_param(url: &str, name: &str) -> String {
        Url::parse(url)
            .expect("absolute url")
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_else(|| panic!("missing {name} in {url}"))
    }

    /// Starts a login and returns the session cookie plus the issued state.
    async fn begin_login(app: &Router) -> (String, String) {
        let response = get(app, "/login", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let state = query_param(&location(&response), "state");
        (session_cookie(&response), state)
    }

    /// Completes a full login and returns the authenticated session cookie.
    async fn log_in(app: &Router) -> String {
        let (cookie, state) = begin_login(app).await;
        let response = get(app, &format!("/callback?code=ABC&state={state}"), Some(&cookie)).await;
        assert_eq!(location(&response), "/");
        session_cookie(&response)
    }

    fn event(n: i64) -> LogEvent {
        LogEvent {
            timestamp: Some(n),
            message: Some(format!("line {n}")),
            ingestion_time: Some(n + 1),
        }
    }

    #[tokio::test]
    async fn health_reports_readiness() {
        let ready = router(TestState::new().build());
        let body = json(get(&ready, "/health", None).await).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["oidcClientReady"], true);
        assert!(body["timestamp"].is_string());

        let not_ready = router(TestState::new().not_ready().build());
        let response = get(&not_ready, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["oidcClientReady"], false);
    }

    #[tokio::test]
    async fn flow_routes_are_unavailable_until_ready() {
        let app = router(TestState::new().not_ready().build());

        for uri in ["/login", "/callback?code=ABC&state=S1"] {
            let response = get(&app, uri, None).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(
                json(response).await,
                serde_json::json!({"error": "Authentication service not ready"})
            );
        }
    }

    #[tokio::test]
    async fn login_redirects_with_fresh_state_and_nonce() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());

        let response = get(&app, "/login", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let target = location(&response);
        assert!(target.starts_with(AUTHORIZE_ENDPOINT));
        let state = query_param(&target, "state");
        let nonce = query_param(&target, "nonce");

        let sessions = store.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pending_state(), Some(state.as_str()));
        assert_eq!(sessions[0].pending_nonce(), Some(nonce.as_str()));

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie");
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn repeated_login_issues_new_state() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());

        let (cookie, first) = begin_login(&app).await;
        let response = get(&app, "/login", Some(&cookie)).await;
        let second = query_param(&location(&response), "state");

        assert_ne!(first, second);
        let sessions = store.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pending_state(), Some(second.as_str()));
    }

    #[tokio::test]
    async fn login_callback_then_landing_shows_profile() {
        let app = router(TestState::new().build());
        let (cookie, state) = begin_login(&app).await;

        let response = get(&app, &format!("/callback?code=ABC&state={state}"), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/");
        let authenticated = session_cookie(&response);

        let body = json(get(&app, "/", Some(&authenticated)).await).await;
        assert_eq!(body["isAuthenticated"], true);
        assert_eq!(body["userInfo"]["sub"], "u1");
        assert_eq!(body["userInfo"]["email"], "a@b.com");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn successful_callback_rotates_session_id() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());
        let (pre_login, state) = begin_login(&app).await;
        let pre_login_id = store.sessions().await[0].id();

        let response = get(&app, &format!("/callback?code=ABC&state={state}"), Some(&pre_login)).await;
        let authenticated = session_cookie(&response);
        assert_ne!(authenticated, pre_login);

        let sessions = store.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_ne!(sessions[0].id(), pre_login_id);
        assert!(sessions[0].is_authenticated());

        let body = json(get(&app, "/", Some(&pre_login)).await).await;
        assert_eq!(body["isAuthenticated"], false);
    }

    #[tokio::test]
    async fn failed_relogin_returns_session_to_anonymous() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());
        let cookie = log_in(&app).await;

        let response = get(&app, "/login", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let awaiting = json(get(&app, "/", Some(&cookie)).await).await;
        assert_eq!(awaiting["isAuthenticated"], false);

        let failed = get(&app, "/callback?code=ABC&state=forged", Some(&cookie)).await;
        assert_eq!(location(&failed), FAILURE_REDIRECT);

        let body = json(get(&app, "/", Some(&cookie)).await).await;
        assert_eq!(body["isAuthenticated"], false);
        assert_eq!(body["userInfo"], serde_json::json!({}));

        let sessions = store.sessions().await;
        assert!(sessions[0].user_profile().is_none());
        assert!(sessions[0].token_set().is_none());
    }

    #[tokio::test]
    async fn unparseable_callback_query_fails_and_spends_pending_login() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());
        let (cookie, state) = begin_login(&app).await;

        let duplicated = get(
            &app,
            &format!("/callback?code=ABC&state={state}&state=other"),
            Some(&cookie),
        )
        .await;
        assert_eq!(duplicated.status(), StatusCode::FOUND);
        assert_eq!(location(&duplicated), FAILURE_REDIRECT);

        let sessions = store.sessions().await;
        assert!(sessions[0].pending_state().is_none());
        assert!(sessions[0].pending_nonce().is_none());

        let retried = get(&app, &format!("/callback?code=ABC&state={state}"), Some(&cookie)).await;
        assert_eq!(location(&retried), FAILURE_REDIRECT);
    }

    #[tokio::test]
    async fn state_mismatch_fails_and_clears_pending_login() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());
        let (cookie, _) = begin_login(&app).await;

        let response = get(&app, "/callback?code=ABC&state=forged", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), FAILURE_REDIRECT);

        let sessions = store.sessions().await;
        assert!(!sessions[0].is_authenticated());
        assert!(sessions[0].pending_state().is_none());
        assert!(sessions[0].pending_nonce().is_none());

        let body = json(get(&app, "/", Some(&cookie)).await).await;
        assert_eq!(body["isAuthenticated"], false);
        assert_eq!(body["userInfo"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn pending_login_is_spent_by_a_failed_callback() {
        let app = router(TestState::new().build());
        let (cookie, state) = begin_login(&app).await;

        let failed = get(&app, "/callback?code=ABC&state=forged", Some(&cookie)).await;
        assert_eq!(location(&failed), FAILURE_REDIRECT);

        let retried = get(&app, &format!("/callback?code=ABC&state={state}"), Some(&cookie)).await;
        assert_eq!(location(&retried), FAILURE_REDIRECT);

        let body = json(get(&app, "/", Some(&cookie)).await).await;
        assert_eq!(body["isAuthenticated"], false);
    }

    #[tokio::test]
    async fn replayed_callback_fails() {
        let app = router(TestState::new().build());
        let (cookie, state) = begin_login(&app).await;
        let callback = format!("/callback?code=ABC&state={state}");

        assert_eq!(location(&get(&app, &callback, Some(&cookie)).await), "/");
        assert_eq!(
            location(&get(&app, &callback, Some(&cookie)).await),
            FAILURE_REDIRECT
        );
    }

    #[tokio::test]
    async fn callback_failures_redirect_generically() {
        let app = router(TestState::new().build());

        let no_session = get(&app, "/callback?code=ABC&state=S1", None).await;
        assert_eq!(location(&no_session), FAILURE_REDIRECT);

        let (cookie, _) = begin_login(&app).await;
        let rejected = get(
            &app,
            "/callback?error=access_denied&error_description=User+cancelled",
            Some(&cookie),
        )
        .await;
        assert_eq!(location(&rejected), FAILURE_REDIRECT);

        let (cookie, state) = begin_login(&app).await;
        let bad_code = get(&app, &format!("/callback?code=WRONG&state={state}"), Some(&cookie)).await;
        assert_eq!(location(&bad_code), FAILURE_REDIRECT);
    }

    #[tokio::test]
    async fn landing_echoes_error_indicator() {
        let app = router(TestState::new().build());
        let body = json(get(&app, "/?error=authentication_failed", None).await).await;

        assert_eq!(body["isAuthenticated"], false);
        assert_eq!(body["error"], "authentication_failed");
    }

    #[tokio::test]
    async fn forged_cookie_is_anonymous() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());
        log_in(&app).await;

        let session_id = store.sessions().await[0].id();
        let forged = format!("session={session_id}");

        let body = json(get(&app, "/", Some(&forged)).await).await;
        assert_eq!(body["isAuthenticated"], false);
    }

    #[tokio::test]
    async fn logout_destroys_session_and_redirects_to_provider() {
        let store = Arc::new(MemorySessionStore::new());
        let app = router(TestState::new().sessions(store.clone()).build());
        let cookie = log_in(&app).await;

        let response = get(&app, "/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://auth.example.com/logout?client_id=client-123&logout_uri=https%3A%2F%2Fgateway.example.com"
        );
        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("removal cookie");
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));

        assert!(store.sessions().await.is_empty());
        let body = json(get(&app, "/", Some(&cookie)).await).await;
        assert_eq!(body["isAuthenticated"], false);
    }

    #[tokio::test]
    async fn logout_redirects_even_when_destroy_fails() {
        let store: Arc<dyn SessionStore> = Arc::new(UndestroyableSessionStore::default());
        let app = router(TestState::new().sessions(store).build());
        let (cookie, _) = begin_login(&app).await;

        let response = get(&app, "/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(location(&response).starts_with("https://auth.example.com/logout?client_id=client-123"));
    }

    #[tokio::test]
    async fn logout_without_session_still_redirects() {
        let app = router(TestState::new().not_ready().build());
        let response = get(&app, "/logout", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn logs_pass_page_through_within_limit() {
        let page = LogPage {
            events: (1..=5).map(event).collect(),
            next_forward_token: Some("f/00000000000000000000000000000000000000000000000000000001".to_string()),
            next_backward_token: Some("b/00000000000000000000000000000000000000000000000000000001".to_string()),
        };
        let store = Arc::new(FakeLogStore::page(page));
        let config = LogsConfig {
            limit: 3,
            ..LogsConfig::default()
        };
        let app = router(TestState::new().logs(store.clone()).logs_config(config).build());

        let response = get(&app, "/api/logs", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["events"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["events"][0]["message"], "line 1");
        assert_eq!(body["events"][0]["ingestionTime"], 2);
        assert_eq!(
            body["nextForwardToken"],
            "f/00000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(
            body["nextBackwardToken"],
            "b/00000000000000000000000000000000000000000000000000000001"
        );
        assert!(body["timestamp"].is_string());

        assert_eq!(store.queries(), vec![LogQuery::new("test", "custom", 3)]);
    }

    #[tokio::test]
    async fn log_store_failure_carries_supplied_metadata() {
        let err = LogStoreError::new("The specified log group does not exist.")
            .with_code(Some("ResourceNotFoundException".to_string()))
            .with_request_id(Some("req-123".to_string()));
        let app = router(
            TestState::new()
                .logs(Arc::new(FakeLogStore::failing(err)))
                .build(),
        );

        let response = get(&app, "/api/logs", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json(response).await;
        assert_eq!(body["error"], "The specified log group does not exist.");
        assert_eq!(
            body["details"],
            serde_json::json!({"code": "ResourceNotFoundException", "requestId": "req-123"})
        );
    }

    #[tokio::test]
    async fn log_store_failure_without_metadata() {
        let app = router(
            TestState::new()
                .logs(Arc::new(FakeLogStore::failing(LogStoreError::new(
                    "request to log store timed out",
                ))))
                .build(),
        );

        let response = get(&app, "/api/logs", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(response).await["details"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn logs_enforce_auth_only_when_enabled() {
        let config = LogsConfig {
            require_auth: true,
            ..LogsConfig::default()
        };
        let app = router(TestState::new().logs_config(config).build());

        let response = get(&app, "/api/logs", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "Unauthorized");

        let cookie = log_in(&app).await;
        let response = get(&app, "/api/logs", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_structured_404() {
        let app = router(TestState::new().build());
        let response = get(&app, "/nope/here", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json(response).await;
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/nope/here");
        assert!(body["timestamp"].is_string());
    }
}
