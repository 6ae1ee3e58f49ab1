//! In-crate fakes shared by the handler and router tests.

use async_trait::async_trait;
use axum_extra::extract::cookie::Key;
use log_gateway_access::{OidcConfig, PendingLogin, Session, TokenSet, UserProfile};
use log_gateway_core::SessionId;
use log_gateway_logstore::{LogPage, LogQuery, LogStore, LogStoreError};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::auth::oidc::{CodeExchange, OidcError};
use crate::auth::{
    AppState, IdentityClientSlot, IdentityProvider, MemorySessionStore, SessionStore,
    SessionStoreError,
};
use crate::config::{LogsConfig, SessionConfig};

pub const AUTHORIZE_ENDPOINT: &str = "https://idp.example.com/oauth2/authorize";
pub const VALID_CODE: &str = "ABC";

/// Identity provider that accepts [`VALID_CODE`] for subject `u1`.
#[derive(Default)]
pub struct FakeProvider {
    nonces: Mutex<Vec<String>>,
    user_info_fails: bool,
}

impl FakeProvider {
    pub fn failing_user_info(mut self) -> Self {
        self.user_info_fails = true;
        self
    }

    /// Nonces passed to `exchange_code`, in call order.
    pub fn nonces_seen(&self) -> Vec<String> {
        self.nonces.lock().expect("nonce lock").clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self, pending: &PendingLogin) -> String {
        let mut url = Url::parse(AUTHORIZE_ENDPOINT).expect("authorize endpoint");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", "client-123")
            .append_pair("state", pending.state())
            .append_pair("nonce", pending.nonce());
        url.to_string()
    }

    async fn exchange_code(
        &self,
        code: &str,
        expected_nonce: &str,
    ) -> Result<CodeExchange, OidcError> {
        self.nonces
            .lock()
            .expect("nonce lock")
            .push(expected_nonce.to_string());

        if code != VALID_CODE {
            return Err(OidcError::TokenExchange("invalid_grant".to_string()));
        }

        Ok(CodeExchange {
            subject: "u1".to_string(),
            tokens: TokenSet {
                access_token: "access-u1".to_string(),
                id_token: Some("id-u1".to_string()),
                refresh_token: None,
            },
        })
    }

    async fn user_info(
        &self,
        _access_token: &str,
        subject: &str,
    ) -> Result<UserProfile, OidcError> {
        if self.user_info_fails {
            return Err(OidcError::UserInfo("503 from userinfo".to_string()));
        }
        Ok(UserProfile::new(subject).with_email(Some("a@b.com".to_string())))
    }
}

/// Log store returning a canned result and recording each query.
pub struct FakeLogStore {
    result: Result<LogPage, LogStoreError>,
    queries: Mutex<Vec<LogQuery>>,
}

impl FakeLogStore {
    pub fn page(page: LogPage) -> Self {
        Self {
            result: Ok(page),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: LogStoreError) -> Self {
        Self {
            result: Err(err),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().expect("query lock").clone()
    }
}

#[async_trait]
impl LogStore for FakeLogStore {
    async fn get_log_events(&self, query: &LogQuery) -> Result<LogPage, LogStoreError> {
        self.queries.lock().expect("query lock").push(query.clone());
        self.result.clone()
    }
}

/// Session store whose `destroy` always fails; everything else is in memory.
#[derive(Default)]
pub struct UndestroyableSessionStore {
    inner: MemorySessionStore,
}

#[async_trait]
impl SessionStore for UndestroyableSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        self.inner.load(id).await
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.inner.save(session).await
    }

    async fn destroy(&self, _id: &SessionId) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Backend {
            details: "store unavailable".to_string(),
        })
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        self.inner.delete_expired().await
    }
}

pub fn oidc_config() -> OidcConfig {
    OidcConfig::builder(
        "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Example".to_string(),
        "client-123".to_string(),
        "shh".to_string(),
        "https://gateway.example.com/callback".to_string(),
    )
    .logout_endpoint("https://auth.example.com/logout".to_string())
    .post_logout_redirect_uri("https://gateway.example.com".to_string())
    .build()
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: "k".repeat(64),
        duration_hours: 24,
        cleanup_interval_seconds: 300,
        secure_cookies: true,
    }
}

/// Builder for test [`AppState`]s.
pub struct TestState {
    pub identity: IdentityClientSlot,
    pub sessions: Arc<dyn SessionStore>,
    pub logs: Arc<dyn LogStore>,
    pub logs_config: LogsConfig,
}

impl TestState {
    /// Ready identity client, in-memory sessions, an empty log page.
    pub fn new() -> Self {
        Self {
            identity: IdentityClientSlot::ready(Arc::new(FakeProvider::default())),
            sessions: Arc::new(MemorySessionStore::new()),
            logs: Arc::new(FakeLogStore::page(LogPage::default())),
            logs_config: LogsConfig::default(),
        }
    }

    pub fn not_ready(mut self) -> Self {
        self.identity = IdentityClientSlot::empty();
        self
    }

    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn logs(mut self, logs: Arc<dyn LogStore>) -> Self {
        self.logs = logs;
        self
    }

    pub fn logs_config(mut self, logs_config: LogsConfig) -> Self {
        self.logs_config = logs_config;
        self
    }

    pub fn build(self) -> AppState {
        AppState::new(
            self.identity,
            self.sessions,
            self.logs,
            oidc_config(),
            session_config(),
            self.logs_config,
            Key::generate(),
        )
    }
}
