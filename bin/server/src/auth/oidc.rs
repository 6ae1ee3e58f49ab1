//! OIDC client implementation using the openidconnect crate.

use async_trait::async_trait;
use log_gateway_access::{OidcConfig, PendingLogin, TokenSet, UserProfile};
use openidconnect::core::{
    CoreAuthenticationFlow, CoreClient, CoreProviderMetadata, CoreUserInfoClaims,
};
use openidconnect::{
    AccessToken, AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce,
    OAuth2TokenResponse, RedirectUrl, Scope, SubjectIdentifier, TokenResponse,
};
use std::sync::{Arc, OnceLock};

/// The provider operations the login flow depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the authorization URL carrying the pending login's state and nonce.
    fn authorization_url(&self, pending: &PendingLogin) -> String;

    /// Exchanges an authorization code for tokens.
    ///
    /// The ID token must carry `expected_nonce`.
    async fn exchange_code(
        &self,
        code: &str,
        expected_nonce: &str,
    ) -> Result<CodeExchange, OidcError>;

    /// Fetches the profile of `subject` from the userinfo endpoint.
    async fn user_info(
        &self,
        access_token: &str,
        subject: &str,
    ) -> Result<UserProfile, OidcError>;
}

/// Result of a successful token exchange.
#[derive(Debug)]
pub struct CodeExchange {
    /// Subject of the validated ID token.
    pub subject: String,
    pub tokens: TokenSet,
}

/// Generates a fresh, random state/nonce pair for one login attempt.
#[must_use]
pub fn new_pending_login() -> PendingLogin {
    PendingLogin::new(
        CsrfToken::new_random().secret().clone(),
        Nonce::new_random().secret().clone(),
    )
}

/// OIDC client for authenticating users.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    scopes: Vec<Scope>,
    http_client: reqwest::Client,
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata.
    pub async fn discover(config: &OidcConfig) -> Result<Self, OidcError> {
        let issuer_url = IssuerUrl::new(config.issuer_url().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {}", e)))?;

        // Provider responses must never redirect this client.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                OidcError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {}", e)))?;

        let redirect_url = RedirectUrl::new(config.redirect_uri().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid redirect URI: {}", e)))?;

        let scopes = config
            .scopes()
            .into_iter()
            .filter(|s| *s != "openid")
            .map(|s| Scope::new(s.to_string()))
            .collect();

        Ok(Self {
            provider_metadata,
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            redirect_url,
            scopes,
            http_client,
        })
    }

    /// Extracts the raw ID token JWT from a token response.
    fn raw_id_token<TR>(token_response: &TR) -> Option<String>
    where
        TR: serde::Serialize,
    {
        serde_json::to_value(token_response)
            .ok()?
            .get("id_token")?
            .as_str()
            .map(str::to_string)
    }
}

#[async_trait]
impl IdentityProvider for OidcClient {
    fn authorization_url(&self, pending: &PendingLogin) -> String {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let state = pending.state().to_string();
        let nonce = pending.nonce().to_string();

        // The "openid" scope is always sent for the authorization code flow.
        let (auth_url, _, _) = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state),
                move || Nonce::new(nonce),
            )
            .add_scopes(self.scopes.iter().cloned())
            .url();

        auth_url.to_string()
    }

    async fn exchange_code(
        &self,
        code: &str,
        expected_nonce: &str,
    ) -> Result<CodeExchange, OidcError> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| OidcError::TokenExchange(format!("token endpoint error: {}", e)))?
            .request_async(&self.http_client)
            .await
            .map_err(|e| OidcError::TokenExchange(format!("token exchange failed: {}", e)))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| OidcError::TokenExchange("no ID token in response".to_string()))?;

        // Verifies signature, issuer, audience, expiry, and nonce.
        let nonce = Nonce::new(expected_nonce.to_string());
        let claims = id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map_err(|e| {
                OidcError::TokenValidation(format!("ID token validation failed: {}", e))
            })?;

        let tokens = TokenSet {
            access_token: token_response.access_token().secret().clone(),
            id_token: Self::raw_id_token(&token_response),
            refresh_token: token_response.refresh_token().map(|t| t.secret().clone()),
        };

        Ok(CodeExchange {
            subject: claims.subject().as_str().to_string(),
            tokens,
        })
    }

    async fn user_info(
        &self,
        access_token: &str,
        subject: &str,
    ) -> Result<UserProfile, OidcError> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let claims: CoreUserInfoClaims = client
            .user_info(
                AccessToken::new(access_token.to_string()),
                Some(SubjectIdentifier::new(subject.to_string())),
            )
            .map_err(|e| OidcError::UserInfo(format!("userinfo endpoint error: {}", e)))?
            .request_async(&self.http_client)
            .await
            .map_err(|e| OidcError::UserInfo(format!("userinfo request failed: {}", e)))?;

        let name = claims
            .name()
            .and_then(|n| n.get(None))
            .map(|n| n.as_str().to_string());

        let mut profile = UserProfile::new(claims.subject().as_str())
            .with_email(claims.email().map(|e| e.as_str().to_string()))
            .with_name(name);
        profile.email_verified = claims.email_verified();
        profile.phone_number = claims.phone_number().map(|p| p.as_str().to_string());
        profile.phone_number_verified = claims.phone_number_verified();
        profile.preferred_username = claims.preferred_username().map(|u| u.as_str().to_string());

        Ok(profile)
    }
}

/// Holds the identity client once discovery has completed.
///
/// Handlers ask [`IdentityClientSlot::get`] for the client instead of
/// assuming it exists; until [`IdentityClientSlot::install`] runs every
/// dependent route reports "not ready".
#[derive(Clone, Default)]
pub struct IdentityClientSlot {
    inner: Arc<OnceLock<Arc<dyn IdentityProvider>>>,
}

impl IdentityClientSlot {
    /// Creates a slot with no client installed.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds `provider`.
    #[must_use]
    pub fn ready(provider: Arc<dyn IdentityProvider>) -> Self {
        let slot = Self::empty();
        slot.install(provider);
        slot
    }

    /// Installs the client. Returns false if one was already installed, in
    /// which case the existing client is kept.
    pub fn install(&self, provider: Arc<dyn IdentityProvider>) -> bool {
        self.inner.set(provider).is_ok()
    }

    /// Returns true once a client is installed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Returns the installed client, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<dyn IdentityProvider>> {
        self.inner.get().cloned()
    }
}

/// OIDC-related errors.
#[derive(Debug)]
pub enum OidcError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Failed to discover provider metadata.
    Discovery(String),
    /// Token exchange failed.
    TokenExchange(String),
    /// Token validation failed.
    TokenValidation(String),
    /// Userinfo request failed.
    UserInfo(String),
}

impl std::fmt::Display for OidcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OIDC configuration error: {}", msg),
            Self::Discovery(msg) => write!(f, "OIDC discovery error: {}", msg),
            Self::TokenExchange(msg) => write!(f, "OIDC token exchange error: {}", msg),
            Self::TokenValidation(msg) => write!(f, "OIDC token validation error: {}", msg),
            Self::UserInfo(msg) => write!(f, "OIDC userinfo error: {}", msg),
        }
    }
}

impl std::error::Error for OidcError {}
