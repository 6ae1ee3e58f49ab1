//! OIDC (OpenID Connect) configuration.
//!
//! This module provides configuration types for connecting to the external
//! identity provider, and the construction of the provider's logout URL.

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the OIDC identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// The OIDC issuer URL used for discovery
    /// (e.g. "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_example").
    issuer_url: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the callback (e.g. "https://gateway.example.com/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,email,phone"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// The provider's logout endpoint (e.g. "https://auth.example.com/logout").
    logout_endpoint: String,
    /// Where the provider sends the browser after logout.
    post_logout_redirect_uri: String,
    /// Upper bound on any single request to the provider, in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    request_timeout_seconds: u64,
}

fn default_scopes() -> String {
    "openid,email,phone".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    10
}

/// A configured URL that does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOidcUrl {
    /// The configuration field holding the URL.
    pub field: &'static str,
    /// The parser's explanation.
    pub reason: String,
}

impl std::fmt::Display for InvalidOidcUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid OIDC {}: {}", self.field, self.reason)
    }
}

impl std::error::Error for InvalidOidcUrl {}

impl OidcConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> OidcConfigBuilder {
        OidcConfigBuilder::new(issuer_url, client_id, client_secret, redirect_uri)
    }

    /// Returns the OIDC issuer URL.
    #[must_use]
    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the provider logout endpoint.
    #[must_use]
    pub fn logout_endpoint(&self) -> &str {
        &self.logout_endpoint
    }

    /// Returns the post-logout redirect target.
    #[must_use]
    pub fn post_logout_redirect_uri(&self) -> &str {
        &self.post_logout_redirect_uri
    }

    /// Returns the per-request timeout for provider calls.
    #[must_use]
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }

    /// Checks that every configured URL parses.
    ///
    /// # Errors
    ///
    /// Returns the first field whose value is not an absolute URL.
    pub fn validate(&self) -> Result<(), InvalidOidcUrl> {
        let fields = [
            ("issuer_url", &self.issuer_url),
            ("redirect_uri", &self.redirect_uri),
            ("logout_endpoint", &self.logout_endpoint),
            ("post_logout_redirect_uri", &self.post_logout_redirect_uri),
        ];
        for (field, value) in fields {
            Url::parse(value).map_err(|e| InvalidOidcUrl {
                field,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Builds the provider logout URL.
    ///
    /// The URL carries `client_id` and the URL-encoded `logout_uri` the
    /// provider redirects to afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout endpoint is not an absolute URL.
    pub fn logout_url(&self) -> Result<Url, InvalidOidcUrl> {
        let mut url = Url::parse(&self.logout_endpoint).map_err(|e| InvalidOidcUrl {
            field: "logout_endpoint",
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("logout_uri", &self.post_logout_redirect_uri);
        Ok(url)
    }
}

/// Builder for `OidcConfig`.
#[derive(Debug)]
pub struct OidcConfigBuilder {
    issuer_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    logout_endpoint: String,
    post_logout_redirect_uri: String,
    request_timeout_seconds: u64,
}

impl OidcConfigBuilder {
    /// Creates a new builder with required fields.
    ///
    /// The logout endpoint defaults to `<issuer>/logout` and the post-logout
    /// target to the origin of the redirect URI until set explicitly.
    #[must_use]
    pub fn new(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        let logout_endpoint = format!("{}/logout", issuer_url.trim_end_matches('/'));
        let post_logout_redirect_uri = Url::parse(&redirect_uri)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| redirect_uri.clone());
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            logout_endpoint,
            post_logout_redirect_uri,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }

    /// Sets the provider logout endpoint.
    #[must_use]
    pub fn logout_endpoint(mut self, endpoint: String) -> Self {
        self.logout_endpoint = endpoint;
        self
    }

    /// Sets the post-logout redirect target.
    #[must_use]
    pub fn post_logout_redirect_uri(mut self, uri: String) -> Self {
        self.post_logout_redirect_uri = uri;
        self
    }

    /// Sets the per-request provider timeout.
    #[must_use]
    pub fn request_timeout_seconds(mut self, seconds: u64) -> Self {
        self.request_timeout_seconds = seconds;
        self
    }

    /// Builds the `OidcConfig`.
    #[must_use]
    pub fn build(self) -> OidcConfig {
        OidcConfig {
            issuer_url: self.issuer_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            scopes: default_scopes(),
            logout_endpoint: self.logout_endpoint,
            post_logout_redirect_uri: self.post_logout_redirect_uri,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }
}
