//! OAuth 2.0 token endpoint client for the Google Ads API.
//!
//! Covers the two grants the tool needs: exchanging an authorization code for
//! a refresh token (one-time setup from the CLI) and exchanging the refresh
//! token for short-lived access tokens (every run).

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use sosb_core::AppConfig;

use crate::error::SourceError;

const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scope required by the keyword planner.
pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// Redirect URI registered for the desktop OAuth client.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Only present on the authorization-code grant.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for Google's OAuth authorization and token endpoints.
pub struct OAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    auth_url: Url,
    token_url: Url,
}

impl OAuthClient {
    /// Creates a client pointed at Google's production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(client_id: &str, client_secret: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_endpoints(
            client_id,
            client_secret,
            timeout_secs,
            DEFAULT_AUTH_URL,
            DEFAULT_TOKEN_URL,
        )
    }

    /// Creates a client from the OAuth fields of the application config.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] naming every unset
    /// variable, or [`SourceError::Http`] if the client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SourceError> {
        let creds = &config.google_ads;
        let mut missing = Vec::new();
        if creds.client_id.is_none() {
            missing.push("GOOGLE_CLIENT_ID");
        }
        if creds.client_secret.is_none() {
            missing.push("GOOGLE_CLIENT_SECRET");
        }
        match (&creds.client_id, &creds.client_secret) {
            (Some(id), Some(secret)) => Self::new(id, secret, config.ads_request_timeout_secs),
            _ => Err(SourceError::MissingCredentials(missing)),
        }
    }

    /// Creates a client with custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::Auth`] if either URL is
    /// invalid.
    pub fn with_endpoints(
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
        auth_url: &str,
        token_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sosb/0.1 (share-of-search)")
            .build()?;

        let parse = |url: &str| {
            Url::parse(url).map_err(|e| SourceError::Auth(format!("invalid OAuth URL '{url}': {e}")))
        };

        Ok(Self {
            client,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            auth_url: parse(auth_url)?,
            token_url: parse(token_url)?,
        })
    }

    /// Consent-screen URL that yields an authorization code with offline access.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", ADWORDS_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        url
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Auth`] if Google rejects the code.
    /// - [`SourceError::Http`] on network failure.
    /// - [`SourceError::Deserialize`] if the response has an unexpected shape.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, SourceError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Exchanges a refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Auth`] if the refresh token is revoked or invalid.
    /// - [`SourceError::Api`] on a 5xx from the token endpoint.
    /// - [`SourceError::Http`] on network failure.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, SourceError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn request_token(&self, grant: &[(&str, &str)]) -> Result<TokenResponse, SourceError> {
        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        form.extend_from_slice(grant);

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_server_error() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: format!("token endpoint error: {body}"),
            });
        }
        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&body).map_or_else(
                |_| format!("token exchange failed with status {status}"),
                |e| match e.error_description {
                    Some(description) => format!("{}: {description}", e.error),
                    None => e.error,
                },
            );
            return Err(SourceError::Auth(message));
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: "OAuth token response".to_owned(),
            source: e,
        })
    }
}
