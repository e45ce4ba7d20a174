//! Twitch OAuth token validation and refresh.
//!
//! Runs once at startup: the configured access token is validated (which
//! also resolves the bot login used for the IRC `NICK`), and an invalid
//! token is exchanged through the refresh grant when refresh credentials
//! are configured. Refreshed tokens are used in memory only; persisting
//! them is the credential store's business, not ours.

use serde::Deserialize;
use thiserror::Error;

use crate::common::config::ChatConfig;

const VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";
const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The access token was rejected
    #[error("access token is invalid or expired")]
    InvalidToken,

    /// No refresh credentials are configured to recover from an invalid token
    #[error("token refresh is not configured (client_id/client_secret/refresh_token)")]
    RefreshUnavailable,

    /// Transport-level failure talking to the id service
    #[error("token endpoint error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Response of `GET /oauth2/validate`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub login: String,
    pub user_id: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Response of the refresh grant on `POST /oauth2/token`
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Resolved chat credentials: the login to `NICK` as and the token to use
#[derive(Debug, Clone)]
pub struct Credentials {
    pub login: String,
    pub token: String,
}

/// Client for the Twitch id endpoints
pub struct TwitchAuth {
    http: reqwest::Client,
}

impl TwitchAuth {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Validate an access token, resolving the login it belongs to
    pub async fn validate(&self, token: &str) -> Result<TokenInfo, AuthError> {
        let response = self
            .http
            .get(VALIDATE_URL)
            .header("Authorization", format!("OAuth {}", token))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken);
        }
        Ok(response.error_for_status()?.json::<TokenInfo>().await?)
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<RefreshedToken, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        let response = self.http.post(TOKEN_URL).form(&params).send().await?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST
            || response.status() == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AuthError::InvalidToken);
        }
        Ok(response.error_for_status()?.json::<RefreshedToken>().await?)
    }

    /// Resolve working credentials from the configured ones, refreshing the
    /// access token when possible.
    pub async fn ensure_credentials(&self, chat: &ChatConfig) -> Result<Credentials, AuthError> {
        match self.validate(&chat.token).await {
            Ok(info) => {
                tracing::info!(
                    "Access token for '{}' is valid ({}s remaining)",
                    info.login,
                    info.expires_in
                );
                Ok(Credentials {
                    login: info.login,
                    token: chat.token.clone(),
                })
            }
            Err(AuthError::InvalidToken) => {
                let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
                    chat.client_id.as_deref(),
                    chat.client_secret.as_deref(),
                    chat.refresh_token.as_deref(),
                ) else {
                    return Err(AuthError::RefreshUnavailable);
                };

                tracing::info!("Access token is invalid, trying the refresh grant");
                let refreshed = self.refresh(client_id, client_secret, refresh_token).await?;
                let info = self.validate(&refreshed.access_token).await?;
                tracing::info!("Access token refreshed for '{}'", info.login);

                Ok(Credentials {
                    login: info.login,
                    token: refreshed.access_token,
                })
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for TwitchAuth {
    fn default() -> Self {
        Self::new()
    }
}
