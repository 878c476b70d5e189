use crate::{config::GoogleConfig, services::DispatchError};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::warn;

// https://developers.google.com/identity/protocols/oauth2/web-server#httprest_3

const TOKEN_REFETCH_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    access_token: String,
    // Access token expires in specified in seconds
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedAccessToken {
    access_token: String,
    expires_ts: i64,
}

/// Hands out access tokens for a google account authorized through a
/// refresh token. A token is reused until it is one minute away from expiring.
pub struct GoogleTokenProvider {
    config: GoogleConfig,
    client: reqwest::Client,
    token_endpoint: String,
    cached: Mutex<Option<CachedAccessToken>>,
}

impl GoogleTokenProvider {
    pub fn new(config: GoogleConfig) -> Self {
        Self::with_token_endpoint(config, TOKEN_REFETCH_ENDPOINT)
    }

    pub fn with_token_endpoint(config: GoogleConfig, token_endpoint: &str) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            token_endpoint: token_endpoint.to_string(),
            cached: Mutex::new(None),
        }
    }

    async fn refresh_access_token(&self) -> Result<RefreshTokenResponse, DispatchError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", self.config.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let res = self
            .client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| DispatchError::new("network", e.to_string()))?;

        if !res.status().is_success() {
            return Err(DispatchError::new(
                res.status().as_u16().to_string(),
                "Google rejected the refresh token",
            ));
        }

        res.json::<RefreshTokenResponse>()
            .await
            .map_err(|e| DispatchError::new("unexpected-response", e.to_string()))
    }

    pub async fn get_access_token(&self) -> Result<String, DispatchError> {
        let mut cached = self.cached.lock().await;

        let now = Utc::now().timestamp_millis();
        let one_minute_in_millis = 1000 * 60;
        if let Some(token) = cached.as_ref() {
            if now + one_minute_in_millis <= token.expires_ts {
                return Ok(token.access_token.clone());
            }
        }

        match self.refresh_access_token().await {
            Ok(tokens) => {
                let token = CachedAccessToken {
                    access_token: tokens.access_token,
                    expires_ts: now.saturating_add(tokens.expires_in.saturating_mul(1000)),
                };
                let access_token = token.access_token.clone();
                *cached = Some(token);
                Ok(access_token)
            }
            Err(e) => {
                warn!("Unable to refresh google access token. Error: {:?}", e);
                *cached = None;
                Err(e)
            }
        }
    }
}
