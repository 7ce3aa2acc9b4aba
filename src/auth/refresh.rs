// The refresh-token wire exchange

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};

use crate::error::RefreshFailure;

use super::types::{RefreshRequest, RefreshResponse, TokenData};

/// Client for the remote auth endpoint
#[derive(Clone)]
pub struct RefreshClient {
    client: Client,
    refresh_url: String,
}

impl RefreshClient {
    pub fn new(client: Client, refresh_url: impl Into<String>) -> Self {
        Self {
            client,
            refresh_url: refresh_url.into(),
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Goes straight to the wire, bypassing the session guard, so a failing
    /// exchange can never trigger another refresh.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenData, RefreshFailure> {
        tracing::info!("Refreshing access token...");

        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };

        let response = self
            .client
            .post(&self.refresh_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Auth endpoint rate-limited the refresh: {}", message);
            return Err(RefreshFailure::RateLimited { message });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("Refresh rejected: {} - {}", status, message);
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let data: RefreshResponse = response.json().await?;

        if data.access_token.is_empty() {
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
                message: "refresh response does not contain accessToken".to_string(),
            });
        }

        // Expiration with buffer (minus 60 seconds)
        let expires_in = data.expires_in.unwrap_or(3600);
        let expires_at = Utc::now() + Duration::seconds(expires_in as i64 - 60);

        tracing::info!("Token refreshed, expires: {}", expires_at.to_rfc3339());

        Ok(TokenData {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            expires_at,
        })
    }
}
