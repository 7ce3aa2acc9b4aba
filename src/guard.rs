// The session guard pipeline
// Classifies each outbound request, attaches the bearer token, and recovers
// from unauthorized responses through the refresh coordinator. Responses
// other than 401 pass through unchanged.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Request, Response, StatusCode, Url};

use crate::auth::{
    CredentialStore, RefreshClient, RefreshCoordinator, RefreshOutcome, RefreshTicket,
};
use crate::config::GuardConfig;
use crate::error::{RefreshFailure, SessionError};
use crate::policy::classify;

/// Hook invoked when a refresh failure terminates the session
pub type LogoutHook = Arc<dyn Fn() + Send + Sync>;

/// The request pipeline: credential policy, bearer attachment, coordinated
/// token refresh with single replay
pub struct SessionGuard {
    client: Client,
    store: Arc<dyn CredentialStore>,
    refresher: RefreshClient,
    coordinator: RefreshCoordinator,
    refresh_path: String,
    on_forced_logout: Option<LogoutHook>,
}

impl SessionGuard {
    pub fn builder(config: GuardConfig, store: Arc<dyn CredentialStore>) -> SessionGuardBuilder {
        SessionGuardBuilder {
            config,
            store,
            client: None,
            on_forced_logout: None,
        }
    }

    /// Build a guard with default HTTP client settings
    pub fn new(config: GuardConfig, store: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        Self::builder(config, store).build()
    }

    /// Execute a request through the pipeline.
    ///
    /// The caller's request is never mutated; the wire sees a clone, with an
    /// `Authorization: Bearer` header when policy requires one and a token
    /// is stored.
    pub async fn execute(&self, request: Request) -> Result<Response, SessionError> {
        let access = classify(request.url(), request.method());

        let outgoing = if access.requires_token() {
            match self.store.access_token() {
                Some(token) => with_bearer(&request, &token)?,
                None => {
                    tracing::warn!(url = %request.url(), "no access token for protected endpoint");
                    clone_request(&request)?
                }
            }
        } else {
            clone_request(&request)?
        };

        let response = self
            .client
            .execute(outgoing)
            .await
            .map_err(SessionError::Network)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // A failing refresh-token request must not try to refresh itself
        if request.url().path() == self.refresh_path {
            return Err(unauthorized(response).await);
        }

        tracing::debug!(url = %request.url(), "unauthorized response, entering refresh flow");
        self.recover(request, response).await
    }

    /// Fail any requests still waiting on an in-flight refresh, e.g. when
    /// the surrounding session is being torn down
    pub fn abort_pending(&self) {
        self.coordinator.abort_pending();
    }

    /// Resolve a 401 through the coordinator, then replay once
    async fn recover(&self, request: Request, response: Response) -> Result<Response, SessionError> {
        match self.coordinator.join() {
            RefreshTicket::Cooldown { retry_after } => {
                tracing::warn!("token refresh in cooldown for another {:?}", retry_after);
                Err(SessionError::RefreshCooldown { retry_after })
            }

            RefreshTicket::Leader(permit) => match self.run_refresh().await {
                Ok(token) => {
                    permit.complete(RefreshOutcome::Renewed(token.clone()));
                    self.replay(request, &token).await
                }
                Err(failure) => {
                    permit.complete(RefreshOutcome::Failed {
                        rate_limited: failure.is_rate_limited(),
                    });
                    if !failure.is_rate_limited() {
                        self.force_logout();
                    }
                    Err(SessionError::RefreshFailed(failure))
                }
            },

            RefreshTicket::Follower(mut outcome_rx) => {
                tracing::debug!(url = %request.url(), "refresh already in flight, waiting");
                match outcome_rx.recv().await {
                    Ok(RefreshOutcome::Renewed(token)) => self.replay(request, &token).await,
                    // Waiters propagate their original failure, they do not retry
                    Ok(RefreshOutcome::Failed { .. }) | Err(_) => Err(unauthorized(response).await),
                }
            }
        }
    }

    /// Perform the exchange and persist the renewed credential
    async fn run_refresh(&self) -> Result<String, RefreshFailure> {
        let refresh_token = match self.store.refresh_token() {
            Some(token) => token,
            None => {
                tracing::error!("no refresh token in store, cannot refresh");
                return Err(RefreshFailure::Rejected {
                    status: 401,
                    message: "no refresh token available".to_string(),
                });
            }
        };

        let data = self.refresher.refresh(&refresh_token).await?;

        // Keep the old refresh token when the endpoint does not rotate it
        let next_refresh = data.refresh_token.clone().unwrap_or(refresh_token);
        self.store.set_tokens(&data.access_token, &next_refresh);

        Ok(data.access_token)
    }

    /// Retry the original request exactly once with the renewed token
    async fn replay(&self, request: Request, token: &str) -> Result<Response, SessionError> {
        let retry = with_bearer(&request, token)?;
        let response = self
            .client
            .execute(retry)
            .await
            .map_err(SessionError::Network)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Single-retry policy: a second 401 is terminal
            return Err(unauthorized(response).await);
        }

        Ok(response)
    }

    fn force_logout(&self) {
        tracing::warn!("refresh token rejected, terminating session");
        self.store.clear();
        if let Some(hook) = &self.on_forced_logout {
            hook();
        }
    }
}

pub struct SessionGuardBuilder {
    config: GuardConfig,
    store: Arc<dyn CredentialStore>,
    client: Option<Client>,
    on_forced_logout: Option<LogoutHook>,
}

impl SessionGuardBuilder {
    /// Use a pre-built HTTP client instead of the configured defaults
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Invoked once per failed refresh cycle, after credentials are cleared
    pub fn on_forced_logout(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_forced_logout = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> anyhow::Result<SessionGuard> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .pool_max_idle_per_host(self.config.max_connections)
                .connect_timeout(Duration::from_secs(self.config.connect_timeout))
                .timeout(Duration::from_secs(self.config.request_timeout))
                .build()
                .context("Failed to create HTTP client")?,
        };

        let refresh_path = Url::parse(&self.config.refresh_url)
            .context("Invalid refresh endpoint URL")?
            .path()
            .to_string();

        Ok(SessionGuard {
            refresher: RefreshClient::new(client.clone(), self.config.refresh_url.clone()),
            client,
            store: self.store,
            coordinator: RefreshCoordinator::new(self.config.refresh_cooldown),
            refresh_path,
            on_forced_logout: self.on_forced_logout,
        })
    }
}

/// Clone a request, leaving the original untouched
fn clone_request(request: &Request) -> Result<Request, SessionError> {
    request
        .try_clone()
        .ok_or_else(|| SessionError::Internal(anyhow::anyhow!("request body is not cloneable")))
}

/// Clone a request with an `Authorization: Bearer` header
fn with_bearer(request: &Request, token: &str) -> Result<Request, SessionError> {
    let mut cloned = clone_request(request)?;
    let value = format!("Bearer {}", token)
        .parse()
        .map_err(|e| SessionError::Internal(anyhow::anyhow!("invalid bearer header: {}", e)))?;
    cloned.headers_mut().insert(AUTHORIZATION, value);
    Ok(cloned)
}

/// Convert a terminal unauthorized response into the error taxonomy
async fn unauthorized(response: Response) -> SessionError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    SessionError::Unauthorized { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn request(method: Method, url: &str) -> Request {
        Client::new().request(method, url).build().unwrap()
    }

    #[test]
    fn test_with_bearer_does_not_mutate_original() {
        let original = request(Method::GET, "https://shop.example.com/api/orders");
        let attached = with_bearer(&original, "a-1").unwrap();

        assert!(original.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            attached.headers().get(AUTHORIZATION).unwrap(),
            "Bearer a-1"
        );
    }

    #[test]
    fn test_with_bearer_replaces_existing_header() {
        let mut original = request(Method::GET, "https://shop.example.com/api/orders");
        original
            .headers_mut()
            .insert(AUTHORIZATION, "Bearer stale".parse().unwrap());

        let attached = with_bearer(&original, "a-2").unwrap();
        assert_eq!(
            attached.headers().get(AUTHORIZATION).unwrap(),
            "Bearer a-2"
        );
    }

    #[test]
    fn test_clone_request_preserves_method_url_and_body() {
        let original = Client::new()
            .post("https://shop.example.com/api/cart")
            .body(r#"{"productId":5}"#)
            .build()
            .unwrap();

        let cloned = clone_request(&original).unwrap();
        assert_eq!(cloned.method(), &Method::POST);
        assert_eq!(cloned.url(), original.url());
        assert!(cloned.body().is_some());
    }
}
