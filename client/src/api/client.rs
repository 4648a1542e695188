/// HTTP client for the custodial wallet backend
///
/// Every request carries the stored bearer token. Every failure is normalised
/// into a `WalletError` whose message is either the backend's own `error`
/// text or a fixed per-operation fallback, and every 401 clears the session
/// and fires the auth-rejected hook before the error is returned.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::types::{
    ApiErrorBody, AuthResponse, BalanceResponse, Credentials, TransactionHistoryResponse,
    TransferRequest, TransferResponse,
};
use crate::errors::{WalletError, WalletResult};
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;

/// Default page size of `GET /transactions/history`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback fired once per response rejected with 401.
pub type AuthRejectedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    Register,
    Login,
    Transfer,
    Balance,
    History,
}

impl ApiOperation {
    /// Message used when the backend gives no structured error.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            ApiOperation::Register => "Error registering user",
            ApiOperation::Login => "Error logging in",
            ApiOperation::Transfer => "Error transferring funds",
            ApiOperation::Balance => "Error fetching balance",
            ApiOperation::History => "Error fetching history",
        }
    }

    fn fallback(&self) -> WalletError {
        WalletError::Api(self.fallback_message().to_string())
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ApiOperation::Register => "register",
            ApiOperation::Login => "login",
            ApiOperation::Transfer => "transfer",
            ApiOperation::Balance => "balance",
            ApiOperation::History => "history",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    sessions: SessionStore,
    on_auth_rejected: Option<AuthRejectedHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("sessions", &self.sessions)
            .field("on_auth_rejected", &self.on_auth_rejected.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>, sessions: SessionStore) -> WalletResult<Self> {
        Self::with_timeout(base_url, sessions, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        sessions: SessionStore,
        timeout: Duration,
    ) -> WalletResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            WalletError::NetworkError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(ApiClient {
            client,
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            sessions,
            on_auth_rejected: None,
        })
    }

    /// Install the hook fired after a 401 has cleared the session.
    pub fn on_auth_rejected<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_auth_rejected = Some(Arc::new(hook));
        self
    }

    /// Send the user back to the login screen whenever a credential is rejected.
    pub fn redirect_on_auth_rejected(self, navigator: Arc<dyn Navigator>) -> Self {
        self.on_auth_rejected(move || navigator.navigate(Route::Login))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Create an account; on success the returned session is already persisted.
    pub async fn register(&self, credentials: &Credentials) -> WalletResult<AuthResponse> {
        let request = self.client.post(self.url("/auth/register")).json(credentials);
        let response: AuthResponse = self.send(ApiOperation::Register, request).await?;
        self.store_session(&response)?;
        Ok(response)
    }

    /// Log in; on success the returned session is already persisted.
    pub async fn login(&self, credentials: &Credentials) -> WalletResult<AuthResponse> {
        let request = self.client.post(self.url("/auth/login")).json(credentials);
        let response: AuthResponse = self.send(ApiOperation::Login, request).await?;
        self.store_session(&response)?;
        Ok(response)
    }

    pub fn logout(&self) -> WalletResult<()> {
        self.sessions.clear_session()?;
        tracing::info!("logged out");
        Ok(())
    }

    pub async fn transfer(&self, transfer: &TransferRequest) -> WalletResult<TransferResponse> {
        let request = self
            .client
            .post(self.url("/transactions/transfer"))
            .json(transfer);
        self.send(ApiOperation::Transfer, request).await
    }

    pub async fn get_balance(&self) -> WalletResult<BalanceResponse> {
        let request = self.client.get(self.url("/transactions/balance"));
        self.send(ApiOperation::Balance, request).await
    }

    pub async fn get_history(&self, limit: Option<u32>) -> WalletResult<TransactionHistoryResponse> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let request = self
            .client
            .get(self.url("/transactions/history"))
            .query(&[("limit", limit)]);
        self.send(ApiOperation::History, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn store_session(&self, response: &AuthResponse) -> WalletResult<()> {
        match (&response.token, &response.user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                self.sessions.set_session(token, user)?;
                tracing::info!(username = %user.username, "session established");
            }
            _ => tracing::warn!("auth response did not include both token and user"),
        }
        Ok(())
    }

    fn handle_auth_rejected(&self, operation: ApiOperation) {
        tracing::warn!(%operation, "credential rejected by backend; clearing session");
        if let Err(err) = self.sessions.clear_session() {
            tracing::error!(error = %err, "failed to clear session after 401");
        }
        if let Some(hook) = &self.on_auth_rejected {
            hook();
        }
    }

    /// Attach the bearer token, send, and normalise the outcome.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        request: RequestBuilder,
    ) -> WalletResult<T> {
        let request = match self.sessions.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            let err = WalletError::from(e);
            tracing::warn!(%operation, error = %err, "request failed");
            operation.fallback()
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(response).await;
            self.handle_auth_rejected(operation);
            return Err(WalletError::Unauthorized(
                message.unwrap_or_else(|| operation.fallback_message().to_string()),
            ));
        }

        if !status.is_success() {
            let message = error_message(response).await;
            tracing::debug!(%operation, %status, ?message, "backend returned an error");
            return Err(message.map(WalletError::Api).unwrap_or_else(|| operation.fallback()));
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(%operation, error = %e, "failed to read response body");
            operation.fallback()
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%operation, error = %e, "malformed response body");
            operation.fallback()
        })
    }
}

async fn error_message(response: reqwest::Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice::<ApiErrorBody>(&bytes)
        .ok()?
        .into_message()
}
