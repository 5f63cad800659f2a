//! Authenticated request client
//!
//! Every call goes through [`ApiClient::send`]: issue the request with the
//! session cookies, classify the envelope, and on an expired access token
//! refresh once (shared by all concurrent callers) before retrying.

pub mod coordinator;
pub mod error;
pub mod navigator;
pub mod request;
mod resources;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::envelope::ApiResponse;

pub use coordinator::{
    PendingRefresh, RefreshCoordinator, RefreshOutcome, RefreshRole, RefreshTicket,
};
pub use error::{ApiError, ClientError};
pub use navigator::{HeadlessNavigator, Navigator, login_redirect_url};
pub use request::{ApiRequest, Attempt, Reply, Verdict};

pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Message of the 401 raised by the caller whose refresh call failed.
pub const REFRESH_FAILED: &str = "Failed to refresh token";
/// Message of the 401 raised by callers that awaited a failed refresh.
pub const SESSION_EXPIRED: &str = "Session expired";

/// Minimarket API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    refresh_url: String,
    login_path: String,
    navigator: Arc<dyn Navigator>,
    refresh: Arc<RefreshCoordinator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("refresh_url", &self.refresh_url)
            .field("login_path", &self.login_path)
            .field("refreshing", &self.refresh.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Origin plus API prefix, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Refresh coordination shared by every clone of this client.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Run one logical request and return the envelope's `data`.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let reply = self.attempt(&request).await?;

        match reply.classify(Attempt::Initial) {
            Verdict::Success => return reply.into_data(),
            Verdict::Failure => return Err(reply.into_error()),
            Verdict::TokenMissing => return Err(self.token_missing(reply)),
            Verdict::TokenExpired => {}
        }

        debug!(method = %request.method, path = %request.path, "access token expired");
        let outcome = self
            .refresh
            .run(|| self.call_refresh_endpoint())
            .await;

        if !outcome.refreshed {
            redirect_to_login(self);
            let message = match outcome.role {
                RefreshRole::Leader => REFRESH_FAILED,
                RefreshRole::Follower => SESSION_EXPIRED,
            };
            return Err(ApiError::unauthorized(message, reply.error_code()));
        }

        let reply = self.attempt(&request).await?;
        match reply.classify(Attempt::Retry) {
            Verdict::Success => reply.into_data(),
            Verdict::TokenMissing => Err(self.token_missing(reply)),
            Verdict::TokenExpired | Verdict::Failure => {
                warn!(path = %request.path, status = %reply.status, "request failed after token refresh");
                Err(reply.into_error())
            }
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// One network round trip. Transport failures and bodies that are not
    /// an envelope become the generic 500.
    async fn attempt(&self, request: &ApiRequest) -> Result<Reply, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(path = %request.path, error = %e, "request failed");
            ApiError::transport()
        })?;

        let status = response.status();
        let envelope = response
            .json::<ApiResponse<serde_json::Value>>()
            .await
            .map_err(|e| {
                error!(path = %request.path, %status, error = %e, "response is not an API envelope");
                ApiError::transport()
            })?;

        Ok(Reply { status, envelope })
    }

    async fn call_refresh_endpoint(&self) -> bool {
        let response = match self.http.request(Method::POST, &self.refresh_url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "refresh request failed");
                return false;
            }
        };

        let status = response.status();
        match response.json::<ApiResponse<serde_json::Value>>().await {
            Ok(envelope) if status.is_success() && envelope.success => true,
            Ok(envelope) => {
                warn!(%status, code = ?envelope.error_code, "token refresh rejected");
                false
            }
            Err(e) => {
                error!(%status, error = %e, "refresh response is not an API envelope");
                false
            }
        }
    }

    fn token_missing(&self, reply: Reply) -> ApiError {
        redirect_to_login(self);
        let code = reply.error_code();
        let message = reply
            .envelope
            .error_message
            .unwrap_or_else(|| "Token missing".to_string());
        ApiError::unauthorized(message, code)
    }
}

fn redirect_to_login(client: &ApiClient) {
    navigator::redirect_to_login(client.navigator.as_ref(), &client.login_path);
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    api_prefix: Option<String>,
    refresh_path: Option<String>,
    login_path: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    navigator: Option<Arc<dyn Navigator>>,
    cookie_jar: Option<Arc<reqwest::cookie::Jar>>,
}

impl ApiClientBuilder {
    /// Origin of the backend, e.g. `http://localhost:3000`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Path prepended to every endpoint, `/api/v1` by default
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Refresh endpoint relative to the API prefix
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Transport timeout per attempt. Off unless set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Share a cookie jar, e.g. to seed a session or inspect rotated tokens.
    pub fn cookie_jar(mut self, jar: Arc<reqwest::cookie::Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let origin = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        Url::parse(&origin)?;

        let prefix = self
            .api_prefix
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        let base_url = join_path(origin.trim_end_matches('/'), &prefix);

        let refresh_path = self
            .refresh_path
            .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string());
        let refresh_url = join_path(&base_url, &refresh_path);
        Url::parse(&refresh_url)?;

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent("minimarket-client/0.1.0");
        }

        client_builder = match self.cookie_jar {
            Some(jar) => client_builder.cookie_provider(jar),
            None => client_builder.cookie_store(true),
        };

        let http = client_builder.build()?;

        Ok(ApiClient {
            http,
            base_url,
            refresh_url,
            login_path: self
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(HeadlessNavigator::default())),
            refresh: Arc::new(RefreshCoordinator::new()),
        })
    }
}

fn join_path(base: &str, path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
