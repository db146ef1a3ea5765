use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use super::common::{ApiErrorDetails, ApiErrorResponse, ApiResponse};
use super::error::ApiError;
use super::pool::{ConnectionPoolConfig, ConnectionPoolManager};

/// Header carrying the organization (client) id on every request
pub const CLIENT_ID_HEADER: &str = "X-User-Id";

/// Xelon HQ API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    auth_header: String,
    client_id: Option<String>,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub client_id: Option<String>,
    pub user_agent: String,
    pub insecure: bool,
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            client_id: None,
            user_agent: crate::config::user_agent(),
            insecure: false,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default options
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::with_options(base_url, token, ClientOptions::default())
    }

    pub fn with_options(
        base_url: &str,
        token: &str,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        let pool_config = ConnectionPoolConfig {
            request_timeout: std::time::Duration::from_secs(options.retry.timeout_seconds),
            ..Default::default()
        };

        let http_client = ConnectionPoolManager::new(pool_config).build_client(options.insecure, &options.user_agent)?;

        // Url::join drops the last segment unless the base ends with a slash
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", token),
                client_id: options.client_id.filter(|id| !id.is_empty()),
                retry_config: options.retry,
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Execute a GET request, retrying rate limits and connection failures
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// POST without a request body, used by action endpoints such as start/stop
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::POST, path, None::<&()>).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::PATCH, path, Some(body)).await
    }

    /// DELETE; HQ may answer with an empty body or a JSON message, both are success
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<serde_json::Value, ()>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    pub fn devices(&self) -> crate::api::devices::DevicesApi<'_> {
        crate::api::devices::DevicesApi::new(self)
    }

    pub fn firewalls(&self) -> crate::api::firewalls::FirewallsApi<'_> {
        crate::api::firewalls::FirewallsApi::new(self)
    }

    pub fn isos(&self) -> crate::api::isos::IsosApi<'_> {
        crate::api::isos::IsosApi::new(self)
    }

    pub fn load_balancers(&self) -> crate::api::load_balancers::LoadBalancersApi<'_> {
        crate::api::load_balancers::LoadBalancersApi::new(self)
    }

    pub fn persistent_storages(
        &self,
    ) -> crate::api::persistent_storages::PersistentStoragesApi<'_> {
        crate::api::persistent_storages::PersistentStoragesApi::new(self)
    }

    pub fn templates(&self) -> crate::api::templates::TemplatesApi<'_> {
        crate::api::templates::TemplatesApi::new(self)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, &self.inner.auth_header);

        if let Some(client_id) = &self.inner.client_id {
            request = request.header(CLIENT_ID_HEADER, client_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await
    }

    /// Single attempt; mutating calls are never replayed
    async fn execute<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        tracing::debug!("{} request to: {}", method, url);

        match self.send(method, url, body).await {
            Ok(response) => self.handle_response(response).await,
            Err(e) => {
                if e.is_timeout() {
                    Err(ApiError::Timeout(self.inner.retry_config.timeout_seconds))
                } else {
                    Err(ApiError::RequestError(e))
                }
            }
        }
    }

    /// Execute request with retry logic.
    ///
    /// Only 429 and connection failures are retried. Server errors surface on the
    /// first attempt so callers can decide whether they mean "still provisioning".
    async fn execute_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            tracing::debug!("{} request to: {}", method, url);

            match self.send(method.clone(), url.clone(), body).await {
                Ok(response) => {
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else {
                        return self.handle_response(response).await;
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::RequestError(e));
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::RateLimited))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            return self.parse_success_response(response).await;
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthError);
        }

        self.handle_error_response(response).await
    }

    /// Parse successful response
    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        // empty bodies (204, action endpoints) deserialize as unit
        let body = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };

        match serde_json::from_str::<ApiResponse<T>>(body) {
            Ok(wrapper) => Ok(wrapper.data),
            Err(_) => match serde_json::from_str::<T>(body) {
                Ok(data) => Ok(data),
                Err(e) => {
                    tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
                    Err(ApiError::ParseError(e.to_string()))
                }
            },
        }
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let (message, details) = match serde_json::from_str::<ApiErrorResponse>(&text) {
            Ok(err_resp) => (
                err_resp.message.clone().unwrap_or_else(|| text.clone()),
                Some(Box::new(ApiErrorDetails {
                    message: err_resp.message,
                    field_errors: err_resp.errors,
                })),
            ),
            Err(_) => (text, None),
        };

        Err(ApiError::ApiError {
            status,
            message,
            details,
        })
    }
}
