//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{GeocodingApi, StorageApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Gigmap API client
///
/// Wraps `reqwest` with request correlation IDs, per-call timeouts and
/// uniform error mapping. There is no retry layer.
#[derive(Clone)]
pub struct GigmapClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for GigmapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigmapClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl GigmapClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static("gigmap-api-client/0.3"));

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access geocoding endpoints
    #[must_use]
    pub fn geocoding(&self) -> GeocodingApi {
        GeocodingApi::new(self.clone())
    }

    /// Access upload and object storage endpoints
    #[must_use]
    pub fn storage(&self) -> StorageApi {
        StorageApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods
    // -------------------------------------------------------------------------

    /// POST a JSON body to an absolute URL and decode the JSON response
    ///
    /// `timeout` overrides the client-wide request timeout.
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> ApiResult<T> {
        let mut request = self.request_builder(Method::POST, url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = self.execute(request, timeout).await?;
        self.handle_response(response).await
    }

    /// Build a request to an absolute URL with correlation and auth headers
    pub fn request_builder(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self.public_request_builder(method, url);
        if let Some(ref token) = self.config.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    /// Build a request without the auth header, for third-party endpoints
    pub fn public_request_builder(&self, method: Method, url: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());
        self.inner.request(method, url).header(X_REQUEST_ID, &request_id)
    }

    /// Send a request, mapping transport failures
    pub async fn execute(&self, request: RequestBuilder, timeout: Option<Duration>) -> ApiResult<Response> {
        let start = Instant::now();
        let result = request.send().await;
        let elapsed = start.elapsed();

        match result {
            Ok(response) => {
                debug!(
                    status = response.status().as_u16(),
                    elapsed_ms = elapsed.as_millis(),
                    "Request completed"
                );
                Ok(response)
            }
            Err(e) if e.is_timeout() => {
                debug!(elapsed_ms = elapsed.as_millis(), "Request timed out");
                Err(ApiError::Timeout(timeout.unwrap_or(self.config.timeout)))
            }
            Err(e) => Err(ApiError::Request(e)),
        }
    }

    /// Turn a non-2xx status into an error, then decode the JSON body
    pub async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Turn a non-2xx status into an error carrying the response text
    pub async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ApiError::api_response(status.as_u16(), message))
    }
}
