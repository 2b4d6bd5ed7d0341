//! # HTTP Retrieval Utilities
//!
//! An asynchronous API client wrapper around `reqwest`. Every request carries
//! `Content-Type: application/json`; callers may add headers or override that
//! default per request. Retries for transient failures are delegated to
//! `reqwest-retry` and are off unless a retry count is configured.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors raised at the HTTP transport boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL or the joined endpoint is not a valid absolute URL.
    #[error("invalid url '{url}': {source}")]
    Url {
        /// The offending URL text.
        url: String,
        /// The parser error.
        source: url::ParseError,
    },

    /// The request could not be sent (connection refused, DNS, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status} - {body}")]
    Status {
        /// Numeric HTTP status.
        status: u16,
        /// The raw error body returned by the server.
        body: String,
    },

    /// The response body is not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// A JSON HTTP client bound to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// The base URL that endpoints are appended to.
    base_url: String,
    /// Headers sent with every request unless overridden.
    default_headers: HeaderMap,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - absolute base URL, e.g. `http://localhost:8080`.
    /// * `max_retries` - transient-failure retries with exponential backoff; `0` disables them.
    pub fn new(base_url: &str, max_retries: u32) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|source| ApiError::Url {
            url: base_url.to_string(),
            source,
        })?;

        let mut builder = ClientBuilder::new(reqwest::Client::new());
        if max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            inner: builder.build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers,
        })
    }

    /// Adds (or replaces) a header sent with every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// The base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `endpoint` to the base URL (`{BASE_URL}{endpoint}`).
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        let full = if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        };
        Url::parse(&full).map_err(|source| ApiError::Url { url: full, source })
    }

    /// Performs a request and reports non-2xx statuses in the returned
    /// `ApiResponse` instead of failing.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb.
    /// * `endpoint` - The path appended to the base URL.
    /// * `body` - Optional value serialized as the JSON body.
    /// * `headers` - Optional headers; they override the defaults key by key.
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint)?;

        let mut merged = self.default_headers.clone();
        if let Some(extra) = headers {
            for (name, value) in extra.iter() {
                merged.insert(name.clone(), value.clone());
            }
        }

        log::debug!("Making API request: {} {}", method, url);
        let mut req = self.inner.request(method.clone(), url.clone()).headers(merged);

        if let Some(b) = body {
            let json_body = serde_json::to_vec(b).map_err(ApiError::Encode)?;
            req = req.body(json_body);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("API request failed: {} {}: {}", method, url, e);
                return Err(ApiError::Transport(e));
            }
        };

        let status = response.status();
        let resp_headers = response.headers().clone();
        log::debug!("Response status: {} for {}", status, url);

        if status.is_success() {
            let bytes = response.bytes().await?;
            let data = serde_json::from_slice::<T>(&bytes).map_err(|e| {
                log::error!("Failed to decode response from {}: {}", url, e);
                ApiError::Decode(e)
            })?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            let error_text = response.text().await.ok();
            log::error!(
                "HTTP error! status: {} {}",
                status.as_u16(),
                error_text.as_deref().unwrap_or_default()
            );
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }

    /// Performs a request and returns the decoded body, turning a non-2xx
    /// status into `ApiError::Status`.
    pub async fn request_json<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request::<T, B>(method, endpoint, body, headers).await?;
        match response.data {
            Some(data) if response.success => Ok(data),
            _ => Err(ApiError::Status {
                status: response.status,
                body: response.error_body.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_appended_to_base() {
        let api = ApiClient::new("http://localhost:8080/", 0).unwrap();
        assert_eq!(
            api.endpoint_url("/documents").unwrap().as_str(),
            "http://localhost:8080/documents"
        );
        assert_eq!(
            api.endpoint_url("documents").unwrap().as_str(),
            "http://localhost:8080/documents"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let api = ApiClient::new("http://10.0.2.2:8080/api", 0).unwrap();
        assert_eq!(
            api.endpoint_url("/documents").unwrap().as_str(),
            "http://10.0.2.2:8080/api/documents"
        );
    }

    #[test]
    fn test_relative_base_is_rejected() {
        assert!(matches!(ApiClient::new("/documents", 0), Err(ApiError::Url { .. })));
    }

    #[test]
    fn test_default_content_type_is_json() {
        let api = ApiClient::new("http://localhost:8080", 0).unwrap();
        assert_eq!(
            api.default_headers.get(CONTENT_TYPE).unwrap(),
            &HeaderValue::from_static("application/json")
        );
    }
}
