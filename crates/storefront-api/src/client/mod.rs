//! HTTP client for the store's goods/orders/autocomplete REST API.

mod goods;
mod orders;

pub use goods::MIN_AUTOCOMPLETE_CHARS;

use std::time::Duration;

use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_core::AppConfig;

use crate::error::ApiError;
use crate::retry::retry_with_backoff;

/// Upper bound on simultaneous `GET /goods/{id}` requests during a batch
/// lookup.
pub(super) const LOOKUP_CONCURRENCY: usize = 4;

/// Longest error body kept in [`ApiError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 300;

/// HTTP client for the store API.
///
/// Every request carries the `api_key` query parameter. Non-2xx responses
/// become typed errors: 404 → [`ApiError::NotFound`], 429 →
/// [`ApiError::RateLimited`], anything else → [`ApiError::UnexpectedStatus`].
///
/// Reads are retried on transient failures with exponential backoff up to
/// `max_retries` additional attempts. Writes are never retried.
pub struct ApiClient {
    pub(super) client: Client,
    api_key: String,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure of a read.
    pub(super) max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
    pub(super) backoff_base_ms: u64,
}

impl ApiClient {
    /// Creates an `ApiClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `base_url` is the API root, e.g.
    /// `https://edu.std-900.ist.mospolytech.ru/exam-2024-1/api`; endpoint paths
    /// are appended to it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so `Url::join` appends
        // endpoint segments instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot carry endpoint paths".to_owned(),
            });
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from loaded application configuration.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            &config.api_key,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Builds the request URL for `endpoint` (e.g. `"goods"`,
    /// `"orders/12"`) with the API key and any extra query parameters,
    /// percent-encoded.
    pub(super) fn endpoint_url(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot append \"{endpoint}\": {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET with retry and deserializes the JSON body into `T`.
    pub(super) async fn get_json<T>(&self, url: &Url, context: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Sends a GET with retry and returns the raw body of a 2xx response.
    pub(super) async fn get_text(&self, url: &Url) -> Result<String, ApiError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                success_body(response, &url).await
            }
        })
        .await
    }

    /// Sends a single write request (no retry) with an optional JSON body.
    pub(super) async fn send_write<B>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        tracing::debug!(method = %method, url = %redacted(url), "sending store API write");
        let response = request.send().await?;
        success_body(response, url).await
    }
}

/// Maps non-2xx responses to typed errors and returns the body otherwise.
async fn success_body(response: Response, url: &Url) -> Result<String, ApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ApiError::RateLimited { retry_after_secs });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound {
            url: redacted(url),
        });
    }

    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            url: redacted(url),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }
    Ok(body)
}

/// URL without its query string, so the API key never reaches logs or
/// error messages.
pub(crate) fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
