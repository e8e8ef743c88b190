//! Shared HTTP plumbing for provider clients
//!
//! Wraps a `reqwest::Client` with authentication, a token-bucket rate limiter
//! and status → [`SourceError`] mapping.

use super::SourceError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

/// How a provider authenticates
#[derive(Debug, Clone)]
pub enum Auth {
    None,
    Bearer(String),
    Header(&'static str, String),
}

/// HTTP client bound to one provider
pub struct ProviderHttp {
    provider: &'static str,
    client: Client,
    base_url: String,
    auth: Auth,
    timeout: Duration,
    rate_limiter: DefaultDirectRateLimiter,
}

impl ProviderHttp {
    /// `requests_per_second` of zero is treated as one
    pub fn new(
        provider: &'static str,
        base_url: &str,
        auth: Auth,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(foodprint_common::config::get_user_agent())
            .build()
            .unwrap_or_else(|e| {
                warn!(provider, "Falling back to default HTTP client: {}", e);
                Client::new()
            });

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);

        Self {
            provider,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            timeout,
            rate_limiter: RateLimiter::direct(Quota::per_second(rate)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Header(name, value) => request.header(*name, value),
        }
    }

    /// GET `path` with query parameters, returning the JSON body
    ///
    /// 404 maps to `Ok(None)`.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, SourceError> {
        self.rate_limiter.until_ready().await;

        let url = self.url(path);
        debug!(provider = self.provider, url = %url, "GET");

        let request = self
            .authorize(self.client.get(&url))
            .query(query)
            .timeout(self.timeout);
        self.send(request).await
    }

    /// POST a JSON body to `path`, returning the JSON response
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Option<Value>, SourceError> {
        self.rate_limiter.until_ready().await;

        let url = self.url(path);
        debug!(provider = self.provider, url = %url, "POST");

        let request = self
            .authorize(self.client.post(&url))
            .json(body)
            .timeout(self.timeout);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Option<Value>, SourceError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(Some(body))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Read a number that may be encoded as a JSON string ("2.4")
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
