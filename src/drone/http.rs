//! HTTP utilities for Drone REST API calls

use crate::error::{RemoteError, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Per-request timeout; the provider does no retrying on top of this
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Pull the `message` field out of a Drone error body, falling back to the
/// sanitized raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| sanitize_for_log(body))
}

/// HTTP client wrapper for Drone API calls
#[derive(Clone)]
pub struct DroneHttpClient {
    client: Client,
}

impl DroneHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("drone-provider/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let body = self.send(self.client.get(url), token).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Make a POST request with an optional JSON body and decode the response
    pub async fn post<B, T>(&self, url: &str, token: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response_body = self.send(request, token).await?;
        Ok(serde_json::from_str(&response_body)?)
    }

    /// Make a PATCH request with a JSON body and decode the response
    pub async fn patch<B, T>(&self, url: &str, token: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("PATCH {}", url);
        let request = self.client.request(Method::PATCH, url).json(body);
        let response_body = self.send(request, token).await?;
        Ok(serde_json::from_str(&response_body)?)
    }

    /// Make a DELETE request; any response body is discarded
    pub async fn delete(&self, url: &str, token: &str) -> Result<()> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url), token).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> Result<String> {
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only the sanitized/truncated body is logged
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(RemoteError::Status {
                status,
                message: error_message(&body),
            }
            .into());
        }

        Ok(body)
    }
}

/// Format a Drone API error for display
pub fn format_drone_error(error: &crate::error::Error) -> String {
    let Some(status) = error.status() else {
        return error.to_string();
    };

    match status.as_u16() {
        401 => "Authentication failed. Check DRONE_TOKEN.".to_string(),
        403 => "Permission denied. The token lacks access to this resource.".to_string(),
        404 => "Resource not found.".to_string(),
        409 => "Resource conflict. The resource may already exist.".to_string(),
        500..=599 => "Drone server error. Please try again.".to_string(),
        _ => error.to_string(),
    }
}
