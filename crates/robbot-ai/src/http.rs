//! Shared HTTP plumbing for the REST backends.

use std::time::Duration;

use crate::BackendError;

pub(crate) fn build_client() -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| BackendError::NetworkError(format!("failed to build HTTP client: {e}")))
}

/// Map a non-success response onto a [`BackendError`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(classify_failure(status, &text))
}

pub(crate) fn classify_failure(status: reqwest::StatusCode, body: &str) -> BackendError {
    let snippet: String = body.chars().take(200).collect();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return BackendError::RateLimited;
    }
    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
    {
        return BackendError::Unauthorized(format!("HTTP {status}: {snippet}"));
    }
    BackendError::ApiError(format!("HTTP {status}: {snippet}"))
}

pub(crate) fn network_error(e: reqwest::Error) -> BackendError {
    BackendError::NetworkError(e.to_string())
}
