//! Shared response handling for the HTTP clients.

use reqwest::Response;
use serde::de::DeserializeOwned;
use waypoint_core::{Result, WaypointError};

/// Maps a transport failure (DNS, connect, timeout) to a remote error.
pub fn transport_error(operation: &str, err: reqwest::Error) -> WaypointError {
    if err.is_timeout() {
        WaypointError::remote(operation, format!("request timed out: {err}"))
    } else {
        WaypointError::remote(operation, err.to_string())
    }
}

/// Turns a non-2xx response into a remote error carrying its status and body.
pub async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(map_http_error(operation, status.as_u16(), &error_text))
}

pub fn map_http_error(operation: &str, status: u16, body: &str) -> WaypointError {
    let message = match body.trim() {
        "" => default_reason(status).to_string(),
        text => text.to_string(),
    };
    WaypointError::remote_status(operation, status, message)
}

fn default_reason(status: u16) -> &'static str {
    match status {
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        429 => "rate limited",
        500..=599 => "server error",
        _ => "request failed",
    }
}

/// Decodes a JSON body, reporting malformed payloads against the operation.
pub async fn read_json<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        WaypointError::remote(operation, format!("invalid response body: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_keeps_body_text() {
        let err = map_http_error("patch trip", 422, "title is required");
        assert_eq!(err.http_status(), Some(422));
        assert!(err.to_string().ends_with("title is required"));
    }

    #[test]
    fn test_empty_body_uses_status_reason() {
        let err = map_http_error("upload media", 503, "  ");
        assert!(err.to_string().ends_with("server error"));
    }
}
