//
//  stash-client
//  api/response.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Response translation
//!
//! Turns raw HTTP responses into either a decoded payload or an
//! [`ApiError`]. A 2xx status is success. Any other status becomes an
//! error carrying the status and the decoded error body.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::common::{ApiError, ErrorBody};

/// Returns the response unchanged if its status is 2xx.
///
/// For any other status the body is read and decoded into an
/// [`ErrorBody`] (non-JSON bodies are wrapped), and the matching
/// [`ApiError`] is returned.
pub async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let text = response.text().await.unwrap_or_default();
    debug!(%status, %url, "request failed");
    Err(ApiError::from_status(status, ErrorBody::from_text(&text)))
}

/// Decodes a 2xx response body as `T`.
///
/// An empty body (204 No Content, or an empty 200) decodes as JSON `null`,
/// so `()`, `Option<_>` and [`Value`] are valid targets for endpoints that
/// return nothing.
pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check(response).await?;
    let text = response.text().await?;

    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Returns `true` for a 2xx response, discarding the body.
pub async fn ok_or_error(response: Response) -> Result<bool, ApiError> {
    check(response).await?;
    Ok(true)
}
