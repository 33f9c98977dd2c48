//
//  stash-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Stash REST API
//!
//! This module provides the types shared by every endpoint wrapper: the
//! error taxonomy, the decoded server error payload, query parameter
//! building and the small user/link structures that appear in most
//! responses.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`ErrorBody`] - Decoded error payload returned by the server
//! - [`QueryParams`] - Ordered query string builder with optional values
//! - [`User`], [`SelfLink`] - Structures embedded in many responses
//! - Pagination types (re-exported from [`pagination`] submodule)
//!
//! # Example
//!
//! ```rust
//! use stash_client::api::common::ApiError;
//!
//! fn handle_result<T>(result: Result<T, ApiError>) {
//!     match result {
//!         Ok(_) => println!("Success!"),
//!         Err(ApiError::NotFound { body }) => println!("Not found: {}", body.message()),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Unified error type for all Stash API operations.
///
/// Every non-2xx response becomes either [`ApiError::NotFound`] (404) or
/// [`ApiError::Http`] (any other status). Both carry the decoded error
/// payload so callers can inspect what the server said.
///
/// # Variants
///
/// | Variant | Description | HTTP Status |
/// |---------|-------------|-------------|
/// | `NotFound` | Requested resource does not exist | 404 |
/// | `Http` | Any other failed request | 4xx/5xx |
/// | `Network` | Connection, TLS or timeout failure | N/A |
/// | `Decode` | Response body was not the expected JSON | N/A |
/// | `InvalidUrl` | The configured base URL cannot be used | N/A |
/// | `InvalidPath` | A resource path would not address a single resource | N/A |
///
/// # Example
///
/// ```rust
/// use reqwest::StatusCode;
/// use stash_client::api::common::{ApiError, ErrorBody};
///
/// let error = ApiError::from_status(
///     StatusCode::CONFLICT,
///     ErrorBody::from_text(r#"{"errors":[{"message":"Project key already exists"}]}"#),
/// );
///
/// assert_eq!(error.status(), Some(StatusCode::CONFLICT));
/// assert!(error.to_string().contains("Project key already exists"));
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// The requested resource was not found (HTTP 404).
    #[error("Resource not found: {}", .body.message())]
    NotFound {
        /// Decoded error payload from the server.
        body: ErrorBody,
    },

    /// The server answered with a non-success status other than 404.
    #[error("HTTP {status}: {}", .body.message())]
    Http {
        /// The original HTTP status code.
        status: StatusCode,
        /// Decoded error payload from the server.
        body: ErrorBody,
    },

    /// A network-level error occurred during the request.
    ///
    /// Covers connection failures, timeouts, DNS resolution errors and
    /// other transport-layer issues.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected type.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The base URL given to the client is not a usable HTTP(S) URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// A path segment was empty, `.` or `..`. No request is sent.
    #[error("Invalid path segment: '{0}'")]
    InvalidPath(String),
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl ApiError {
    /// Builds the error for a failed response.
    ///
    /// 404 maps to [`ApiError::NotFound`]; every other status maps to
    /// [`ApiError::Http`].
    pub fn from_status(status: StatusCode, body: ErrorBody) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound { body }
        } else {
            Self::Http { status, body }
        }
    }

    /// Returns the HTTP status of a failed response.
    ///
    /// Returns `None` for transport, decoding and URL errors, where no
    /// status was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Http { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            Self::Decode(_) | Self::InvalidUrl(_) | Self::InvalidPath(_) => None,
        }
    }

    /// Returns the decoded server error payload, if the server sent one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::NotFound { body } | Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns `true` for a 404 response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for 401 Unauthorized and 403 Forbidden responses.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// Decoded error payload returned with a failed response.
///
/// Stash answers errors with:
/// ```json
/// {"errors": [{"context": null, "message": "Human readable message", "exceptionName": "..."}]}
/// ```
///
/// Bodies that are not JSON (proxies, load balancers) are wrapped into the
/// same shape so callers always see `errors[].message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorBody {
    data: Value,
}

impl ErrorBody {
    /// Wraps an already decoded payload.
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Decodes a raw response body.
    ///
    /// JSON bodies are kept as they are. Anything else becomes
    /// `{"errors": [{"message": <text>}]}`; an empty body becomes
    /// `{"errors": []}`.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::new(json!({ "errors": [] }));
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(data) => Self::new(data),
            Err(_) => Self::new(json!({ "errors": [{ "message": trimmed }] })),
        }
    }

    /// The decoded payload.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Extracts every human readable message from the payload.
    ///
    /// Understands the Stash format (`errors[].message`), the Bitbucket
    /// Cloud formats (`error.message`, `error.detail`) and a flat
    /// `message` field.
    pub fn messages(&self) -> Vec<String> {
        if let Some(errors) = self.data.get("errors").and_then(Value::as_array) {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if !messages.is_empty() {
                return messages;
            }
        }

        let error = self.data.get("error");
        if let Some(message) = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return vec![message.to_string()];
        }
        if let Some(detail) = error.and_then(|e| e.get("detail")).and_then(Value::as_str) {
            return vec![detail.to_string()];
        }

        if let Some(message) = self.data.get("message").and_then(Value::as_str) {
            return vec![message.to_string()];
        }

        Vec::new()
    }

    /// A single display string for the payload.
    ///
    /// Joins all messages with `"; "`, falling back to the raw JSON when
    /// no message field is present.
    pub fn message(&self) -> String {
        let messages = self.messages();
        if !messages.is_empty() {
            return messages.join("; ");
        }
        match &self.data {
            Value::Object(map) if map.get("errors").is_some_and(|e| e == &json!([])) => {
                "no error details".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Ordered query string parameters.
///
/// Optional values are skipped, mirroring how the REST endpoints treat a
/// missing parameter as "use the server default".
///
/// # Example
///
/// ```rust
/// use stash_client::api::common::QueryParams;
///
/// let params = QueryParams::new()
///     .with("until", "master")
///     .with_opt("since", None::<&str>)
///     .with("withCounts", false);
///
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get("withCounts"), Some("false"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a parameter only when a value is present.
    pub fn with_opt<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Appends a parameter in place.
    pub fn push(&mut self, key: &str, value: impl ToString) {
        self.0.push((key.to_string(), value.to_string()));
    }

    /// Replaces every occurrence of `key` with a single value.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.0.retain(|(k, _)| k != key);
        self.push(key, value);
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Error returned when a string does not name a known API enum value.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declares a fieldless enum whose variants travel as fixed strings in
/// query parameters and JSON bodies.
///
/// Generates `as_str`, `ALL`, `Display` and a case-insensitive `FromStr`.
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $value)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::api::common::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().replace('-', "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(&normalized))
                    .ok_or_else(|| $crate::api::common::ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

pub(crate) use api_enum;

/// Self-referential link to a resource in the web UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfLink {
    /// The full URL to view this resource in the web UI.
    pub href: String,
}

/// Represents a user in Stash.
///
/// Used throughout the API to represent authors, reviewers, permission
/// holders and other participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique numeric identifier for the user.
    #[serde(default)]
    pub id: Option<u64>,

    /// Username (login name) for the user.
    pub name: String,

    /// Full display name of the user.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,

    /// Email address of the user.
    /// May be `None` if hidden by privacy settings.
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,

    /// URL-safe version of the username.
    #[serde(default)]
    pub slug: Option<String>,

    /// Whether the account is active.
    #[serde(default)]
    pub active: Option<bool>,
}

impl User {
    /// The display name, falling back to the login name.
    pub fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_server_format() {
        let body = ErrorBody::from_text(
            r#"{"errors":[{"context":null,"message":"first"},{"message":"second"}]}"#,
        );
        assert_eq!(body.messages(), vec!["first", "second"]);
        assert_eq!(body.message(), "first; second");
    }

    #[test]
    fn test_error_body_cloud_formats() {
        let body = ErrorBody::from_text(r#"{"type":"error","error":{"message":"nope"}}"#);
        assert_eq!(body.message(), "nope");

        let body = ErrorBody::from_text(r#"{"error":{"detail":"details here"}}"#);
        assert_eq!(body.message(), "details here");

        let body = ErrorBody::from_text(r#"{"message":"flat"}"#);
        assert_eq!(body.message(), "flat");
    }

    #[test]
    fn test_error_body_wraps_plain_text() {
        let body = ErrorBody::from_text("Bad Gateway\n");
        assert_eq!(body.data()["errors"][0]["message"], "Bad Gateway");
        assert_eq!(body.message(), "Bad Gateway");
    }

    #[test]
    fn test_error_body_empty() {
        let body = ErrorBody::from_text("");
        assert!(body.messages().is_empty());
        assert_eq!(body.message(), "no error details");
    }

    #[test]
    fn test_error_body_unknown_json_falls_back_to_raw() {
        let body = ErrorBody::from_text(r#"{"foo":1}"#);
        assert_eq!(body.message(), r#"{"foo":1}"#);
    }

    #[test]
    fn test_api_error_status_mapping() {
        let not_found = ApiError::from_status(StatusCode::NOT_FOUND, ErrorBody::from_text(""));
        assert!(not_found.is_not_found());
        assert_eq!(not_found.status(), Some(StatusCode::NOT_FOUND));

        let forbidden = ApiError::from_status(StatusCode::FORBIDDEN, ErrorBody::from_text(""));
        assert!(!forbidden.is_not_found());
        assert!(forbidden.is_auth_error());
        assert_eq!(forbidden.status(), Some(StatusCode::FORBIDDEN));

        let decode = ApiError::from(serde_json::from_str::<Value>("{").unwrap_err());
        assert_eq!(decode.status(), None);
        assert!(decode.body().is_none());
    }

    #[test]
    fn test_query_params() {
        let mut params = QueryParams::new()
            .with("a", 1)
            .with_opt("b", Some("x"))
            .with_opt::<String>("c", None);
        assert_eq!(params.len(), 2);

        params.set("a", 5);
        assert_eq!(params.get("a"), Some("5"));
        assert_eq!(params.len(), 2);
    }

    api_enum! {
        enum Shade ("shade") {
            Light => "LIGHT",
            ExtraDark => "EXTRA_DARK",
        }
    }

    #[test]
    fn test_api_enum_parse_and_display() {
        assert_eq!("light".parse::<Shade>().unwrap(), Shade::Light);
        assert_eq!("extra-dark".parse::<Shade>().unwrap(), Shade::ExtraDark);
        assert_eq!(Shade::ExtraDark.to_string(), "EXTRA_DARK");
        assert_eq!(serde_json::to_string(&Shade::Light).unwrap(), r#""LIGHT""#);

        let err = "pale".parse::<Shade>().unwrap_err();
        assert_eq!(err.kind, "shade");
        assert_eq!(err.expected, "LIGHT, EXTRA_DARK");
    }

    #[test]
    fn test_user_display_falls_back_to_name() {
        let user: User = serde_json::from_str(r#"{"name":"jdoe"}"#).unwrap();
        assert_eq!(user.display(), "jdoe");

        let user: User =
            serde_json::from_str(r#"{"name":"jdoe","displayName":"Jane Doe","id":3}"#).unwrap();
        assert_eq!(user.display(), "Jane Doe");
        assert_eq!(user.id, Some(3));
    }
}
