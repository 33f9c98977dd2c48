//
//  stash-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Credentials for Stash servers and where they come from.
//!
//! ## Supported Authentication Methods
//!
//! - **HTTP access token**: sent as a bearer token (Bitbucket Server 5.5+).
//! - **Basic authentication**: username and password, the only option on
//!   older Stash releases.
//!
//! ## Credential Sources
//!
//! 1. The `STASH_TOKEN` environment variable (always a bearer token)
//! 2. The system keyring, keyed by normalized host
//!
//! ## Module Structure
//!
//! - [`keyring`]: secure credential storage using the system keyring
//! - [`token`]: reading, validating and verifying secrets
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_client::auth::AuthCredential;
//! use stash_client::api::StashClient;
//!
//! # fn example() -> Result<(), stash_client::api::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?
//!     .with_auth(AuthCredential::Basic {
//!         username: "jdoe".to_string(),
//!         password: "secret".to_string(),
//!     });
//! # Ok(())
//! # }
//! ```

mod keyring;
mod token;

pub use keyring::*;
pub use token::*;

use std::fmt;

use anyhow::Result;
use reqwest::RequestBuilder;

use crate::config::{AuthType, HostConfig};

/// Environment variable holding a bearer token that overrides the keyring.
pub const TOKEN_ENV: &str = "STASH_TOKEN";

/// Authentication credential attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// HTTP access token.
    PersonalAccessToken { token: String },

    /// Username and password.
    Basic { username: String, password: String },
}

impl AuthCredential {
    /// Adds the matching `Authorization` header to `request`.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::PersonalAccessToken { token } => request.bearer_auth(token),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    /// Short name of the method, for status output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PersonalAccessToken { .. } => "token",
            Self::Basic { .. } => "basic",
        }
    }

    /// Builds the credential for `host` from a stored secret.
    ///
    /// Basic authentication needs the configured user; without one the
    /// secret is used as a token.
    pub fn from_secret(host: &HostConfig, secret: String) -> Self {
        match (host.auth, &host.user) {
            (AuthType::Basic, Some(user)) => Self::Basic {
                username: user.clone(),
                password: secret,
            },
            _ => Self::PersonalAccessToken { token: secret },
        }
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonalAccessToken { .. } => f
                .debug_struct("PersonalAccessToken")
                .field("token", &"<redacted>")
                .finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Finds the credential for a host.
///
/// `STASH_TOKEN` wins over the keyring. Returns `Ok(None)` when neither
/// has a secret, so anonymous access still works on public servers.
pub fn resolve_credential(host_key: &str, host: &HostConfig) -> Result<Option<AuthCredential>> {
    if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty()) {
        tracing::debug!("using token from {TOKEN_ENV}");
        return Ok(Some(AuthCredential::PersonalAccessToken {
            token: token.trim().to_string(),
        }));
    }

    let secret = KeyringStore::new().get(host_key)?;
    Ok(secret.map(|secret| AuthCredential::from_secret(host, secret)))
}
