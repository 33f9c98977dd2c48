//
//  stash-client
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Reading and verifying secrets

use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use crate::api::resource::push_path;
use crate::api::{ApiError, QueryParams, StashClient};

/// Reads one line from stdin, for `--with-token`.
pub fn read_token_from_stdin() -> Result<String> {
    use std::io::{self, BufRead};

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}

/// A token must be non-empty and contain no whitespace.
pub fn validate_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

/// Name of the authenticated user, or `None` when the server treats the
/// request as anonymous.
///
/// Uses the application-links `whoami` servlet, which answers with the
/// plain user name.
pub async fn whoami(client: &StashClient) -> Result<Option<String>, ApiError> {
    let mut url = client.base_url().clone();
    push_path(&mut url, "plugins/servlet/applinks/whoami")?;

    let response = client
        .request(Method::GET, url, &QueryParams::new(), None::<&()>)
        .await?;
    let name = response.text().await?;
    let name = name.trim();
    debug!(user = name, "whoami");

    if name.is_empty() || name == "anonymous" {
        Ok(None)
    } else {
        Ok(Some(name.to_string()))
    }
}

/// Checks that `client`'s credential is accepted.
///
/// Returns `Ok(false)` for 401, `Ok(true)` when listing one project
/// succeeds, and the error for anything else.
pub async fn verify_credential(client: &StashClient) -> Result<bool, ApiError> {
    match client.projects().list().limit(1).next_page().await {
        Ok(_) => Ok(true),
        Err(err) if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED) => Ok(false),
        Err(err) => Err(err),
    }
}
