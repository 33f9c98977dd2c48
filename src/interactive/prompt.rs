//
//  stash-client
//  interactive/prompt.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Text, secret and confirmation prompts
//!
//! ```no_run
//! use stash_client::interactive::prompt::{prompt_confirm_with_default, prompt_server_url};
//!
//! # fn example() -> anyhow::Result<()> {
//! let url = prompt_server_url()?;
//! if prompt_confirm_with_default(&format!("Log in to {url}?"), true)? {
//!     println!("ok");
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use dialoguer::{Confirm, Input, Password};

use crate::api::StashClient;
use crate::config::AuthType;

pub fn prompt_input(message: &str) -> Result<String> {
    let input: String = Input::new().with_prompt(message).interact_text()?;
    Ok(input.trim().to_string())
}

pub fn prompt_input_with_default(message: &str, default: &str) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(message)
        .default(default.to_string())
        .interact_text()?;
    Ok(input.trim().to_string())
}

/// Asks for a server base URL until one a client can be built from is
/// entered.
pub fn prompt_server_url() -> Result<String> {
    let url: String = Input::new()
        .with_prompt("Stash server URL (e.g., https://stash.example.com)")
        .validate_with(|input: &String| -> Result<(), String> {
            StashClient::new(input.trim())
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(url.trim().to_string())
}

/// Masked input for the secret `auth` sends: an access token or a
/// password.
pub fn prompt_secret(auth: AuthType) -> Result<String> {
    let label = match auth {
        AuthType::Token => "Access token",
        AuthType::Basic => "Password",
    };
    let secret = Password::new().with_prompt(label).interact()?;
    Ok(secret)
}

pub fn prompt_confirm_with_default(message: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}
