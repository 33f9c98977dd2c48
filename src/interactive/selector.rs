//
//  stash-client
//  interactive/selector.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Selection menus

use anyhow::Result;
use dialoguer::Select;

use crate::config::AuthType;

const AUTH_CHOICES: [(AuthType, &str); 2] = [
    (AuthType::Token, "HTTP access token"),
    (AuthType::Basic, "Username and password"),
];

/// Asks how to authenticate, starting on `current`.
pub fn select_auth_type(current: AuthType) -> Result<AuthType> {
    let labels: Vec<&str> = AUTH_CHOICES.iter().map(|(_, label)| *label).collect();
    let default = AUTH_CHOICES
        .iter()
        .position(|(auth, _)| *auth == current)
        .unwrap_or_default();

    let index = Select::new()
        .with_prompt("How would you like to authenticate?")
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(AUTH_CHOICES[index].0)
}
