//
//  stash-client
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Secure credential storage
//!
//! Secrets are stored in the platform keyring (macOS Keychain, Windows
//! Credential Manager, Secret Service on Linux) under the service name
//! `stash-client`, one entry per normalized host.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "stash-client";

/// Keyring-backed secret store.
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Stores `secret` for `host`, replacing any previous one.
    pub fn store(&self, host: &str, secret: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host)?;
        entry
            .set_password(secret)
            .with_context(|| format!("Failed to store credentials for {host} in the keyring"))?;
        Ok(())
    }

    /// The secret for `host`, or `None` if nothing is stored.
    pub fn get(&self, host: &str) -> Result<Option<String>> {
        let entry = Entry::new(&self.service, host)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read credentials for {host}")),
        }
    }

    /// Removes the secret for `host`. Missing entries are not an error.
    pub fn delete(&self, host: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove credentials for {host}")),
        }
    }
}
