//
//  stash-client
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Normalization
//!
//! Stash servers are identified by their base URL, which may carry a port
//! and a context path (`http://build:7990/stash`). Configuration entries
//! and keyring entries are keyed by the normalized form of that URL:
//! scheme dropped, lowercased, no trailing slash.
//!
//! ```rust
//! use stash_client::config::{host_url, normalize_host};
//!
//! assert_eq!(normalize_host("https://Stash.Example.com/"), "stash.example.com");
//! assert_eq!(normalize_host("http://build:7990/stash"), "build:7990/stash");
//! assert_eq!(host_url("stash.example.com"), "https://stash.example.com");
//! ```

/// Default scheme for hosts given without one.
pub const DEFAULT_SCHEME: &str = "https";

/// Turns a base URL or host into the key used for configuration and
/// credentials.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(host);
    host.trim_end_matches('/').to_lowercase()
}

/// Turns a host into a base URL, adding `https://` when no scheme is
/// given and dropping trailing slashes.
pub fn host_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("{DEFAULT_SCHEME}://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("stash.example.com"), "stash.example.com");
        assert_eq!(normalize_host(" HTTPS://Stash.Example.com// "), "stash.example.com");
        assert_eq!(
            normalize_host("http://localhost:7990/Stash/"),
            "localhost:7990/stash"
        );
    }

    #[test]
    fn test_host_url() {
        assert_eq!(host_url("stash.example.com/"), "https://stash.example.com");
        assert_eq!(
            host_url("http://localhost:7990/stash/"),
            "http://localhost:7990/stash"
        );
    }
}
