//
//  stash-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Client Library
//!
//! An async client for the Atlassian Stash (Bitbucket Server) REST API,
//! plus the `stash` command-line tool built on top of it.
//!
//! ## Overview
//!
//! Every REST resource is reached through a handle that knows its URL
//! relative to its parent. Collection endpoints are walked with a
//! [`api::Paginator`], and every non-2xx response becomes an
//! [`api::ApiError`] carrying the status code and decoded error body.
//!
//! ## Module Structure
//!
//! - [`cli`]: command-line interface definitions using clap
//! - [`api`]: HTTP client, resource handles, pagination and errors
//! - [`auth`]: credentials (access tokens, basic auth, keyring storage)
//! - [`config`]: configuration file management
//! - [`output`]: output formatting (table, JSON)
//! - [`interactive`]: interactive prompts and selectors
//! - [`util`]: utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stash_client::api::StashClient;
//!
//! # async fn example() -> Result<(), stash_client::api::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?;
//!
//! let repos = client.project("PRJ").repos().list().collect_all().await?;
//! for repo in repos {
//!     println!("{}", repo.slug);
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Stash REST API client.
///
/// Resource handles for projects, repositories, pull requests and
/// permissions, the shared pagination walker and error types.
pub mod api;

/// Authentication and credential management.
///
/// Handles HTTP access tokens and basic authentication, with secrets
/// stored in the system keychain.
pub mod auth;

/// Configuration file management.
///
/// Manages the CLI's configuration stored in platform-specific locations:
/// - Linux: `~/.config/stash/config.toml`
/// - macOS: `~/Library/Application Support/stash/config.toml`
/// - Windows: `%APPDATA%\stash\config.toml`
pub mod config;

/// Output formatting for tables and JSON.
pub mod output;

/// Interactive terminal prompts.
pub mod interactive;

/// Utility functions and helpers.
pub mod util;

/// Re-export of the main CLI struct for convenient access.
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Application name, used for the binary and configuration paths.
pub const APP_NAME: &str = "stash";

/// Application version, taken from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Scripts can tell the kind of failure apart without parsing stderr.
///
/// ```rust,no_run
/// use stash_client::exit_codes;
///
/// std::process::exit(exit_codes::NOT_FOUND);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The server answered 401 or 403.
    ///
    /// Run `stash auth login` to authenticate.
    pub const AUTH_ERROR: i32 = 4;

    /// The server answered 404.
    pub const NOT_FOUND: i32 = 8;

    /// Operation cancelled at a confirmation prompt.
    pub const CANCELLED: i32 = 16;

    /// The server answered 429.
    pub const RATE_LIMIT: i32 = 32;
}
