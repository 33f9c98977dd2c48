//
//  stash-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash REST API
//!
//! Typed access to the Atlassian Stash / Bitbucket Server REST API
//! (`/rest/api/1.0`).
//!
//! ## Module Structure
//!
//! - [`client`]: [`StashClient`], the connection to one server
//! - [`resource`]: [`ResourceBase`](resource::ResourceBase), URL composition shared by every endpoint
//! - [`response`]: status checking and body decoding
//! - [`common`]: errors, query parameters and pagination
//! - [`projects`], [`repos`], [`pullrequests`], [`permissions`]: endpoint wrappers
//!
//! ## Resource Hierarchy
//!
//! ```text
//! StashClient
//! └── projects()                      /projects
//!     └── project(key)                /projects/{key}
//!         ├── permissions()           /projects/{key}/permissions
//!         └── repos()                 /projects/{key}/repos
//!             └── repo(slug)          /projects/{key}/repos/{slug}
//!                 ├── permissions()
//!                 └── pull_requests() /projects/{key}/repos/{slug}/pull-requests
//!                     └── pull_request(id)
//! ```

pub mod client;

pub mod common;

pub mod permissions;

pub mod projects;

pub mod pullrequests;

pub mod repos;

pub mod resource;

pub mod response;

pub use client::StashClient;

pub use common::{ApiError, ErrorBody, Page, Paginator, QueryParams};
