//
//  stash-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the Stash REST API
//!
//! This module provides [`StashClient`], the entry point of the library. It
//! owns the connection pool, the server base URL and the optional
//! credential, and hands out resource handles for projects, repositories
//! and pull requests.
//!
//! ## Features
//!
//! - Base URLs with or without a context path (`https://host/stash`)
//! - Authentication header injection
//! - JSON request bodies and decoded JSON responses
//! - Typed errors for every non-2xx response
//! - Custom User-Agent header
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_client::api::client::StashClient;
//! use stash_client::auth::AuthCredential;
//!
//! # async fn example() -> Result<(), stash_client::api::common::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?
//!     .with_auth(AuthCredential::PersonalAccessToken {
//!         token: "token".to_string(),
//!     });
//!
//! let repo = client.project("PRJ").repo("my-repo").get().await?;
//! println!("{}", repo.name);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::common::{ApiError, QueryParams};
use super::projects::{ProjectResource, Projects};
use super::resource::push_path;
use super::response;
use crate::auth::AuthCredential;
use crate::config::HostConfig;

/// Path of the REST API below the server base URL.
pub const API_PATH: &str = "rest/api/1.0";

/// Version information reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationProperties {
    /// Server version, e.g. `"7.21.0"`.
    pub version: String,

    #[serde(rename = "buildNumber", default)]
    pub build_number: Option<String>,

    #[serde(rename = "buildDate", default)]
    pub build_date: Option<String>,

    /// Product name, e.g. `"Bitbucket"` or `"Stash"`.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// HTTP client for a single Stash server.
///
/// Cloning is cheap: clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use stash_client::api::client::StashClient;
///
/// let client = StashClient::new("http://localhost:7990/stash").unwrap();
/// assert_eq!(
///     client.api_url().as_str(),
///     "http://localhost:7990/stash/rest/api/1.0"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StashClient {
    http: Client,
    base_url: Url,
    api_url: Url,
    auth: Option<AuthCredential>,
}

impl StashClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// A URL without a scheme is treated as `https://`. A trailing slash
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the URL cannot be parsed or is
    /// not a hierarchical HTTP(S) URL, and [`ApiError::Network`] if the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let mut api_url = base_url.clone();
        push_path(&mut api_url, API_PATH)?;

        Ok(Self {
            http: Client::builder()
                .user_agent(format!("stash-client/{}", crate::VERSION))
                .build()?,
            base_url,
            api_url,
            auth: None,
        })
    }

    /// Creates a client from a configured host entry.
    ///
    /// Credentials are not stored in the configuration; attach them with
    /// [`StashClient::with_auth`].
    pub fn from_config(config: &HostConfig) -> Result<Self, ApiError> {
        Self::new(&config.url)
    }

    /// Sets the credential sent with every request.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Returns `true` if a credential is attached.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// The server base URL, including any context path.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The REST API root, `<base>/rest/api/1.0`.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Builds an absolute API URL from a relative path.
    ///
    /// Each `/`-separated part of `path` becomes one segment; empty parts
    /// are skipped.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.api_url.clone();
        push_path(&mut url, path)?;
        Ok(url)
    }

    /// Sends a request without checking the status.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query.as_slice());
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        Ok(request.send().await?)
    }

    /// Sends a request and returns the raw response if its status is 2xx.
    ///
    /// # Parameters
    ///
    /// * `method` - HTTP method
    /// * `url` - Absolute URL, usually from [`StashClient::url`]
    /// * `query` - Query string parameters
    /// * `body` - Optional JSON body
    ///
    /// # Errors
    ///
    /// Any non-2xx status becomes [`ApiError::NotFound`] or
    /// [`ApiError::Http`].
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        response::check(self.send(method, url, query, body).await?).await
    }

    /// `GET <api>/<path>` decoded as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<T, ApiError> {
        let response = self
            .send(Method::GET, self.url(path)?, query, None::<&()>)
            .await?;
        response::decode(response).await
    }

    /// `POST <api>/<path>` with a JSON body, decoded as `T`.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(Method::POST, self.url(path)?, &QueryParams::new(), Some(body))
            .await?;
        response::decode(response).await
    }

    /// `PUT <api>/<path>` with a JSON body, decoded as `T`.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(Method::PUT, self.url(path)?, &QueryParams::new(), Some(body))
            .await?;
        response::decode(response).await
    }

    /// `DELETE <api>/<path>`.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, self.url(path)?, &QueryParams::new(), None::<&()>)
            .await?;
        Ok(())
    }

    /// Server version information.
    pub async fn application_properties(&self) -> Result<ApplicationProperties, ApiError> {
        self.get("application-properties", &QueryParams::new()).await
    }

    /// The project collection.
    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    /// Handle for a single project.
    pub fn project(&self, key: &str) -> ProjectResource<'_> {
        self.projects().project(key)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::InvalidUrl("empty URL".to_string()));
    }

    let url = if raw.contains("://") {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("https://{raw}"))?
    };

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}
