//
//  stash-client
//  api/resource.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Resource URL composition
//!
//! Every endpoint wrapper is built on [`ResourceBase`]: a URL below the
//! API root plus a reference to the shared [`StashClient`] and the URL of
//! the resource it was derived from. Nested resources are composed by
//! appending path segments, so `projects` → `projects/PRJ` →
//! `projects/PRJ/repos/my-repo` → `.../pull-requests/12`.
//!
//! Dynamic parts (project keys, repository slugs, branch names) go through
//! [`ResourceBase::child`], which percent-encodes them as a single segment.
//! Fixed sub-paths go through [`ResourceBase::nested`].

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::{PathSegmentsMut, Url};

use super::client::StashClient;
use super::common::{ApiError, Paginator, QueryParams};
use super::response;

fn is_dot(part: &str) -> bool {
    matches!(part, "." | "..")
}

fn segments_mut(url: &mut Url) -> Result<PathSegmentsMut<'_>, ApiError> {
    let text = url.to_string();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(text))
}

/// Appends every non-empty `/`-separated part of `path` to `url`.
///
/// A trailing empty segment on `url` (from a trailing slash) is dropped
/// first, so the result never contains `//`. A `.` or `..` part is
/// rejected with [`ApiError::InvalidPath`] and leaves `url` untouched.
pub(crate) fn push_path(url: &mut Url, path: &str) -> Result<(), ApiError> {
    let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    if let Some(dot) = parts.iter().find(|part| is_dot(part)) {
        return Err(ApiError::InvalidPath((*dot).to_string()));
    }
    segments_mut(url)?.pop_if_empty().extend(parts);
    Ok(())
}

/// Appends `segment` percent-encoded as one path segment.
///
/// Empty, `.` and `..` segments would address the enclosing collection
/// and are rejected.
pub(crate) fn push_segment(url: &mut Url, segment: &str) -> Result<(), ApiError> {
    if segment.is_empty() || is_dot(segment) {
        return Err(ApiError::InvalidPath(segment.to_string()));
    }
    segments_mut(url)?.pop_if_empty().push(segment);
    Ok(())
}

fn rejection(err: ApiError) -> String {
    match err {
        ApiError::InvalidPath(segment) => segment,
        other => other.to_string(),
    }
}

/// A REST resource: a URL, the client that talks to it and the URL of
/// the resource it was derived from.
///
/// Composing with a segment that cannot address a resource does not
/// panic. The resource remembers it, and every request made through it
/// (or anything derived from it) fails with [`ApiError::InvalidPath`]
/// before reaching the network.
#[derive(Debug, Clone)]
pub struct ResourceBase<'a> {
    client: &'a StashClient,
    url: Url,
    parent: Option<Url>,
    invalid: Option<String>,
}

impl<'a> ResourceBase<'a> {
    /// A top-level resource at `<api>/<path>`.
    pub fn root(client: &'a StashClient, path: &str) -> Self {
        let mut url = client.api_url().clone();
        let invalid = push_path(&mut url, path).err().map(rejection);
        Self {
            client,
            url,
            parent: None,
            invalid,
        }
    }

    /// A child resource one segment below this one.
    ///
    /// `segment` is percent-encoded as a whole, so a branch name such as
    /// `feature/login` stays one segment (`feature%2Flogin`).
    pub fn child(&self, segment: &str) -> Self {
        let mut url = self.url.clone();
        let result = push_segment(&mut url, segment);
        self.derive(url, result)
    }

    /// A resource at a fixed path relative to this one, such as
    /// `"/pull-requests"` or `"branches/default"`.
    pub fn nested(&self, relative_path: &str) -> Self {
        let mut url = self.url.clone();
        let result = push_path(&mut url, relative_path);
        self.derive(url, result)
    }

    fn derive(&self, url: Url, result: Result<(), ApiError>) -> Self {
        Self {
            client: self.client,
            url,
            parent: Some(self.url.clone()),
            invalid: self
                .invalid
                .clone()
                .or_else(|| result.err().map(rejection)),
        }
    }

    /// String form of this resource's URL, with `resource_path` appended
    /// when it is not empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stash_client::api::client::StashClient;
    /// use stash_client::api::resource::ResourceBase;
    ///
    /// let client = StashClient::new("https://stash.example.com").unwrap();
    /// let repos = ResourceBase::root(&client, "projects").child("PRJ").nested("repos");
    ///
    /// assert_eq!(repos.url(""), "https://stash.example.com/rest/api/1.0/projects/PRJ/repos");
    /// assert_eq!(
    ///     repos.url("/my-repo"),
    ///     "https://stash.example.com/rest/api/1.0/projects/PRJ/repos/my-repo"
    /// );
    /// ```
    pub fn url(&self, resource_path: &str) -> String {
        self.nested(resource_path).url.to_string()
    }

    /// URL of the resource this one was derived from.
    pub fn parent(&self) -> Option<&Url> {
        self.parent.as_ref()
    }

    pub fn client(&self) -> &'a StashClient {
        self.client
    }

    fn target(&self, path: &str) -> Result<Url, ApiError> {
        let resource = self.nested(path);
        match resource.invalid {
            Some(segment) => Err(ApiError::InvalidPath(segment)),
            None => Ok(resource.url),
        }
    }

    /// Sends a request to `path` below this resource and decodes the
    /// response as `T`.
    pub async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = self
            .client
            .send(method, self.target(path)?, query, body)
            .await?;
        response::decode(raw).await
    }

    /// Sends a request to `path` below this resource and returns `true`
    /// on a 2xx status.
    pub async fn call_ok<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<bool, ApiError> {
        let raw = self
            .client
            .send(method, self.target(path)?, query, body)
            .await?;
        response::ok_or_error(raw).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<T, ApiError> {
        self.call(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::POST, path, &QueryParams::new(), Some(body))
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::PUT, path, &QueryParams::new(), Some(body))
            .await
    }

    /// Deletes `path` below this resource. Any 2xx status is success.
    pub async fn delete(&self, path: &str, query: &QueryParams) -> Result<(), ApiError> {
        self.call_ok(Method::DELETE, path, query, None::<&()>)
            .await
            .map(|_| ())
    }

    /// Walks the paginated collection at `path` below this resource.
    pub fn paginate<T: DeserializeOwned>(&self, path: &str, params: QueryParams) -> Paginator<'a, T> {
        match self.target(path) {
            Ok(url) => Paginator::new(self.client, url, params),
            Err(err) => Paginator::failed(self.client, self.url.clone(), err),
        }
    }
}
