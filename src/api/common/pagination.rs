//
//  stash-client
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination for Stash REST API collections
//!
//! Collection endpoints answer with an offset-based envelope:
//!
//! ```json
//! {
//!     "size": 25,
//!     "limit": 25,
//!     "isLastPage": false,
//!     "values": [ ... ],
//!     "start": 0,
//!     "nextPageStart": 25
//! }
//! ```
//!
//! [`Page`] mirrors one envelope. [`Paginator`] walks the whole collection
//! lazily, requesting the next page with `start=<nextPageStart>` only when
//! the items of the current one have been consumed.
//!
//! # Example
//!
//! ```rust,no_run
//! use stash_client::api::client::StashClient;
//!
//! # async fn example() -> Result<(), stash_client::api::common::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?;
//!
//! let mut projects = client.projects().list();
//! while let Some(project) = projects.try_next().await? {
//!     println!("{}", project.key);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, QueryParams};
use crate::api::client::StashClient;
use crate::api::response;

/// Key holding the page items in the standard envelope.
pub const DEFAULT_VALUES_KEY: &str = "values";

/// One page of a paginated collection.
///
/// Only `values` is required. The other fields default when absent so
/// partial envelopes still decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order.
    pub values: Vec<T>,

    /// Number of items on this page.
    #[serde(default)]
    pub size: u32,

    /// Page size the server applied.
    #[serde(default)]
    pub limit: u32,

    /// Whether this is the last page.
    #[serde(rename = "isLastPage", default)]
    pub is_last_page: bool,

    /// Start index for the following page.
    #[serde(rename = "nextPageStart", default)]
    pub next_page_start: Option<u64>,

    /// Start index of this page.
    #[serde(default)]
    pub start: u64,
}

impl<T> Page<T> {
    /// Start index for the next request, if any.
    pub fn next_start(&self) -> Option<u64> {
        if self.is_last_page {
            None
        } else {
            self.next_page_start
        }
    }
}

/// Lazy walker over every item of a paginated collection.
///
/// Created by the endpoint methods that return collections. Nothing is
/// requested until [`Paginator::next_page`], [`Paginator::try_next`] or
/// [`Paginator::collect_all`] is called. The walk ends when the server
/// reports the last page, when a page carries no items key, or on the
/// first error. Call the endpoint method again to restart. A collection
/// whose path could not be composed yields its error on the first fetch.
#[derive(Debug)]
pub struct Paginator<'a, T> {
    client: &'a StashClient,
    url: Url,
    params: QueryParams,
    values_key: String,
    limit: Option<u32>,
    next_start: Option<u64>,
    buffer: VecDeque<T>,
    error: Option<ApiError>,
}

impl<'a, T: DeserializeOwned> Paginator<'a, T> {
    pub(crate) fn new(client: &'a StashClient, url: Url, params: QueryParams) -> Self {
        Self {
            client,
            url,
            params,
            values_key: DEFAULT_VALUES_KEY.to_string(),
            limit: None,
            next_start: Some(0),
            buffer: VecDeque::new(),
            error: None,
        }
    }

    pub(crate) fn failed(client: &'a StashClient, url: Url, error: ApiError) -> Self {
        Self {
            next_start: None,
            error: Some(error),
            ..Self::new(client, url, QueryParams::new())
        }
    }

    /// Requests `limit` items per page.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Starts the walk at `start` instead of the first item.
    pub fn start_at(mut self, start: u64) -> Self {
        self.next_start = Some(start);
        self
    }

    /// Reads the page items from `key` instead of `values`.
    pub fn values_key(mut self, key: impl Into<String>) -> Self {
        self.values_key = key.into();
        self
    }

    /// The collection URL, without paging parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches the next whole page.
    ///
    /// Returns `Ok(None)` once the collection is exhausted. Items already
    /// buffered by [`Paginator::try_next`] are not part of the returned
    /// page.
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>, ApiError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let Some(start) = self.next_start.take() else {
            return Ok(None);
        };

        let mut params = self.params.clone();
        params.set("start", start);
        if let Some(limit) = self.limit {
            params.set("limit", limit);
        }

        debug!(url = %self.url, start, "fetching page");
        let raw = self
            .client
            .send(Method::GET, self.url.clone(), &params, None::<&()>)
            .await?;
        let mut data: Value = response::decode(raw).await?;

        let Some(values) = data
            .as_object_mut()
            .and_then(|envelope| envelope.remove(&self.values_key))
        else {
            debug!(url = %self.url, key = %self.values_key, "page has no items; stopping");
            return Ok(None);
        };
        data[DEFAULT_VALUES_KEY] = values;
        let page: Page<T> = serde_json::from_value(data)?;

        match page.next_start() {
            Some(next) if next > start => self.next_start = Some(next),
            Some(next) => warn!(
                url = %self.url,
                start,
                next,
                "nextPageStart does not advance; stopping pagination"
            ),
            None if !page.is_last_page => warn!(
                url = %self.url,
                start,
                "page is not the last one but has no nextPageStart; stopping pagination"
            ),
            None => {}
        }

        Ok(Some(page))
    }

    /// Yields the next item, fetching another page when needed.
    pub async fn try_next(&mut self) -> Result<Option<T>, ApiError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.buffer.extend(page.values),
                None => return Ok(None),
            }
        }
    }

    /// Collects every remaining item.
    pub async fn collect_all(mut self) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Collects at most `max` items, requesting no more pages than needed.
    pub async fn collect_up_to(mut self, max: usize) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        while items.len() < max {
            match self.try_next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> StashClient {
        StashClient::new(&server.url()).unwrap()
    }

    fn envelope(values: Value, start: u64, next: Option<u64>, last: bool) -> String {
        let size = values.as_array().map(|v| v.len()).unwrap_or(0);
        let mut body = json!({
            "values": values,
            "size": size,
            "limit": 2,
            "isLastPage": last,
            "start": start,
        });
        if let Some(next) = next {
            body["nextPageStart"] = json!(next);
        }
        body.to_string()
    }

    #[test]
    fn test_page_navigation() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"values":[1,2],"isLastPage":false,"nextPageStart":2}"#)
                .unwrap();
        assert_eq!(page.next_start(), Some(2));

        let last: Page<u32> =
            serde_json::from_str(r#"{"values":[3],"isLastPage":true,"nextPageStart":3}"#).unwrap();
        assert_eq!(last.next_start(), None);
    }

    #[tokio::test]
    async fn test_stops_on_last_page_despite_next_page_start() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(envelope(json!([1, 2]), 0, Some(2), true))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<u32> = Paginator::new(&client, url, QueryParams::new())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(envelope(json!([1, 2]), 0, Some(2), false))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(envelope(json!([3, 4]), 2, Some(4), false))
            .create_async()
            .await;
        let third = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "4".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(envelope(json!([5]), 4, None, true))
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<u32> = Paginator::new(&client, url, QueryParams::new())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn test_keeps_caller_params_and_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "core".into()),
                Matcher::UrlEncoded("limit".into(), "10".into()),
                Matcher::UrlEncoded("start".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(envelope(json!(["a"]), 5, None, true))
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<String> =
            Paginator::new(&client, url, QueryParams::new().with("name", "core"))
                .limit(10)
                .start_at(5)
                .collect_all()
                .await
                .unwrap();

        assert_eq!(items, vec!["a"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stops_without_next_page_start() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(envelope(json!([1]), 0, None, false))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<u32> = Paginator::new(&client, url, QueryParams::new())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(items, vec![1]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stops_when_next_page_start_does_not_advance() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(envelope(json!([1]), 0, Some(0), false))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<u32> = Paginator::new(&client, url, QueryParams::new())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(items, vec![1]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_values_key_ends_sequence() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<u32> = Paginator::new(&client, url, QueryParams::new())
            .collect_all()
            .await
            .unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_custom_values_key() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects/P/repos/r/browse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"lines":[{"text":"hello"},{"text":"world"}],"isLastPage":true,"start":0}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects/P/repos/r/browse").unwrap();
        let lines: Vec<Value> = Paginator::new(&client, url, QueryParams::new())
            .values_key("lines")
            .collect_all()
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["text"], "world");
    }

    #[tokio::test]
    async fn test_error_ends_sequence() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(envelope(json!([1]), 0, Some(1), false))
            .create_async()
            .await;
        server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "1".into()))
            .with_status(500)
            .with_body(r#"{"errors":[{"message":"boom"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let mut pages: Paginator<'_, u32> = Paginator::new(&client, url, QueryParams::new());

        assert_eq!(pages.try_next().await.unwrap(), Some(1));
        let err = pages.try_next().await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.body().unwrap().message(), "boom");
        assert_eq!(pages.try_next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_collect_up_to_fetches_only_needed_pages() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(envelope(json!([1, 2]), 0, Some(2), false))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "2".into()))
            .with_status(200)
            .with_body(envelope(json!([3, 4]), 2, None, true))
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.url("projects").unwrap();
        let items: Vec<u32> = Paginator::new(&client, url, QueryParams::new())
            .collect_up_to(2)
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2]);
        first.assert_async().await;
        second.assert_async().await;
    }
}
