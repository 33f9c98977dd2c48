//
//  stash-client
//  cli/api.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Direct API access command
//!
//! Sends an authenticated request to any REST endpoint and prints the
//! response. Paths are relative to `rest/api/1.0` unless they start with
//! `rest/` or `plugins/`, which are resolved against the server base URL.
//!
//! ## Examples
//!
//! ```bash
//! # Get a repository
//! stash api projects/PRJ/repos/my-repo
//!
//! # Create a project
//! stash api -X POST projects -F key=NEW -F name="New project"
//!
//! # Walk every page of a collection
//! stash api projects/PRJ/repos --paginate
//!
//! # Another REST plugin
//! stash api rest/branch-utils/1.0/projects/PRJ/repos/my-repo/branches/info/abc123
//! ```

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Args;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::api::resource::push_path;
use crate::api::{Paginator, QueryParams, StashClient};
use crate::output::write_json;

use super::{GlobalOptions, Session};

/// Make direct API requests
#[derive(Args, Debug)]
pub struct ApiCommand {
    /// API endpoint (e.g., projects/PRJ/repos)
    pub endpoint: String,

    /// HTTP method (GET, POST, PUT, DELETE)
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Request body fields (key=value, nested with dots, values parsed as JSON)
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,

    /// Raw string body fields (key=value)
    #[arg(long, action = clap::ArgAction::Append)]
    pub raw_field: Vec<String>,

    /// Query string parameters (key=value)
    #[arg(long, short = 'q', action = clap::ArgAction::Append)]
    pub query: Vec<String>,

    /// Read request body from file (- for stdin)
    #[arg(long, short = 'f')]
    pub input: Option<String>,

    /// Fetch every page and print the combined items
    #[arg(long)]
    pub paginate: bool,

    /// Items key of each page when paginating
    #[arg(long, default_value = "values", requires = "paginate")]
    pub values_key: String,
}

impl ApiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let method = self.parse_method()?;
        let body = self.build_body()?;

        let session = Session::open(global)?;
        let (url, mut query) = endpoint_url(&session.client, &self.endpoint)?;
        for pair in &self.query {
            let (key, value) = split_pair(pair)?;
            query.set(key, value);
        }

        if self.paginate {
            if method != Method::GET {
                bail!("--paginate only works with GET requests");
            }
            let start = start_param(&query)?;
            let values = Paginator::<Value>::new(&session.client, url, query)
                .values_key(self.values_key.as_str())
                .start_at(start)
                .collect_all()
                .await?;
            return write_json(&values);
        }

        let response = session
            .client
            .request(method, url, &query, body.as_ref())
            .await?;
        let text = response.text().await?;

        match serde_json::from_str::<Value>(&text) {
            Ok(json) => write_json(&json)?,
            Err(_) if text.is_empty() => {}
            Err(_) => println!("{text}"),
        }
        Ok(())
    }

    fn parse_method(&self) -> Result<Method> {
        match self.method.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            _ => bail!("Unsupported HTTP method: {}", self.method),
        }
    }

    fn build_body(&self) -> Result<Option<Value>> {
        if let Some(input) = &self.input {
            let content = if input == "-" {
                let mut buffer = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
                buffer
            } else {
                fs::read_to_string(input)?
            };
            return Ok(Some(serde_json::from_str(&content)?));
        }

        if self.field.is_empty() && self.raw_field.is_empty() {
            return Ok(None);
        }

        let mut body = serde_json::Map::new();
        for field in &self.field {
            let (key, value) = split_pair(field)?;
            set_nested_value(&mut body, key, parse_field_value(value));
        }
        for field in &self.raw_field {
            let (key, value) = split_pair(field)?;
            set_nested_value(&mut body, key, Value::String(value.to_string()));
        }
        Ok(Some(Value::Object(body)))
    }
}

/// Resolves `endpoint` to an absolute URL plus any query string it
/// carried.
fn endpoint_url(client: &StashClient, endpoint: &str) -> Result<(Url, QueryParams)> {
    let (path, query_string) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };
    let path = path.trim_start_matches('/');

    let url = if path.starts_with("rest/") || path.starts_with("plugins/") {
        let mut url = client.base_url().clone();
        push_path(&mut url, path)?;
        url
    } else {
        client.url(path)?
    };

    let mut query = QueryParams::new();
    if let Some(query_string) = query_string {
        for (key, value) in url::form_urlencoded::parse(query_string.as_bytes()) {
            query.push(&key, value);
        }
    }
    Ok((url, query))
}

/// Offset of the first item to fetch: the `start` query parameter, or 0.
fn start_param(query: &QueryParams) -> Result<u64> {
    match query.get("start") {
        Some(start) => start
            .parse()
            .with_context(|| format!("Invalid start parameter: {start}")),
        None => Ok(0),
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("Invalid field format: {}. Expected key=value", pair),
    }
}

/// Interprets `true`, `false`, `null`, numbers and JSON literals;
/// anything else stays a string.
fn parse_field_value(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(n) = value.parse::<i64>() {
                Value::Number(n.into())
            } else if value.starts_with('[') || value.starts_with('{') {
                serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
            } else {
                Value::String(value.to_string())
            }
        }
    }
}

fn set_nested_value(obj: &mut serde_json::Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            obj.insert(key.to_string(), value);
        }
        Some((first, rest)) => {
            let entry = obj
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(nested) = entry {
                set_nested_value(nested, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_field_value() {
        assert_eq!(parse_field_value("true"), json!(true));
        assert_eq!(parse_field_value("42"), json!(42));
        assert_eq!(parse_field_value("[1,2]"), json!([1, 2]));
        assert_eq!(parse_field_value("{broken"), json!("{broken"));
        assert_eq!(parse_field_value("Platform"), json!("Platform"));
    }

    #[test]
    fn test_set_nested_value() {
        let mut body = serde_json::Map::new();
        set_nested_value(&mut body, "name", json!("fork"));
        set_nested_value(&mut body, "project.key", json!("PRJ"));
        set_nested_value(&mut body, "project.name", json!("Platform"));

        assert_eq!(
            Value::Object(body),
            json!({"name": "fork", "project": {"key": "PRJ", "name": "Platform"}})
        );
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("a=b=c").unwrap(), ("a", "b=c"));
        assert!(split_pair("novalue").is_err());
        assert!(split_pair("=x").is_err());
    }

    #[test]
    fn test_endpoint_url() {
        let client = StashClient::new("https://stash.example.com/stash").unwrap();

        let (url, query) = endpoint_url(&client, "/projects/PRJ/repos?limit=5").unwrap();
        assert_eq!(
            url.as_str(),
            "https://stash.example.com/stash/rest/api/1.0/projects/PRJ/repos"
        );
        assert_eq!(query.get("limit"), Some("5"));

        let (url, query) = endpoint_url(&client, "rest/branch-utils/1.0/projects").unwrap();
        assert_eq!(
            url.as_str(),
            "https://stash.example.com/stash/rest/branch-utils/1.0/projects"
        );
        assert!(query.is_empty());
    }

    #[test]
    fn test_start_param() {
        let client = StashClient::new("https://stash.example.com").unwrap();

        let (_, query) = endpoint_url(&client, "projects?start=25&limit=5").unwrap();
        assert_eq!(start_param(&query).unwrap(), 25);

        let (_, query) = endpoint_url(&client, "projects").unwrap();
        assert_eq!(start_param(&query).unwrap(), 0);

        let (_, query) = endpoint_url(&client, "projects?start=-1").unwrap();
        assert!(start_param(&query).is_err());
    }

    #[tokio::test]
    async fn test_paginate_resumes_at_start_param() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("start".into(), "25".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"values":[{"key":"Z"}],"isLastPage":true,"start":25}"#)
            .expect(1)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let (url, query) = endpoint_url(&client, "projects?start=25&limit=5").unwrap();
        let start = start_param(&query).unwrap();
        let values = Paginator::<Value>::new(&client, url, query)
            .start_at(start)
            .collect_all()
            .await
            .unwrap();

        assert_eq!(values, vec![json!({"key": "Z"})]);
        mock.assert_async().await;
    }
}
