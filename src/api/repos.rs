//
//  stash-client
//  api/repos.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Repository API
//!
//! Repositories live inside a project and are addressed by slug. The
//! slug is derived from the repository name, so renaming a repository
//! may change its URL.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST            /rest/api/1.0/projects/{key}/repos
//! GET/PUT/POST/DELETE /rest/api/1.0/projects/{key}/repos/{slug}
//! GET                 .../repos/{slug}/branches
//! GET/PUT             .../repos/{slug}/branches/default
//! GET                 .../repos/{slug}/tags
//! GET                 .../repos/{slug}/browse[/{path}]
//! GET                 .../repos/{slug}/files[/{path}]
//! GET                 .../repos/{slug}/changes
//! GET                 .../repos/{slug}/commits[/{id}]
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_client::api::client::StashClient;
//!
//! # async fn example() -> Result<(), stash_client::api::common::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?;
//! let repo = client.project("PRJ").repo("my-repo");
//!
//! let default = repo.default_branch().await?;
//! let mut commits = repo.commits(&default.id, None, None);
//! while let Some(commit) = commits.try_next().await? {
//!     println!("{} {}", commit.display_id, commit.summary());
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::{api_enum, ApiError, Paginator, QueryParams, SelfLink};
use super::permissions::Permissions;
use super::pullrequests::{PullRequestResource, PullRequests};
use super::resource::ResourceBase;

/// A repository as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: u64,

    /// URL-safe identifier derived from the name.
    pub slug: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub project: ProjectRef,

    /// Source control type, `git` on every current server.
    #[serde(rename = "scmId", default)]
    pub scm_id: String,

    /// `AVAILABLE`, `INITIALISING` or `INITIALISATION_FAILED`.
    #[serde(default)]
    pub state: String,

    #[serde(rename = "statusMessage", default)]
    pub status_message: Option<String>,

    #[serde(default)]
    pub forkable: bool,

    #[serde(rename = "public", default)]
    pub is_public: bool,

    /// Repository this one was forked from.
    #[serde(default)]
    pub origin: Option<Box<Repository>>,

    #[serde(default)]
    pub links: Option<RepositoryLinks>,
}

impl Repository {
    /// Clone URL for `protocol` (`http` or `ssh`).
    pub fn clone_url(&self, protocol: &str) -> Option<&str> {
        self.links
            .as_ref()?
            .clone
            .iter()
            .find(|link| link.name == protocol)
            .map(|link| link.href.as_str())
    }

    /// Web UI URL of the repository.
    pub fn web_url(&self) -> Option<&str> {
        self.links
            .as_ref()?
            .self_link
            .first()
            .map(|link| link.href.as_str())
    }
}

/// Minimal project reference embedded in a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub id: u64,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "public", default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryLinks {
    #[serde(default)]
    pub clone: Vec<CloneLink>,
    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneLink {
    pub href: String,
    /// `http` or `ssh`.
    pub name: String,
}

/// Body of `POST /projects/{key}/repos`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRepositoryRequest {
    pub name: String,
    #[serde(rename = "scmId")]
    pub scm_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forkable: Option<bool>,
}

impl Default for CreateRepositoryRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            scm_id: "git".to_string(),
            forkable: None,
        }
    }
}

/// A branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Fully qualified ref, e.g. `refs/heads/master`.
    pub id: String,

    /// Short name, e.g. `master`.
    #[serde(rename = "displayId")]
    pub display_id: String,

    /// Hash of the branch head. Older servers call it `latestChangeset`.
    #[serde(rename = "latestCommit", alias = "latestChangeset", default)]
    pub latest_commit: Option<String>,

    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// A tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,

    #[serde(rename = "displayId")]
    pub display_id: String,

    #[serde(rename = "latestCommit", alias = "latestChangeset", default)]
    pub latest_commit: Option<String>,

    /// Hash of the tag object for annotated tags.
    #[serde(default)]
    pub hash: Option<String>,
}

/// Author or committer of a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

/// Parent reference of a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub id: String,
    #[serde(rename = "displayId", default)]
    pub display_id: Option<String>,
}

/// A commit (changeset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,

    #[serde(rename = "displayId")]
    pub display_id: String,

    pub author: Person,

    /// Milliseconds since the Unix epoch.
    #[serde(rename = "authorTimestamp", default)]
    pub author_timestamp: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub parents: Vec<CommitRef>,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Path of a changed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePath {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(rename = "toString")]
    pub to_string: String,
}

/// One file changed by a commit or pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "contentId", default)]
    pub content_id: Option<String>,

    pub path: ChangePath,

    /// Previous path for moves and copies.
    #[serde(rename = "srcPath", default)]
    pub src_path: Option<ChangePath>,

    /// `ADD`, `MODIFY`, `DELETE`, `MOVE` or `COPY`.
    #[serde(rename = "type")]
    pub change_type: String,

    /// `FILE` or `DIRECTORY`.
    #[serde(rename = "nodeType", default)]
    pub node_type: Option<String>,
}

api_enum! {
    /// Ordering of branch and tag listings.
    pub enum RefOrder ("ref order") {
        Alphabetical => "ALPHABETICAL",
        Modification => "MODIFICATION",
    }
}

/// Options for browsing repository content.
#[derive(Debug, Clone, Default)]
pub struct BrowseOptions {
    /// Commit, branch or tag to browse at. Defaults to the default branch.
    pub at: Option<String>,
    /// Only return the type of the path (`FILE` or `DIRECTORY`).
    pub type_only: bool,
    /// Include blame information for files.
    pub blame: bool,
    /// With `blame`, omit the file content.
    pub no_content: bool,
}

impl BrowseOptions {
    fn params(&self) -> QueryParams {
        let mut params = QueryParams::new().with_opt("at", self.at.as_deref());
        if self.type_only {
            params.push("type", true);
        }
        if self.blame {
            params.push("blame", true);
        }
        if self.no_content {
            params.push("noContent", true);
        }
        params
    }
}

/// Repositories of one project, `/projects/{key}/repos`.
#[derive(Debug, Clone)]
pub struct Repos<'a> {
    project_key: String,
    resource: ResourceBase<'a>,
}

impl<'a> Repos<'a> {
    pub(crate) fn new(project_key: &str, resource: ResourceBase<'a>) -> Self {
        Self {
            project_key: project_key.to_string(),
            resource,
        }
    }

    /// Every repository of the project visible to the caller.
    pub fn list(&self) -> Paginator<'a, Repository> {
        self.resource.paginate("", QueryParams::new())
    }

    /// Creates a repository. `scm_id` defaults to `git`.
    pub async fn create(&self, name: &str, scm_id: Option<&str>) -> Result<Repository, ApiError> {
        let mut request = CreateRepositoryRequest {
            name: name.to_string(),
            ..Default::default()
        };
        if let Some(scm_id) = scm_id {
            request.scm_id = scm_id.to_string();
        }
        self.create_with(&request).await
    }

    /// Creates a repository from a full request body.
    pub async fn create_with(
        &self,
        request: &CreateRepositoryRequest,
    ) -> Result<Repository, ApiError> {
        self.resource.post("", request).await
    }

    /// Handle for the repository with `slug`. No request is made.
    pub fn repo(&self, slug: &str) -> RepoResource<'a> {
        RepoResource {
            project_key: self.project_key.clone(),
            slug: slug.to_string(),
            resource: self.resource.child(slug),
        }
    }
}

/// A single repository, `/projects/{key}/repos/{slug}`.
#[derive(Debug, Clone)]
pub struct RepoResource<'a> {
    project_key: String,
    slug: String,
    resource: ResourceBase<'a>,
}

impl<'a> RepoResource<'a> {
    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn resource(&self) -> &ResourceBase<'a> {
        &self.resource
    }

    /// Fetches the repository.
    pub async fn get(&self) -> Result<Repository, ApiError> {
        self.resource.get("", &QueryParams::new()).await
    }

    /// Renames the repository.
    ///
    /// The slug is derived from the name, so the returned repository may
    /// live at a different URL than this handle.
    pub async fn update(&self, name: &str) -> Result<Repository, ApiError> {
        self.resource.put("", &json!({ "name": name })).await
    }

    /// Forks the repository.
    ///
    /// # Parameters
    ///
    /// * `name` - Name of the fork; defaults to this repository's name
    /// * `project_key` - Target project; defaults to the caller's personal project
    pub async fn fork(
        &self,
        name: Option<&str>,
        project_key: Option<&str>,
    ) -> Result<Repository, ApiError> {
        let mut body = json!({});
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        if let Some(key) = project_key {
            body["project"] = json!({ "key": key });
        }
        self.resource.post("", &body).await
    }

    /// Schedules the repository for deletion.
    pub async fn delete(&self) -> Result<(), ApiError> {
        self.resource.delete("", &QueryParams::new()).await
    }

    /// Branches, optionally filtered by `filter_text`.
    pub fn branches(
        &self,
        filter_text: Option<&str>,
        order_by: Option<RefOrder>,
    ) -> Paginator<'a, Branch> {
        let params = QueryParams::new()
            .with_opt("filterText", filter_text)
            .with_opt("orderBy", order_by);
        self.resource.paginate("branches", params)
    }

    /// The default branch.
    pub async fn default_branch(&self) -> Result<Branch, ApiError> {
        self.resource
            .get("branches/default", &QueryParams::new())
            .await
    }

    /// Sets the default branch. `id` may be a short name or a full ref.
    pub async fn set_default_branch(&self, id: &str) -> Result<bool, ApiError> {
        let id = if id.starts_with("refs/") {
            id.to_string()
        } else {
            format!("refs/heads/{id}")
        };
        self.resource
            .call_ok(
                reqwest::Method::PUT,
                "branches/default",
                &QueryParams::new(),
                Some(&json!({ "id": id })),
            )
            .await
    }

    /// Tags, optionally filtered by `filter_text`.
    pub fn tags(&self, filter_text: Option<&str>, order_by: Option<RefOrder>) -> Paginator<'a, Tag> {
        let params = QueryParams::new()
            .with_opt("filterText", filter_text)
            .with_opt("orderBy", order_by);
        self.resource.paginate("tags", params)
    }

    /// Content of the repository root, line by line.
    ///
    /// Each item is one raw line object, e.g. `{"text": "..."}`, read from
    /// the `lines` key of every page.
    pub fn browse(&self, options: &BrowseOptions) -> Paginator<'a, Value> {
        self.browse_path("", options)
    }

    /// Content of the file at `path`, line by line.
    pub fn browse_path(&self, path: &str, options: &BrowseOptions) -> Paginator<'a, Value> {
        self.resource
            .nested("browse")
            .paginate(path, options.params())
            .values_key("lines")
    }

    /// Paths of every file below `path` (the root when empty).
    pub fn files(&self, path: &str, at: Option<&str>) -> Paginator<'a, String> {
        self.resource
            .nested("files")
            .paginate(path, QueryParams::new().with_opt("at", at))
    }

    /// Files changed in `until`, compared with `since` or its first
    /// parent.
    pub fn changes(&self, until: &str, since: Option<&str>) -> Paginator<'a, Change> {
        let params = QueryParams::new()
            .with("until", until)
            .with_opt("since", since);
        self.resource.paginate("changes", params)
    }

    /// Commits reachable from `until` (inclusive) and not from `since`
    /// (exclusive), optionally limited to those touching `path`.
    pub fn commits(
        &self,
        until: &str,
        since: Option<&str>,
        path: Option<&str>,
    ) -> Paginator<'a, Commit> {
        let params = QueryParams::new()
            .with("until", until)
            .with("withCounts", false)
            .with_opt("since", since)
            .with_opt("path", path);
        self.resource.paginate("commits", params)
    }

    /// A single commit by hash or ref.
    pub async fn commit(&self, id: &str) -> Result<Commit, ApiError> {
        self.resource
            .nested("commits")
            .child(id)
            .get("", &QueryParams::new())
            .await
    }

    /// The repository's pull requests.
    pub fn pull_requests(&self) -> PullRequests<'a> {
        PullRequests::new(
            &self.project_key,
            &self.slug,
            self.resource.nested("/pull-requests"),
        )
    }

    /// Handle for one pull request.
    pub fn pull_request(&self, id: u64) -> PullRequestResource<'a> {
        self.pull_requests().pull_request(id)
    }

    /// Repository-level permissions.
    pub fn permissions(&self) -> Permissions<'a> {
        Permissions::new(self.resource.nested("permissions"))
    }
}
