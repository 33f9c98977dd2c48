//
//  stash-client
//  api/pullrequests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Pull Request API
//!
//! Pull requests belong to the repository they target. State changes
//! (decline, reopen, merge) and updates carry the pull request `version`
//! for optimistic locking; a stale version is answered with 409 Conflict.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST   .../repos/{slug}/pull-requests
//! GET/PUT    .../pull-requests/{id}
//! POST       .../pull-requests/{id}/decline?version=
//! POST       .../pull-requests/{id}/reopen?version=
//! GET/POST   .../pull-requests/{id}/merge[?version=]
//! POST/DELETE .../pull-requests/{id}/approve
//! POST/DELETE .../pull-requests/{id}/watch
//! GET        .../pull-requests/{id}/activities
//! GET        .../pull-requests/{id}/changes
//! GET        .../pull-requests/{id}/commits
//! GET        .../pull-requests/{id}/diff[/{path}]
//! POST       .../pull-requests/{id}/comments
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_client::api::client::StashClient;
//! use stash_client::api::pullrequests::NewPullRequest;
//!
//! # async fn example() -> Result<(), stash_client::api::common::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?;
//! let pulls = client.project("PRJ").repo("my-repo").pull_requests();
//!
//! let pr = pulls
//!     .create(&NewPullRequest::new("Add feature", "feature/login", "master").reviewer("jdoe"))
//!     .await?;
//!
//! let status = pulls.pull_request(pr.id).can_merge().await?;
//! if status.can_merge {
//!     pulls.pull_request(pr.id).merge(pr.version).await?;
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::{api_enum, ApiError, Paginator, QueryParams, SelfLink, User};
use super::repos::{Change, Commit, ProjectRef};
use super::resource::ResourceBase;

api_enum! {
    /// Pull request state filter.
    pub enum PullRequestState ("pull request state") {
        Open => "OPEN",
        Declined => "DECLINED",
        Merged => "MERGED",
        All => "ALL",
    }
}

api_enum! {
    /// Whether to list pull requests into or out of the repository.
    pub enum Direction ("direction") {
        Incoming => "INCOMING",
        Outgoing => "OUTGOING",
    }
}

api_enum! {
    /// Listing order.
    pub enum PullRequestOrder ("order") {
        Oldest => "OLDEST",
        Newest => "NEWEST",
    }
}

/// A pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,

    /// Optimistic locking version, required by state changes.
    #[serde(default)]
    pub version: u64,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// `OPEN`, `DECLINED` or `MERGED`.
    pub state: String,

    #[serde(default)]
    pub open: bool,

    #[serde(default)]
    pub closed: bool,

    /// Milliseconds since the Unix epoch.
    #[serde(rename = "createdDate", default)]
    pub created_date: i64,

    #[serde(rename = "updatedDate", default)]
    pub updated_date: i64,

    #[serde(rename = "fromRef")]
    pub from_ref: PrRef,

    #[serde(rename = "toRef")]
    pub to_ref: PrRef,

    #[serde(default)]
    pub locked: bool,

    pub author: PrParticipant,

    #[serde(default)]
    pub reviewers: Vec<PrParticipant>,

    #[serde(default)]
    pub participants: Vec<PrParticipant>,

    #[serde(default)]
    pub links: Option<PullRequestLinks>,
}

impl PullRequest {
    pub fn web_url(&self) -> Option<&str> {
        self.links
            .as_ref()?
            .self_link
            .first()
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestLinks {
    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

/// Source or target ref of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrRef {
    pub id: String,

    #[serde(rename = "displayId")]
    pub display_id: String,

    #[serde(rename = "latestCommit", alias = "latestChangeset", default)]
    pub latest_commit: Option<String>,

    pub repository: RepositoryRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRef {
    #[serde(default)]
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    pub project: ProjectRef,
}

/// Author, reviewer or participant of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrParticipant {
    pub user: User,

    /// `AUTHOR`, `REVIEWER` or `PARTICIPANT`.
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub approved: bool,

    /// `APPROVED`, `UNAPPROVED` or `NEEDS_WORK` on newer servers.
    #[serde(default)]
    pub status: Option<String>,
}

/// Result of a merge check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeStatus {
    #[serde(rename = "canMerge")]
    pub can_merge: bool,

    #[serde(default)]
    pub conflicted: bool,

    #[serde(default)]
    pub vetoes: Vec<MergeVeto>,
}

/// A reason the server refuses to merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeVeto {
    #[serde(rename = "summaryMessage")]
    pub summary_message: String,

    #[serde(rename = "detailedMessage", default)]
    pub detailed_message: Option<String>,
}

/// A pull request comment and its replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,

    #[serde(default)]
    pub version: u64,

    pub text: String,

    pub author: User,

    #[serde(rename = "createdDate", default)]
    pub created_date: i64,

    #[serde(rename = "updatedDate", default)]
    pub updated_date: i64,

    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// One entry of the pull request activity stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,

    #[serde(rename = "createdDate", default)]
    pub created_date: i64,

    pub user: User,

    /// `OPENED`, `COMMENTED`, `APPROVED`, `MERGED`, `RESCOPED`, ...
    pub action: String,

    #[serde(default)]
    pub comment: Option<Comment>,
}

/// Filters for listing pull requests.
///
/// Defaults to open pull requests targeting the repository.
#[derive(Debug, Clone)]
pub struct ListPullRequests {
    pub direction: Direction,
    /// Only pull requests to (incoming) or from (outgoing) this ref.
    pub at: Option<String>,
    pub state: PullRequestState,
    pub order: Option<PullRequestOrder>,
}

impl Default for ListPullRequests {
    fn default() -> Self {
        Self {
            direction: Direction::Incoming,
            at: None,
            state: PullRequestState::Open,
            order: None,
        }
    }
}

impl ListPullRequests {
    fn params(&self) -> QueryParams {
        QueryParams::new()
            .with("direction", self.direction)
            .with_opt("at", self.at.as_deref().map(qualify_ref))
            .with("state", self.state)
            .with_opt("order", self.order)
    }
}

/// A pull request to create.
#[derive(Debug, Clone)]
pub struct NewPullRequest {
    pub title: String,
    pub from_ref: String,
    pub to_ref: String,
    pub description: Option<String>,
    pub reviewers: Vec<String>,
}

impl NewPullRequest {
    /// `from_ref` and `to_ref` may be bare branch names or full refs.
    pub fn new(title: &str, from_ref: &str, to_ref: &str) -> Self {
        Self {
            title: title.to_string(),
            from_ref: from_ref.to_string(),
            to_ref: to_ref.to_string(),
            description: None,
            reviewers: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds a reviewer by user name.
    pub fn reviewer(mut self, name: &str) -> Self {
        self.reviewers.push(name.to_string());
        self
    }
}

/// Changes to an existing pull request. `version` must match the
/// server's current version.
#[derive(Debug, Clone, Default)]
pub struct UpdatePullRequest {
    pub version: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Replaces the reviewer list when set.
    pub reviewers: Option<Vec<String>>,
    /// New target branch.
    pub to_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct CreatePullRequestBody<'r> {
    title: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'r str>,
    #[serde(rename = "fromRef")]
    from_ref: RefSpec<'r>,
    #[serde(rename = "toRef")]
    to_ref: RefSpec<'r>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reviewers: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
struct RefSpec<'r> {
    id: String,
    repository: RepositorySpec<'r>,
}

#[derive(Debug, Clone, Serialize)]
struct RepositorySpec<'r> {
    slug: &'r str,
    project: ProjectSpec<'r>,
}

#[derive(Debug, Clone, Serialize)]
struct ProjectSpec<'r> {
    key: &'r str,
}

/// Expands a bare branch name to `refs/heads/<name>`.
fn qualify_ref(name: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("refs/heads/{name}")
    }
}

fn reviewer_list(names: &[String]) -> Vec<Value> {
    names
        .iter()
        .map(|name| json!({ "user": { "name": name } }))
        .collect()
}

/// Pull requests of one repository, `.../repos/{slug}/pull-requests`.
#[derive(Debug, Clone)]
pub struct PullRequests<'a> {
    project_key: String,
    repo_slug: String,
    resource: ResourceBase<'a>,
}

impl<'a> PullRequests<'a> {
    pub(crate) fn new(project_key: &str, repo_slug: &str, resource: ResourceBase<'a>) -> Self {
        Self {
            project_key: project_key.to_string(),
            repo_slug: repo_slug.to_string(),
            resource,
        }
    }

    /// Pull requests matching `filter`.
    pub fn list(&self, filter: &ListPullRequests) -> Paginator<'a, PullRequest> {
        self.resource.paginate("", filter.params())
    }

    /// Opens a pull request from one branch of this repository to another.
    pub async fn create(&self, request: &NewPullRequest) -> Result<PullRequest, ApiError> {
        let spec = |name: &str| RefSpec {
            id: qualify_ref(name),
            repository: RepositorySpec {
                slug: &self.repo_slug,
                project: ProjectSpec {
                    key: &self.project_key,
                },
            },
        };
        let body = CreatePullRequestBody {
            title: &request.title,
            description: request.description.as_deref(),
            from_ref: spec(&request.from_ref),
            to_ref: spec(&request.to_ref),
            reviewers: reviewer_list(&request.reviewers),
        };
        self.resource.post("", &body).await
    }

    /// Handle for pull request `id`. No request is made.
    pub fn pull_request(&self, id: u64) -> PullRequestResource<'a> {
        PullRequestResource {
            id,
            resource: self.resource.child(&id.to_string()),
        }
    }
}

/// A single pull request, `.../pull-requests/{id}`.
#[derive(Debug, Clone)]
pub struct PullRequestResource<'a> {
    id: u64,
    resource: ResourceBase<'a>,
}

impl<'a> PullRequestResource<'a> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn get(&self) -> Result<PullRequest, ApiError> {
        self.resource.get("", &QueryParams::new()).await
    }

    /// Updates title, description, reviewers or target branch.
    pub async fn update(&self, update: &UpdatePullRequest) -> Result<PullRequest, ApiError> {
        let mut body = json!({ "version": update.version });
        if let Some(title) = &update.title {
            body["title"] = json!(title);
        }
        if let Some(description) = &update.description {
            body["description"] = json!(description);
        }
        if let Some(reviewers) = &update.reviewers {
            body["reviewers"] = Value::Array(reviewer_list(reviewers));
        }
        if let Some(to_ref) = &update.to_ref {
            body["toRef"] = json!({ "id": qualify_ref(to_ref) });
        }
        self.resource.put("", &body).await
    }

    async fn transition(&self, action: &str, version: u64) -> Result<PullRequest, ApiError> {
        self.resource
            .call(
                reqwest::Method::POST,
                action,
                &QueryParams::new().with("version", version),
                None::<&()>,
            )
            .await
    }

    pub async fn decline(&self, version: u64) -> Result<PullRequest, ApiError> {
        self.transition("decline", version).await
    }

    pub async fn reopen(&self, version: u64) -> Result<PullRequest, ApiError> {
        self.transition("reopen", version).await
    }

    /// Merges the pull request. Fails with 409 if it cannot be merged.
    pub async fn merge(&self, version: u64) -> Result<PullRequest, ApiError> {
        self.transition("merge", version).await
    }

    /// Whether the pull request can be merged, and why not.
    pub async fn can_merge(&self) -> Result<MergeStatus, ApiError> {
        self.resource.get("merge", &QueryParams::new()).await
    }

    /// Approves as the current user.
    pub async fn approve(&self) -> Result<PrParticipant, ApiError> {
        self.resource.post("approve", &json!({})).await
    }

    /// Withdraws the current user's approval.
    pub async fn unapprove(&self) -> Result<PrParticipant, ApiError> {
        self.resource
            .call(reqwest::Method::DELETE, "approve", &QueryParams::new(), None::<&()>)
            .await
    }

    pub async fn watch(&self) -> Result<bool, ApiError> {
        self.resource
            .call_ok(reqwest::Method::POST, "watch", &QueryParams::new(), None::<&()>)
            .await
    }

    pub async fn unwatch(&self) -> Result<bool, ApiError> {
        self.resource
            .call_ok(reqwest::Method::DELETE, "watch", &QueryParams::new(), None::<&()>)
            .await
    }

    /// Activity stream, newest first.
    pub fn activities(&self) -> Paginator<'a, Activity> {
        self.resource.paginate("activities", QueryParams::new())
    }

    /// Files changed by the pull request.
    pub fn changes(&self) -> Paginator<'a, Change> {
        self.resource.paginate("changes", QueryParams::new())
    }

    /// Commits included in the pull request.
    pub fn commits(&self) -> Paginator<'a, Commit> {
        self.resource.paginate("commits", QueryParams::new())
    }

    /// Structured diff of the whole pull request, or of one file.
    pub async fn diff(&self, path: Option<&str>) -> Result<Value, ApiError> {
        let diff = self.resource.nested("diff");
        diff.get(path.unwrap_or_default(), &QueryParams::new()).await
    }

    /// Adds a general comment.
    pub async fn comment(&self, text: &str) -> Result<Comment, ApiError> {
        self.resource
            .post("comments", &json!({ "text": text }))
            .await
    }

    /// Replies to an existing comment.
    pub async fn reply(&self, parent_id: u64, text: &str) -> Result<Comment, ApiError> {
        self.resource
            .post(
                "comments",
                &json!({ "text": text, "parent": { "id": parent_id } }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::StashClient;
    use mockito::{Matcher, Server};

    const PR: &str = r#"{
        "id": 101,
        "version": 3,
        "title": "Talking Nerdy",
        "description": "It's a kludge.",
        "state": "OPEN",
        "open": true,
        "closed": false,
        "createdDate": 1359075920,
        "updatedDate": 1359085920,
        "fromRef": {
            "id": "refs/heads/feature-ABC-123",
            "displayId": "feature-ABC-123",
            "latestCommit": "babecafebabecafebabecafebabecafebabecafe",
            "repository": {"slug": "my-repo", "name": null, "project": {"key": "PRJ"}}
        },
        "toRef": {
            "id": "refs/heads/master",
            "displayId": "master",
            "repository": {"slug": "my-repo", "name": null, "project": {"key": "PRJ"}}
        },
        "locked": false,
        "author": {
            "user": {"name": "tom", "emailAddress": "tom@example.com", "id": 115026, "displayName": "Tom", "active": true, "slug": "tom", "type": "NORMAL"},
            "role": "AUTHOR",
            "approved": true
        },
        "reviewers": [
            {"user": {"name": "jcitizen", "displayName": "Jane Citizen"}, "role": "REVIEWER", "approved": true}
        ],
        "participants": [],
        "links": {"self": [{"href": "http://link/to/pullrequest"}]}
    }"#;

    const BASE: &str = "/rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests";

    #[test]
    fn test_pull_request_deserialize() {
        let pr: PullRequest = serde_json::from_str(PR).unwrap();
        assert_eq!(pr.id, 101);
        assert_eq!(pr.version, 3);
        assert_eq!(pr.author.user.display(), "Tom");
        assert_eq!(pr.reviewers[0].user.display(), "Jane Citizen");
        assert_eq!(pr.web_url(), Some("http://link/to/pullrequest"));
    }

    #[test]
    fn test_qualify_ref() {
        assert_eq!(qualify_ref("master"), "refs/heads/master");
        assert_eq!(qualify_ref("feature/x"), "refs/heads/feature/x");
        assert_eq!(qualify_ref("refs/tags/v1"), "refs/tags/v1");
    }

    #[tokio::test]
    async fn test_list_defaults_to_incoming_open() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", BASE)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("direction".into(), "INCOMING".into()),
                Matcher::UrlEncoded("state".into(), "OPEN".into()),
            ]))
            .with_status(200)
            .with_body(format!(
                r#"{{"size":1,"limit":25,"isLastPage":true,"start":0,"values":[{PR}]}}"#
            ))
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let prs = client
            .project("PRJ")
            .repo("my-repo")
            .pull_requests()
            .list(&ListPullRequests::default())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].title, "Talking Nerdy");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", BASE)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("direction".into(), "OUTGOING".into()),
                Matcher::UrlEncoded("state".into(), "MERGED".into()),
                Matcher::UrlEncoded("at".into(), "refs/heads/develop".into()),
                Matcher::UrlEncoded("order".into(), "OLDEST".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"values":[],"isLastPage":true}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let filter = ListPullRequests {
            direction: Direction::Outgoing,
            at: Some("develop".to_string()),
            state: PullRequestState::Merged,
            order: Some(PullRequestOrder::Oldest),
        };
        let prs = client
            .project("PRJ")
            .repo("my-repo")
            .pull_requests()
            .list(&filter)
            .collect_all()
            .await
            .unwrap();

        assert!(prs.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_expands_branch_names() {
        let mut server = Server::new_async().await;
        let expected = json!({
            "title": "Talking Nerdy",
            "description": "It's a kludge.",
            "fromRef": {
                "id": "refs/heads/feature-ABC-123",
                "repository": {"slug": "my-repo", "project": {"key": "PRJ"}}
            },
            "toRef": {
                "id": "refs/heads/master",
                "repository": {"slug": "my-repo", "project": {"key": "PRJ"}}
            },
            "reviewers": [{"user": {"name": "jcitizen"}}]
        });
        let mock = server
            .mock("POST", BASE)
            .match_body(Matcher::Json(expected))
            .with_status(201)
            .with_body(PR)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let request = NewPullRequest::new("Talking Nerdy", "feature-ABC-123", "refs/heads/master")
            .description("It's a kludge.")
            .reviewer("jcitizen");
        let pr = client
            .project("PRJ")
            .repo("my-repo")
            .pull_requests()
            .create(&request)
            .await
            .unwrap();

        assert_eq!(pr.id, 101);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_merge_sends_version_and_reports_conflict() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", format!("{BASE}/101/merge").as_str())
            .match_query(Matcher::UrlEncoded("version".into(), "2".into()))
            .with_status(409)
            .with_body(r#"{"errors":[{"message":"You are attempting to modify a pull request based on out-of-date information.","currentVersion":3}]}"#)
            .create_async()
            .await;
        let ok = server
            .mock("POST", format!("{BASE}/101/merge").as_str())
            .match_query(Matcher::UrlEncoded("version".into(), "3".into()))
            .with_status(200)
            .with_body(PR)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let pr = client.project("PRJ").repo("my-repo").pull_request(101);

        let err = pr.merge(2).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::CONFLICT));
        assert_eq!(err.body().unwrap().data()["errors"][0]["currentVersion"], 3);

        pr.merge(3).await.unwrap();
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_can_merge() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", format!("{BASE}/101/merge").as_str())
            .with_status(200)
            .with_body(r#"{"canMerge":false,"conflicted":true,"vetoes":[{"summaryMessage":"You may not merge after 6pm on a Friday.","detailedMessage":"It is likely that your Blood Alcohol Content (BAC) exceeds the threshold for making sensible decisions regarding pull requests. Please try again on Monday."}]}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let status = client
            .project("PRJ")
            .repo("my-repo")
            .pull_request(101)
            .can_merge()
            .await
            .unwrap();

        assert!(!status.can_merge);
        assert!(status.conflicted);
        assert_eq!(
            status.vetoes[0].summary_message,
            "You may not merge after 6pm on a Friday."
        );
    }

    #[tokio::test]
    async fn test_decline_and_reopen() {
        let mut server = Server::new_async().await;
        let decline = server
            .mock("POST", format!("{BASE}/101/decline").as_str())
            .match_query(Matcher::UrlEncoded("version".into(), "3".into()))
            .with_status(200)
            .with_body(PR)
            .create_async()
            .await;
        let reopen = server
            .mock("POST", format!("{BASE}/101/reopen").as_str())
            .match_query(Matcher::UrlEncoded("version".into(), "4".into()))
            .with_status(200)
            .with_body(PR)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let pr = client.project("PRJ").repo("my-repo").pull_request(101);
        pr.decline(3).await.unwrap();
        pr.reopen(4).await.unwrap();

        decline.assert_async().await;
        reopen.assert_async().await;
    }

    #[tokio::test]
    async fn test_approve_and_watch() {
        let mut server = Server::new_async().await;
        let participant = r#"{"user":{"name":"charlie"},"role":"REVIEWER","approved":true}"#;
        server
            .mock("POST", format!("{BASE}/101/approve").as_str())
            .with_status(200)
            .with_body(participant)
            .create_async()
            .await;
        server
            .mock("DELETE", format!("{BASE}/101/approve").as_str())
            .with_status(200)
            .with_body(r#"{"user":{"name":"charlie"},"role":"REVIEWER","approved":false}"#)
            .create_async()
            .await;
        let watch = server
            .mock("POST", format!("{BASE}/101/watch").as_str())
            .with_status(204)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let pr = client.project("PRJ").repo("my-repo").pull_request(101);

        assert!(pr.approve().await.unwrap().approved);
        assert!(!pr.unapprove().await.unwrap().approved);
        assert!(pr.watch().await.unwrap());
        watch.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_sends_version() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", format!("{BASE}/101").as_str())
            .match_body(Matcher::Json(json!({
                "version": 3,
                "title": "New title",
                "reviewers": [{"user": {"name": "jdoe"}}]
            })))
            .with_status(200)
            .with_body(PR)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        client
            .project("PRJ")
            .repo("my-repo")
            .pull_request(101)
            .update(&UpdatePullRequest {
                version: 3,
                title: Some("New title".to_string()),
                reviewers: Some(vec!["jdoe".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_comment_and_activities() {
        let mut server = Server::new_async().await;
        let comment = server
            .mock("POST", format!("{BASE}/101/comments").as_str())
            .match_body(Matcher::Json(json!({"text": "LGTM"})))
            .with_status(201)
            .with_body(r#"{"id":1,"version":0,"text":"LGTM","author":{"name":"jdoe"},"createdDate":1,"updatedDate":1}"#)
            .create_async()
            .await;
        server
            .mock("GET", format!("{BASE}/101/activities").as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"values":[{"id":9,"createdDate":2,"user":{"name":"jdoe"},"action":"COMMENTED","comment":{"id":1,"text":"LGTM","author":{"name":"jdoe"}}}],"isLastPage":true}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let pr = client.project("PRJ").repo("my-repo").pull_request(101);

        assert_eq!(pr.comment("LGTM").await.unwrap().id, 1);
        let activities = pr.activities().collect_all().await.unwrap();
        assert_eq!(activities[0].action, "COMMENTED");
        assert_eq!(activities[0].comment.as_ref().map(|c| c.text.as_str()), Some("LGTM"));
        comment.assert_async().await;
    }

    #[tokio::test]
    async fn test_reply_references_parent_comment() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", format!("{BASE}/101/comments").as_str())
            .match_body(Matcher::Json(json!({"text": "Agreed", "parent": {"id": 7}})))
            .with_status(201)
            .with_body(r#"{"id":8,"version":0,"text":"Agreed","author":{"name":"jdoe"}}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let reply = client
            .project("PRJ")
            .repo("my-repo")
            .pull_request(101)
            .reply(7, "Agreed")
            .await
            .unwrap();

        assert_eq!(reply.id, 8);
        assert_eq!(reply.text, "Agreed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unwatch_deletes_watch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", format!("{BASE}/101/watch").as_str())
            .with_status(204)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let pr = client.project("PRJ").repo("my-repo").pull_request(101);

        assert!(pr.unwatch().await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_changes_and_commits_are_paginated() {
        let mut server = Server::new_async().await;
        let changes = server
            .mock("GET", format!("{BASE}/101/changes").as_str())
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(r#"{"values":[{"path":{"components":["README.md"],"name":"README.md","toString":"README.md"},"type":"ADD"}],"isLastPage":true,"start":0}"#)
            .create_async()
            .await;
        let first = server
            .mock("GET", format!("{BASE}/101/commits").as_str())
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(r#"{"values":[{"id":"c2","displayId":"c2","author":{"name":"tom"},"message":"Second"}],"isLastPage":false,"nextPageStart":1,"start":0}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", format!("{BASE}/101/commits").as_str())
            .match_query(Matcher::UrlEncoded("start".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"values":[{"id":"c1","displayId":"c1","author":{"name":"tom"},"message":"First"}],"isLastPage":true,"start":1}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let pr = client.project("PRJ").repo("my-repo").pull_request(101);

        let files = pr.changes().collect_all().await.unwrap();
        assert_eq!(files[0].path.to_string, "README.md");
        assert_eq!(files[0].change_type, "ADD");

        let commits = pr.commits().collect_all().await.unwrap();
        let ids: Vec<&str> = commits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);

        changes.assert_async().await;
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_diff_for_path() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", format!("{BASE}/101/diff/src/lib.rs").as_str())
            .with_status(200)
            .with_body(r#"{"fromHash":"a","toHash":"b","diffs":[]}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let diff = client
            .project("PRJ")
            .repo("my-repo")
            .pull_request(101)
            .diff(Some("src/lib.rs"))
            .await
            .unwrap();

        assert_eq!(diff["toHash"], "b");
    }
}
