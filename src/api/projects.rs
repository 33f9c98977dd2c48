//
//  stash-client
//  api/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Project API
//!
//! Projects group related repositories and carry shared access control.
//! Each project has a unique key (short uppercase identifier used in
//! URLs). Personal projects have type `PERSONAL` and keys prefixed with
//! `~`.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST       /rest/api/1.0/projects
//! GET/PUT/DELETE /rest/api/1.0/projects/{projectKey}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_client::api::client::StashClient;
//!
//! # async fn example() -> Result<(), stash_client::api::common::ApiError> {
//! let client = StashClient::new("https://stash.example.com")?;
//!
//! let project = client
//!     .projects()
//!     .create("MYPROJ", "My Project", Some("A sample project"))
//!     .await?;
//! println!("Created project: {} ({})", project.name, project.key);
//!
//! for repo in client.project("MYPROJ").repos().list().collect_all().await? {
//!     println!("{}", repo.slug);
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use super::client::StashClient;
use super::common::{ApiError, Paginator, QueryParams, SelfLink};
use super::permissions::Permissions;
use super::repos::{RepoResource, Repos};
use super::resource::ResourceBase;

/// A Stash project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: u64,

    /// Unique project key, e.g. `"PRJ"`.
    pub key: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "public", default)]
    pub is_public: bool,

    /// `NORMAL` or `PERSONAL`.
    #[serde(rename = "type", default)]
    pub project_type: Option<String>,

    #[serde(default)]
    pub links: Option<ProjectLinks>,
}

impl Project {
    /// Web UI URL of the project, if the server sent one.
    pub fn web_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.self_link.first())
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /projects/{key}`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProjectRequest {
    /// New key. Changing it moves every repository URL of the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "public", skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// The project collection, `/projects`.
#[derive(Debug, Clone)]
pub struct Projects<'a> {
    resource: ResourceBase<'a>,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a StashClient) -> Self {
        Self {
            resource: ResourceBase::root(client, "projects"),
        }
    }

    /// Every project visible to the caller.
    pub fn list(&self) -> Paginator<'a, Project> {
        self.resource.paginate("", QueryParams::new())
    }

    /// Projects whose name contains `name`.
    pub fn search(&self, name: &str) -> Paginator<'a, Project> {
        self.resource
            .paginate("", QueryParams::new().with("name", name))
    }

    /// Creates a project.
    ///
    /// # Parameters
    ///
    /// * `key` - Unique project key
    /// * `name` - Display name
    /// * `description` - Optional description
    pub async fn create(
        &self,
        key: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, ApiError> {
        let body = CreateProjectRequest {
            key: key.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        self.resource.post("", &body).await
    }

    /// Handle for the project with `key`. No request is made.
    pub fn project(&self, key: &str) -> ProjectResource<'a> {
        ProjectResource {
            key: key.to_string(),
            resource: self.resource.child(key),
        }
    }
}

/// A single project, `/projects/{key}`.
#[derive(Debug, Clone)]
pub struct ProjectResource<'a> {
    key: String,
    resource: ResourceBase<'a>,
}

impl<'a> ProjectResource<'a> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn resource(&self) -> &ResourceBase<'a> {
        &self.resource
    }

    /// Fetches the project.
    pub async fn get(&self) -> Result<Project, ApiError> {
        self.resource.get("", &QueryParams::new()).await
    }

    /// Updates the project's key, name, description or visibility.
    pub async fn update(&self, request: &UpdateProjectRequest) -> Result<Project, ApiError> {
        self.resource.put("", request).await
    }

    /// Deletes the project. The server refuses while it still has
    /// repositories.
    pub async fn delete(&self) -> Result<(), ApiError> {
        self.resource.delete("", &QueryParams::new()).await
    }

    /// The project's repositories.
    pub fn repos(&self) -> Repos<'a> {
        Repos::new(&self.key, self.resource.nested("repos"))
    }

    /// Handle for one repository of the project.
    pub fn repo(&self, slug: &str) -> RepoResource<'a> {
        self.repos().repo(slug)
    }

    /// Project-level permissions.
    pub fn permissions(&self) -> Permissions<'a> {
        Permissions::new(self.resource.nested("permissions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PROJECT: &str = r#"{
        "key": "PRJ",
        "id": 1,
        "name": "My Cool Project",
        "description": "The description for my cool project.",
        "public": true,
        "type": "NORMAL",
        "links": {"self": [{"href": "http://link/to/project"}]}
    }"#;

    #[test]
    fn test_project_deserialize() {
        let project: Project = serde_json::from_str(PROJECT).unwrap();
        assert_eq!(project.key, "PRJ");
        assert!(project.is_public);
        assert_eq!(project.project_type.as_deref(), Some("NORMAL"));
        assert_eq!(project.web_url(), Some("http://link/to/project"));
    }

    #[test]
    fn test_update_request_skips_unset_fields() {
        let request = UpdateProjectRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "Renamed"})
        );
    }

    #[tokio::test]
    async fn test_list_projects() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(format!(
                r#"{{"size":1,"limit":25,"isLastPage":true,"start":0,"values":[{PROJECT}]}}"#
            ))
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let projects = client.projects().list().collect_all().await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "My Cool Project");
    }

    #[tokio::test]
    async fn test_search_projects_by_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "cool project".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(format!(
                r#"{{"size":1,"limit":25,"isLastPage":true,"start":0,"values":[{PROJECT}]}}"#
            ))
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let projects = client
            .projects()
            .search("cool project")
            .collect_all()
            .await
            .unwrap();

        assert_eq!(projects[0].key, "PRJ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_project() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/1.0/projects")
            .match_body(Matcher::Json(json!({"key": "PRJ", "name": "My Cool Project"})))
            .with_status(201)
            .with_body(PROJECT)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let project = client
            .projects()
            .create("PRJ", "My Cool Project", None)
            .await
            .unwrap();

        assert_eq!(project.id, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_project() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects/NOPE")
            .with_status(404)
            .with_body(r#"{"errors":[{"context":null,"message":"Project NOPE does not exist.","exceptionName":"com.atlassian.bitbucket.project.NoSuchProjectException"}]}"#)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let err = client.project("NOPE").get().await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.body().unwrap().message(), "Project NOPE does not exist.");
    }

    #[tokio::test]
    async fn test_update_and_delete_project() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/rest/api/1.0/projects/PRJ")
            .match_body(Matcher::Json(json!({"description": "new"})))
            .with_status(200)
            .with_body(PROJECT)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/rest/api/1.0/projects/PRJ")
            .with_status(204)
            .create_async()
            .await;

        let client = StashClient::new(&server.url()).unwrap();
        let project = client.project("PRJ");
        project
            .update(&UpdateProjectRequest {
                description: Some("new".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        project.delete().await.unwrap();

        put.assert_async().await;
        delete.assert_async().await;
    }
}
