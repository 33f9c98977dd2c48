//
//  stash-client
//  api/permissions.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project and repository permissions
//!
//! The same endpoints exist below a project and below a repository:
//!
//! ```text
//! GET/PUT/DELETE .../permissions/users[?name=&permission=]
//! GET/PUT/DELETE .../permissions/groups[?name=&permission=]
//! ```

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::common::{api_enum, ApiError, Paginator, QueryParams, User};
use super::resource::ResourceBase;

api_enum! {
    /// A permission that can be granted to a user or group.
    pub enum Permission ("permission") {
        ProjectRead => "PROJECT_READ",
        ProjectWrite => "PROJECT_WRITE",
        ProjectAdmin => "PROJECT_ADMIN",
        RepoRead => "REPO_READ",
        RepoWrite => "REPO_WRITE",
        RepoAdmin => "REPO_ADMIN",
    }
}

/// A user and the permission they hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermission {
    pub user: User,
    pub permission: String,
}

/// A group and the permission it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPermission {
    pub group: Group,
    pub permission: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

/// Permissions of a project or repository.
#[derive(Debug, Clone)]
pub struct Permissions<'a> {
    resource: ResourceBase<'a>,
}

impl<'a> Permissions<'a> {
    pub(crate) fn new(resource: ResourceBase<'a>) -> Self {
        Self { resource }
    }

    /// Users with an explicit permission, optionally filtered by name.
    pub fn users(&self, filter: Option<&str>) -> Paginator<'a, UserPermission> {
        self.resource
            .paginate("users", QueryParams::new().with_opt("filter", filter))
    }

    /// Groups with an explicit permission, optionally filtered by name.
    pub fn groups(&self, filter: Option<&str>) -> Paginator<'a, GroupPermission> {
        self.resource
            .paginate("groups", QueryParams::new().with_opt("filter", filter))
    }

    pub async fn grant_user(&self, name: &str, permission: Permission) -> Result<bool, ApiError> {
        self.change("users", name, Some(permission)).await
    }

    pub async fn revoke_user(&self, name: &str) -> Result<bool, ApiError> {
        self.change("users", name, None).await
    }

    pub async fn grant_group(&self, name: &str, permission: Permission) -> Result<bool, ApiError> {
        self.change("groups", name, Some(permission)).await
    }

    pub async fn revoke_group(&self, name: &str) -> Result<bool, ApiError> {
        self.change("groups", name, None).await
    }

    async fn change(
        &self,
        kind: &str,
        name: &str,
        permission: Option<Permission>,
    ) -> Result<bool, ApiError> {
        let method = if permission.is_some() {
            Method::PUT
        } else {
            Method::DELETE
        };
        let params = QueryParams::new()
            .with("name", name)
            .with_opt("permission", permission);
        self.resource
            .call_ok(method, kind, &params, None::<&()>)
            .await
    }
}
