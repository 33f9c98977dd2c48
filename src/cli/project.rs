//
//  stash-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands
//!
//! Listing, viewing, creating, editing and deleting projects, plus the
//! `permissions` subcommands shared with `stash repo`.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use super::{confirm, GlobalOptions, Session};
use crate::api::permissions::{GroupPermission, Permission, Permissions, UserPermission};
use crate::api::projects::{Project, UpdateProjectRequest};
use crate::output::{print_field, print_header, TableOutput, TableRow};
use crate::util::truncate;

/// Manage projects
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a project
    View(ViewArgs),

    /// Create a project
    Create(CreateArgs),

    /// Edit a project
    Edit(EditArgs),

    /// Delete a project
    Delete(DeleteArgs),

    /// Manage project permissions
    #[command(visible_alias = "perms")]
    Permissions(ProjectPermissionsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only projects whose name contains this text
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Maximum number of projects to list
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project key, e.g. PRJ
    pub key: String,

    /// Project name
    pub name: String,

    /// Project description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Project key
    pub key: String,

    /// New project key
    #[arg(long)]
    pub new_key: Option<String>,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Make the project public
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Make the project private
    #[arg(long)]
    pub private: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project key
    pub key: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ProjectPermissionsArgs {
    /// Project key
    pub key: String,

    #[command(subcommand)]
    pub command: PermissionSubcommand,
}

/// Permission subcommands for projects and repositories.
#[derive(Subcommand, Debug)]
pub enum PermissionSubcommand {
    /// List users and groups with explicit permissions
    #[command(visible_alias = "ls")]
    List(PermissionListArgs),

    /// Grant a permission to a user or group
    Grant(GrantArgs),

    /// Revoke the permission of a user or group
    Revoke(RevokeArgs),
}

#[derive(Args, Debug)]
pub struct PermissionListArgs {
    /// Only names containing this text
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// List groups instead of users
    #[arg(long, short = 'g')]
    pub groups: bool,
}

#[derive(Args, Debug)]
pub struct GrantArgs {
    /// User or group name
    pub name: String,

    /// Permission, e.g. PROJECT_READ or repo-write
    pub permission: Permission,

    /// Treat the name as a group
    #[arg(long, short = 'g')]
    pub group: bool,
}

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// User or group name
    pub name: String,

    /// Treat the name as a group
    #[arg(long, short = 'g')]
    pub group: bool,
}

impl TableRow for Project {
    fn headers() -> Vec<&'static str> {
        vec!["KEY", "NAME", "VISIBILITY", "DESCRIPTION"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let key = if color {
            style(&self.key).cyan().to_string()
        } else {
            self.key.clone()
        };
        vec![
            key,
            self.name.clone(),
            visibility(self.is_public).to_string(),
            truncate(self.description.as_deref().unwrap_or_default(), 50),
        ]
    }
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        print_header(&format!("{} ({})", self.name, self.key));
        println!();

        print_field("Visibility", visibility(self.is_public), color);
        if let Some(kind) = &self.project_type {
            print_field("Type", kind, color);
        }
        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            print_field("Description", desc, color);
        }
        if let Some(url) = self.web_url() {
            print_field("URL", url, color);
        }
    }
}

impl TableRow for UserPermission {
    fn headers() -> Vec<&'static str> {
        vec!["USER", "NAME", "PERMISSION"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.user.name.clone(),
            self.user.display().to_string(),
            self.permission.clone(),
        ]
    }
}

impl TableRow for GroupPermission {
    fn headers() -> Vec<&'static str> {
        vec!["GROUP", "PERMISSION"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![self.group.name.clone(), self.permission.clone()]
    }
}

fn visibility(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private"
    }
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ProjectSubcommand::List(args) => self.list(args, global).await,
            ProjectSubcommand::View(args) => self.view(args, global).await,
            ProjectSubcommand::Create(args) => self.create(args, global).await,
            ProjectSubcommand::Edit(args) => self.edit(args, global).await,
            ProjectSubcommand::Delete(args) => self.delete(args, global).await,
            ProjectSubcommand::Permissions(args) => {
                let session = Session::open(global)?;
                let permissions = session.client.project(&args.key).permissions();
                run_permissions(&session, permissions, &args.command, global).await
            }
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let projects = session.client.projects();
        let paginator = match &args.search {
            Some(name) => projects.search(name),
            None => projects.list(),
        };
        let values = session.paged(paginator).collect_up_to(args.limit).await?;

        global.output().write_list(&values, "No projects found")
    }

    async fn view(&self, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let project = session.client.project(&args.key).get().await?;

        global.output().write(&project)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let project = session
            .client
            .projects()
            .create(&args.key, &args.name, args.description.as_deref())
            .await?;

        let output = global.output();
        output.write_success(&format!("Created project {}", project.key));
        if output.is_json() {
            output.write(&project)?;
        }
        Ok(())
    }

    async fn edit(&self, args: &EditArgs, global: &GlobalOptions) -> Result<()> {
        let request = UpdateProjectRequest {
            key: args.new_key.clone(),
            name: args.name.clone(),
            description: args.description.clone(),
            is_public: match (args.public, args.private) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        };
        if request.key.is_none()
            && request.name.is_none()
            && request.description.is_none()
            && request.is_public.is_none()
        {
            bail!("Nothing to change. Pass --name, --description, --new-key, --public or --private.");
        }

        let session = Session::open(global)?;
        let project = session.client.project(&args.key).update(&request).await?;

        let output = global.output();
        output.write_success(&format!("Updated project {}", project.key));
        if output.is_json() {
            output.write(&project)?;
        }
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        confirm(global, args.yes, &format!("Delete project {}?", args.key))?;

        let session = Session::open(global)?;
        session.client.project(&args.key).delete().await?;

        global
            .output()
            .write_success(&format!("Deleted project {}", args.key));
        Ok(())
    }
}

/// Runs a permission subcommand against a project or repository.
pub(super) async fn run_permissions(
    session: &Session,
    permissions: Permissions<'_>,
    command: &PermissionSubcommand,
    global: &GlobalOptions,
) -> Result<()> {
    let output = global.output();
    match command {
        PermissionSubcommand::List(args) => {
            if args.groups {
                let values = session
                    .paged(permissions.groups(args.filter.as_deref()))
                    .collect_all()
                    .await?;
                output.write_list(&values, "No group permissions")
            } else {
                let values = session
                    .paged(permissions.users(args.filter.as_deref()))
                    .collect_all()
                    .await?;
                output.write_list(&values, "No user permissions")
            }
        }
        PermissionSubcommand::Grant(args) => {
            let granted = if args.group {
                permissions.grant_group(&args.name, args.permission).await?
            } else {
                permissions.grant_user(&args.name, args.permission).await?
            };
            if !granted {
                bail!("Server did not grant {} to {}", args.permission, args.name);
            }
            output.write_success(&format!("Granted {} to {}", args.permission, args.name));
            Ok(())
        }
        PermissionSubcommand::Revoke(args) => {
            let revoked = if args.group {
                permissions.revoke_group(&args.name).await?
            } else {
                permissions.revoke_user(&args.name).await?
            };
            if !revoked {
                bail!("Server did not revoke the permission of {}", args.name);
            }
            output.write_success(&format!("Revoked permission of {}", args.name));
            Ok(())
        }
    }
}
