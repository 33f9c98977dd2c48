//
//  stash-client
//  cli/repo.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use super::project::{run_permissions, PermissionSubcommand};
use super::{confirm, GlobalOptions, Session};
use crate::api::repos::{
    BrowseOptions, Branch, Change, Commit, RefOrder, RepoResource, Repository, Tag,
};
use crate::output::{
    format_bool, format_status, print_field, print_header, write_json, TableOutput, TableRow,
};
use crate::util::{format_relative_time_ms, format_time_ms, truncate};

/// Manage repositories
#[derive(Args, Debug)]
pub struct RepoCommand {
    #[command(subcommand)]
    pub command: RepoSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RepoSubcommand {
    /// List repositories of a project
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a repository
    View(RepoArgs),

    /// Create a repository
    Create(CreateArgs),

    /// Rename a repository
    Rename(RenameArgs),

    /// Fork a repository
    Fork(ForkArgs),

    /// Delete a repository
    Delete(DeleteArgs),

    /// List branches
    Branches(RefListArgs),

    /// Show or change the default branch
    #[command(name = "default-branch")]
    DefaultBranch(DefaultBranchArgs),

    /// List tags
    Tags(RefListArgs),

    /// List commits
    Commits(CommitsArgs),

    /// View a commit
    Commit(CommitArgs),

    /// List files changed by a commit
    Changes(ChangesArgs),

    /// List file paths
    Files(FilesArgs),

    /// Print the content of a file
    Browse(BrowseArgs),

    /// Manage repository permissions
    #[command(visible_alias = "perms")]
    Permissions(PermissionsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum number of repositories to list
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository in PROJECT/REPO or REPO format
    #[arg(value_name = "REPO")]
    pub target: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository name
    pub name: String,

    /// Source control type
    #[arg(long, default_value = "git")]
    pub scm: String,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// New repository name
    pub new_name: String,
}

#[derive(Args, Debug)]
pub struct ForkArgs {
    /// Repository in PROJECT/REPO or REPO format
    #[arg(value_name = "REPO")]
    pub target: Option<String>,

    /// Name of the fork
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Project to fork into, defaults to your personal project
    #[arg(long)]
    pub to_project: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Repository in PROJECT/REPO or REPO format
    #[arg(value_name = "REPO")]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RefListArgs {
    /// Only refs whose name contains this text
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Sort order: alphabetical or modification
    #[arg(long, short = 'o')]
    pub order: Option<RefOrder>,

    /// Maximum number of refs to list
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct DefaultBranchArgs {
    /// Branch to make the default
    #[arg(long)]
    pub set: Option<String>,
}

#[derive(Args, Debug)]
pub struct CommitsArgs {
    /// Newest commit to include, defaults to the default branch
    #[arg(long)]
    pub until: Option<String>,

    /// Exclude commits reachable from this ref
    #[arg(long)]
    pub since: Option<String>,

    /// Only commits touching this path
    #[arg(long)]
    pub path: Option<String>,

    /// Maximum number of commits to list
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Commit hash or ref
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ChangesArgs {
    /// Commit hash or ref
    pub until: String,

    /// Compare with this commit instead of the first parent
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Directory to list, defaults to the repository root
    pub path: Option<String>,

    /// Commit, branch or tag
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// File path
    pub path: String,

    /// Commit, branch or tag
    #[arg(long)]
    pub at: Option<String>,

    /// Include blame information
    #[arg(long)]
    pub blame: bool,
}

#[derive(Args, Debug)]
pub struct PermissionsArgs {
    #[command(subcommand)]
    pub command: PermissionSubcommand,
}

impl TableRow for Repository {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "SLUG", "STATE", "VISIBILITY"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let name = format!("{}/{}", self.project.key, self.name);
        let name = if color {
            style(name).cyan().to_string()
        } else {
            name
        };
        vec![
            name,
            self.slug.clone(),
            format_status(&self.state, color),
            if self.is_public { "public" } else { "private" }.to_string(),
        ]
    }
}

/// Detail view of a repository with the clone URL for the configured
/// protocol.
#[derive(Debug, Serialize)]
struct RepoDetail<'r> {
    #[serde(flatten)]
    repository: &'r Repository,
    #[serde(skip)]
    protocol: &'r str,
}

impl TableOutput for RepoDetail<'_> {
    fn print_table(&self, color: bool) {
        let repo = self.repository;
        print_header(&format!("{}/{}", repo.project.key, repo.name));
        println!();

        print_field("Slug", &repo.slug, color);
        print_field("State", &format_status(&repo.state, color), color);
        if let Some(message) = &repo.status_message {
            print_field("Status", message, color);
        }
        print_field("Public", &format_bool(repo.is_public, color), color);
        print_field("Forkable", &format_bool(repo.forkable, color), color);
        if let Some(origin) = &repo.origin {
            print_field(
                "Forked from",
                &format!("{}/{}", origin.project.key, origin.slug),
                color,
            );
        }
        if let Some(desc) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            print_field("Description", desc, color);
        }
        println!();

        if let Some(url) = repo
            .clone_url(self.protocol)
            .or_else(|| repo.clone_url("http"))
        {
            print_field("Clone", url, color);
        }
        if let Some(url) = repo.web_url() {
            print_field("URL", url, color);
        }
    }
}

impl TableRow for Branch {
    fn headers() -> Vec<&'static str> {
        vec!["BRANCH", "COMMIT", "DEFAULT"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.display_id.clone(),
            short_hash(self.latest_commit.as_deref()),
            if self.is_default {
                format_bool(true, color)
            } else {
                String::new()
            },
        ]
    }
}

impl TableRow for Tag {
    fn headers() -> Vec<&'static str> {
        vec!["TAG", "COMMIT"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.display_id.clone(),
            short_hash(self.latest_commit.as_deref()),
        ]
    }
}

impl TableRow for Commit {
    fn headers() -> Vec<&'static str> {
        vec!["COMMIT", "AUTHOR", "WHEN", "MESSAGE"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let id = if color {
            style(&self.display_id).yellow().to_string()
        } else {
            self.display_id.clone()
        };
        vec![
            id,
            self.author.name.clone(),
            format_relative_time_ms(self.author_timestamp),
            truncate(self.summary(), 60),
        ]
    }
}

impl TableOutput for Commit {
    fn print_table(&self, color: bool) {
        print_header(&format!("commit {}", self.id));
        println!();

        let author = match &self.author.email_address {
            Some(email) => format!("{} <{}>", self.author.name, email),
            None => self.author.name.clone(),
        };
        print_field("Author", &author, color);
        print_field("Date", &format_time_ms(self.author_timestamp), color);
        if !self.parents.is_empty() {
            let parents: Vec<&str> = self
                .parents
                .iter()
                .map(|p| p.display_id.as_deref().unwrap_or(&p.id))
                .collect();
            print_field("Parents", &parents.join(" "), color);
        }
        println!();
        for line in self.message.lines() {
            println!("    {line}");
        }
    }
}

impl TableRow for Change {
    fn headers() -> Vec<&'static str> {
        vec!["TYPE", "PATH"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let path = match &self.src_path {
            Some(src) if src.to_string != self.path.to_string => {
                format!("{} -> {}", src.to_string, self.path.to_string)
            }
            _ => self.path.to_string.clone(),
        };
        vec![self.change_type.clone(), path]
    }
}

fn short_hash(hash: Option<&str>) -> String {
    hash.map(|h| h.chars().take(11).collect())
        .unwrap_or_default()
}

impl RepoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            RepoSubcommand::List(args) => self.list(args, global).await,
            RepoSubcommand::View(args) => self.view(args, global).await,
            RepoSubcommand::Create(args) => self.create(args, global).await,
            RepoSubcommand::Rename(args) => self.rename(args, global).await,
            RepoSubcommand::Fork(args) => self.fork(args, global).await,
            RepoSubcommand::Delete(args) => self.delete(args, global).await,
            RepoSubcommand::Branches(args) => self.branches(args, global).await,
            RepoSubcommand::DefaultBranch(args) => self.default_branch(args, global).await,
            RepoSubcommand::Tags(args) => self.tags(args, global).await,
            RepoSubcommand::Commits(args) => self.commits(args, global).await,
            RepoSubcommand::Commit(args) => self.commit(args, global).await,
            RepoSubcommand::Changes(args) => self.changes(args, global).await,
            RepoSubcommand::Files(args) => self.files(args, global).await,
            RepoSubcommand::Browse(args) => self.browse(args, global).await,
            RepoSubcommand::Permissions(args) => {
                let session = Session::open(global)?;
                let permissions = target(&session, global, None)?.permissions();
                run_permissions(&session, permissions, &args.command, global).await
            }
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let project = session.project_key(global)?;
        let repos = session.client.project(&project).repos().list();
        let values = session.paged(repos).collect_up_to(args.limit).await?;

        global
            .output()
            .write_list(&values, &format!("No repositories in {project}"))
    }

    async fn view(&self, args: &RepoArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let repository = target(&session, global, args.target.as_deref())?.get().await?;

        global.output().write(&RepoDetail {
            repository: &repository,
            protocol: &session.config.core.git_protocol,
        })
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let project = session.project_key(global)?;
        let repository = session
            .client
            .project(&project)
            .repos()
            .create(&args.name, Some(&args.scm))
            .await?;

        let output = global.output();
        output.write_success(&format!(
            "Created repository {}/{}",
            repository.project.key, repository.slug
        ));
        if output.is_json() {
            write_json(&repository)?;
        }
        Ok(())
    }

    async fn rename(&self, args: &RenameArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let repo = target(&session, global, None)?;
        let repository = repo.update(&args.new_name).await?;

        let output = global.output();
        output.write_success(&format!(
            "Renamed {}/{} to {}",
            repo.project_key(),
            repo.slug(),
            repository.slug
        ));
        if output.is_json() {
            write_json(&repository)?;
        }
        Ok(())
    }

    async fn fork(&self, args: &ForkArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let fork = target(&session, global, args.target.as_deref())?
            .fork(args.name.as_deref(), args.to_project.as_deref())
            .await?;

        let output = global.output();
        output.write_success(&format!(
            "Created fork {}/{}",
            fork.project.key, fork.slug
        ));
        if output.is_json() {
            write_json(&fork)?;
        }
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let repo = target(&session, global, args.target.as_deref())?;
        let name = format!("{}/{}", repo.project_key(), repo.slug());
        confirm(global, args.yes, &format!("Delete repository {name}?"))?;

        repo.delete().await?;
        global
            .output()
            .write_success(&format!("Scheduled {name} for deletion"));
        Ok(())
    }

    async fn branches(&self, args: &RefListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let branches = target(&session, global, None)?.branches(args.filter.as_deref(), args.order);
        let values = session.paged(branches).collect_up_to(args.limit).await?;

        global.output().write_list(&values, "No branches found")
    }

    async fn default_branch(&self, args: &DefaultBranchArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let repo = target(&session, global, None)?;
        let output = global.output();

        if let Some(branch) = &args.set {
            if !repo.set_default_branch(branch).await? {
                bail!("Server did not change the default branch");
            }
            output.write_success(&format!("Default branch is now {branch}"));
            return Ok(());
        }

        let branch = repo.default_branch().await?;
        if output.is_json() {
            write_json(&branch)
        } else {
            println!("{}", branch.display_id);
            Ok(())
        }
    }

    async fn tags(&self, args: &RefListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let tags = target(&session, global, None)?.tags(args.filter.as_deref(), args.order);
        let values = session.paged(tags).collect_up_to(args.limit).await?;

        global.output().write_list(&values, "No tags found")
    }

    async fn commits(&self, args: &CommitsArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let repo = target(&session, global, None)?;
        let until = match &args.until {
            Some(until) => until.clone(),
            None => repo.default_branch().await?.id,
        };

        let commits = repo.commits(&until, args.since.as_deref(), args.path.as_deref());
        let values = session.paged(commits).collect_up_to(args.limit).await?;

        global.output().write_list(&values, "No commits found")
    }

    async fn commit(&self, args: &CommitArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let commit = target(&session, global, None)?.commit(&args.id).await?;

        global.output().write(&commit)
    }

    async fn changes(&self, args: &ChangesArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let changes = target(&session, global, None)?.changes(&args.until, args.since.as_deref());
        let values = session.paged(changes).collect_all().await?;

        global.output().write_list(&values, "No changes")
    }

    async fn files(&self, args: &FilesArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let files = target(&session, global, None)?.files(args.path.as_deref().unwrap_or_default(), args.at.as_deref());
        let values = session.paged(files).collect_all().await?;

        if global.json {
            return write_json(&values);
        }
        for path in values {
            println!("{path}");
        }
        Ok(())
    }

    async fn browse(&self, args: &BrowseArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let options = BrowseOptions {
            at: args.at.clone(),
            blame: args.blame,
            ..Default::default()
        };
        let mut lines = session.paged(target(&session, global, None)?.browse_path(&args.path, &options));

        if global.json {
            return write_json(&lines.collect_all().await?);
        }
        while let Some(line) = lines.try_next().await? {
            println!("{}", line["text"].as_str().unwrap_or_default());
        }
        Ok(())
    }
}

fn target<'a>(
    session: &'a Session,
    global: &GlobalOptions,
    repo: Option<&str>,
) -> Result<RepoResource<'a>> {
    let (project, slug) = session.repo_target(global, repo)?;
    Ok(session.client.project(&project).repo(&slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repository_row() {
        let repo: Repository = serde_json::from_value(json!({
            "slug": "my-repo",
            "name": "My Repo",
            "project": {"key": "PRJ"},
            "state": "AVAILABLE",
            "public": false
        }))
        .unwrap();

        assert_eq!(
            repo.row(false),
            vec!["PRJ/My Repo", "my-repo", "AVAILABLE", "private"]
        );
    }

    #[test]
    fn test_repo_detail_serializes_repository() {
        let repo: Repository = serde_json::from_value(json!({
            "slug": "my-repo",
            "name": "My Repo",
            "project": {"key": "PRJ"}
        }))
        .unwrap();
        let detail = RepoDetail {
            repository: &repo,
            protocol: "ssh",
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["slug"], "my-repo");
        assert!(value.get("protocol").is_none());
    }

    #[test]
    fn test_change_row_shows_moves() {
        let change: Change = serde_json::from_value(json!({
            "path": {"toString": "src/new.rs"},
            "srcPath": {"toString": "src/old.rs"},
            "type": "MOVE"
        }))
        .unwrap();
        assert_eq!(change.row(false), vec!["MOVE", "src/old.rs -> src/new.rs"]);
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash(Some("8d51122def5632836d1cb1026e879069e10a1e13")), "8d51122def5");
        assert_eq!(short_hash(None), "");
    }

    #[test]
    fn test_commit_row_uses_summary() {
        let commit: Commit = serde_json::from_value(json!({
            "id": "abcdef1234",
            "displayId": "abcdef1",
            "author": {"name": "jdoe"},
            "authorTimestamp": 0,
            "message": "Fix pagination\n\nLonger body"
        }))
        .unwrap();
        let row = commit.row(false);
        assert_eq!(row[0], "abcdef1");
        assert_eq!(row[3], "Fix pagination");
    }
}
