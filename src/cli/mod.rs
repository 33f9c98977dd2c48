//
//  stash-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod api;
mod auth;
mod completion;
mod config;
mod pr;
mod project;
mod repo;

pub use api::ApiCommand;
pub use auth::AuthCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use pr::PrCommand;
pub use project::ProjectCommand;
pub use repo::RepoCommand;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use crate::api::{Paginator, StashClient};
use crate::auth::resolve_credential;
use crate::config::{Config, HostConfig};
use crate::interactive::{is_interactive, prompt_confirm_with_default};
use crate::output::{OutputFormat, OutputWriter};

/// Stash CLI - Work with Stash from the command line
#[derive(Parser, Debug)]
#[command(
    name = "stash",
    version,
    about = "Work with Stash (Bitbucket Server) from the command line",
    long_about = "stash is a CLI for the Atlassian Stash / Bitbucket Server REST API.\n\n\
                  It brings projects, repositories and pull requests to your terminal.",
    propagate_version = true,
    after_help = "Use 'stash <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Stash server URL or configured host name
    #[arg(long, global = true, env = "STASH_HOST")]
    pub host: Option<String>,

    /// Project key for the operation
    #[arg(long, short = 'p', global = true, env = "STASH_PROJECT")]
    pub project: Option<String>,

    /// Repository in PROJECT/REPO or REPO format
    #[arg(long, short = 'R', global = true, env = "STASH_REPO")]
    pub repo: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true, env = "STASH_NO_PROMPT")]
    pub no_prompt: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with a Stash server
    #[command(visible_alias = "login")]
    Auth(AuthCommand),

    /// Manage projects
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Manage repositories
    #[command(visible_alias = "r")]
    Repo(RepoCommand),

    /// Manage pull requests
    Pr(PrCommand),

    /// Make API requests
    Api(ApiCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

/// Returned when the user declines a confirmation prompt.
#[derive(Debug, thiserror::Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

impl GlobalOptions {
    pub(crate) fn output(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_json_flag(self.json))
    }
}

/// Everything a command needs to talk to one server.
pub(crate) struct Session {
    pub client: StashClient,
    pub host: String,
    pub host_config: HostConfig,
    pub config: Config,
}

impl Session {
    /// Loads the configuration and builds an authenticated client for the
    /// selected host.
    pub fn open(global: &GlobalOptions) -> Result<Self> {
        let config = Config::load()?;
        let (host, host_config) = config.resolve_host(global.host.as_deref())?;
        let mut client = StashClient::from_config(&host_config)?;
        match resolve_credential(&host, &host_config)? {
            Some(credential) => client = client.with_auth(credential),
            None => tracing::debug!("no credential for {host}, continuing anonymously"),
        }

        Ok(Self {
            client,
            host,
            host_config,
            config,
        })
    }

    /// Project key from `--project`, `--repo PROJECT/REPO` or the host's
    /// default project.
    pub fn project_key(&self, global: &GlobalOptions) -> Result<String> {
        if let Some(project) = &global.project {
            return Ok(project.clone());
        }
        if let Some((Some(project), _)) = global.repo.as_deref().map(split_repo) {
            return Ok(project.to_string());
        }
        match &self.host_config.default_project {
            Some(project) => Ok(project.clone()),
            None => bail!(
                "No project given. Pass --project or set default_project for {} in the config file.",
                self.host
            ),
        }
    }

    /// Project key and slug for a repository given as `PROJECT/REPO` or
    /// `REPO`, falling back to `--repo`.
    pub fn repo_target(&self, global: &GlobalOptions, repo: Option<&str>) -> Result<(String, String)> {
        let Some(repo) = repo.or(global.repo.as_deref()) else {
            bail!("No repository given. Pass a repository or --repo PROJECT/REPO.");
        };
        match parse_repo(repo)? {
            (Some(project), slug) => Ok((project.to_string(), slug.to_string())),
            (None, slug) => Ok((self.project_key(global)?, slug.to_string())),
        }
    }

    /// Applies the configured page size to a listing.
    pub fn paged<'a, T: DeserializeOwned>(&self, paginator: Paginator<'a, T>) -> Paginator<'a, T> {
        match self.config.core.page_size {
            Some(size) => paginator.limit(size),
            None => paginator,
        }
    }
}

/// Splits `PROJECT/REPO` into its parts. A bare `REPO` has no project.
pub(crate) fn split_repo(value: &str) -> (Option<&str>, &str) {
    match value.split_once('/') {
        Some((project, slug)) if !project.is_empty() => (Some(project), slug),
        Some((_, slug)) => (None, slug),
        None => (None, value),
    }
}

/// [`split_repo`], refusing parts that cannot name a project or
/// repository.
pub(crate) fn parse_repo(value: &str) -> Result<(Option<&str>, &str)> {
    let (project, slug) = split_repo(value);
    let bad = |part: &str| part.is_empty() || part == "." || part == ".." || part.contains('/');
    if bad(slug) || project.is_some_and(bad) {
        bail!("Invalid repository '{value}'. Expected PROJECT/REPO or REPO.");
    }
    Ok((project, slug))
}

/// Asks before a destructive action unless `--yes` was passed.
pub(crate) fn confirm(global: &GlobalOptions, yes: bool, message: &str) -> Result<()> {
    if yes {
        return Ok(());
    }
    if global.no_prompt || !is_interactive() {
        bail!("Refusing to continue without confirmation. Pass --yes to skip the prompt.");
    }
    if prompt_confirm_with_default(message, false)? {
        Ok(())
    } else {
        Err(Cancelled.into())
    }
}
