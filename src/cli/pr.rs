//
//  stash-client
//  cli/pr.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use super::{confirm, GlobalOptions, Session};
use crate::api::pullrequests::{
    Activity, Direction, ListPullRequests, NewPullRequest, PullRequest, PullRequestOrder,
    PullRequestResource, PullRequestState, PullRequests, UpdatePullRequest,
};
use crate::output::{
    format_bool, format_status, print_field, print_header, write_json, TableOutput, TableRow,
};
use crate::util::{format_relative_time_ms, format_time_ms, truncate};

/// Manage pull requests
#[derive(Args, Debug)]
pub struct PrCommand {
    #[command(subcommand)]
    pub command: PrSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PrSubcommand {
    /// List pull requests
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a pull request
    View(PrArgs),

    /// Create a pull request
    Create(CreateArgs),

    /// Edit a pull request
    Edit(EditArgs),

    /// Merge a pull request
    Merge(MergeArgs),

    /// Decline a pull request
    #[command(visible_alias = "close")]
    Decline(PrArgs),

    /// Reopen a declined pull request
    Reopen(PrArgs),

    /// Approve a pull request
    Approve(PrArgs),

    /// Remove your approval from a pull request
    Unapprove(PrArgs),

    /// Check whether a pull request can be merged
    Checks(PrArgs),

    /// Add a comment to a pull request
    Comment(CommentArgs),

    /// Show the activity of a pull request
    Activity(ActivityArgs),

    /// List commits of a pull request
    Commits(PrArgs),

    /// List files changed by a pull request
    Changes(PrArgs),

    /// Print the diff of a pull request as JSON
    Diff(DiffArgs),

    /// Watch a pull request
    Watch(PrArgs),

    /// Stop watching a pull request
    Unwatch(PrArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by state
    #[arg(long, short = 's', default_value = "open")]
    pub state: PullRequestState,

    /// List pull requests from this repository instead of into it
    #[arg(long)]
    pub outgoing: bool,

    /// Only pull requests into (or, with --outgoing, from) this branch
    #[arg(long, short = 'B')]
    pub branch: Option<String>,

    /// Sort order: newest or oldest
    #[arg(long, short = 'o')]
    pub order: Option<PullRequestOrder>,

    /// Maximum number of PRs to list
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct PrArgs {
    /// Pull request ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title
    #[arg(long, short = 't')]
    pub title: String,

    /// Description
    #[arg(long, short = 'b')]
    pub body: Option<String>,

    /// Source branch
    #[arg(long, short = 'H')]
    pub head: String,

    /// Target branch, defaults to the repository's default branch
    #[arg(long, short = 'B')]
    pub base: Option<String>,

    /// Reviewer user name (repeatable)
    #[arg(long, short = 'r')]
    pub reviewer: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Pull request ID
    pub id: u64,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// New description
    #[arg(long, short = 'b')]
    pub body: Option<String>,

    /// New target branch
    #[arg(long, short = 'B')]
    pub base: Option<String>,

    /// Replace the reviewers (repeatable)
    #[arg(long, short = 'r')]
    pub reviewer: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Pull request ID
    pub id: u64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Pull request ID
    pub id: u64,

    /// Comment text
    #[arg(long, short = 'b')]
    pub body: String,

    /// Reply to the comment with this ID
    #[arg(long)]
    pub reply_to: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ActivityArgs {
    /// Pull request ID
    pub id: u64,

    /// Maximum number of entries to show
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Pull request ID
    pub id: u64,

    /// Only this file
    #[arg(long)]
    pub path: Option<String>,
}

impl TableRow for PullRequest {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "TITLE", "STATE", "AUTHOR", "BRANCH", "UPDATED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let id = if color {
            style(format!("#{}", self.id)).cyan().to_string()
        } else {
            format!("#{}", self.id)
        };
        vec![
            id,
            truncate(&self.title, 45),
            format_status(&self.state, color),
            truncate(self.author.user.display(), 18),
            format!(
                "{} → {}",
                truncate(&self.from_ref.display_id, 20),
                truncate(&self.to_ref.display_id, 15)
            ),
            format_relative_time_ms(self.updated_date),
        ]
    }
}

impl TableOutput for PullRequest {
    fn print_table(&self, color: bool) {
        print_header(&format!("PR #{}: {}", self.id, self.title));
        println!();

        print_field("State", &format_status(&self.state, color), color);
        print_field("Author", self.author.user.display(), color);
        print_field("Version", &self.version.to_string(), color);
        println!();

        print_field("Source", &self.from_ref.display_id, color);
        print_field("Destination", &self.to_ref.display_id, color);
        println!();

        if !self.reviewers.is_empty() {
            let reviewers: Vec<String> = self
                .reviewers
                .iter()
                .map(|r| {
                    if r.approved {
                        format!("{} (approved)", r.user.display())
                    } else {
                        r.user.display().to_string()
                    }
                })
                .collect();
            print_field("Reviewers", &reviewers.join(", "), color);
        }
        let approvals = self.reviewers.iter().filter(|r| r.approved).count();
        print_field("Approvals", &approvals.to_string(), color);
        println!();

        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            println!("Description:");
            println!("{}", desc);
            println!();
        }

        print_field("Created", &format_time_ms(self.created_date), color);
        print_field("Updated", &format_time_ms(self.updated_date), color);
        if let Some(url) = self.web_url() {
            print_field("URL", url, color);
        }
    }
}

impl TableRow for Activity {
    fn headers() -> Vec<&'static str> {
        vec!["WHEN", "USER", "ACTION", "COMMENT"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            format_relative_time_ms(self.created_date),
            self.user.display().to_string(),
            self.action.clone(),
            self.comment
                .as_ref()
                .map(|c| truncate(&c.text, 50))
                .unwrap_or_default(),
        ]
    }
}

impl PrCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            PrSubcommand::List(args) => self.list(args, global).await,
            PrSubcommand::View(args) => self.view(args, global).await,
            PrSubcommand::Create(args) => self.create(args, global).await,
            PrSubcommand::Edit(args) => self.edit(args, global).await,
            PrSubcommand::Merge(args) => self.merge(args, global).await,
            PrSubcommand::Decline(args) => self.decline(args, global).await,
            PrSubcommand::Reopen(args) => self.reopen(args, global).await,
            PrSubcommand::Approve(args) => self.approve(args, global).await,
            PrSubcommand::Unapprove(args) => self.unapprove(args, global).await,
            PrSubcommand::Checks(args) => self.checks(args, global).await,
            PrSubcommand::Comment(args) => self.comment(args, global).await,
            PrSubcommand::Activity(args) => self.activity(args, global).await,
            PrSubcommand::Commits(args) => self.commits(args, global).await,
            PrSubcommand::Changes(args) => self.changes(args, global).await,
            PrSubcommand::Diff(args) => self.diff(args, global).await,
            PrSubcommand::Watch(args) => self.watch(args, global, true).await,
            PrSubcommand::Unwatch(args) => self.watch(args, global, false).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let filter = ListPullRequests {
            direction: if args.outgoing {
                Direction::Outgoing
            } else {
                Direction::Incoming
            },
            at: args.branch.clone(),
            state: args.state,
            order: args.order,
        };
        let prs = pull_requests(&session, global)?.list(&filter);
        let values = session.paged(prs).collect_up_to(args.limit).await?;

        global
            .output()
            .write_list(&values, "No pull requests match your search")
    }

    async fn view(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let pr = pull_request(&session, global, args.id)?.get().await?;

        global.output().write(&pr)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let (project, slug) = session.repo_target(global, None)?;
        let repo = session.client.project(&project).repo(&slug);

        let base = match &args.base {
            Some(base) => base.clone(),
            None => repo.default_branch().await?.id,
        };
        let mut request = NewPullRequest::new(&args.title, &args.head, &base);
        if let Some(body) = &args.body {
            request = request.description(body);
        }
        for reviewer in &args.reviewer {
            request = request.reviewer(reviewer);
        }

        let pr = repo.pull_requests().create(&request).await?;

        let output = global.output();
        output.write_success(&format!("Created PR #{}: {}", pr.id, pr.title));
        if output.is_json() {
            write_json(&pr)?;
        } else if let Some(url) = pr.web_url() {
            println!("{url}");
        }
        Ok(())
    }

    async fn edit(&self, args: &EditArgs, global: &GlobalOptions) -> Result<()> {
        if args.title.is_none() && args.body.is_none() && args.base.is_none() && args.reviewer.is_empty() {
            bail!("Nothing to change. Pass --title, --body, --base or --reviewer.");
        }

        let session = Session::open(global)?;
        let handle = pull_request(&session, global, args.id)?;
        let current = handle.get().await?;

        let update = UpdatePullRequest {
            version: current.version,
            title: args.title.clone(),
            description: args.body.clone(),
            reviewers: (!args.reviewer.is_empty()).then(|| args.reviewer.clone()),
            to_ref: args.base.clone(),
        };
        let pr = handle.update(&update).await?;

        let output = global.output();
        output.write_success(&format!("Updated PR #{}", pr.id));
        if output.is_json() {
            write_json(&pr)?;
        }
        Ok(())
    }

    async fn merge(&self, args: &MergeArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let handle = pull_request(&session, global, args.id)?;
        let current = handle.get().await?;

        let status = handle.can_merge().await?;
        if !status.can_merge {
            let reasons: Vec<&str> = status
                .vetoes
                .iter()
                .map(|v| v.summary_message.as_str())
                .collect();
            bail!("PR #{} cannot be merged: {}", args.id, reasons.join("; "));
        }

        confirm(
            global,
            args.yes,
            &format!(
                "Merge PR #{} ({} into {})?",
                current.id, current.from_ref.display_id, current.to_ref.display_id
            ),
        )?;
        let pr = handle.merge(current.version).await?;

        let output = global.output();
        output.write_success(&format!("Merged PR #{}", pr.id));
        if output.is_json() {
            write_json(&pr)?;
        }
        Ok(())
    }

    async fn decline(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let handle = pull_request(&session, global, args.id)?;
        let version = handle.get().await?.version;
        let pr = handle.decline(version).await?;

        global
            .output()
            .write_success(&format!("Declined PR #{}", pr.id));
        Ok(())
    }

    async fn reopen(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let handle = pull_request(&session, global, args.id)?;
        let version = handle.get().await?.version;
        let pr = handle.reopen(version).await?;

        global
            .output()
            .write_success(&format!("Reopened PR #{}", pr.id));
        Ok(())
    }

    async fn approve(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let participant = pull_request(&session, global, args.id)?.approve().await?;

        let output = global.output();
        output.write_success(&format!("Approved PR #{}", args.id));
        if output.is_json() {
            write_json(&participant)?;
        }
        Ok(())
    }

    async fn unapprove(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        pull_request(&session, global, args.id)?.unapprove().await?;

        global
            .output()
            .write_success(&format!("Removed approval from PR #{}", args.id));
        Ok(())
    }

    async fn checks(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let status = pull_request(&session, global, args.id)?.can_merge().await?;

        if global.json {
            return write_json(&status);
        }
        let color = console::colors_enabled();
        print_field("Can merge", &format_bool(status.can_merge, color), color);
        print_field("Conflicted", &format_bool(status.conflicted, color), color);
        for veto in &status.vetoes {
            println!("  - {}", veto.summary_message);
            if let Some(detail) = &veto.detailed_message {
                println!("    {detail}");
            }
        }
        Ok(())
    }

    async fn comment(&self, args: &CommentArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let handle = pull_request(&session, global, args.id)?;
        let comment = match args.reply_to {
            Some(parent) => handle.reply(parent, &args.body).await?,
            None => handle.comment(&args.body).await?,
        };

        let output = global.output();
        output.write_success(&format!("Added comment {} to PR #{}", comment.id, args.id));
        if output.is_json() {
            write_json(&comment)?;
        }
        Ok(())
    }

    async fn activity(&self, args: &ActivityArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let activities = pull_request(&session, global, args.id)?.activities();
        let values = session.paged(activities).collect_up_to(args.limit).await?;

        global.output().write_list(&values, "No activity")
    }

    async fn commits(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let commits = pull_request(&session, global, args.id)?.commits();
        let values = session.paged(commits).collect_all().await?;

        global.output().write_list(&values, "No commits")
    }

    async fn changes(&self, args: &PrArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let changes = pull_request(&session, global, args.id)?.changes();
        let values = session.paged(changes).collect_all().await?;

        global.output().write_list(&values, "No changes")
    }

    async fn diff(&self, args: &DiffArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let diff = pull_request(&session, global, args.id)?
            .diff(args.path.as_deref())
            .await?;

        write_json(&diff)
    }

    async fn watch(&self, args: &PrArgs, global: &GlobalOptions, watch: bool) -> Result<()> {
        let session = Session::open(global)?;
        let handle = pull_request(&session, global, args.id)?;
        let changed = if watch {
            handle.watch().await?
        } else {
            handle.unwatch().await?
        };
        if !changed {
            bail!("Server did not update the watch state of PR #{}", args.id);
        }

        let verb = if watch { "Watching" } else { "Stopped watching" };
        global
            .output()
            .write_success(&format!("{verb} PR #{}", args.id));
        Ok(())
    }
}

fn pull_requests<'a>(session: &'a Session, global: &GlobalOptions) -> Result<PullRequests<'a>> {
    let (project, slug) = session.repo_target(global, None)?;
    Ok(session.client.project(&project).repo(&slug).pull_requests())
}

fn pull_request<'a>(
    session: &'a Session,
    global: &GlobalOptions,
    id: u64,
) -> Result<PullRequestResource<'a>> {
    Ok(pull_requests(session, global)?.pull_request(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PullRequest {
        serde_json::from_value(json!({
            "id": 42,
            "version": 3,
            "title": "Add pagination",
            "state": "OPEN",
            "fromRef": {
                "id": "refs/heads/feature/paging",
                "displayId": "feature/paging",
                "repository": {"slug": "api", "project": {"key": "PRJ"}}
            },
            "toRef": {
                "id": "refs/heads/master",
                "displayId": "master",
                "repository": {"slug": "api", "project": {"key": "PRJ"}}
            },
            "author": {"user": {"name": "jdoe", "displayName": "Jane Doe"}, "role": "AUTHOR"},
            "updatedDate": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_pull_request_row() {
        let row = sample().row(false);
        assert_eq!(row[0], "#42");
        assert_eq!(row[1], "Add pagination");
        assert_eq!(row[2], "OPEN");
        assert_eq!(row[3], "Jane Doe");
        assert_eq!(row[4], "feature/paging → master");
        assert_eq!(PullRequest::headers().len(), row.len());
    }

    #[test]
    fn test_list_args_parse_state() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ListArgs,
        }

        let parsed = Wrapper::try_parse_from(["pr", "--state", "merged", "-o", "oldest"]).unwrap();
        assert_eq!(parsed.args.state, PullRequestState::Merged);
        assert_eq!(parsed.args.order, Some(PullRequestOrder::Oldest));

        let parsed = Wrapper::try_parse_from(["pr"]).unwrap();
        assert_eq!(parsed.args.state, PullRequestState::Open);

        assert!(Wrapper::try_parse_from(["pr", "--state", "stale"]).is_err());
    }
}
