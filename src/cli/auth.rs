//
//  stash-client
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands.
//!
//! Credentials are verified against the server before they are stored in
//! the system keyring. The configuration file only records the host, the
//! user name and which kind of secret is stored.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::StashClient;
use crate::auth::{
    read_token_from_stdin, resolve_credential, validate_token, verify_credential, whoami,
    AuthCredential, KeyringStore,
};
use crate::config::{AuthType, Config, HostConfig};
use crate::interactive::{
    is_interactive, prompt_confirm_with_default, prompt_input, prompt_input_with_default,
    prompt_secret, prompt_server_url, select_auth_type,
};

use super::GlobalOptions;

/// Authenticate with a Stash server.
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Log in to a Stash server
    Login(LoginArgs),

    /// Log out of a Stash server
    Logout(LogoutArgs),

    /// View authentication status
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Use username and password instead of an access token
    #[arg(long)]
    pub basic: bool,

    /// Login name, required with --basic
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Read the token or password from standard input
    #[arg(long)]
    pub with_token: bool,

    /// Make this the default host
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Log out of all hosts
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show the stored secret (masked)
    #[arg(long, short = 't')]
    pub show_token: bool,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Login(args) => login(args, global).await,
            AuthSubcommand::Logout(args) => logout(args, global).await,
            AuthSubcommand::Status(args) => status(args, global).await,
        }
    }
}

/// Performs the login flow.
async fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let interactive = !global.no_prompt && is_interactive();
    let output = global.output();

    let url = match &global.host {
        Some(host) => host.clone(),
        None if interactive => prompt_server_url()?,
        None => bail!("No host given. Pass --host <url>."),
    };

    let mut config = Config::load()?;
    let mut host = config
        .host_config(&url)
        .cloned()
        .unwrap_or_else(|| HostConfig::new(&url));

    host.auth = if args.basic {
        AuthType::Basic
    } else if args.user.is_some() || !interactive || args.with_token {
        host.auth
    } else {
        select_auth_type(host.auth)?
    };

    if host.auth == AuthType::Basic {
        let user = match (&args.user, &host.user) {
            (Some(user), _) => user.clone(),
            (None, Some(existing)) if interactive => prompt_input_with_default("Username", existing)?,
            (None, Some(existing)) => existing.clone(),
            (None, None) if interactive => prompt_input("Username")?,
            (None, None) => bail!("Basic authentication needs a user name. Pass --user."),
        };
        host.user = Some(user);
    } else if args.user.is_some() {
        host.user = args.user.clone();
    }

    let secret = if args.with_token {
        read_token_from_stdin()?
    } else if interactive {
        if host.auth == AuthType::Token {
            println!();
            println!("To create an HTTP access token:");
            println!("  1. Go to {}/plugins/servlet/access-tokens/manage", host.url);
            println!("  2. Click 'Create token'");
            println!("  3. Give it a name and select permissions");
            println!("  4. Copy the generated token");
            println!();
        }
        prompt_secret(host.auth)?
    } else {
        bail!("No secret given. Pass --with-token and provide it on standard input.");
    };

    if secret.is_empty() || (host.auth == AuthType::Token && !validate_token(&secret)) {
        bail!("Invalid token format");
    }

    let credential = AuthCredential::from_secret(&host, secret.clone());
    let client = StashClient::from_config(&host)?.with_auth(credential);

    output.write_info("Validating credentials...");
    if !verify_credential(&client).await? {
        bail!("The server rejected the credentials for {}", host.url);
    }

    let username = whoami(&client).await.unwrap_or_else(|e| {
        tracing::debug!("whoami failed: {e}");
        None
    });
    if host.user.is_none() {
        host.user = username.clone();
    }

    let key = config.add_host(host);
    KeyringStore::new().store(&key, &secret)?;
    if args.default || config.core.default_host.is_none() {
        config.core.default_host = Some(key.clone());
    }
    config.save()?;

    match username {
        Some(user) => output.write_success(&format!("Logged in to {key} as {user}")),
        None => output.write_success(&format!("Logged in to {key}")),
    }
    Ok(())
}

/// Performs logout.
async fn logout(args: &LogoutArgs, global: &GlobalOptions) -> Result<()> {
    let keyring = KeyringStore::new();
    let mut config = Config::load()?;
    let output = global.output();

    if args.all {
        let hosts: Vec<String> = config.hosts.keys().cloned().collect();
        if hosts.is_empty() {
            output.write_info("Not logged in to any Stash server");
            return Ok(());
        }
        if !global.no_prompt
            && is_interactive()
            && !prompt_confirm_with_default(&format!("Log out of {} hosts?", hosts.len()), false)?
        {
            return Ok(());
        }
        for host in hosts {
            keyring.delete(&host)?;
            config.remove_host(&host);
            output.write_success(&format!("Logged out of {host}"));
        }
        config.save()?;
        return Ok(());
    }

    let (key, _) = config.resolve_host(global.host.as_deref())?;
    keyring.delete(&key)?;
    if config.remove_host(&key).is_none() {
        output.write_warning(&format!("{key} was not configured"));
    }
    config.save()?;

    output.write_success(&format!("Logged out of {key}"));
    Ok(())
}

/// Prints every configured host with its server version and the user the
/// stored credential authenticates as.
async fn status(args: &StatusArgs, global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let color = console::colors_enabled();

    if config.hosts.is_empty() {
        println!("Not logged in to any Stash server");
        println!();
        println!("Run 'stash auth login --host <url>' to authenticate");
        return Ok(());
    }

    let mut report = Vec::new();
    for (key, host) in &config.hosts {
        let credential = resolve_credential(key, host)?;
        let mut client = StashClient::from_config(host)?;
        if let Some(credential) = credential.clone() {
            client = client.with_auth(credential);
        }

        let version = match client.application_properties().await {
            Ok(props) => Some(props.version),
            Err(e) => {
                tracing::debug!("{key}: {e}");
                None
            }
        };
        let user = match &credential {
            Some(_) => whoami(&client).await.unwrap_or(None),
            None => None,
        };

        report.push(serde_json::json!({
            "host": key,
            "url": host.url,
            "default": config.core.default_host.as_deref() == Some(key.as_str()),
            "auth": credential.as_ref().map(AuthCredential::kind),
            "user": user,
            "reachable": version.is_some(),
            "version": version,
        }));

        if global.json {
            continue;
        }

        let title = if color {
            style(key).bold().to_string()
        } else {
            key.clone()
        };
        println!("{title}");
        match (&credential, &user) {
            (Some(_), Some(user)) => println!("  Logged in as: {user}"),
            (Some(_), None) => println!("  Status: credential rejected or user unknown"),
            (None, _) => println!("  Status: no credential stored"),
        }
        if let Some(credential) = &credential {
            println!("  Auth: {}", credential.kind());
        }
        match &version {
            Some(version) => println!("  Server version: {version}"),
            None => println!("  Server: unreachable"),
        }
        if args.show_token {
            if let Some(secret) = KeyringStore::new().get(key)? {
                println!("  Secret: {}", mask_secret(&secret));
            }
        }
        println!();
    }

    if global.json {
        crate::output::write_json(&report)?;
    }
    Ok(())
}

/// Keeps the first and last four characters of long secrets.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}
