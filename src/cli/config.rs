//
//  stash-client
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes the core settings in [`CONFIG_KEYS`] and lists the
//! configured hosts.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{Config, CONFIG_KEYS};
use crate::output::write_json;

use super::GlobalOptions;

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// List all configuration values and hosts
    #[command(visible_alias = "ls")]
    List,

    /// Set the default project of a host
    #[command(name = "default-project")]
    DefaultProject(DefaultProjectArgs),

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

#[derive(Args, Debug)]
pub struct DefaultProjectArgs {
    /// Project key
    pub key: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args, global),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::DefaultProject(args) => self.default_project(args, global),
            ConfigSubcommand::Path => self.path(global),
        }
    }

    fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        if !CONFIG_KEYS.contains(&args.key.as_str()) {
            bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                args.key,
                CONFIG_KEYS.join(", ")
            );
        }
        let config = Config::load()?;
        let value = config.get(&args.key);

        if global.json {
            write_json(&serde_json::json!({ "key": args.key, "value": value }))?;
        } else if let Some(v) = value {
            println!("{}", v);
        }
        Ok(())
    }

    fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        let mut config = Config::load()?;
        config.set(&args.key, &args.value)?;
        config.save()?;

        global
            .output()
            .write_success(&format!("Set {} to {}", args.key, args.value));
        Ok(())
    }

    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;

        if global.json {
            return write_json(&config);
        }

        let color = console::colors_enabled();
        for key in CONFIG_KEYS {
            let value = config.get(key).unwrap_or_default();
            if color {
                println!("{}={}", style(key).cyan(), value);
            } else {
                println!("{}={}", key, value);
            }
        }

        for (name, host) in &config.hosts {
            println!();
            println!("[{}]", name);
            println!("url={}", host.url);
            println!("auth={}", serde_json::to_value(host.auth)?.as_str().unwrap_or_default());
            if let Some(user) = &host.user {
                println!("user={}", user);
            }
            if let Some(project) = &host.default_project {
                println!("default_project={}", project);
            }
        }
        Ok(())
    }

    fn default_project(&self, args: &DefaultProjectArgs, global: &GlobalOptions) -> Result<()> {
        let mut config = Config::load()?;
        let (key, _) = config.resolve_host(global.host.as_deref())?;
        let Some(host) = config.hosts.get_mut(&key) else {
            bail!("{key} is not configured. Run `stash auth login --host {key}` first.");
        };
        host.default_project = Some(args.key.clone());
        config.save()?;

        global
            .output()
            .write_success(&format!("Default project for {key} is now {}", args.key));
        Ok(())
    }

    fn path(&self, global: &GlobalOptions) -> Result<()> {
        let path = Config::config_path()?;
        if global.json {
            write_json(&serde_json::json!({ "path": path }))?;
        } else {
            println!("{}", path.display());
        }
        Ok(())
    }
}
