//
//  stash-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the `stash` configuration: general settings plus one
//! entry per Stash server. Credentials are never written here; they live
//! in the system keyring (see [`crate::auth::KeyringStore`]).
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/stash/config.toml`
//! - **macOS**: `~/Library/Application Support/stash/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\stash\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! default_host = "stash.example.com"
//! git_protocol = "ssh"
//! page_size = 50
//!
//! [hosts."stash.example.com"]
//! url = "https://stash.example.com"
//! user = "jdoe"
//! auth = "token"
//! default_project = "PRJ"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stash_client::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut config = Config::load()?;
//! config.set("git_protocol", "ssh")?;
//! config.save()?;
//!
//! let (host, entry) = config.resolve_host(None)?;
//! println!("{host} -> {}", entry.url);
//! # Ok(())
//! # }
//! ```

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "STASH_CONFIG";

/// Settings that can be read and written with `stash config`.
pub const CONFIG_KEYS: &[&str] = &["default_host", "git_protocol", "page_size"];

/// Complete configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    /// Server entries keyed by [`normalize_host`] of their URL.
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    /// Host used when `--host` is not given.
    #[serde(default)]
    pub default_host: Option<String>,

    /// Clone URL shown by `repo view`: `http` or `ssh`.
    #[serde(default = "default_git_protocol")]
    pub git_protocol: String,

    /// Page size requested from collection endpoints.
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn default_git_protocol() -> String {
    "http".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_host: None,
            git_protocol: default_git_protocol(),
            page_size: None,
        }
    }
}

/// How the stored secret for a host is sent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// HTTP access token sent as a bearer token.
    #[default]
    Token,
    /// Username and password sent with HTTP basic authentication.
    Basic,
}

/// One Stash server.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HostConfig {
    /// Base URL, including any context path.
    pub url: String,

    /// Login name, required for basic authentication.
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub auth: AuthType,

    /// Project used when `--project` is not given.
    #[serde(default)]
    pub default_project: Option<String>,
}

impl HostConfig {
    /// Entry for `url` with default settings.
    pub fn new(url: &str) -> Self {
        Self {
            url: host_url(url),
            ..Default::default()
        }
    }
}

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// Returns the default configuration if no file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`, or the default if it does not
    /// exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid configuration file {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// Path of the configuration file, `STASH_CONFIG` if set.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn host_config(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(&normalize_host(host))
    }

    /// Adds or replaces the entry for `config.url` and returns its key.
    pub fn add_host(&mut self, config: HostConfig) -> String {
        let key = normalize_host(&config.url);
        self.hosts.insert(key.clone(), config);
        key
    }

    /// Removes the entry for `host`, clearing the default if it pointed
    /// there.
    pub fn remove_host(&mut self, host: &str) -> Option<HostConfig> {
        let key = normalize_host(host);
        if self.core.default_host.as_deref() == Some(key.as_str()) {
            self.core.default_host = None;
        }
        self.hosts.remove(&key)
    }

    /// Picks the server to talk to.
    ///
    /// An explicit host (from `--host` or `STASH_HOST`) wins and does not
    /// need a configuration entry. Otherwise the configured default host
    /// is used, or the only configured host.
    pub fn resolve_host(&self, explicit: Option<&str>) -> Result<(String, HostConfig)> {
        if let Some(host) = explicit {
            let key = normalize_host(host);
            let entry = self
                .hosts
                .get(&key)
                .cloned()
                .unwrap_or_else(|| HostConfig::new(host));
            return Ok((key, entry));
        }

        if let Some(default) = &self.core.default_host {
            let key = normalize_host(default);
            return match self.hosts.get(&key) {
                Some(entry) => Ok((key, entry.clone())),
                None => Ok((key, HostConfig::new(default))),
            };
        }

        let mut hosts = self.hosts.iter();
        match (hosts.next(), hosts.next()) {
            (Some((key, entry)), None) => Ok((key.clone(), entry.clone())),
            (None, _) => bail!("No Stash server configured. Run `stash auth login --host <url>`."),
            (Some(_), Some(_)) => bail!(
                "Several Stash servers are configured. Pass --host or set one with `stash config set default_host <host>`."
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default_host" => self.core.default_host.clone(),
            "git_protocol" => Some(self.core.git_protocol.clone()),
            "page_size" => self.core.page_size.map(|size| size.to_string()),
            _ => None,
        }
    }

    /// Sets a value from [`CONFIG_KEYS`], validating it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_host" => {
                self.core.default_host = Some(normalize_host(value));
            }
            "git_protocol" => {
                if !matches!(value, "http" | "ssh") {
                    bail!("git_protocol must be 'http' or 'ssh', got '{value}'");
                }
                self.core.git_protocol = value.to_string();
            }
            "page_size" => {
                let size: u32 = value
                    .parse()
                    .with_context(|| format!("page_size must be a number, got '{value}'"))?;
                if size == 0 {
                    bail!("page_size must be greater than zero");
                }
                self.core.page_size = Some(size);
            }
            _ => bail!(
                "Unknown configuration key '{key}'. Valid keys: {}",
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.core.git_protocol, "http");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let key = config.add_host(HostConfig {
            url: "https://stash.example.com/stash".to_string(),
            user: Some("jdoe".to_string()),
            auth: AuthType::Basic,
            default_project: Some("PRJ".to_string()),
        });
        config.set("default_host", &key).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(key, "stash.example.com/stash");
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "core = 5").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_get_and_set() {
        let mut config = Config::default();
        config.set("git_protocol", "ssh").unwrap();
        config.set("page_size", "50").unwrap();

        assert_eq!(config.get("git_protocol").as_deref(), Some("ssh"));
        assert_eq!(config.get("page_size").as_deref(), Some("50"));
        assert!(config.set("git_protocol", "ftp").is_err());
        assert!(config.set("page_size", "0").is_err());
        assert!(config.set("editor", "vim").is_err());
        assert_eq!(config.get("editor"), None);
    }

    #[test]
    fn test_resolve_host() {
        let mut config = Config::default();
        assert!(config.resolve_host(None).is_err());

        config.add_host(HostConfig::new("https://one.example.com"));
        let (key, _) = config.resolve_host(None).unwrap();
        assert_eq!(key, "one.example.com");

        config.add_host(HostConfig::new("two.example.com"));
        assert!(config.resolve_host(None).is_err());

        config.set("default_host", "https://two.example.com/").unwrap();
        let (key, entry) = config.resolve_host(None).unwrap();
        assert_eq!(key, "two.example.com");
        assert_eq!(entry.url, "https://two.example.com");

        let (key, entry) = config
            .resolve_host(Some("http://adhoc.example.com:7990"))
            .unwrap();
        assert_eq!(key, "adhoc.example.com:7990");
        assert_eq!(entry.url, "http://adhoc.example.com:7990");
    }

    #[test]
    fn test_remove_default_host() {
        let mut config = Config::default();
        let key = config.add_host(HostConfig::new("stash.example.com"));
        config.set("default_host", &key).unwrap();

        assert!(config.remove_host("https://stash.example.com").is_some());
        assert_eq!(config.core.default_host, None);
        assert!(config.hosts.is_empty());
    }
}
