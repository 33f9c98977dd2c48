//
//  stash-client
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Configuration file I/O
//!
//! Small helpers used by [`Config`](super::Config) to read and write the
//! TOML file. Write operations create missing parent directories.

use std::path::Path;

use anyhow::{Context, Result};

/// Reads the configuration file at `path`.
pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))
}

/// Writes `content` to `path`, creating parent directories first.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write configuration file {}", path.display()))
}

pub fn config_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("config.toml");

        assert!(!config_exists(&path));
        write_config_file(&path, "[core]\n").unwrap();
        assert!(config_exists(&path));
        assert_eq!(read_config_file(&path).unwrap(), "[core]\n");
    }

    #[test]
    fn test_directory_is_not_a_config_file() {
        let dir = TempDir::new().unwrap();
        assert!(!config_exists(dir.path()));
        assert!(read_config_file(dir.path()).is_err());
    }
}
