//! Clearing of stale generated files before a fresh generation.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::config::CliConfig;
use crate::core::Result;

/// Extensions of files the generator owns
pub const GENERATED_EXTENSIONS: &[&str] = &[".d.ts", ".ts", ".js"];

/// Prefix of transport files that stay when a custom request library is configured
pub const BASE_FILE_PREFIX: &str = "base.";

/// Decides which direct entries of an output directory are stale and deletes them
#[derive(Debug, Clone, Default)]
pub struct DirectoryReconciler {
    ignore: BTreeSet<String>,
    custom_transport: bool,
}

impl DirectoryReconciler {
    pub fn new(ignore: BTreeSet<String>, custom_transport: bool) -> Self {
        Self {
            ignore,
            custom_transport,
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.ignore_delete.clone(), config.uses_custom_transport())
    }

    /// Whether the entry `name` of `dir` may be deleted
    pub fn should_remove(&self, dir: &Path, name: &str) -> bool {
        let generated = GENERATED_EXTENSIONS
            .iter()
            .any(|ext| name.len() > ext.len() && name.ends_with(ext));
        if !generated {
            return false;
        }
        if self.custom_transport && name.starts_with(BASE_FILE_PREFIX) {
            return false;
        }
        if self.ignore.contains(name) {
            return false;
        }
        dir.join(name) != Path::new(name)
    }

    /// Delete every stale file directly inside `dir`.
    ///
    /// Returns the deleted paths in name order. A missing directory is not an error.
    pub async fn reconcile(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        match fs::metadata(dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();

        let mut removed = Vec::new();
        for name in names {
            if !self.should_remove(dir, &name) {
                continue;
            }
            let path = dir.join(&name);
            fs::remove_file(&path).await?;
            debug!(path = %path.display(), "Removed stale generated file");
            removed.push(path);
        }
        Ok(removed)
    }
}

/// Run reconciliation for `config` unless auto-clear is disabled
pub async fn clear_stale_files(config: &CliConfig) -> Result<Vec<PathBuf>> {
    if !config.auto_clear {
        return Ok(Vec::new());
    }
    DirectoryReconciler::from_config(config)
        .reconcile(&config.sdk_dir)
        .await
}
