//! Output directory handling: artifacts, snapshots and stale-file reconciliation

pub mod reconciler;

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::core::Result;
pub use reconciler::{DirectoryReconciler, clear_stale_files};

/// Snapshot of the document as fetched
pub const ORIGIN_SNAPSHOT: &str = "origin.json";

/// Snapshot of the normalized document
pub const NORMALIZED_SNAPSHOT: &str = "oas.json";

/// A generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    pub fn new<P: Into<PathBuf>, C: Into<String>>(path: P, content: C) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Create `path` and any missing ancestors
pub async fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Write every artifact, creating parent directories as needed
pub async fn write_artifacts(artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        if let Some(parent) = artifact.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(&artifact.path).await?;
        file.write_all(artifact.content.as_bytes()).await?;
        file.flush().await?;
    }
    Ok(())
}

/// Persist `spec` as two-space indented JSON under `dir/name`
pub async fn write_snapshot(dir: &Path, name: &str, spec: &JsonValue) -> Result<PathBuf> {
    let path = dir.join(name);
    let content = serde_json::to_string_pretty(spec)?;
    fs::write(&path, content).await?;
    Ok(path)
}
