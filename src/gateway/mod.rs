// FILE: src/gateway/mod.rs
//! The Gateway: everything that touches the host OS on behalf of the registry.
//!
//! File pickers, stat, recursive folder expansion, and the shell actions
//! (open with the default handler, reveal in the file manager). The registry
//! never stores file contents; it only consumes the metadata returned here.

pub mod fs;

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::Result;

pub use fs::FsGateway;

/// Metadata of one file, as handed to the registry for ingestion.
///
/// `extension` is lowercase without the dot and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub extension: String,
}

/// Result of stat-ing an existing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub extension: String,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl FileInfo {
    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            path: self.path.clone(),
            name: self.name.clone(),
            size: self.size,
            extension: self.extension.clone(),
        }
    }
}

/// Outcome of a shell action. Failures carry a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Interactive path selection. Cancelling yields `None` / an empty list.
pub trait FilePicker: Send + Sync {
    fn pick_file(&self) -> Option<PathBuf>;
    fn pick_many(&self) -> Vec<PathBuf>;
}

/// Contract the session relies on. Calls may block; callers run them off the
/// event loop.
pub trait FileGateway: Send + Sync {
    /// Pick one file and describe it. `Ok(None)` on cancel.
    fn pick_single_file(&self) -> Result<Option<FileDescriptor>>;

    /// Pick any number of files and/or folders. Empty on cancel.
    fn pick_multiple(&self) -> Vec<PathBuf>;

    /// Flatten files and folders into file descriptors. Unreadable entries are
    /// skipped.
    fn expand_paths(&self, paths: &[PathBuf]) -> Vec<FileDescriptor>;

    /// `Ok(None)` when nothing exists at `path`.
    fn stat_path(&self, path: &Path) -> Result<Option<FileInfo>>;

    fn open_path(&self, path: &Path) -> ActionOutcome;

    fn reveal_path(&self, path: &Path) -> ActionOutcome;
}
