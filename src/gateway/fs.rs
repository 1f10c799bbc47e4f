// FILE: src/gateway/fs.rs
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use crate::core::classify::extension_of;
use crate::error::{DocError, Result};
use crate::gateway::{ActionOutcome, FileDescriptor, FileGateway, FileInfo, FilePicker};

/// Gateway backed by the local filesystem and the desktop shell.
pub struct FsGateway {
    picker: Box<dyn FilePicker>,
    max_depth: usize,
}

impl FsGateway {
    pub fn new(picker: Box<dyn FilePicker>, max_depth: usize) -> Self {
        Self { picker, max_depth }
    }

    fn describe(path: &Path, metadata: &fs::Metadata) -> FileInfo {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let extension = extension_of(&name);

        FileInfo {
            path: path.to_string_lossy().to_string(),
            name,
            size: metadata.len(),
            extension,
            is_dir: metadata.is_dir(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
        }
    }

    /// Walk one folder. Symlinks are followed; walkdir reports a link back to
    /// an ancestor as an error, which is skipped like any unreadable entry.
    fn walk_folder(&self, root: &Path, out: &mut Vec<FileDescriptor>) {
        for entry in walkdir::WalkDir::new(root)
            .follow_links(true)
            .max_depth(self.max_depth)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if e.loop_ancestor().is_some() {
                        tracing::warn!("[Gateway] Skipping symlink cycle: {}", e);
                    } else {
                        tracing::warn!("[Gateway] Skipping unreadable entry: {}", e);
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => out.push(Self::describe(entry.path(), &metadata).descriptor()),
                Err(e) => tracing::warn!("[Gateway] Could not stat {}: {}", entry.path().display(), e),
            }
        }
    }
}

impl FileGateway for FsGateway {
    fn pick_single_file(&self) -> Result<Option<FileDescriptor>> {
        let Some(path) = self.picker.pick_file() else {
            return Ok(None);
        };

        match self.stat_path(&path)? {
            Some(info) if !info.is_dir => Ok(Some(info.descriptor())),
            Some(_) => Err(DocError::InvalidPath(format!("{} is a folder", path.display()))),
            None => Err(DocError::Gateway(format!("File not found: {}", path.display()))),
        }
    }

    fn pick_multiple(&self) -> Vec<PathBuf> {
        self.picker.pick_many()
    }

    fn expand_paths(&self, paths: &[PathBuf]) -> Vec<FileDescriptor> {
        let mut files = Vec::new();

        for path in paths {
            let metadata = match fs::metadata(path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("[Gateway] Error processing path {}: {}", path.display(), e);
                    continue;
                }
            };

            if metadata.is_dir() {
                self.walk_folder(path, &mut files);
            } else {
                files.push(Self::describe(path, &metadata).descriptor());
            }
        }

        tracing::debug!("[Gateway] Expanded {} paths into {} files", paths.len(), files.len());
        files
    }

    fn stat_path(&self, path: &Path) -> Result<Option<FileInfo>> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(Self::describe(path, &metadata))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DocError::Gateway(format!("Could not read {}: {}", path.display(), e))),
        }
    }

    fn open_path(&self, path: &Path) -> ActionOutcome {
        if !path.exists() {
            return ActionOutcome::failed("File not found");
        }

        match opener::open(path) {
            Ok(()) => ActionOutcome::ok("File opened successfully"),
            Err(e) => ActionOutcome::failed(format!("Error opening file: {}", e)),
        }
    }

    fn reveal_path(&self, path: &Path) -> ActionOutcome {
        if !path.exists() {
            return ActionOutcome::failed("File not found");
        }

        match reveal_in_file_manager(path) {
            Ok(()) => ActionOutcome::ok("Shown in folder"),
            Err(e) => ActionOutcome::failed(format!("Error showing file: {}", e)),
        }
    }
}

#[cfg(target_os = "windows")]
fn reveal_in_file_manager(path: &Path) -> std::result::Result<(), String> {
    std::process::Command::new("explorer")
        .arg(format!("/select,{}", path.display()))
        .spawn()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(target_os = "macos")]
fn reveal_in_file_manager(path: &Path) -> std::result::Result<(), String> {
    std::process::Command::new("open")
        .arg("-R")
        .arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn reveal_in_file_manager(path: &Path) -> std::result::Result<(), String> {
    // No portable "select" verb here; open the containing folder instead.
    let folder = path.parent().unwrap_or(path);
    opener::open(folder).map_err(|e| e.to_string())
}
