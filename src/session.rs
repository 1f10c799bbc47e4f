// FILE: src/session.rs
//! Session: turns user gestures into gateway calls and registry mutations.
//!
//! All registry access happens on the caller's task. Gateway work runs on the
//! blocking pool and is awaited while `&mut self` is held, so a gesture can
//! never overlap another one. Destructive actions are two-step: a request
//! parks a `Confirmation`, and only `respond(true)` carries it out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::core::classify::Category;
use crate::core::registry::Registry;
use crate::engine::{SortKey, Totals};
use crate::error::{DocError, Result};
use crate::gateway::{FileDescriptor, FileGateway};
use crate::state::{View, ViewState};
use crate::storage::DocumentRecord;

/// User-facing message produced by a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// A destructive action waiting for an explicit yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeleteEntry { id: String },
    ClearAll,
    RemoveMissing { id: String, title: String, path: String },
}

impl Confirmation {
    pub fn prompt(&self) -> String {
        match self {
            Confirmation::DeleteEntry { .. } => {
                "Are you sure you want to delete this document entry? This will not delete the file itself.".to_string()
            }
            Confirmation::ClearAll => {
                "Are you sure you want to delete all document entries? This cannot be undone.".to_string()
            }
            Confirmation::RemoveMissing { title, path, .. } => format!(
                "The file for \"{}\" was not found at the path:\n\n{}\n\nIt may have been moved or deleted. Would you like to remove this entry from the list?",
                title, path
            ),
        }
    }
}

/// What happened when a document was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// No record with that id.
    Unknown,
    /// The shell refused; the file still exists.
    Failed(String),
    /// The file is gone; a `RemoveMissing` confirmation is now pending.
    Missing(String),
}

const EMPTY_LISTING: &str = "No documents found. Try adjusting your filters or search terms.";

pub struct Session {
    registry: Registry,
    gateway: Arc<dyn FileGateway>,
    state: ViewState,
    selected_file: Option<FileDescriptor>,
    pending: Option<Confirmation>,
}

impl Session {
    pub fn new(registry: Registry, gateway: Arc<dyn FileGateway>, debounce: Duration) -> Self {
        Self {
            registry,
            gateway,
            state: ViewState::new(debounce),
            selected_file: None,
            pending: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn empty_listing_text() -> &'static str {
        EMPTY_LISTING
    }

    // ========== VIEW STATE ==========

    pub fn show(&mut self, view: View) {
        self.state.view = view;
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.state.category = category;
    }

    pub fn set_type(&mut self, doc_type: Option<String>) {
        self.state.doc_type = doc_type;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.state.sort = sort;
    }

    pub fn search_input(&mut self, term: &str, now: Instant) {
        self.state.search.input(term, now);
    }

    /// Set a complete search term, e.g. one typed as a whole line.
    pub fn search_submit(&mut self, term: &str) {
        self.state.search.submit(term);
    }

    /// True once the search box has been quiet for the debounce period.
    pub fn search_due(&mut self, now: Instant) -> bool {
        self.state.search.poll(now)
    }

    pub fn listing(&self) -> Vec<&DocumentRecord> {
        self.registry.query(&self.state.query())
    }

    pub fn summary(&self) -> Totals {
        self.registry.totals()
    }

    // ========== ADD ==========

    pub fn selected_file(&self) -> Option<&FileDescriptor> {
        self.selected_file.as_ref()
    }

    /// Pick one file for the add form. A cancelled dialog keeps the previous
    /// selection.
    pub async fn browse(&mut self) -> Result<Option<&FileDescriptor>> {
        let picked = self.call_gateway(|g| g.pick_single_file()).await??;
        if let Some(file) = picked {
            tracing::debug!("[Session] Selected {}", file.path);
            self.selected_file = Some(file);
        }
        Ok(self.selected_file.as_ref())
    }

    /// Submit the add form with the current selection.
    pub fn submit(&mut self, title: &str) -> Result<Notice> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DocError::validation("Please enter a document title."));
        }
        let Some(file) = self.selected_file.as_ref() else {
            return Err(DocError::validation("Please select a file using the \"Browse\" button."));
        };

        self.registry.add(title, file)?;
        let message = format!("'{}' was added with the title '{}'.", file.name, title);
        self.selected_file = None;
        Ok(Notice::Success(message))
    }

    /// Files and folders dropped onto the add view.
    pub async fn drop_paths(&mut self, paths: Vec<PathBuf>) -> Result<Option<Notice>> {
        if paths.is_empty() {
            return Ok(None);
        }
        let files = self.call_gateway(move |g| g.expand_paths(&paths)).await?;
        self.process_files(&files)
    }

    /// Click on the drop zone: multi-select dialog, then the same ingestion.
    pub async fn pick_and_add(&mut self) -> Result<Option<Notice>> {
        let files = self.call_gateway(|g| {
            let paths = g.pick_multiple();
            if paths.is_empty() { Vec::new() } else { g.expand_paths(&paths) }
        }).await?;
        self.process_files(&files)
    }

    /// Register every descriptor, titled after its file name.
    pub fn process_files(&mut self, files: &[FileDescriptor]) -> Result<Option<Notice>> {
        if files.is_empty() {
            return Ok(None);
        }

        let mut added = Vec::new();
        for file in files {
            match self.registry.add(&title_from_name(&file.name), file) {
                Ok(_) => added.push(file.name.as_str()),
                Err(DocError::Validation(reason)) => {
                    tracing::warn!("[Session] Skipping {:?}: {}", file.path, reason);
                }
                Err(e) => return Err(e),
            }
        }

        let notice = match added.as_slice() {
            [] => Notice::Error("Invalid document data provided.".to_string()),
            [name] => Notice::Success(format!("'{}' was added successfully!", name)),
            names => Notice::Success(format!("{} documents were added successfully!", names.len())),
        };
        Ok(Some(notice))
    }

    // ========== CONFIRMATIONS ==========

    pub fn pending(&self) -> Option<&Confirmation> {
        self.pending.as_ref()
    }

    /// Ask to delete one entry. Unknown ids raise nothing.
    pub fn request_delete(&mut self, id: &str) -> Option<&Confirmation> {
        self.registry.get(id)?;
        self.pending = Some(Confirmation::DeleteEntry { id: id.to_string() });
        self.pending.as_ref()
    }

    pub fn request_clear(&mut self) -> &Confirmation {
        self.pending.insert(Confirmation::ClearAll)
    }

    /// Answer the pending confirmation. Declining is not an error.
    pub fn respond(&mut self, accept: bool) -> Result<Option<Notice>> {
        let Some(confirmation) = self.pending.take() else {
            return Ok(None);
        };
        if !accept {
            tracing::debug!("[Session] Declined {:?}", confirmation);
            return Ok(None);
        }

        match confirmation {
            Confirmation::DeleteEntry { id } | Confirmation::RemoveMissing { id, .. } => {
                Ok(self.registry.remove(&id)?.map(|doc| Notice::Success(format!("'{}' was removed.", doc.title))))
            }
            Confirmation::ClearAll => {
                let removed = self.registry.clear()?;
                Ok(Some(Notice::Success(format!("{} document entries were removed.", removed))))
            }
        }
    }

    // ========== SHELL ACTIONS ==========

    /// Open with the default handler. If that fails because the file is gone,
    /// a `RemoveMissing` confirmation is parked.
    pub async fn open(&mut self, id: &str) -> Result<OpenOutcome> {
        let Some(doc) = self.registry.get(id) else {
            return Ok(OpenOutcome::Unknown);
        };
        let (title, path) = (doc.title.clone(), doc.path.clone());

        let target = PathBuf::from(&path);
        let outcome = self.call_gateway(move |g| g.open_path(&target)).await?;
        if outcome.success {
            return Ok(OpenOutcome::Opened);
        }

        let target = PathBuf::from(&path);
        let exists = match self.call_gateway(move |g| g.stat_path(&target)).await? {
            Ok(info) => info.is_some(),
            Err(e) => {
                tracing::warn!("[Session] Could not re-check {}: {}", path, e);
                true
            }
        };

        if exists {
            return Ok(OpenOutcome::Failed(outcome.message));
        }

        self.pending = Some(Confirmation::RemoveMissing { id: id.to_string(), title, path });
        Ok(OpenOutcome::Missing(outcome.message))
    }

    /// Show the file in its folder.
    pub async fn reveal(&self, id: &str) -> Result<Option<Notice>> {
        let Some(doc) = self.registry.get(id) else {
            return Ok(None);
        };

        let target = PathBuf::from(&doc.path);
        let outcome = self.call_gateway(move |g| g.reveal_path(&target)).await?;
        if outcome.success {
            Ok(None)
        } else {
            Ok(Some(Notice::Error(outcome.message)))
        }
    }

    async fn call_gateway<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn FileGateway) -> T + Send + 'static,
        T: Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        tokio::task::spawn_blocking(move || f(gateway.as_ref()))
            .await
            .map_err(|e| DocError::Gateway(format!("gateway task failed: {}", e)))
    }
}

/// Title for a bulk-added file: the name without its last extension.
/// Dot-files would end up untitled, so they keep their full name.
pub fn title_from_name(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[..idx].to_string(),
        _ => name.to_string(),
    }
}
