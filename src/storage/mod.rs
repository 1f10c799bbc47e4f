// FILE: src/storage/mod.rs
pub mod connection;
pub mod document_store;

// Common exports
pub use connection::{KvStore, DOCUMENTS_BACKUP_KEY, DOCUMENTS_KEY};
pub use document_store::{load_documents, save_documents, LoadOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::classify::Category;

/// One tracked file reference. The only persisted entity.
///
/// Field names serialize in camelCase (`fileName`, `addedDate`, `type`) so the
/// stored blob keeps the layout earlier versions wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub path: String,
    pub added_date: DateTime<Utc>,
    pub size: u64,
    pub extension: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub category: Category,
}

impl std::fmt::Display for DocumentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {}, size: {})", self.title, self.path, self.doc_type, self.size)
    }
}
