// FILE: src/core/registry.rs
//! Document Registry
//!
//! In-memory list of records, newest first, mirrored into the key-value store
//! after every mutation. A mutation that fails to persist is rolled back, so
//! memory never claims more than what is on disk.

use chrono::Utc;
use tokio::sync::watch;
use crate::core::classify::{classify, extension_of, normalize_extension};
use crate::engine::{Query, Totals};
use crate::error::{DocError, Result};
use crate::gateway::FileDescriptor;
use crate::storage::{load_documents, save_documents, DocumentRecord, KvStore};

pub struct Registry {
    store: KvStore,
    documents: Vec<DocumentRecord>,
    /// Bumped after every successful mutation; views re-render on change.
    revision: watch::Sender<u64>,
}

impl Registry {
    /// Load the registry, reconciling legacy records. Reconciled records are
    /// written back before this returns.
    pub fn load(store: KvStore) -> Result<Self> {
        let outcome = load_documents(&store)?;
        let needs_write_back = outcome.needs_write_back();
        let (revision, _) = watch::channel(0);
        let registry = Self { store, documents: outcome.records, revision };

        if needs_write_back {
            registry.persist()?;
            tracing::info!(
                "Migrated {} documents to include category and type information, dropped {} unreadable",
                outcome.backfilled,
                outcome.skipped
            );
        }

        Ok(registry)
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Register a file under `title`. The new record goes to index 0.
    pub fn add(&mut self, title: &str, file: &FileDescriptor) -> Result<&DocumentRecord> {
        let title = title.trim();
        if title.is_empty() || file.path.is_empty() {
            return Err(DocError::validation("Invalid document data provided."));
        }

        let extension = if file.extension.is_empty() {
            extension_of(&file.path)
        } else {
            normalize_extension(&file.extension)
        };
        let classification = classify(&extension);

        let record = DocumentRecord {
            id: self.fresh_id(),
            title: title.to_string(),
            file_name: file.name.clone(),
            path: file.path.clone(),
            added_date: Utc::now(),
            size: file.size,
            extension,
            doc_type: classification.doc_type,
            category: classification.category,
        };

        self.documents.insert(0, record);
        if let Err(e) = self.persist() {
            self.documents.remove(0);
            return Err(e);
        }

        self.bump();
        let record = &self.documents[0];
        tracing::debug!("Added document {} ({})", record.id, record.path);
        Ok(record)
    }

    /// Remove the first record with `id`. Unknown ids are not an error.
    pub fn remove(&mut self, id: &str) -> Result<Option<DocumentRecord>> {
        let Some(index) = self.documents.iter().position(|d| d.id == id) else {
            tracing::debug!("Remove of unknown document {} ignored", id);
            return Ok(None);
        };

        let removed = self.documents.remove(index);
        if let Err(e) = self.persist() {
            self.documents.insert(index, removed);
            return Err(e);
        }

        self.bump();
        tracing::debug!("Removed document {} ({})", removed.id, removed.path);
        Ok(Some(removed))
    }

    /// Drop every record. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let previous = std::mem::take(&mut self.documents);
        if let Err(e) = self.persist() {
            self.documents = previous;
            return Err(e);
        }

        self.bump();
        tracing::info!("Cleared {} documents", previous.len());
        Ok(previous.len())
    }

    pub fn query(&self, query: &Query) -> Vec<&DocumentRecord> {
        query.run(&self.documents)
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.documents)
    }

    /// Distinct type tokens present, sorted. Feeds the type filter options.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.documents.iter().map(|d| d.doc_type.clone()).collect();
        types.sort();
        types.dedup();
        types
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) -> Result<()> {
        save_documents(&self.store, &self.documents).map_err(|e| {
            tracing::error!("Failed to persist documents: {}", e);
            e
        })
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::Category;
    use crate::engine::SortKey;
    use crate::storage::{DOCUMENTS_BACKUP_KEY, DOCUMENTS_KEY};

    fn descriptor(path: &str, size: u64) -> FileDescriptor {
        let name = path.rsplit('/').next().unwrap().to_string();
        FileDescriptor { path: path.to_string(), name, size, extension: String::new() }
    }

    fn empty_registry() -> Registry {
        Registry::load(KvStore::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_add_classifies_and_inserts_at_head() {
        let mut registry = empty_registry();
        registry.add("Older", &descriptor("/x/older.txt", 1)).unwrap();

        let record = registry.add("Report", &descriptor("/x/report.PDF", 1234)).unwrap().clone();
        assert_eq!(record.extension, "pdf");
        assert_eq!(record.category, Category::Documents);
        assert_eq!(record.doc_type, "pdf");
        assert_eq!(record.file_name, "report.PDF");
        assert_eq!(record.size, 1234);
        assert_eq!(registry.documents()[0].id, record.id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_add_prefers_reported_extension() {
        let mut registry = empty_registry();
        let mut file = descriptor("/x/clip", 9);
        file.extension = "MKV".to_string();
        let record = registry.add("Clip", &file).unwrap();
        assert_eq!(record.extension, "mkv");
        assert_eq!(record.category, Category::Videos);
        assert_eq!(record.doc_type, "video");
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut registry = empty_registry();
        let err = registry.add("   ", &descriptor("/x/a.txt", 1)).unwrap_err();
        assert!(err.is_validation());

        let err = registry.add("Title", &descriptor("", 1)).unwrap_err();
        assert!(err.is_validation());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut registry = empty_registry();
        for i in 0..50 {
            registry.add("Doc", &descriptor(&format!("/x/{}.txt", i), i)).unwrap();
        }
        let mut ids: Vec<&str> = registry.documents().iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_remove_and_remove_unknown() {
        let mut registry = empty_registry();
        let id = registry.add("A", &descriptor("/x/a.txt", 1)).unwrap().id.clone();
        registry.add("B", &descriptor("/x/b.txt", 2)).unwrap();

        assert!(registry.remove("does-not-exist").unwrap().is_none());
        assert_eq!(registry.len(), 2);

        let removed = registry.remove(&id).unwrap().unwrap();
        assert_eq!(removed.title, "A");
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn test_clear_and_totals() {
        let mut registry = empty_registry();
        registry.add("A", &descriptor("/x/a.txt", 10)).unwrap();
        registry.add("B", &descriptor("/x/b.png", 32)).unwrap();

        let totals = registry.totals();
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total_size, 42);
        assert_eq!(registry.types(), vec!["image".to_string(), "txt".to_string()]);

        assert_eq!(registry.clear().unwrap(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.totals().total_size, 0);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("documents.db");

        let kept_id = {
            let mut registry = Registry::load(KvStore::open(&db_path).unwrap()).unwrap();
            let gone = registry.add("Gone", &descriptor("/x/gone.txt", 1)).unwrap().id.clone();
            let kept = registry.add("Kept", &descriptor("/x/kept.md", 2)).unwrap().id.clone();
            registry.remove(&gone).unwrap();
            kept
        };

        let registry = Registry::load(KvStore::open(&db_path).unwrap()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.documents()[0].id, kept_id);
        assert_eq!(registry.documents()[0].category, Category::Documents);
    }

    #[test]
    fn test_load_backfills_and_writes_back() {
        let store = KvStore::open_in_memory().unwrap();
        store.put(DOCUMENTS_KEY, r#"[{"id": 17.5, "title": "Slides", "fileName": "deck.pptx",
            "path": "/w/deck.pptx", "addedDate": "2024-02-02T08:00:00.000Z", "size": 99}]"#).unwrap();

        let registry = Registry::load(store).unwrap();
        let record = &registry.documents()[0];
        assert_eq!(record.category, Category::Documents);
        assert_eq!(record.doc_type, "pptx");
        assert_eq!(record.extension, "pptx");

        let stored = registry.store.get(DOCUMENTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(value[0]["category"], "documents");
        assert_eq!(value[0]["type"], "pptx");
        assert_eq!(value[0]["extension"], "pptx");
    }

    #[test]
    fn test_unreadable_entry_does_not_cost_the_others() {
        let store = KvStore::open_in_memory().unwrap();
        store.put(DOCUMENTS_KEY, r#"[
            {"id": "good", "title": "Keep me", "fileName": "keep.txt", "path": "/k/keep.txt",
             "addedDate": "2024-03-01T10:00:00Z", "size": 3, "extension": "txt", "type": "txt", "category": "documents"},
            {"id": "bad", "title": "Broken", "path": "/k/broken.txt", "size": 5.5}
        ]"#).unwrap();

        let mut registry = Registry::load(store).unwrap();
        assert_eq!(registry.len(), 1);
        registry.add("New", &descriptor("/k/new.md", 1)).unwrap();

        let stored = registry.store.get(DOCUMENTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["title"], "New");
        assert_eq!(value[1]["title"], "Keep me");

        let backup = registry.store.get(DOCUMENTS_BACKUP_KEY).unwrap().unwrap();
        assert!(backup.contains("Broken"));
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("documents.db");

        let mut registry = Registry::load(KvStore::open(&db_path).unwrap()).unwrap();
        let id = registry.add("Only", &descriptor("/x/only.txt", 7)).unwrap().id.clone();
        let before = registry.documents().to_vec();
        let mut rx = registry.subscribe();
        rx.borrow_and_update();

        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute_batch("DROP TABLE kv_store")
            .unwrap();

        assert!(registry.add("Second", &descriptor("/x/second.txt", 1)).is_err());
        assert_eq!(registry.documents(), &before[..]);

        assert!(registry.remove(&id).is_err());
        assert_eq!(registry.documents(), &before[..]);
        assert!(registry.get(&id).is_some());

        assert!(registry.clear().is_err());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.documents(), &before[..]);

        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_revision_bumps_on_mutation_only() {
        let mut registry = empty_registry();
        let mut rx = registry.subscribe();
        assert!(!rx.has_changed().unwrap());

        registry.remove("nothing").unwrap();
        assert!(!rx.has_changed().unwrap());

        registry.add("A", &descriptor("/x/a.txt", 1)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn test_query_through_registry() {
        let mut registry = empty_registry();
        registry.add("banana", &descriptor("/x/banana.txt", 10)).unwrap();
        registry.add("Apple", &descriptor("/x/apple.txt", 500)).unwrap();
        registry.add("cherry", &descriptor("/x/cherry.txt", 200)).unwrap();

        let q = Query { sort: SortKey::parse("title-asc"), ..Query::default() };
        let titles: Vec<&str> = registry.query(&q).iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }
}
