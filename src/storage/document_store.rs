//! Document blob codec
//!
//! Handles the "documents" slot of the key-value store:
//! - Decoding the stored JSON array, tolerating legacy record shapes
//! - Dropping single unreadable entries without losing the rest
//! - Reconciling records that predate the category/type/extension fields
//! - Encoding the registry back into the slot

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use crate::core::classify::{classify, extension_of, Category};
use crate::error::{DocError, Result};
use crate::storage::{DocumentRecord, KvStore, DOCUMENTS_BACKUP_KEY, DOCUMENTS_KEY};

/// What came out of the store at startup.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<DocumentRecord>,
    /// Number of records whose classification fields were recomputed.
    pub backfilled: usize,
    /// Number of stored entries that could not be read and were dropped.
    pub skipped: usize,
}

impl LoadOutcome {
    /// Whether the stored blob differs from what a save would write now.
    pub fn needs_write_back(&self) -> bool {
        self.backfilled > 0 || self.skipped > 0
    }
}

/// Lenient on-disk shape. Every field may be missing or null.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    added_date: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    extension: Option<String>,
    #[serde(default, rename = "type")]
    doc_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Read the registry blob. Absent or malformed data yields an empty list.
///
/// Whenever the blob cannot be kept as-is (malformed, or entries dropped) the
/// raw text is copied under the backup key before anything overwrites it.
pub fn load_documents(store: &KvStore) -> Result<LoadOutcome> {
    let Some(raw) = store.get(DOCUMENTS_KEY)? else {
        tracing::info!("No stored documents, starting empty");
        return Ok(LoadOutcome::default());
    };

    match decode_documents(&raw) {
        Ok(outcome) => {
            tracing::info!(
                "Loaded {} documents ({} needing backfill, {} unreadable)",
                outcome.records.len(),
                outcome.backfilled,
                outcome.skipped
            );
            if outcome.skipped > 0 {
                store.put(DOCUMENTS_BACKUP_KEY, &raw)?;
            }
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!("Stored documents are malformed, starting empty: {}", e);
            store.put(DOCUMENTS_BACKUP_KEY, &raw)?;
            Ok(LoadOutcome::default())
        }
    }
}

/// Write the full registry into the slot.
pub fn save_documents(store: &KvStore, records: &[DocumentRecord]) -> Result<()> {
    let blob = serde_json::to_string(records)?;
    store.put(DOCUMENTS_KEY, &blob)
}

/// Decode a stored blob and reconcile every record in it.
///
/// Only a blob that is not a JSON array is an error. Entries that fail to
/// decode on their own are logged and counted in `skipped`.
pub fn decode_documents(raw: &str) -> Result<LoadOutcome> {
    let items = match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items,
        other => {
            return Err(DocError::Persistence(format!(
                "expected a list of documents, found {}",
                kind_of(&other)
            )))
        }
    };

    let mut outcome = LoadOutcome { records: Vec::with_capacity(items.len()), ..LoadOutcome::default() };
    for (index, item) in items.into_iter().enumerate() {
        let stored: StoredRecord = match serde_json::from_value(item) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Dropping unreadable document entry #{}: {}", index, e);
                outcome.skipped += 1;
                continue;
            }
        };
        let (record, changed) = reconcile(stored);
        if changed {
            outcome.backfilled += 1;
        }
        outcome.records.push(record);
    }
    Ok(outcome)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn a stored record into a full one. Returns `true` when the record had to
/// be corrected and therefore needs to be written back.
///
/// Classification is recomputed from the path, as a unit, whenever any of
/// category, type or extension is missing. Running this on its own output
/// changes nothing.
fn reconcile(stored: StoredRecord) -> (DocumentRecord, bool) {
    let mut changed = false;

    let id = match stored.id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            changed = true;
            uuid::Uuid::new_v4().to_string()
        }
    };

    let path = stored.path.unwrap_or_default();

    let added_date = match stored.added_date.as_deref().map(DateTime::parse_from_rfc3339) {
        Some(Ok(date)) => date.with_timezone(&Utc),
        _ => {
            changed = true;
            DateTime::<Utc>::from(std::time::UNIX_EPOCH)
        }
    };

    let category = stored.category.as_deref().and_then(|c| c.parse::<Category>().ok());
    let classified = match (stored.extension, stored.doc_type, category) {
        (Some(extension), Some(doc_type), Some(category)) if !doc_type.is_empty() => {
            (extension, doc_type, category)
        }
        _ => {
            changed = true;
            let extension = extension_of(&path);
            let c = classify(&extension);
            (extension, c.doc_type, c.category)
        }
    };
    let (extension, doc_type, category) = classified;

    let file_name = match stored.file_name {
        Some(name) => name,
        None => path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().to_string(),
    };

    let record = DocumentRecord {
        id,
        title: stored.title.unwrap_or_default(),
        file_name,
        path,
        added_date,
        size: stored.size.unwrap_or(0),
        extension,
        doc_type,
        category,
    };
    (record, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_current_shape_needs_no_backfill() {
        let raw = r#"[{
            "id": "a1", "title": "Report", "fileName": "report.pdf",
            "path": "/x/report.pdf", "addedDate": "2024-03-01T10:00:00.000Z",
            "size": 1234, "extension": "pdf", "type": "pdf", "category": "documents"
        }]"#;
        let outcome = decode_documents(raw).unwrap();
        assert_eq!(outcome.backfilled, 0);
        assert_eq!(outcome.records.len(), 1);
        let r = &outcome.records[0];
        assert_eq!(r.id, "a1");
        assert_eq!(r.file_name, "report.pdf");
        assert_eq!(r.category, Category::Documents);
        assert_eq!(r.added_date.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_legacy_record_is_backfilled_from_path() {
        let raw = r#"[{
            "id": 1709287200000.123, "title": "Holiday", "fileName": "beach.JPG",
            "path": "/photos/beach.JPG", "addedDate": "2024-03-01T10:00:00.000Z",
            "size": 2048
        }]"#;
        let outcome = decode_documents(raw).unwrap();
        assert_eq!(outcome.backfilled, 1);
        let r = &outcome.records[0];
        assert_eq!(r.id, "1709287200000.123");
        assert_eq!(r.extension, "jpg");
        assert_eq!(r.doc_type, "image");
        assert_eq!(r.category, Category::Images);
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let raw = r#"[{"id": "b", "title": "Notes", "path": "/n/notes", "addedDate": "2024-03-01T10:00:00Z"}]"#;
        let first = decode_documents(raw).unwrap();
        assert_eq!(first.backfilled, 1);
        assert_eq!(first.records[0].extension, "");
        assert_eq!(first.records[0].category, Category::Others);

        let reencoded = serde_json::to_string(&first.records).unwrap();
        let second = decode_documents(&reencoded).unwrap();
        assert_eq!(second.backfilled, 0);
        assert_eq!(second.records, first.records);
    }

    #[test]
    fn test_unknown_category_counts_as_missing() {
        let raw = r#"[{"id": "c", "title": "Clip", "path": "/v/clip.mkv",
            "addedDate": "2024-03-01T10:00:00Z", "extension": "mkv", "type": "video", "category": "movies"}]"#;
        let outcome = decode_documents(raw).unwrap();
        assert_eq!(outcome.backfilled, 1);
        assert_eq!(outcome.records[0].category, Category::Videos);
    }

    #[test]
    fn test_malformed_blob_loads_empty_and_is_backed_up() {
        let store = KvStore::open_in_memory().unwrap();
        store.put(DOCUMENTS_KEY, "{not json").unwrap();
        let outcome = load_documents(&store).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(store.get(DOCUMENTS_BACKUP_KEY).unwrap().as_deref(), Some("{not json"));

        store.put(DOCUMENTS_KEY, r#"{"documents": []}"#).unwrap();
        assert!(load_documents(&store).unwrap().records.is_empty());
        assert!(matches!(decode_documents(r#"{"documents": []}"#), Err(DocError::Persistence(_))));
    }

    #[test]
    fn test_bad_entry_is_dropped_and_the_rest_kept() {
        let raw = r#"[
            {"id": "good", "title": "Keep me", "fileName": "keep.txt", "path": "/k/keep.txt",
             "addedDate": "2024-03-01T10:00:00Z", "size": 3, "extension": "txt", "type": "txt", "category": "documents"},
            {"id": "bad", "title": "Broken", "path": "/k/broken.txt", "size": 5.5},
            {"id": "worse", "title": 123, "path": "/k/worse.txt"},
            "not a record"
        ]"#;
        let store = KvStore::open_in_memory().unwrap();
        store.put(DOCUMENTS_KEY, raw).unwrap();

        let outcome = load_documents(&store).unwrap();
        assert_eq!(outcome.skipped, 3);
        assert_eq!(outcome.backfilled, 0);
        assert!(outcome.needs_write_back());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].title, "Keep me");
        assert_eq!(store.get(DOCUMENTS_BACKUP_KEY).unwrap().as_deref(), Some(raw));
    }

    #[test]
    fn test_save_then_load() {
        let store = KvStore::open_in_memory().unwrap();
        let raw = r#"[{"id": "d", "title": "Song", "fileName": "song.mp3", "path": "/m/song.mp3",
            "addedDate": "2024-03-01T10:00:00Z", "size": 5, "extension": "mp3", "type": "audio", "category": "audio"}]"#;
        let records = decode_documents(raw).unwrap().records;

        save_documents(&store, &records).unwrap();
        let loaded = load_documents(&store).unwrap();
        assert_eq!(loaded.records, records);
        assert_eq!(loaded.backfilled, 0);
    }
}
