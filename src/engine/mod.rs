// FILE: src/engine/mod.rs
pub mod query;

pub use query::{query, Query, SortDirection, SortField, SortKey};

use crate::storage::DocumentRecord;

/// Summary line of the inventory view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub count: usize,
    pub total_size: u64,
}

impl Totals {
    pub fn of(records: &[DocumentRecord]) -> Self {
        Self {
            count: records.len(),
            total_size: records.iter().map(|d| d.size).sum(),
        }
    }
}

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size: base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = format!("{:.2}", bytes as f64 / scale as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", value, SIZE_UNITS[unit])
}
