// FILE: src/engine/query.rs
//! Filter → sort pipeline behind the inventory and search listings.
//!
//! Order of stages is fixed: category, type, search term, then a stable sort.
//! Nothing here mutates the records.

use std::cmp::Ordering;
use std::fmt;
use crate::core::classify::Category;
use crate::storage::DocumentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Size,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `(field, direction)`, written as `"date-desc"`, `"title-asc"`, ...
///
/// An unrecognised field parses to `field: None`, which sorts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field: Some(field), direction }
    }

    pub fn parse(s: &str) -> Self {
        let (field, direction) = s.split_once('-').unwrap_or((s, ""));
        let field = match field {
            "date" => Some(SortField::Date),
            "size" => Some(SortField::Size),
            "title" => Some(SortField::Title),
            _ => None,
        };
        let direction = if direction == "asc" { SortDirection::Asc } else { SortDirection::Desc };
        Self { field, direction }
    }

    fn compare(&self, a: &DocumentRecord, b: &DocumentRecord) -> Ordering {
        let ordering = match self.field {
            Some(SortField::Date) => a.added_date.cmp(&b.added_date),
            Some(SortField::Size) => a.size.cmp(&b.size),
            Some(SortField::Title) => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            None => Ordering::Equal,
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::new(SortField::Date, SortDirection::Desc)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            Some(SortField::Date) => "date",
            Some(SortField::Size) => "size",
            Some(SortField::Title) => "title",
            None => "none",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}-{}", field, direction)
    }
}

/// Full query. `None` filters mean "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub category: Option<Category>,
    pub doc_type: Option<String>,
    pub search: String,
    pub sort: SortKey,
}

impl Query {
    pub fn run<'a>(&self, records: &'a [DocumentRecord]) -> Vec<&'a DocumentRecord> {
        query(records, self.category, self.doc_type.as_deref(), &self.search, self.sort)
    }
}

/// Run the pipeline over `records` (registry order, newest first).
pub fn query<'a>(
    records: &'a [DocumentRecord],
    category: Option<Category>,
    doc_type: Option<&str>,
    search: &str,
    sort: SortKey,
) -> Vec<&'a DocumentRecord> {
    let needle = search.to_lowercase();

    let mut matched: Vec<&DocumentRecord> = records
        .iter()
        .filter(|doc| category.map_or(true, |c| doc.category == c))
        .filter(|doc| doc_type.map_or(true, |t| doc.doc_type == t))
        .filter(|doc| {
            needle.is_empty()
                || doc.title.to_lowercase().contains(&needle)
                || doc.file_name.to_lowercase().contains(&needle)
        })
        .collect();

    // sort_by is stable: ties keep registry order.
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}

/// Parse a category selector where `"all"` means no filter.
pub fn parse_category_filter(s: &str) -> Result<Option<Category>, String> {
    if s == "all" {
        Ok(None)
    } else {
        s.parse::<Category>().map(Some)
    }
}

/// Parse a type selector where `"all"` means no filter.
pub fn parse_type_filter(s: &str) -> Option<String> {
    if s == "all" { None } else { Some(s.to_string()) }
}
