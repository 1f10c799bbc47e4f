// FILE: src/state.rs

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use crate::core::classify::Category;
use crate::engine::{Query, SortKey};

/// The three screens of the interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Add,
    Inventory,
    Search,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Add => "Add New Document",
            View::Search => "Search Documents",
            View::Inventory => "Document Inventory",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            View::Add => "Drag & drop files/folders, or add a single file with a custom title.",
            View::Search => "Find documents quickly by title or filename.",
            View::Inventory => "Browse, filter, and manage all your saved documents.",
        }
    }

    /// Whether this view shows the document listing.
    pub fn lists_documents(&self) -> bool {
        matches!(self, View::Inventory | View::Search)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Add => "add",
            View::Inventory => "inventory",
            View::Search => "search",
        })
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(View::Add),
            "inventory" => Ok(View::Inventory),
            "search" => Ok(View::Search),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

/// Search input with a trailing-edge debounce.
///
/// Every keystroke replaces the term and restarts the quiet period; the
/// listing is refreshed once the quiet period has fully elapsed.
#[derive(Debug, Clone)]
pub struct SearchBox {
    term: String,
    last_activity: Option<Instant>,
    debounce: Duration,
}

impl SearchBox {
    pub fn new(debounce: Duration) -> Self {
        Self { term: String::new(), last_activity: None, debounce }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn input(&mut self, term: &str, now: Instant) {
        self.term = term.to_string();
        self.last_activity = Some(now);
    }

    /// Take a finished term at once, skipping the quiet period.
    pub fn submit(&mut self, term: &str) {
        self.term = term.to_string();
        self.last_activity = None;
    }

    /// True exactly once per burst of input, after the quiet period.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_activity {
            Some(at) if now.saturating_duration_since(at) >= self.debounce => {
                self.last_activity = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.last_activity.is_some()
    }
}

/// Filter/sort selections shared by the inventory and search listings.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view: View,
    pub category: Option<Category>,
    pub doc_type: Option<String>,
    pub sort: SortKey,
    pub search: SearchBox,
}

impl ViewState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            view: View::Add,
            category: None,
            doc_type: None,
            sort: SortKey::default(),
            search: SearchBox::new(debounce),
        }
    }

    pub fn query(&self) -> Query {
        Query {
            category: self.category,
            doc_type: self.doc_type.clone(),
            search: self.search.term().to_string(),
            sort: self.sort,
        }
    }
}
