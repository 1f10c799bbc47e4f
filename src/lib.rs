//! doctrack: Personal Document Tracker
//!
//! Keeps a registry of file references (path, title, derived classification)
//! without ever touching file contents. Pieces:
//! - Registry (in-memory records, persisted to a key-value slot after each change)
//! - Engine (filter → sort pipeline for the inventory and search views)
//! - Gateway (pickers, stat, folder expansion, open/reveal via the OS shell)
//! - Session + Shell (the interactive surface)

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod session;
pub mod shell;
pub mod state;
pub mod storage;

pub use config::Config;
pub use crate::core::{classify, Category, Registry};
pub use engine::{format_file_size, query, Query, SortKey, Totals};
pub use error::{DocError, Result};
pub use gateway::{FileDescriptor, FileGateway, FileInfo, FsGateway};
pub use session::{Confirmation, Notice, OpenOutcome, Session};
pub use storage::{DocumentRecord, KvStore};
