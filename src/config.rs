// FILE: src/config.rs
//! Startup configuration, from flags or the environment.

use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "doctrack", version, about = "Keep track of documents scattered across your disks")]
pub struct Config {
    /// Database file holding the registry
    #[arg(long, env = "DOCTRACK_DB")]
    pub db: Option<PathBuf>,

    /// Quiet period after the last search keystroke before re-querying
    #[arg(long, env = "DOCTRACK_DEBOUNCE_MS", default_value_t = 300)]
    pub debounce_ms: u64,

    /// Deepest folder level visited when expanding dropped folders
    #[arg(long, env = "DOCTRACK_MAX_DEPTH", default_value_t = 64)]
    pub max_depth: usize,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "DOCTRACK_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Explicit path, else `<local data dir>/doctrack/documents.db`, else a
    /// folder under the temp dir.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.db {
            return path.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| std::env::temp_dir().join(".doctrack"))
            .join("doctrack")
            .join("documents.db")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let config = Config::try_parse_from([
            "doctrack", "--db", "/tmp/x/docs.db", "--debounce-ms", "50", "--max-depth", "3",
        ]).unwrap();
        assert_eq!(config.db_path(), PathBuf::from("/tmp/x/docs.db"));
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.max_depth, 3);
    }

    #[test]
    fn test_default_db_path_ends_in_app_folder() {
        let config = Config { db: None, debounce_ms: 300, max_depth: 64, log_level: "info".into() };
        let path = config.db_path();
        assert!(path.ends_with("doctrack/documents.db"));
    }
}
