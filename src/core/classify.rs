// FILE: src/core/classify.rs
//! The Classifier: maps a file extension onto a (category, type) pair.
//!
//! The mapping is total. Every extension, including the empty one, lands in
//! exactly one category. Documents keep their extension as the type token,
//! every other category uses a fixed label.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "csv", "txt", "rtf", "md",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "ico", "tiff", "tif",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "wmv", "flv", "mkv", "webm", "m4v", "3gp",
];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a"];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2"];

const CODE_EXTENSIONS: &[&str] = &[
    "js", "ts", "html", "css", "py", "java", "cpp", "c", "php", "json", "xml",
];

/// Coarse classification bucket of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Documents,
    Images,
    Videos,
    Audio,
    Archives,
    Code,
    Others,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Documents,
        Category::Images,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Code,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Images => "images",
            Category::Videos => "videos",
            Category::Audio => "audio",
            Category::Archives => "archives",
            Category::Code => "code",
            Category::Others => "others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Result of classifying one extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub doc_type: String,
}

/// Classify a lowercase extension (no leading dot).
pub fn classify(ext: &str) -> Classification {
    let (category, doc_type) = if DOCUMENT_EXTENSIONS.contains(&ext) {
        (Category::Documents, ext)
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        (Category::Images, "image")
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        (Category::Videos, "video")
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        (Category::Audio, "audio")
    } else if ARCHIVE_EXTENSIONS.contains(&ext) {
        (Category::Archives, "archive")
    } else if CODE_EXTENSIONS.contains(&ext) {
        (Category::Code, "code")
    } else {
        (Category::Others, "other")
    };

    Classification { category, doc_type: doc_type.to_string() }
}

/// Lowercase extension of the last path segment, without the dot.
///
/// Both `/` and `\` count as separators so Windows paths stored on another
/// platform still classify correctly. A name with no dot yields `""`.
pub fn extension_of(path: &str) -> String {
    let file_name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    match file_name.rfind('.') {
        Some(idx) => file_name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Normalise an extension reported by a gateway (`".PDF"` -> `"pdf"`).
pub fn normalize_extension(reported: &str) -> String {
    reported.trim().trim_start_matches('.').to_lowercase()
}
