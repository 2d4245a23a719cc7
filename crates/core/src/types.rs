use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extension shared by every note file.
pub const NOTE_EXTENSION: &str = "md";

/// Canonical, filesystem-safe identifier derived from a note title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteSlug(pub String);

impl NoteSlug {
    /// Filename of the note this slug names (e.g. `project-ideas.md`)
    pub fn filename(&self) -> String {
        format!("{}.{}", self.0, NOTE_EXTENSION)
    }
}

impl std::fmt::Display for NoteSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A note that was written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNote {
    pub slug: NoteSlug,
    pub filename: String,
    pub path: PathBuf,
}

/// One entry of a note listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    /// Display title recovered from the filename
    pub title: String,
    pub filename: String,
    /// Last-modified time as reported by the filesystem
    pub modified: DateTime<Utc>,
}

/// Result of enumerating the notes directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteListing {
    /// The notes directory has not been created yet
    MissingDirectory,
    /// Notes in directory enumeration order (possibly empty)
    Notes(Vec<NoteSummary>),
}

impl NoteListing {
    /// True when there is nothing to show, whether or not the directory exists
    pub fn is_empty(&self) -> bool {
        match self {
            Self::MissingDirectory => true,
            Self::Notes(notes) => notes.is_empty(),
        }
    }

    pub fn notes(&self) -> &[NoteSummary] {
        match self {
            Self::MissingDirectory => &[],
            Self::Notes(notes) => notes,
        }
    }
}

/// Result of looking a note up by title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteLookup {
    Found { filename: String, content: String },
    NotFound { filename: String },
}
