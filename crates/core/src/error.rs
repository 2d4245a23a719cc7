// Error types for note storage

use std::path::PathBuf;

/// Result type for note storage operations.
pub type NoteResult<T> = Result<T, NoteError>;

/// Errors that can occur while saving, listing or reading notes.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// The title normalizes to an empty slug and cannot name a file.
    #[error("Title {title:?} does not contain any characters usable in a filename")]
    EmptySlug { title: String },

    /// The underlying filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NoteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
