// Core types and storage for mdnotes

pub mod config;
pub mod error;
pub mod slug;
pub mod storage;
pub mod types;

pub use config::NotesConfig;
pub use error::{NoteError, NoteResult};
pub use slug::{slugify, title_from_slug};
pub use types::*;
