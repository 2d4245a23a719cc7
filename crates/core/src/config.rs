use anyhow::{Context, Result};
use std::path::PathBuf;

/// Directory name used under the user's home directory
pub const DEFAULT_NOTES_DIR_NAME: &str = ".mdnotes";

/// Location of the notes directory, handed to the store at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    pub notes_dir: PathBuf,
}

impl NotesConfig {
    pub fn new(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
        }
    }

    /// `~/.mdnotes` for the invoking user
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(Self::new(home.join(DEFAULT_NOTES_DIR_NAME)))
    }
}
