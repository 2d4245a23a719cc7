use crate::config::NotesConfig;
use crate::error::{NoteError, NoteResult};
use crate::slug::{slugify, title_from_slug};
use crate::types::{NoteListing, NoteLookup, NoteSlug, NoteSummary, SavedNote, NOTE_EXTENSION};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Flat-file note storage abstraction
#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    /// Create the notes directory if it does not exist yet
    async fn ensure_directory(&self) -> NoteResult<()>;

    /// Write a note, replacing any existing note with the same slug
    async fn save(&self, title: &str, content: &str) -> NoteResult<SavedNote>;

    /// Enumerate every note in the directory
    async fn list(&self) -> NoteResult<NoteListing>;

    /// Look a note up by title
    async fn read(&self, title: &str) -> NoteResult<NoteLookup>;
}

/// Notes stored as `<slug>.md` files in a single directory
#[derive(Debug, Clone)]
pub struct FilesystemNoteStore {
    notes_dir: PathBuf,
}

impl FilesystemNoteStore {
    pub fn new(config: &NotesConfig) -> Self {
        Self {
            notes_dir: config.notes_dir.clone(),
        }
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    fn slug_for(title: &str) -> NoteResult<NoteSlug> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(NoteError::EmptySlug {
                title: title.to_string(),
            });
        }
        Ok(NoteSlug(slug))
    }

    fn note_path(&self, slug: &NoteSlug) -> PathBuf {
        self.notes_dir.join(slug.filename())
    }

    async fn summarize(path: &Path) -> NoteResult<Option<NoteSummary>> {
        if path.extension().map(|ext| ext != NOTE_EXTENSION).unwrap_or(true) {
            return Ok(None);
        }

        let (Some(stem), Some(filename)) = (path.file_stem(), path.file_name()) else {
            return Ok(None);
        };
        // Slugs never start with a dot; these are editor locks and backups
        if filename.to_string_lossy().starts_with('.') {
            return Ok(None);
        }

        // Dangling symlinks and files removed since read_dir are not notes
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Skipping vanished entry {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(NoteError::io(path, e)),
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        let modified = metadata.modified().map_err(|e| NoteError::io(path, e))?;

        Ok(Some(NoteSummary {
            title: title_from_slug(&stem.to_string_lossy()),
            filename: filename.to_string_lossy().into_owned(),
            modified: DateTime::<Utc>::from(modified),
        }))
    }
}

#[async_trait::async_trait]
impl NoteStore for FilesystemNoteStore {
    async fn ensure_directory(&self) -> NoteResult<()> {
        tokio::fs::create_dir_all(&self.notes_dir)
            .await
            .map_err(|e| NoteError::io(&self.notes_dir, e))
    }

    async fn save(&self, title: &str, content: &str) -> NoteResult<SavedNote> {
        let slug = Self::slug_for(title)?;
        self.ensure_directory().await?;

        let path = self.note_path(&slug);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| NoteError::io(&path, e))?;

        tracing::debug!("Saved note {} ({} bytes)", path.display(), content.len());

        Ok(SavedNote {
            filename: slug.filename(),
            slug,
            path,
        })
    }

    async fn list(&self) -> NoteResult<NoteListing> {
        let mut entries = match tokio::fs::read_dir(&self.notes_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(NoteListing::MissingDirectory),
            Err(e) => return Err(NoteError::io(&self.notes_dir, e)),
        };

        let mut notes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| NoteError::io(&self.notes_dir, e))?
        {
            if let Some(summary) = Self::summarize(&entry.path()).await? {
                notes.push(summary);
            }
        }

        Ok(NoteListing::Notes(notes))
    }

    async fn read(&self, title: &str) -> NoteResult<NoteLookup> {
        let slug = Self::slug_for(title)?;
        let filename = slug.filename();
        let path = self.note_path(&slug);

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| NoteError::io(&path, e))?;
        if !exists {
            return Ok(NoteLookup::NotFound { filename });
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| NoteError::io(&path, e))?;

        Ok(NoteLookup::Found { filename, content })
    }
}
