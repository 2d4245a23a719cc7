// Routing of tool invocations to the note store

use crate::protocol::CallToolResult;
use crate::tools::{ToolCall, ToolRegistry};
use chrono::SecondsFormat;
use mdnotes_core::storage::NoteStore;
use mdnotes_core::{NoteError, NoteListing, NoteLookup};
use serde_json::Value;
use std::sync::Arc;

/// Text shown when there is nothing to list
pub const NO_NOTES_MESSAGE: &str = "No notes found.";

/// Why a tool invocation could not be carried out
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error(transparent)]
    Storage(#[from] NoteError),
}

/// Successful tool output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Routes validated tool calls to their handlers
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    store: Arc<dyn NoteStore>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, store: Arc<dyn NoteStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke `name` and render the outcome as a single text content item.
    ///
    /// Failures become error text rather than protocol errors.
    pub async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        match self.dispatch(name, arguments).await {
            Ok(output) => CallToolResult::text(output.text),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                CallToolResult::error(e.to_string())
            }
        }
    }

    /// Look `name` up in the registry, validate its arguments and run its handler
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<ToolOutput, DispatchError> {
        if !self.registry.contains(name) {
            return Err(DispatchError::UnknownTool(name.to_string()));
        }

        let call = ToolCall::parse(name, arguments)?;
        tracing::info!("Tool call: {}", call.tool_name());

        match call {
            ToolCall::SaveNote(args) => self.save_note(&args.title, &args.content).await,
            ToolCall::ListNotes(_) => self.list_notes().await,
            ToolCall::ReadNote(args) => self.read_note(&args.title).await,
        }
    }

    async fn save_note(&self, title: &str, content: &str) -> Result<ToolOutput, DispatchError> {
        let saved = self.store.save(title, content).await?;
        Ok(ToolOutput::text(format!("Note saved: {}", saved.filename)))
    }

    async fn list_notes(&self) -> Result<ToolOutput, DispatchError> {
        let listing = self.store.list().await?;
        Ok(ToolOutput::text(format_listing(&listing)))
    }

    async fn read_note(&self, title: &str) -> Result<ToolOutput, DispatchError> {
        Ok(match self.store.read(title).await? {
            NoteLookup::Found { content, .. } => ToolOutput::text(content),
            NoteLookup::NotFound { filename } => {
                ToolOutput::text(format!("Note not found: {}", filename))
            }
        })
    }
}

fn format_listing(listing: &NoteListing) -> String {
    if listing.is_empty() {
        return NO_NOTES_MESSAGE.to_string();
    }

    let notes = listing.notes();
    let mut text = format!("Found {} note(s):\n", notes.len());
    for note in notes {
        text.push_str(&format!(
            "\n- {} ({}, modified {})",
            note.title,
            note.filename,
            note.modified.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    text
}
