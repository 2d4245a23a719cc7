// Note tools: descriptors and typed arguments

use crate::dispatch::DispatchError;
use crate::protocol::ToolSchema;
use crate::tools::{json_schema_object, json_schema_string, ToolRegistry};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub const SAVE_NOTE: &str = "save_note";
pub const LIST_NOTES: &str = "list_notes";
pub const READ_NOTE: &str = "read_note";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveNoteArgs {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNotesArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadNoteArgs {
    pub title: String,
}

/// A validated invocation of one of the note tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    SaveNote(SaveNoteArgs),
    ListNotes(ListNotesArgs),
    ReadNote(ReadNoteArgs),
}

impl ToolCall {
    /// Parse a tool name and its raw arguments.
    ///
    /// Absent (`null`) arguments are read as an empty object, so `list_notes`
    /// may be called without any.
    pub fn parse(name: &str, arguments: Value) -> Result<Self, DispatchError> {
        let arguments = if arguments.is_null() {
            Value::Object(Default::default())
        } else {
            arguments
        };

        match name {
            SAVE_NOTE => parse_args(name, arguments).map(Self::SaveNote),
            LIST_NOTES => parse_args(name, arguments).map(Self::ListNotes),
            READ_NOTE => parse_args(name, arguments).map(Self::ReadNote),
            other => Err(DispatchError::UnknownTool(other.to_string())),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::SaveNote(_) => SAVE_NOTE,
            Self::ListNotes(_) => LIST_NOTES,
            Self::ReadNote(_) => READ_NOTE,
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, DispatchError> {
    serde_json::from_value(arguments).map_err(|e| DispatchError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Registry holding `save_note`, `list_notes` and `read_note`, in that order
pub fn note_tool_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(ToolSchema {
        name: SAVE_NOTE.to_string(),
        description: "Create or update a markdown note. Saving with an existing title replaces that note's content.".to_string(),
        input_schema: json_schema_object(
            serde_json::json!({
                "title": json_schema_string("Title of the note"),
                "content": json_schema_string("Markdown content of the note")
            }),
            vec!["title", "content"],
        ),
    });

    registry.register(ToolSchema {
        name: LIST_NOTES.to_string(),
        description: "List all saved notes with their last-modified dates".to_string(),
        input_schema: json_schema_object(serde_json::json!({}), vec![]),
    });

    registry.register(ToolSchema {
        name: READ_NOTE.to_string(),
        description: "Read the content of a note by its title".to_string(),
        input_schema: json_schema_object(
            serde_json::json!({
                "title": json_schema_string("Title of the note to read")
            }),
            vec!["title"],
        ),
    });

    registry
}
