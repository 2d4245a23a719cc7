pub mod notes;
mod registry;

pub use notes::{
    note_tool_registry, ListNotesArgs, ReadNoteArgs, SaveNoteArgs, ToolCall, LIST_NOTES, READ_NOTE,
    SAVE_NOTE,
};
pub use registry::{json_schema_object, json_schema_string, ToolRegistry};
