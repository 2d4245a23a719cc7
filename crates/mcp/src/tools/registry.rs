// Declarative registry of the tools advertised to clients

use crate::protocol::ToolSchema;

/// Ordered, name-keyed collection of tool descriptors.
///
/// Built once at startup and shared read-only afterwards. `tools/list`
/// reports descriptors in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSchema>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any earlier descriptor with the same name
    pub fn register(&mut self, schema: ToolSchema) {
        match self.tools.iter_mut().find(|t| t.name == schema.name) {
            Some(existing) => *existing = schema,
            None => self.tools.push(schema),
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// List all tool schemas
    pub fn list_schemas(&self) -> &[ToolSchema] {
        &self.tools
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}
