// MCP (Model Context Protocol) server exposing markdown notes as tools
// to agent clients over stdio

pub mod codec;
pub mod dispatch;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatch::{DispatchError, Dispatcher, ToolOutput};
pub use server::{McpServer, ServerIdentity, ServerState};
