// Standalone MCP server binary

use anyhow::{Context, Result};
use mdnotes_core::storage::{FilesystemNoteStore, NoteStore};
use mdnotes_core::NotesConfig;
use mdnotes_mcp::tools::note_tool_registry;
use mdnotes_mcp::{Dispatcher, McpServer, ServerIdentity};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        tracing::error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing::info!("mdnotes MCP server starting...");

    let config = NotesConfig::default_location()?;
    let store = FilesystemNoteStore::new(&config);
    store
        .ensure_directory()
        .await
        .context("Failed to create notes directory")?;
    tracing::info!("Notes directory: {}", config.notes_dir.display());

    let registry = note_tool_registry();
    tracing::info!("Registered {} tools", registry.len());

    let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(store));
    let mut server = McpServer::new(ServerIdentity::default(), dispatcher);
    server.connect();
    server.run_stdio().await
}
