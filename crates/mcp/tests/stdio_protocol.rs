// End-to-end exchanges over an in-memory duplex channel

use mdnotes_core::storage::FilesystemNoteStore;
use mdnotes_core::NotesConfig;
use mdnotes_mcp::tools::note_tool_registry;
use mdnotes_mcp::{Dispatcher, McpServer, ServerIdentity, ServerState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn create_server(temp_dir: &TempDir) -> McpServer {
    let store = FilesystemNoteStore::new(&NotesConfig::new(temp_dir.path().join("notes")));
    let dispatcher = Dispatcher::new(Arc::new(note_tool_registry()), Arc::new(store));
    McpServer::new(ServerIdentity::default(), dispatcher)
}

async fn exchange(server: &mut McpServer, input: &str) -> Vec<Value> {
    exchange_bytes(server, input.as_bytes()).await
}

/// Send `input` verbatim, close the client's write side and collect every response line
async fn exchange_bytes(server: &mut McpServer, input: &[u8]) -> Vec<Value> {
    let (mut client, server_end) = tokio::io::duplex(1 << 16);
    client.write_all(input).await.unwrap();
    client.shutdown().await.unwrap();

    let (reader, writer) = tokio::io::split(server_end);
    server.serve(reader, writer).await.unwrap();

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn frames(messages: &[Value]) -> String {
    messages.iter().map(|m| format!("{}\n", m)).collect()
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_full_session() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir);

    let input = frames(&[
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "it", "version": "0.0.1"}
            }
        }),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
        call(2, "list_notes", json!({})),
        call(3, "save_note", json!({"title": "Project Ideas", "content": "# Ideas\n- thing one"})),
        call(4, "list_notes", json!({})),
        call(5, "read_note", json!({"title": "Project Ideas"})),
    ]);

    let responses = exchange(&mut server, &input).await;
    assert_eq!(server.state(), ServerState::Terminated);

    // The notification gets no response; everything else answers in order
    let ids: Vec<_> = responses.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);

    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "mdnotes");
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 3);
    assert_eq!(text_of(&responses[2]), "No notes found.");
    assert_eq!(text_of(&responses[3]), "Note saved: project-ideas.md");
    assert!(text_of(&responses[4]).contains("- project ideas (project-ideas.md, modified "));
    assert_eq!(text_of(&responses[5]), "# Ideas\n- thing one");

    let on_disk = std::fs::read_to_string(temp_dir.path().join("notes/project-ideas.md")).unwrap();
    assert_eq!(on_disk, "# Ideas\n- thing one");
}

#[tokio::test]
async fn test_bad_requests_do_not_stop_the_server() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir);

    let mut input = String::from("this is not json\n\n   \n");
    input.push_str(&frames(&[
        call(1, "no_such_tool", json!({})),
        json!({"jsonrpc": "2.0", "id": 2, "method": "prompts/list"}),
        call(3, "read_note", json!({"title": "missing"})),
        call(4, "save_note", json!({"title": "Overwrite", "content": "one"})),
        call(5, "save_note", json!({"title": "Overwrite", "content": "two"})),
        call(6, "read_note", json!({"title": "overwrite"})),
    ]));

    let responses = exchange(&mut server, &input).await;
    assert_eq!(responses.len(), 7);

    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[0]["id"], Value::Null);

    assert_eq!(responses[1]["result"]["isError"], true);
    assert_eq!(text_of(&responses[1]), "Error: Unknown tool: no_such_tool");

    assert_eq!(responses[2]["error"]["code"], -32601);

    assert!(responses[3]["result"].get("isError").is_none());
    assert_eq!(text_of(&responses[3]), "Note not found: missing.md");

    assert_eq!(text_of(&responses[6]), "two");
}

#[tokio::test]
async fn test_crlf_framing() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir);

    let input = "{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"ping\"}\r\n";
    let responses = exchange(&mut server, input).await;

    assert_eq!(responses, vec![json!({"jsonrpc": "2.0", "id": 9, "result": {}})]);
}

#[tokio::test]
async fn test_empty_channel() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir);
    assert_eq!(server.state(), ServerState::Uninitialized);

    let responses = exchange(&mut server, "").await;
    assert!(responses.is_empty());
    assert_eq!(server.state(), ServerState::Terminated);
}

#[tokio::test]
async fn test_invalid_utf8_line_keeps_serving() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir);

    let mut input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\",\"x\":\"\xff\"}\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

    let responses = exchange_bytes(&mut server, &input).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1], json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
    assert_eq!(server.state(), ServerState::Terminated);
}

#[tokio::test]
async fn test_oversized_line_keeps_serving() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir).with_max_frame_length(64);

    let long_title = "x".repeat(200);
    let input = frames(&[
        call(1, "read_note", json!({"title": long_title})),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
    ]);

    let responses = exchange(&mut server, &input).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert!(responses[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("exceeds 64 bytes"));
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], json!({}));
}

#[tokio::test]
async fn test_terminated_server_refuses_to_serve_again() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = create_server(&temp_dir);

    exchange(&mut server, "").await;

    let (_client, server_end) = tokio::io::duplex(64);
    let (reader, writer) = tokio::io::split(server_end);
    assert!(server.serve(reader, writer).await.is_err());
}
