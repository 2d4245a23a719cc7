// MCP server over a newline-delimited JSON-RPC channel

use crate::codec::{Frame, JsonLinesCodec, MAX_FRAME_LENGTH};
use crate::dispatch::Dispatcher;
use crate::protocol::{
    methods, CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, JSONRPC_VERSION,
    PROTOCOL_VERSION,
};
use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};

/// Name and version reported in the `initialize` handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: "mdnotes".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Lifecycle of a server instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, capabilities not declared yet
    Uninitialized,
    /// Identity and capabilities declared, no channel bound yet
    Connected,
    /// Bound to a channel and handling requests
    Serving,
    /// The channel closed or failed
    Terminated,
}

/// Handles requests strictly one at a time in arrival order. Only protocol
/// frames are written to the channel; diagnostics go through `tracing`.
pub struct McpServer {
    identity: ServerIdentity,
    capabilities: Option<ServerCapabilities>,
    dispatcher: Dispatcher,
    max_frame_length: usize,
    state: ServerState,
}

impl McpServer {
    pub fn new(identity: ServerIdentity, dispatcher: Dispatcher) -> Self {
        Self {
            identity,
            capabilities: None,
            dispatcher,
            max_frame_length: MAX_FRAME_LENGTH,
            state: ServerState::Uninitialized,
        }
    }

    /// Limit the size of a single incoming message
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// Declare the tool capability, moving `Uninitialized` to `Connected`
    pub fn connect(&mut self) {
        if self.state != ServerState::Uninitialized {
            return;
        }
        self.capabilities = Some(ServerCapabilities::tools_only());
        self.transition(ServerState::Connected);
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    fn transition(&mut self, next: ServerState) {
        tracing::debug!("Server state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn run_stdio(&mut self) -> Result<()> {
        tracing::info!(
            "{} {} serving on stdio",
            self.identity.name,
            self.identity.version
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    ///
    /// Connects first if needed. Returns `Ok(())` once the reader reaches end
    /// of input. Any I/O failure on the channel is returned as an error.
    /// Either way the server ends up `Terminated`.
    pub async fn serve<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.state == ServerState::Terminated {
            bail!("Server has already terminated");
        }
        self.connect();
        self.transition(ServerState::Serving);

        let codec = JsonLinesCodec::with_max_length(self.max_frame_length);
        let mut requests = FramedRead::new(reader, codec.clone());
        let mut responses = FramedWrite::new(writer, codec);
        let outcome = self.serve_frames(&mut requests, &mut responses).await;

        self.transition(ServerState::Terminated);
        outcome
    }

    async fn serve_frames<R, W>(
        &self,
        requests: &mut FramedRead<R, JsonLinesCodec>,
        responses: &mut FramedWrite<W, JsonLinesCodec>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(frame) = requests.next().await {
            let response = match frame.context("Failed to read request from channel")? {
                Frame::Message(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.handle_message(line).await
                }
                Frame::InvalidUtf8 => {
                    tracing::warn!("Discarding message that is not valid UTF-8");
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        JsonRpcError::parse_error("message is not valid UTF-8"),
                    ))
                }
                Frame::Oversized => {
                    tracing::warn!("Discarding message over {} bytes", self.max_frame_length);
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        JsonRpcError::parse_error(format!(
                            "message exceeds {} bytes",
                            self.max_frame_length
                        )),
                    ))
                }
            };

            if let Some(response) = response {
                let encoded =
                    serde_json::to_string(&response).context("Failed to encode response")?;
                responses
                    .send(encoded)
                    .await
                    .context("Failed to write response to channel")?;
            }
        }

        tracing::info!("Channel closed, shutting down");
        Ok(())
    }

    /// Handle one framed message. Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Discarding unparseable message: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::invalid_request(e.to_string()),
                ))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                JsonRpcError::invalid_request(format!(
                    "unsupported jsonrpc version {:?}",
                    request.jsonrpc
                )),
            ));
        }

        tracing::debug!("Received {}", request.method);

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        Some(self.handle_request(id, &request.method, request.params).await)
    }

    fn handle_notification(&self, method: &str) {
        match method {
            methods::INITIALIZED => tracing::info!("Client initialized"),
            other => tracing::debug!("Ignoring notification {}", other),
        }
    }

    async fn handle_request(&self, id: Value, method: &str, params: Option<Value>) -> JsonRpcResponse {
        match method {
            methods::INITIALIZE => self.handle_initialize(id, params),
            methods::PING => JsonRpcResponse::success(id, &serde_json::json!({})),
            methods::TOOLS_LIST => JsonRpcResponse::success(
                id,
                &ListToolsResult {
                    tools: self.dispatcher.registry().list_schemas().to_vec(),
                },
            ),
            methods::TOOLS_CALL => self.handle_tools_call(id, params).await,
            other => {
                tracing::warn!("Unknown method: {}", other);
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(other))
            }
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(params)) => tracing::info!(
                "Initializing for {} {} (protocol {})",
                params.client_info.name,
                params.client_info.version,
                params.protocol_version
            ),
            Some(Err(e)) => tracing::debug!("Unrecognized initialize params: {}", e),
            None => {}
        }

        JsonRpcResponse::success(
            id,
            &InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: self.capabilities.clone().unwrap_or_default(),
                server_info: ServerInfo {
                    name: self.identity.name.clone(),
                    version: self.identity.version.clone(),
                },
            },
        )
    }

    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)),
                )
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tools/call params"),
                )
            }
        };

        let result = self.dispatcher.call(&params.name, params.arguments).await;
        JsonRpcResponse::success(id, &result)
    }
}
