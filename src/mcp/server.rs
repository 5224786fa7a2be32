use crate::errors::{ErrorCode, McpError, ToolError, ToolErrorKind};
use crate::mcp::catalog::{list_tools, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolExecutor;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "fb-ads-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn kind_label(kind: ToolErrorKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", kind).to_lowercase())
}

pub fn map_tool_error(tool: &str, error: &ToolError) -> McpError {
    let mut lines = vec![
        "FacebookAdsError".to_string(),
        format!("tool: {}", tool),
        format!("kind: {}", kind_label(error.kind)),
        format!("code: {}", error.code),
        format!("message: {}", error.message),
    ];
    if let Some(hint) = &error.hint {
        lines.push(format!("hint: {}", hint));
    }
    if let Some(details) = &error.details {
        lines.push(format!("details: {}", details));
    }
    let message = lines.join("\n");

    match error.kind {
        ToolErrorKind::InvalidParams => McpError::new(ErrorCode::InvalidParams, message),
        ToolErrorKind::Timeout => McpError::new(ErrorCode::RequestTimeout, message),
        ToolErrorKind::NotFound => McpError::new(ErrorCode::InvalidRequest, message),
        _ => McpError::new(ErrorCode::InternalError, message),
    }
}

/// JSON-RPC front of the tool executor, shared by the stdio and HTTP
/// transports.
pub struct McpServer {
    logger: Logger,
    executor: Arc<ToolExecutor>,
}

impl McpServer {
    pub fn new(logger: Logger, executor: Arc<ToolExecutor>) -> Self {
        Self {
            logger: logger.child("mcp"),
            executor,
        }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": list_tools() })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if name.is_empty() {
            return Err(McpError::invalid_params("Missing tool name"));
        }
        let args = params.get("arguments").cloned().unwrap_or(Value::Null);
        validate_tool_args(name, &args)?;

        let result = self
            .executor
            .execute(name, args)
            .await
            .map_err(|err| map_tool_error(name, &err))?;
        let text = serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string());
        Ok(serde_json::json!({
            "content": [ { "type": "text", "text": text } ]
        }))
    }

    /// Dispatches one decoded request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let outcome = match request.method.as_str() {
            method if method.starts_with("notifications/") => Ok(serde_json::json!({})),
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            other => {
                self.logger.debug(
                    "Unknown method",
                    Some(&serde_json::json!({ "method": other })),
                );
                Err(McpError::new(
                    ErrorCode::MethodNotFound,
                    format!("Method not found: {}", other),
                ))
            }
        };

        let id = request.id?;
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err.code.as_i32(), err.message),
        })
    }

    /// Decodes and dispatches one raw message. Undecodable input is answered
    /// with a null id.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error".to_string(),
                ))
            }
        };
        let id = parsed.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request".to_string(),
                ))
            }
        };
        self.handle_request(request).await
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);
        self.logger.info("Serving MCP over stdio", None);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line).await {
                let payload = serde_json::to_string(&response).unwrap_or_default();
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        self.logger.info("stdin closed, shutting down", None);
        Ok(())
    }
}
