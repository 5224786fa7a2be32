use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::limits::{LOG_STRING_MAX, SUGGESTION_LIMIT};
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::redact::redact_object;
use crate::utils::suggest::suggest;

use serde_json::Value;

/// A family of tools. `tool` is the catalog name the call was made under.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    fn unknown_tool(&self, tool: &str) -> ToolError {
        let candidates = self.tool_names();
        let suggestions = suggest(tool, &candidates, SUGGESTION_LIMIT);
        let hint = if suggestions.is_empty() {
            "Call tools/list to see the available tools".to_string()
        } else {
            format!("Did you mean: {}?", suggestions.join(", "))
        };
        ToolError::not_found(format!("Unknown tool: {}", tool)).with_hint(hint)
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            return Err(self.unknown_tool(tool));
        };
        let trace_id = uuid::Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now().timestamp_millis();
        self.logger.debug(
            tool,
            Some(&serde_json::json!({
                "trace_id": trace_id,
                "args": redact_object(&args, LOG_STRING_MAX),
            })),
        );

        let result = handler.handle(tool, args).await;
        let duration_ms = chrono::Utc::now().timestamp_millis() - started_at;
        match &result {
            Ok(_) => self.logger.info(
                tool,
                Some(&serde_json::json!({
                    "trace_id": trace_id,
                    "status": "ok",
                    "duration_ms": duration_ms,
                })),
            ),
            Err(err) => self.logger.warn(
                tool,
                Some(&serde_json::json!({
                    "trace_id": trace_id,
                    "status": "error",
                    "code": err.code,
                    "duration_ms": duration_ms,
                })),
            ),
        }
        result
    }
}
