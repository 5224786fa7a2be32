use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;

/// Error for a tool name routed to a manager that does not serve it.
pub fn unknown_tool_error(family: &str, tool: &str, known_tools: &[&str]) -> ToolError {
    let suggestions = suggest(tool, known_tools, SUGGESTION_LIMIT);
    let did_you_mean = if suggestions.is_empty() {
        String::new()
    } else {
        format!("Did you mean: {}? ", suggestions.join(", "))
    };
    let hint = format!("{}Use one of: {}.", did_you_mean, known_tools.join(", "));
    ToolError::not_found(format!("{} tools do not include {}", family, tool)).with_hint(hint)
}
