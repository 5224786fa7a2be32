use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::{ErrorCode, McpError};
use crate::utils::suggest::suggest;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// A broken catalog yields an empty list; App::initialize then reports every
// wired tool as missing instead of panicking here.
static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).unwrap_or_default()
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

/// Payload of `tools/list`.
pub fn list_tools() -> Value {
    serde_json::to_value(tool_catalog()).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// Checks call arguments against the tool's input schema. Tools without a
/// catalog entry pass through; the executor reports them as unknown.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(tool) = tool_by_name(tool_name) else {
        return Ok(());
    };
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    // Clients may send `arguments: null` for argument-less tools.
    let empty = Value::Object(Default::default());
    let args = if args.is_null() { &empty } else { args };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, args, errors, &tool.input_schema);
        return Err(McpError::new(ErrorCode::InvalidParams, message));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    args: &Value,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> String {
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let path = err.instance_path.to_string();
        let instance_path = if path.is_empty() {
            "(root)".to_string()
        } else {
            path.clone()
        };
        match &err.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                let props: Vec<String> = schema_node_at(schema, &err.schema_path.to_string())
                    .and_then(|parent| parent.get("properties").and_then(|v| v.as_object()))
                    .map(|map| map.keys().cloned().collect())
                    .unwrap_or_default();
                if unexpected.is_empty() {
                    rendered.push(format!("{}: unknown field", instance_path));
                }
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    let suggestions = suggest(unknown, &props, SUGGESTION_LIMIT);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!(
                            "field '{}': {}",
                            unknown,
                            suggestions.join(", ")
                        ));
                    }
                }
            }
            ValidationErrorKind::Enum { options } => {
                let allowed: Vec<String> = options
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .map(|v| {
                                v.as_str()
                                    .map(|s| s.to_string())
                                    .unwrap_or_else(|| v.to_string())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                if allowed.is_empty() {
                    rendered.push(format!("{}: invalid value", instance_path));
                } else {
                    rendered.push(format!(
                        "{}: expected one of {}",
                        instance_path,
                        allowed.join(", ")
                    ));
                    let received = value_at(args, &path)
                        .and_then(|v| v.as_str())
                        .unwrap_or("");
                    let suggestions = suggest(received, &allowed, SUGGESTION_LIMIT);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!(
                            "{}: {}",
                            instance_path,
                            suggestions.join(", ")
                        ));
                    }
                }
            }
            ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!(
                    "{}: missing required field '{}'",
                    instance_path, prop
                ));
            }
            ValidationErrorKind::Type { kind } => {
                rendered.push(format!(
                    "{}: expected {}",
                    instance_path,
                    format_type_kind(kind)
                ));
            }
            _ => rendered.push(format!("{}: {}", instance_path, err)),
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!(
            "Did you mean: {}",
            did_you_means
                .iter()
                .take(SUGGESTION_LIMIT)
                .cloned()
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }
    lines.push(format!(
        "Hint: see the inputSchema of '{}' in tools/list",
        tool_name
    ));
    lines.join("\n")
}

fn format_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

/// Walks a schema path such as `/properties/time_range/additionalProperties`
/// and returns the object that owns the last keyword.
fn schema_node_at<'a>(schema: &'a Value, schema_path: &str) -> Option<&'a Value> {
    let segments: Vec<&str> = schema_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    let parent_len = segments.len().saturating_sub(1);
    let mut current = schema;
    for segment in &segments[..parent_len] {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn value_at<'a>(root: &'a Value, instance_path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in instance_path.split('/').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_lists_every_tool_once_with_compiled_schema() {
        let names: Vec<&str> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), 22);
        assert_eq!(TOOL_MAP.len(), 22);
        assert_eq!(TOOL_VALIDATORS.len(), 22);
        for tool in tool_catalog() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert_eq!(
                tool.input_schema["additionalProperties"],
                json!(false),
                "{}",
                tool.name
            );
        }
    }

    #[test]
    fn unknown_field_is_rejected_with_suggestion() {
        let err = validate_tool_args("get_campaign_insights", &json!({"campaign_id": "1", "levl": "ad"}))
            .expect_err("unknown field");
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("unknown field 'levl'"), "{}", err.message);
        assert!(err.message.contains("level"), "{}", err.message);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = validate_tool_args("get_ad_by_id", &json!({})).expect_err("required");
        assert!(err.message.contains("missing required field 'ad_id'"), "{}", err.message);
    }

    #[test]
    fn enum_and_type_errors_are_rendered() {
        let err = validate_tool_args("get_adaccount_insights", &json!({"level": "campain"}))
            .expect_err("enum");
        assert!(err.message.contains("expected one of"), "{}", err.message);
        assert!(err.message.contains("campaign"), "{}", err.message);

        let err = validate_tool_args("get_ads_by_adaccount", &json!({"limit": "ten"}))
            .expect_err("type");
        assert!(err.message.contains("/limit: expected"), "{}", err.message);
    }

    #[test]
    fn null_optionals_and_null_arguments_are_accepted() {
        assert!(validate_tool_args("list_ad_accounts", &Value::Null).is_ok());
        assert!(validate_tool_args(
            "get_adaccount_insights",
            &json!({"act_id": null, "time_increment": 1, "fields": ["spend"]})
        )
        .is_ok());
    }

    #[test]
    fn unknown_tools_pass_validation() {
        assert!(validate_tool_args("no_such_tool", &json!({"x": 1})).is_ok());
    }
}
