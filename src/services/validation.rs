use crate::constants::graph::ALLOWED_SCHEMES;
use crate::errors::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Required path id such as `campaign_id` or `ad_id`.
    pub fn ensure_node_id(&self, value: &str, label: &str) -> Result<String, ToolError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        if trimmed.contains(['/', '?', '#', '&']) {
            return Err(ToolError::invalid_params(format!(
                "{} must be a bare Graph object id",
                label
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Deserializes tool arguments into a typed argument struct.
    pub fn parse_args<T: DeserializeOwned>(&self, tool: &str, args: Value) -> Result<T, ToolError> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        serde_json::from_value(args).map_err(|err| {
            ToolError::invalid_params(format!("Invalid arguments for {}: {}", tool, err))
        })
    }

    pub fn ensure_http_url(&self, value: &str, label: &str) -> Result<Url, ToolError> {
        let parsed = Url::parse(value.trim()).map_err(|err| {
            ToolError::invalid_params(format!("{} must be an absolute URL: {}", label, err))
        })?;
        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(ToolError::invalid_params(format!(
                "{} must use http or https, got {}",
                label,
                parsed.scheme()
            )));
        }
        Ok(parsed)
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}
