use crate::constants::config::{
    ACCOUNT_ID_KEYS, ACCOUNT_NAME_KEYS, DEFAULT_ACT_ID_ENV, DEFAULT_ACT_NAME_ENV,
    FLAG_DEFAULT_ACT_ID, FLAG_DEFAULT_ACT_NAME, FLAG_FB_TOKEN, MCP_CONFIG_ENV, TOKEN_KEY,
    USER_CONFIG_KEY,
};
use crate::constants::http::{DEFAULT_PORT, PORT_ENV};
use crate::errors::ConfigError;
use crate::services::logger::Logger;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

/// Command-line values that feed configuration. The outer `Option` says
/// whether the flag appeared at all, the inner one whether a value
/// followed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub fb_token: Option<Option<String>>,
    pub default_act_id: Option<Option<String>>,
    pub default_act_name: Option<Option<String>>,
}

/// Process environment captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub mcp_config: Option<String>,
    pub default_act_id: Option<String>,
    pub default_act_name: Option<String>,
    pub port: Option<String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            mcp_config: std::env::var(MCP_CONFIG_ENV).ok(),
            default_act_id: std::env::var(DEFAULT_ACT_ID_ENV).ok(),
            default_act_name: std::env::var(DEFAULT_ACT_NAME_ENV).ok(),
            port: std::env::var(PORT_ENV).ok(),
        }
    }
}

/// Default ad account candidate as found in configuration, before
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHint {
    pub id: String,
    pub name: Option<String>,
    pub source: &'static str,
}

pub struct ConfigSources {
    logger: Logger,
    env: EnvSnapshot,
    cli: CliOverrides,
    parsed: OnceCell<Map<String, Value>>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn first_string(mapping: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| non_empty(mapping.get(*key).and_then(Value::as_str)))
}

fn flag_value(
    flag: &'static str,
    value: &Option<Option<String>>,
) -> Result<Option<String>, ConfigError> {
    match value {
        None => Ok(None),
        Some(None) => Err(ConfigError::MissingFlagValue { flag }),
        Some(Some(text)) => Ok(Some(text.clone())),
    }
}

impl ConfigSources {
    pub fn new(logger: Logger, env: EnvSnapshot, cli: CliOverrides) -> Self {
        Self {
            logger: logger.child("config"),
            env,
            cli,
            parsed: OnceCell::new(),
        }
    }

    /// The `MCP_CONFIG` object. Parsed on first use; anything that is not a
    /// JSON object is reported once and treated as empty.
    pub fn mcp_config(&self) -> &Map<String, Value> {
        self.parsed.get_or_init(|| {
            let Some(raw) = self.env.mcp_config.as_deref().filter(|raw| !raw.is_empty()) else {
                return Map::new();
            };
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    self.logger.warn(
                        "MCP_CONFIG is not a JSON object; ignoring it",
                        Some(&serde_json::json!({"type": json_type(&other)})),
                    );
                    Map::new()
                }
                Err(err) => {
                    self.logger.warn(
                        "Failed to parse MCP_CONFIG environment variable",
                        Some(&serde_json::json!({"error": err.to_string()})),
                    );
                    Map::new()
                }
            }
        })
    }

    pub fn config_token(&self) -> Option<String> {
        non_empty(self.mcp_config().get(TOKEN_KEY).and_then(Value::as_str))
    }

    pub fn cli_token(&self) -> Result<Option<String>, ConfigError> {
        flag_value(FLAG_FB_TOKEN, &self.cli.fb_token)
    }

    /// First default-account candidate across configuration, environment
    /// and command line, in that order.
    pub fn default_account(&self) -> Result<Option<AccountHint>, ConfigError> {
        let config = self.mcp_config();
        let nested = config.get(USER_CONFIG_KEY).and_then(Value::as_object);

        let config_id = first_string(config, ACCOUNT_ID_KEYS)
            .or_else(|| nested.and_then(|inner| first_string(inner, ACCOUNT_ID_KEYS)));
        let config_name = first_string(config, ACCOUNT_NAME_KEYS)
            .or_else(|| nested.and_then(|inner| first_string(inner, ACCOUNT_NAME_KEYS)));
        if let Some(id) = config_id {
            return Ok(Some(AccountHint {
                id,
                name: config_name,
                source: MCP_CONFIG_ENV,
            }));
        }

        if let Some(id) = non_empty(self.env.default_act_id.as_deref()) {
            return Ok(Some(AccountHint {
                id,
                name: non_empty(self.env.default_act_name.as_deref()).or(config_name),
                source: DEFAULT_ACT_ID_ENV,
            }));
        }

        if let Some(id) = flag_value(FLAG_DEFAULT_ACT_ID, &self.cli.default_act_id)? {
            let Some(id) = non_empty(Some(&id)) else {
                return Ok(None);
            };
            let name = flag_value(FLAG_DEFAULT_ACT_NAME, &self.cli.default_act_name)?
                .and_then(|name| non_empty(Some(&name)))
                .or(config_name);
            return Ok(Some(AccountHint {
                id,
                name,
                source: "command line",
            }));
        }

        Ok(None)
    }

    /// `Some(port)` when the environment asks for the HTTP transport.
    pub fn http_port(&self) -> Result<Option<u16>, ConfigError> {
        let Some(raw) = self.env.port.as_deref() else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Some(DEFAULT_PORT));
        }
        trimmed
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidPort(raw.to_string()))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
