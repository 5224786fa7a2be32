//! Query-parameter construction for Graph API calls.
//!
//! Tool arguments arrive as loosely typed JSON. Every optional argument is
//! funnelled through [`QueryParams::insert_opt`], which consults a fixed
//! encoding table keyed by parameter name so that the wire form of a value
//! never depends on which tool produced it.

use crate::constants::graph::ACCESS_TOKEN_PARAM;
use crate::constants::limits::LOG_STRING_MAX;
use crate::utils::redact::redact_object;
use serde_json::Value;
use std::collections::BTreeMap;

/// How a parameter value is turned into its wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Sequences are joined with `,`.
    CommaJoined,
    /// Sequences and mappings are serialized to a JSON string.
    Json,
    /// Scalars pass through unchanged.
    PassThrough,
}

const COMMA_JOINED_KEYS: &[&str] = &[
    "fields",
    "action_attribution_windows",
    "action_breakdowns",
    "breakdowns",
];

const JSON_KEYS: &[&str] = &[
    "filtering",
    "time_range",
    "time_ranges",
    "effective_status",
    "special_ad_categories",
    "objective",
    "buyer_guarantee_agreement_status",
];

pub fn encoding_for(key: &str) -> Encoding {
    if COMMA_JOINED_KEYS.contains(&key) {
        Encoding::CommaJoined
    } else if JSON_KEYS.contains(&key) {
        Encoding::Json
    } else {
        Encoding::PassThrough
    }
}

fn wire_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Encodes `value` for `key`. Returns `None` for JSON null, which is
/// treated the same as an argument that was never supplied.
pub fn encode_value(key: &str, value: Value) -> Option<Value> {
    if value.is_null() {
        return None;
    }
    let encoded = match (encoding_for(key), value) {
        (Encoding::CommaJoined, Value::Array(items)) => Value::String(
            items
                .iter()
                .map(wire_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        (Encoding::Json, structured @ (Value::Array(_) | Value::Object(_))) => {
            Value::String(structured.to_string())
        }
        // The wire only carries scalars; anything structured left at this
        // point is shipped as JSON text.
        (_, structured @ (Value::Array(_) | Value::Object(_))) => {
            Value::String(structured.to_string())
        }
        (_, scalar) => scalar,
    };
    Some(encoded)
}

/// True when a value would count as "supplied" under truthiness rules:
/// not null, not an empty string, not an empty list or mapping, not `false`
/// and not zero.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(number) => number.as_f64() != Some(0.0),
    }
}

/// Flat mapping of wire-safe parameter values, built fresh per request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: BTreeMap<String, Value>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: &str) -> Self {
        let mut params = Self::new();
        params.set(ACCESS_TOKEN_PARAM, token);
        params
    }

    /// Sets a value verbatim, bypassing the encoding table.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    /// Adds an optional argument; `None` (and JSON null) leave no trace.
    pub fn insert_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(encoded) = value.and_then(|v| encode_value(key, v.into())) {
            self.entries.insert(key.to_string(), encoded);
        }
        self
    }

    /// Like [`insert_opt`](Self::insert_opt), but empty strings, empty
    /// collections and `false` are treated as not supplied.
    pub fn insert_present<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        let value = value.map(Into::into).filter(is_present);
        self.insert_opt(key, value)
    }

    pub fn merge(&mut self, other: QueryParams) -> &mut Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name/value pairs as they go on the wire.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), wire_text(value)))
            .collect()
    }

    /// URL-encoded query string of the redacted parameters, for logs.
    pub fn redacted_query_string(&self) -> String {
        let redacted = self.redacted();
        let pairs: Vec<(String, String)> = redacted
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(key, value)| (key.clone(), wire_text(value)))
                    .collect()
            })
            .unwrap_or_default();
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// The parameter map with the access token and other secrets masked.
    pub fn redacted(&self) -> Value {
        redact_object(&self.to_value(), LOG_STRING_MAX)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}
