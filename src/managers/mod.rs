pub mod accounts;
pub mod activities;
pub mod ads;
pub mod adsets;
pub mod campaigns;
pub mod creatives;
pub mod insights;

use crate::services::params::QueryParams;
use serde::Deserialize;
use serde_json::Value;

/// Arguments shared by the edge listings (`/ads`, `/adsets`, `/campaigns`,
/// `/adcreatives`). Empty strings and lists count as not supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeArgs {
    pub fields: Option<Vec<String>>,
    pub filtering: Option<Vec<Value>>,
    pub limit: Option<i64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub effective_status: Option<Vec<String>>,
    pub date_format: Option<String>,
}

impl EdgeArgs {
    /// `default_limit` fills in `limit` when the caller left it out.
    pub fn apply(&self, params: &mut QueryParams, default_limit: Option<i64>) {
        params
            .insert_present("fields", self.fields.clone())
            .insert_present("filtering", self.filtering.clone().map(Value::Array))
            .insert_opt("limit", self.limit.or(default_limit))
            .insert_present("after", self.after.clone())
            .insert_present("before", self.before.clone())
            .insert_present("effective_status", self.effective_status.clone())
            .insert_present("date_format", self.date_format.clone());
    }
}

/// Time filters accepted by the account-level listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowArgs {
    pub date_preset: Option<String>,
    pub time_range: Option<Value>,
    pub updated_since: Option<i64>,
}

impl WindowArgs {
    pub fn apply(&self, params: &mut QueryParams) {
        params
            .insert_present("date_preset", self.date_preset.clone())
            .insert_present("time_range", self.time_range.clone())
            .insert_present("updated_since", self.updated_since);
    }
}

/// Single-object reads only send `fields` when it lists something.
pub fn node_params(fields: Option<Vec<String>>) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert_present("fields", fields);
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_args_skip_empty_values_and_default_limit() {
        let args: EdgeArgs = serde_json::from_value(json!({
            "fields": [],
            "after": "",
            "effective_status": ["ACTIVE", "PAUSED"]
        }))
        .expect("args");
        let mut params = QueryParams::new();
        args.apply(&mut params, Some(25));
        assert!(!params.contains_key("fields"));
        assert!(!params.contains_key("after"));
        assert_eq!(params.get("limit"), Some(&json!(25)));
        assert_eq!(
            params.get_str("effective_status"),
            Some("[\"ACTIVE\",\"PAUSED\"]")
        );
    }

    #[test]
    fn explicit_limit_wins_and_zero_is_sent() {
        let args: EdgeArgs = serde_json::from_value(json!({"limit": 0})).expect("args");
        let mut params = QueryParams::new();
        args.apply(&mut params, Some(25));
        assert_eq!(params.get("limit"), Some(&json!(0)));
    }

    #[test]
    fn window_args_encode_time_range() {
        let window: WindowArgs = serde_json::from_value(json!({
            "time_range": {"since": "2024-01-01", "until": "2024-01-31"},
            "date_preset": "",
            "updated_since": 1704067200
        }))
        .expect("window");
        let mut params = QueryParams::new();
        window.apply(&mut params);
        assert!(params.get_str("time_range").expect("range").contains("2024-01-31"));
        assert!(!params.contains_key("date_preset"));
        assert_eq!(params.get("updated_since"), Some(&json!(1704067200)));
    }
}
