//! Query construction for the four insights tools.
//!
//! Time-window precedence: `time_ranges` over `time_range` over
//! `date_preset`. Any explicit window (`time_range`, `time_ranges`,
//! `since`, `until`) drops `date_preset`; `since`/`until` only apply when
//! no range form was given.

use crate::constants::insights::{
    AGGREGATE_TIME_INCREMENT, DEFAULT_ACTION_BREAKDOWNS, DEFAULT_DATE_PRESET,
};
use crate::services::params::{is_present, QueryParams};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsArgs {
    pub fields: Option<Vec<String>>,
    pub date_preset: Option<String>,
    pub time_range: Option<Value>,
    pub time_ranges: Option<Vec<Value>>,
    pub time_increment: Option<Value>,
    pub level: Option<String>,
    pub action_attribution_windows: Option<Vec<String>>,
    pub action_breakdowns: Option<Vec<String>>,
    pub action_report_time: Option<String>,
    pub breakdowns: Option<Vec<String>>,
    pub default_summary: Option<bool>,
    pub use_account_attribution_setting: Option<bool>,
    pub use_unified_attribution_setting: Option<bool>,
    pub filtering: Option<Vec<Value>>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub offset: Option<i64>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub locale: Option<String>,
}

fn is_aggregate_increment(value: &Value) -> bool {
    value.as_str() == Some(AGGREGATE_TIME_INCREMENT)
}

impl InsightsArgs {
    /// Merges the insights arguments into `base`. `default_level` applies
    /// when the caller gave no `level`.
    pub fn build_params(&self, mut base: QueryParams, default_level: &str) -> QueryParams {
        base.insert_opt("fields", self.fields.clone());

        // Empty windows count as not supplied.
        let time_range = self.time_range.as_ref().filter(|range| is_present(range));
        let time_ranges = self.time_ranges.as_ref().filter(|ranges| !ranges.is_empty());
        let since = self.since.as_deref().filter(|value| !value.is_empty());
        let until = self.until.as_deref().filter(|value| !value.is_empty());
        let has_range = time_range.is_some() || time_ranges.is_some();

        if let Some(ranges) = time_ranges {
            base.insert_opt("time_ranges", Some(Value::Array(ranges.clone())));
        } else if let Some(range) = time_range {
            base.insert_opt("time_range", Some(range.clone()));
        } else if since.is_none() && until.is_none() {
            let preset = self
                .date_preset
                .as_deref()
                .filter(|preset| !preset.is_empty())
                .unwrap_or(DEFAULT_DATE_PRESET);
            base.set("date_preset", preset);
        }

        let increment = self
            .time_increment
            .clone()
            .filter(is_present)
            .unwrap_or_else(|| Value::String(AGGREGATE_TIME_INCREMENT.to_string()));
        if !is_aggregate_increment(&increment) {
            base.insert_opt("time_increment", Some(increment));
        }

        let level = self.level.as_deref().unwrap_or(default_level);
        base.set("level", level);

        base.insert_opt(
            "action_attribution_windows",
            self.action_attribution_windows.clone(),
        );
        let action_breakdowns = self.action_breakdowns.clone().unwrap_or_else(|| {
            DEFAULT_ACTION_BREAKDOWNS
                .iter()
                .map(|item| item.to_string())
                .collect()
        });
        base.insert_opt("action_breakdowns", Some(action_breakdowns));
        base.insert_opt("action_report_time", self.action_report_time.clone());
        base.insert_opt("breakdowns", self.breakdowns.clone());

        // Only a true flag reaches the wire; false is the remote default.
        if self.default_summary.unwrap_or(false) {
            base.set("default_summary", "true");
        }
        if self.use_account_attribution_setting.unwrap_or(false) {
            base.set("use_account_attribution_setting", "true");
        }
        if self.use_unified_attribution_setting.unwrap_or(true) {
            base.set("use_unified_attribution_setting", "true");
        }

        base.insert_opt("filtering", self.filtering.clone().map(Value::Array));
        base.insert_opt("sort", self.sort.clone());
        base.insert_opt("limit", self.limit);
        base.insert_opt("after", self.after.clone());
        base.insert_opt("before", self.before.clone());
        base.insert_opt("offset", self.offset);

        if !has_range {
            base.insert_opt("since", since);
            base.insert_opt("until", until);
        }
        base.insert_opt("locale", self.locale.clone());
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(args: Value, level: &str) -> QueryParams {
        let parsed: InsightsArgs = serde_json::from_value(args).expect("args");
        parsed.build_params(QueryParams::new(), level)
    }

    #[test]
    fn defaults_match_documented_wire_shape() {
        let params = build(json!({}), "campaign");
        assert_eq!(params.get_str("level"), Some("campaign"));
        assert_eq!(params.get_str("date_preset"), Some("last_30d"));
        assert_eq!(params.get_str("action_breakdowns"), Some("action_type"));
        assert_eq!(params.get_str("use_unified_attribution_setting"), Some("true"));
        for absent in [
            "time_range",
            "time_ranges",
            "time_increment",
            "breakdowns",
            "default_summary",
            "use_account_attribution_setting",
            "since",
            "until",
        ] {
            assert!(!params.contains_key(absent), "{} should be absent", absent);
        }
    }

    #[test]
    fn time_ranges_override_range_and_preset() {
        let params = build(
            json!({
                "date_preset": "last_7d",
                "time_range": {"since": "2024-01-01", "until": "2024-01-31"},
                "time_ranges": [{"since": "2024-02-01", "until": "2024-02-29"}]
            }),
            "account",
        );
        assert!(params.contains_key("time_ranges"));
        assert!(!params.contains_key("time_range"));
        assert!(!params.contains_key("date_preset"));
    }

    #[test]
    fn time_range_drops_preset_and_since_until() {
        let params = build(
            json!({
                "time_range": {"since": "2024-01-01", "until": "2024-01-31"},
                "since": "2023-01-01",
                "until": "2023-02-01"
            }),
            "account",
        );
        let range: Value =
            serde_json::from_str(params.get_str("time_range").expect("range")).expect("json");
        assert_eq!(range["since"], "2024-01-01");
        assert!(!params.contains_key("date_preset"));
        assert!(!params.contains_key("since"));
        assert!(!params.contains_key("until"));
    }

    #[test]
    fn since_until_pass_through_without_ranges() {
        let params = build(json!({"since": "1704067200", "until": "1706745600"}), "ad");
        assert_eq!(params.get_str("since"), Some("1704067200"));
        assert_eq!(params.get_str("until"), Some("1706745600"));
        assert!(!params.contains_key("date_preset"));
    }

    #[test]
    fn time_increment_only_when_not_aggregate() {
        let daily = build(json!({"time_increment": 1}), "account");
        assert_eq!(daily.get("time_increment"), Some(&json!(1)));
        let monthly = build(json!({"time_increment": "monthly"}), "account");
        assert_eq!(monthly.get_str("time_increment"), Some("monthly"));
        let aggregate = build(json!({"time_increment": "all_days"}), "account");
        assert!(!aggregate.contains_key("time_increment"));
        let zero = build(json!({"time_increment": 0}), "account");
        assert!(!zero.contains_key("time_increment"));
    }

    #[test]
    fn boolean_flags_are_emitted_only_when_true() {
        let params = build(
            json!({
                "default_summary": true,
                "use_account_attribution_setting": false,
                "use_unified_attribution_setting": false
            }),
            "account",
        );
        assert_eq!(params.get_str("default_summary"), Some("true"));
        assert!(!params.contains_key("use_account_attribution_setting"));
        assert!(!params.contains_key("use_unified_attribution_setting"));
    }

    #[test]
    fn explicit_level_and_lists_are_encoded() {
        let params = build(
            json!({
                "level": "ad",
                "breakdowns": ["age", "gender"],
                "action_breakdowns": ["action_device", "action_type"],
                "fields": ["impressions", "spend"]
            }),
            "account",
        );
        assert_eq!(params.get_str("level"), Some("ad"));
        assert_eq!(params.get_str("breakdowns"), Some("age,gender"));
        assert_eq!(
            params.get_str("action_breakdowns"),
            Some("action_device,action_type")
        );
        assert_eq!(params.get_str("fields"), Some("impressions,spend"));
    }
}
