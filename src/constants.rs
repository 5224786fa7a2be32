pub mod graph {
    pub const API_VERSION: &str = "v22.0";
    pub const BASE_URL: &str = "https://graph.facebook.com/v22.0";
    pub const ACCESS_TOKEN_PARAM: &str = "access_token";
    pub const ALLOWED_SCHEMES: &[&str] = &["http", "https"];
}

pub mod account {
    pub const ID_PREFIX: &str = "act_";
    pub const DEFAULT_RESOLUTION_FIELDS: &str = "adaccounts.limit(1){id,account_id,name}";
    pub const LIST_FIELDS: &str = "adaccounts{name}";
    pub const DETAIL_FIELDS: &[&str] = &[
        "name",
        "business_name",
        "age",
        "account_status",
        "balance",
        "amount_spent",
        "attribution_spec",
        "account_id",
        "business",
        "business_city",
        "brand_safety_content_filter_levels",
        "currency",
        "created_time",
        "id",
    ];
}

pub mod insights {
    pub const DEFAULT_DATE_PRESET: &str = "last_30d";
    /// Wire value meaning "one aggregate row for the whole period".
    pub const AGGREGATE_TIME_INCREMENT: &str = "all_days";
    pub const DEFAULT_ACTION_BREAKDOWNS: &[&str] = &["action_type"];
    pub const LEVEL_ACCOUNT: &str = "account";
    pub const LEVEL_CAMPAIGN: &str = "campaign";
    pub const LEVEL_ADSET: &str = "adset";
    pub const LEVEL_AD: &str = "ad";
}

pub mod edges {
    pub const DEFAULT_LIMIT: i64 = 25;
}

pub mod config {
    pub const MCP_CONFIG_ENV: &str = "MCP_CONFIG";
    pub const DEFAULT_ACT_ID_ENV: &str = "FB_DEFAULT_ACT_ID";
    pub const DEFAULT_ACT_NAME_ENV: &str = "FB_DEFAULT_ACT_NAME";
    pub const TOKEN_KEY: &str = "fbToken";
    pub const USER_CONFIG_KEY: &str = "user_config";
    pub const ACCOUNT_ID_KEYS: &[&str] = &[
        "defaultActId",
        "actId",
        "default_ad_account_id",
        "facebook_ad_account_id",
    ];
    pub const ACCOUNT_NAME_KEYS: &[&str] = &[
        "defaultActName",
        "actName",
        "default_ad_account_name",
        "facebook_ad_account_name",
    ];
    pub const FLAG_FB_TOKEN: &str = "--fb-token";
    pub const FLAG_DEFAULT_ACT_ID: &str = "--default-act-id";
    pub const FLAG_DEFAULT_ACT_NAME: &str = "--default-act-name";
}

pub mod http {
    pub const PORT_ENV: &str = "PORT";
    pub const DEFAULT_PORT: u16 = 8081;
    pub const BIND_HOST: [u8; 4] = [0, 0, 0, 0];
    pub const ALLOWED_ORIGIN: &str = "https://smithery.ai";
    pub const MCP_PATH: &str = "/mcp";
    pub const HEALTH_PATH: &str = "/health";
}

pub mod limits {
    pub const LOG_STRING_MAX: usize = 2048;
    pub const SUGGESTION_LIMIT: usize = 3;
}
