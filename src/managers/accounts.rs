use crate::constants::account::{DETAIL_FIELDS, LIST_FIELDS};
use crate::errors::ToolError;
use crate::services::graph::GraphClient;
use crate::services::logger::Logger;
use crate::services::pagination::{dedupe_by_id, drain_all};
use crate::services::params::QueryParams;
use crate::services::resolver::AccountResolver;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const ACCOUNT_TOOLS: &[&str] = &[
    "set_access_token",
    "list_ad_accounts",
    "get_details_of_ad_account",
];

#[derive(Debug, Deserialize)]
struct SetAccessTokenArgs {
    access_token: String,
    act_id: Option<String>,
    act_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AccountDetailsArgs {
    act_id: Option<String>,
    fields: Option<Vec<String>>,
}

/// Token management and ad-account lookups.
#[derive(Clone)]
pub struct AccountManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
    resolver: AccountResolver,
}

impl AccountManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        graph: GraphClient,
        resolver: AccountResolver,
    ) -> Self {
        Self {
            logger: logger.child("accounts"),
            validation,
            graph,
            resolver,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "set_access_token" => self.set_access_token(args).await,
            "list_ad_accounts" => self.list_ad_accounts().await,
            "get_details_of_ad_account" => self.details(args).await,
            _ => Err(unknown_tool_error("account", tool, ACCOUNT_TOOLS)),
        }
    }

    async fn set_access_token(&self, args: Value) -> Result<Value, ToolError> {
        let args: SetAccessTokenArgs = self.validation.parse_args("set_access_token", args)?;
        let seeded = self
            .graph
            .session()
            .set_access_token(
                &args.access_token,
                args.act_id.as_deref(),
                args.act_name.as_deref(),
            )
            .await?;

        let mut response = serde_json::json!({
            "status": "success",
            "access_token_configured": true,
        });
        if let Some(account) = seeded {
            response["default_ad_account"] = serde_json::to_value(account)
                .map_err(|err| ToolError::internal(err.to_string()))?;
        }
        Ok(response)
    }

    /// Every ad account reachable by the token, across all pages, each id
    /// listed once.
    async fn list_ad_accounts(&self) -> Result<Value, ToolError> {
        let mut params = QueryParams::new();
        params.set("fields", LIST_FIELDS);
        let mut result = self.graph.get("me", params).await?;

        if !result.get("adaccounts").is_some_and(Value::is_object) {
            return Ok(result);
        }
        let section = result["adaccounts"].take();
        let mut drained = drain_all(section, &self.graph).await?;
        let rows = match drained.get_mut("data").map(Value::take) {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        };
        let fetched = rows.len();
        let unique = dedupe_by_id(rows);
        if unique.len() != fetched {
            self.logger.debug(
                "Dropped duplicate ad accounts",
                Some(&serde_json::json!({"duplicates": fetched - unique.len()})),
            );
        }
        drained["data"] = Value::Array(unique);
        result["adaccounts"] = drained;
        Ok(result)
    }

    async fn details(&self, args: Value) -> Result<Value, ToolError> {
        let args: AccountDetailsArgs =
            self.validation.parse_args("get_details_of_ad_account", args)?;
        let act_id = self.resolver.resolve(args.act_id.as_deref()).await?;
        let fields = args
            .fields
            .unwrap_or_else(|| DETAIL_FIELDS.iter().map(|f| f.to_string()).collect());
        let mut params = QueryParams::new();
        params.insert_opt("fields", Some(fields));
        self.graph.get(&act_id, params).await
    }
}

#[async_trait]
impl ToolHandler for AccountManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
