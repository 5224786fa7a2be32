use crate::errors::ToolError;
use crate::services::graph::GraphClient;
use crate::services::logger::Logger;
use crate::services::params::{is_present, QueryParams};
use crate::services::resolver::AccountResolver;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const ACTIVITY_TOOLS: &[&str] = &["get_activities_by_adaccount", "get_activities_by_adset"];

/// Change-history query. `time_range` wins over `since`/`until`.
#[derive(Debug, Default, Deserialize)]
struct ActivityQuery {
    fields: Option<Vec<String>>,
    limit: Option<i64>,
    after: Option<String>,
    before: Option<String>,
    time_range: Option<Value>,
    since: Option<String>,
    until: Option<String>,
}

impl ActivityQuery {
    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .insert_present("fields", self.fields.clone())
            .insert_opt("limit", self.limit)
            .insert_present("after", self.after.clone())
            .insert_present("before", self.before.clone());
        match self.time_range.clone().filter(is_present) {
            Some(range) => {
                params.insert_opt("time_range", Some(range));
            }
            None => {
                params
                    .insert_present("since", self.since.clone())
                    .insert_present("until", self.until.clone());
            }
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct AccountActivitiesArgs {
    act_id: Option<String>,
    #[serde(flatten)]
    query: ActivityQuery,
}

#[derive(Debug, Deserialize)]
struct AdsetActivitiesArgs {
    adset_id: String,
    #[serde(flatten)]
    query: ActivityQuery,
}

#[derive(Clone)]
pub struct ActivityManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
    resolver: AccountResolver,
}

impl ActivityManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        graph: GraphClient,
        resolver: AccountResolver,
    ) -> Self {
        Self {
            logger: logger.child("activities"),
            validation,
            graph,
            resolver,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let (parent, query) = match tool {
            "get_activities_by_adaccount" => {
                let args: AccountActivitiesArgs = self.validation.parse_args(tool, args)?;
                let act_id = self.resolver.resolve(args.act_id.as_deref()).await?;
                (act_id, args.query)
            }
            "get_activities_by_adset" => {
                let args: AdsetActivitiesArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.adset_id, "adset_id")?;
                (id, args.query)
            }
            _ => return Err(unknown_tool_error("activity", tool, ACTIVITY_TOOLS)),
        };
        let params = query.to_params();
        self.logger.debug(
            "Listing activities",
            Some(&serde_json::json!({"parent": parent, "params": params.redacted()})),
        );
        self.graph
            .get(&format!("{}/activities", parent), params)
            .await
    }
}

#[async_trait]
impl ToolHandler for ActivityManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
