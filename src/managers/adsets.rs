use crate::constants::edges::DEFAULT_LIMIT;
use crate::errors::ToolError;
use crate::managers::{node_params, EdgeArgs, WindowArgs};
use crate::services::graph::GraphClient;
use crate::services::logger::Logger;
use crate::services::params::QueryParams;
use crate::services::resolver::AccountResolver;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const ADSET_TOOLS: &[&str] = &[
    "get_adset_by_id",
    "get_adsets_by_ids",
    "get_adsets_by_adaccount",
    "get_adsets_by_campaign",
];

#[derive(Debug, Deserialize)]
struct AdsetArgs {
    adset_id: String,
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AdsetsByIdsArgs {
    adset_ids: Vec<String>,
    fields: Option<Vec<String>>,
    date_format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdsetsByAccountArgs {
    act_id: Option<String>,
    #[serde(flatten)]
    edge: EdgeArgs,
    #[serde(flatten)]
    window: WindowArgs,
}

#[derive(Debug, Deserialize)]
struct AdsetsByCampaignArgs {
    campaign_id: String,
    #[serde(flatten)]
    edge: EdgeArgs,
}

#[derive(Clone)]
pub struct AdsetManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
    resolver: AccountResolver,
}

impl AdsetManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        graph: GraphClient,
        resolver: AccountResolver,
    ) -> Self {
        Self {
            logger: logger.child("adsets"),
            validation,
            graph,
            resolver,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_adset_by_id" => {
                let args: AdsetArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.adset_id, "adset_id")?;
                self.graph.get(&id, node_params(args.fields)).await
            }
            "get_adsets_by_ids" => self.by_ids(args).await,
            "get_adsets_by_adaccount" => {
                let args: AdsetsByAccountArgs = self.validation.parse_args(tool, args)?;
                let act_id = self.resolver.resolve(args.act_id.as_deref()).await?;
                let mut params = QueryParams::new();
                args.edge.apply(&mut params, Some(DEFAULT_LIMIT));
                args.window.apply(&mut params);
                self.graph.get(&format!("{}/adsets", act_id), params).await
            }
            "get_adsets_by_campaign" => {
                let args: AdsetsByCampaignArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.campaign_id, "campaign_id")?;
                let mut params = QueryParams::new();
                args.edge.apply(&mut params, Some(DEFAULT_LIMIT));
                self.graph.get(&format!("{}/adsets", id), params).await
            }
            _ => Err(unknown_tool_error("ad set", tool, ADSET_TOOLS)),
        }
    }

    /// Batch read through the API root; the response is keyed by ad set id.
    async fn by_ids(&self, args: Value) -> Result<Value, ToolError> {
        let args: AdsetsByIdsArgs = self.validation.parse_args("get_adsets_by_ids", args)?;
        let ids = args
            .adset_ids
            .iter()
            .map(|id| self.validation.ensure_node_id(id, "adset_ids[]"))
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Err(ToolError::invalid_params("adset_ids must list at least one id"));
        }
        let mut params = node_params(args.fields);
        params
            .set("ids", ids.join(","))
            .insert_present("date_format", args.date_format);
        self.logger
            .debug("Batch ad set read", Some(&serde_json::json!({"count": ids.len()})));
        self.graph.get("", params).await
    }
}

#[async_trait]
impl ToolHandler for AdsetManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
