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

pub const AD_TOOLS: &[&str] = &[
    "get_ad_by_id",
    "get_ads_by_adaccount",
    "get_ads_by_campaign",
    "get_ads_by_adset",
];

#[derive(Debug, Deserialize)]
struct AdArgs {
    ad_id: String,
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AdsByAccountArgs {
    act_id: Option<String>,
    #[serde(flatten)]
    edge: EdgeArgs,
    #[serde(flatten)]
    window: WindowArgs,
}

#[derive(Debug, Deserialize)]
struct AdsByCampaignArgs {
    campaign_id: String,
    #[serde(flatten)]
    edge: EdgeArgs,
}

#[derive(Debug, Deserialize)]
struct AdsByAdsetArgs {
    adset_id: String,
    #[serde(flatten)]
    edge: EdgeArgs,
}

#[derive(Clone)]
pub struct AdManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
    resolver: AccountResolver,
}

impl AdManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        graph: GraphClient,
        resolver: AccountResolver,
    ) -> Self {
        Self {
            logger: logger.child("ads"),
            validation,
            graph,
            resolver,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_ad_by_id" => {
                let args: AdArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.ad_id, "ad_id")?;
                self.graph.get(&id, node_params(args.fields)).await
            }
            "get_ads_by_adaccount" => {
                let args: AdsByAccountArgs = self.validation.parse_args(tool, args)?;
                let act_id = self.resolver.resolve(args.act_id.as_deref()).await?;
                let mut params = QueryParams::new();
                args.edge.apply(&mut params, Some(DEFAULT_LIMIT));
                args.window.apply(&mut params);
                self.list(&act_id, params).await
            }
            "get_ads_by_campaign" => {
                let args: AdsByCampaignArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.campaign_id, "campaign_id")?;
                // No date_format on this edge.
                let edge = EdgeArgs {
                    date_format: None,
                    ..args.edge
                };
                let mut params = QueryParams::new();
                edge.apply(&mut params, Some(DEFAULT_LIMIT));
                self.list(&id, params).await
            }
            "get_ads_by_adset" => {
                let args: AdsByAdsetArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.adset_id, "adset_id")?;
                let mut params = QueryParams::new();
                args.edge.apply(&mut params, Some(DEFAULT_LIMIT));
                self.list(&id, params).await
            }
            _ => Err(unknown_tool_error("ad", tool, AD_TOOLS)),
        }
    }

    async fn list(&self, parent_id: &str, params: QueryParams) -> Result<Value, ToolError> {
        self.logger.debug(
            "Listing ads",
            Some(&serde_json::json!({"parent": parent_id, "params": params.redacted()})),
        );
        self.graph.get(&format!("{}/ads", parent_id), params).await
    }
}

#[async_trait]
impl ToolHandler for AdManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
