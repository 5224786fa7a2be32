use crate::constants::insights::{LEVEL_ACCOUNT, LEVEL_AD, LEVEL_ADSET, LEVEL_CAMPAIGN};
use crate::errors::ToolError;
use crate::services::graph::GraphClient;
use crate::services::insights::InsightsArgs;
use crate::services::logger::Logger;
use crate::services::pagination::{drain_all, page_rows};
use crate::services::params::QueryParams;
use crate::services::resolver::AccountResolver;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const INSIGHTS_TOOLS: &[&str] = &[
    "get_adaccount_insights",
    "get_campaign_insights",
    "get_adset_insights",
    "get_ad_insights",
    "fetch_pagination_url",
];

#[derive(Debug, Deserialize)]
struct AccountInsightsArgs {
    act_id: Option<String>,
    #[serde(flatten)]
    query: InsightsArgs,
}

#[derive(Debug, Deserialize)]
struct CampaignInsightsArgs {
    campaign_id: String,
    #[serde(flatten)]
    query: InsightsArgs,
}

#[derive(Debug, Deserialize)]
struct AdsetInsightsArgs {
    adset_id: String,
    #[serde(flatten)]
    query: InsightsArgs,
}

#[derive(Debug, Deserialize)]
struct AdInsightsArgs {
    ad_id: String,
    #[serde(flatten)]
    query: InsightsArgs,
}

#[derive(Debug, Deserialize)]
struct PaginationUrlArgs {
    url: String,
}

/// Insights reads at every level of the account hierarchy. Results are
/// drained to the last page before they are returned.
#[derive(Clone)]
pub struct InsightsManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
    resolver: AccountResolver,
}

impl InsightsManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        graph: GraphClient,
        resolver: AccountResolver,
    ) -> Self {
        Self {
            logger: logger.child("insights"),
            validation,
            graph,
            resolver,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_adaccount_insights" => {
                let args: AccountInsightsArgs = self.validation.parse_args(tool, args)?;
                let act_id = self.resolver.resolve(args.act_id.as_deref()).await?;
                self.fetch(&act_id, &args.query, LEVEL_ACCOUNT).await
            }
            "get_campaign_insights" => {
                let args: CampaignInsightsArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.campaign_id, "campaign_id")?;
                self.fetch(&id, &args.query, LEVEL_CAMPAIGN).await
            }
            "get_adset_insights" => {
                let args: AdsetInsightsArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.adset_id, "adset_id")?;
                self.fetch(&id, &args.query, LEVEL_ADSET).await
            }
            "get_ad_insights" => {
                let args: AdInsightsArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.ad_id, "ad_id")?;
                self.fetch(&id, &args.query, LEVEL_AD).await
            }
            "fetch_pagination_url" => {
                let args: PaginationUrlArgs = self.validation.parse_args(tool, args)?;
                self.validation.ensure_http_url(&args.url, "url")?;
                self.graph.fetch_url(args.url.trim()).await
            }
            _ => Err(unknown_tool_error("insights", tool, INSIGHTS_TOOLS)),
        }
    }

    async fn fetch(
        &self,
        object_id: &str,
        query: &InsightsArgs,
        default_level: &str,
    ) -> Result<Value, ToolError> {
        let params = query.build_params(QueryParams::new(), default_level);
        let first = self
            .graph
            .get(&format!("{}/insights", object_id), params)
            .await?;
        let drained = drain_all(first, &self.graph).await?;
        self.logger.debug(
            "Insights drained",
            Some(&serde_json::json!({
                "object_id": object_id,
                "rows": page_rows(&drained).len(),
            })),
        );
        Ok(drained)
    }
}

#[async_trait]
impl ToolHandler for InsightsManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
