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

pub const CAMPAIGN_TOOLS: &[&str] = &["get_campaign_by_id", "get_campaigns_by_adaccount"];

#[derive(Debug, Deserialize)]
struct CampaignArgs {
    campaign_id: String,
    fields: Option<Vec<String>>,
    date_format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CampaignsByAccountArgs {
    act_id: Option<String>,
    #[serde(flatten)]
    edge: EdgeArgs,
    #[serde(flatten)]
    window: WindowArgs,
    is_completed: Option<bool>,
    special_ad_categories: Option<Vec<String>>,
    objective: Option<Vec<String>>,
    buyer_guarantee_agreement_status: Option<Vec<String>>,
    include_drafts: Option<bool>,
}

#[derive(Clone)]
pub struct CampaignManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
    resolver: AccountResolver,
}

impl CampaignManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        graph: GraphClient,
        resolver: AccountResolver,
    ) -> Self {
        Self {
            logger: logger.child("campaigns"),
            validation,
            graph,
            resolver,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_campaign_by_id" => {
                let args: CampaignArgs = self.validation.parse_args(tool, args)?;
                let id = self.validation.ensure_node_id(&args.campaign_id, "campaign_id")?;
                let mut params = node_params(args.fields);
                params.insert_present("date_format", args.date_format);
                self.graph.get(&id, params).await
            }
            "get_campaigns_by_adaccount" => self.by_account(args).await,
            _ => Err(unknown_tool_error("campaign", tool, CAMPAIGN_TOOLS)),
        }
    }

    async fn by_account(&self, args: Value) -> Result<Value, ToolError> {
        let args: CampaignsByAccountArgs =
            self.validation.parse_args("get_campaigns_by_adaccount", args)?;
        let act_id = self.resolver.resolve(args.act_id.as_deref()).await?;

        let mut params = QueryParams::new();
        args.edge.apply(&mut params, Some(DEFAULT_LIMIT));
        args.window.apply(&mut params);
        // The two flags are tri-state: false is a real filter.
        params
            .insert_opt("is_completed", args.is_completed)
            .insert_present("special_ad_categories", args.special_ad_categories)
            .insert_present("objective", args.objective)
            .insert_present(
                "buyer_guarantee_agreement_status",
                args.buyer_guarantee_agreement_status,
            )
            .insert_opt("include_drafts", args.include_drafts);

        self.logger.debug(
            "Listing campaigns",
            Some(&serde_json::json!({"act_id": act_id, "params": params.redacted()})),
        );
        self.graph.get(&format!("{}/campaigns", act_id), params).await
    }
}

#[async_trait]
impl ToolHandler for CampaignManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
