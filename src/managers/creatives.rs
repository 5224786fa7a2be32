use crate::constants::edges::DEFAULT_LIMIT;
use crate::errors::ToolError;
use crate::managers::{node_params, EdgeArgs};
use crate::services::graph::GraphClient;
use crate::services::logger::Logger;
use crate::services::params::QueryParams;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const CREATIVE_TOOLS: &[&str] = &["get_ad_creative_by_id", "get_ad_creatives_by_ad_id"];

#[derive(Debug, Deserialize)]
struct CreativeArgs {
    creative_id: String,
    fields: Option<Vec<String>>,
    thumbnail_width: Option<i64>,
    thumbnail_height: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreativesByAdArgs {
    ad_id: String,
    fields: Option<Vec<String>>,
    limit: Option<i64>,
    after: Option<String>,
    before: Option<String>,
    date_format: Option<String>,
}

#[derive(Clone)]
pub struct CreativeManager {
    logger: Logger,
    validation: Validation,
    graph: GraphClient,
}

impl CreativeManager {
    pub fn new(logger: Logger, validation: Validation, graph: GraphClient) -> Self {
        Self {
            logger: logger.child("creatives"),
            validation,
            graph,
        }
    }

    pub async fn handle_action(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_ad_creative_by_id" => self.creative(args).await,
            "get_ad_creatives_by_ad_id" => self.creatives_by_ad(args).await,
            _ => Err(unknown_tool_error("creative", tool, CREATIVE_TOOLS)),
        }
    }

    async fn creative(&self, args: Value) -> Result<Value, ToolError> {
        let args: CreativeArgs = self.validation.parse_args("get_ad_creative_by_id", args)?;
        let id = self
            .validation
            .ensure_node_id(&args.creative_id, "creative_id")?;
        let mut params = node_params(args.fields);
        params
            .insert_present("thumbnail_width", args.thumbnail_width)
            .insert_present("thumbnail_height", args.thumbnail_height);
        self.graph.get(&id, params).await
    }

    async fn creatives_by_ad(&self, args: Value) -> Result<Value, ToolError> {
        let args: CreativesByAdArgs =
            self.validation.parse_args("get_ad_creatives_by_ad_id", args)?;
        let id = self.validation.ensure_node_id(&args.ad_id, "ad_id")?;
        let edge = EdgeArgs {
            fields: args.fields,
            limit: args.limit,
            after: args.after,
            before: args.before,
            date_format: args.date_format,
            ..EdgeArgs::default()
        };
        let mut params = QueryParams::new();
        edge.apply(&mut params, Some(DEFAULT_LIMIT));
        self.logger.debug("Listing ad creatives", Some(&serde_json::json!({"ad_id": id})));
        self.graph.get(&format!("{}/adcreatives", id), params).await
    }
}

#[async_trait]
impl ToolHandler for CreativeManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.handle_action(tool, args).await
    }
}
