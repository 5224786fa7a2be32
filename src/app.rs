use crate::constants::graph::BASE_URL;
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::tool_catalog;
use crate::mcp::server::McpServer;
use crate::services::config::{CliOverrides, ConfigSources, EnvSnapshot};
use crate::services::graph::GraphClient;
use crate::services::logger::Logger;
use crate::services::resolver::AccountResolver;
use crate::services::session::Session;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::transport::{GraphTransport, ReqwestTransport};
use crate::services::validation::Validation;
use std::collections::HashMap;
use std::sync::Arc;

/// Knobs for building the app. Tests swap in a scripted transport, a fixed
/// environment and a local base URL.
#[derive(Default)]
pub struct AppOptions {
    pub cli: CliOverrides,
    pub env: Option<EnvSnapshot>,
    pub transport: Option<Arc<dyn GraphTransport>>,
    pub base_url: Option<String>,
}

pub struct App {
    pub logger: Logger,
    pub config: Arc<ConfigSources>,
    pub session: Arc<Session>,
    pub resolver: AccountResolver,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let catalog = tool_catalog();
        let mut missing: Vec<String> = catalog
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        let mut unlisted: Vec<String> = handlers
            .keys()
            .filter(|name| !catalog.iter().any(|tool| &tool.name == *name))
            .cloned()
            .collect();
        if catalog.is_empty() {
            missing.push("(tool_catalog.json is empty or invalid)".to_string());
        }
        if missing.is_empty() && unlisted.is_empty() {
            return Ok(());
        }
        missing.sort();
        unlisted.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "Every tool in tool_catalog.json needs a handler, and every handler a catalog entry.",
            )
            .with_details(serde_json::json!({
                "missing_tools": missing,
                "unlisted_handlers": unlisted,
            })))
    }

    pub fn initialize(options: AppOptions) -> Result<Self, ToolError> {
        let logger = Logger::new("fb-ads-mcp");
        let validation = Validation::new();

        let env = options.env.unwrap_or_else(EnvSnapshot::capture);
        let config = Arc::new(ConfigSources::new(logger.clone(), env, options.cli));
        let session = Arc::new(Session::new(logger.clone(), config.clone()));
        let transport: Arc<dyn GraphTransport> = match options.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let base_url = options.base_url.as_deref().unwrap_or(BASE_URL);
        let graph = GraphClient::new(logger.clone(), transport, session.clone(), base_url);
        let resolver = AccountResolver::new(logger.clone(), session.clone(), graph.clone());

        let account_manager: Arc<dyn ToolHandler> =
            Arc::new(managers::accounts::AccountManager::new(
                logger.clone(),
                validation.clone(),
                graph.clone(),
                resolver.clone(),
            ));
        let insights_manager: Arc<dyn ToolHandler> =
            Arc::new(managers::insights::InsightsManager::new(
                logger.clone(),
                validation.clone(),
                graph.clone(),
                resolver.clone(),
            ));
        let creative_manager: Arc<dyn ToolHandler> =
            Arc::new(managers::creatives::CreativeManager::new(
                logger.clone(),
                validation.clone(),
                graph.clone(),
            ));
        let ad_manager: Arc<dyn ToolHandler> = Arc::new(managers::ads::AdManager::new(
            logger.clone(),
            validation.clone(),
            graph.clone(),
            resolver.clone(),
        ));
        let adset_manager: Arc<dyn ToolHandler> = Arc::new(managers::adsets::AdsetManager::new(
            logger.clone(),
            validation.clone(),
            graph.clone(),
            resolver.clone(),
        ));
        let campaign_manager: Arc<dyn ToolHandler> =
            Arc::new(managers::campaigns::CampaignManager::new(
                logger.clone(),
                validation.clone(),
                graph.clone(),
                resolver.clone(),
            ));
        let activity_manager: Arc<dyn ToolHandler> =
            Arc::new(managers::activities::ActivityManager::new(
                logger.clone(),
                validation.clone(),
                graph.clone(),
                resolver.clone(),
            ));

        let families: [(&[&str], &Arc<dyn ToolHandler>); 7] = [
            (managers::accounts::ACCOUNT_TOOLS, &account_manager),
            (managers::insights::INSIGHTS_TOOLS, &insights_manager),
            (managers::creatives::CREATIVE_TOOLS, &creative_manager),
            (managers::ads::AD_TOOLS, &ad_manager),
            (managers::adsets::ADSET_TOOLS, &adset_manager),
            (managers::campaigns::CAMPAIGN_TOOLS, &campaign_manager),
            (managers::activities::ACTIVITY_TOOLS, &activity_manager),
        ];
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for (tools, handler) in families {
            for tool in tools {
                handlers.insert((*tool).to_string(), handler.clone());
            }
        }

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));

        Ok(Self {
            logger,
            config,
            session,
            resolver,
            tool_executor,
        })
    }

    pub fn mcp_server(&self) -> Arc<McpServer> {
        Arc::new(McpServer::new(
            self.logger.clone(),
            self.tool_executor.clone(),
        ))
    }
}
