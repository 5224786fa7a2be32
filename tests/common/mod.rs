#![allow(dead_code)]

use async_trait::async_trait;
use fb_ads_mcp::app::{App, AppOptions};
use fb_ads_mcp::errors::ToolError;
use fb_ads_mcp::services::config::{CliOverrides, EnvSnapshot};
use fb_ads_mcp::services::params::QueryParams;
use fb_ads_mcp::services::transport::GraphTransport;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub const BASE_URL: &str = "https://graph.test/v22.0";

/// `<BASE_URL>/<path>`, or `path` itself when it is already absolute.
pub fn url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}/{}", BASE_URL, path)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub params: QueryParams,
}

/// Scripted Graph API: answers by exact URL and records every request.
/// Each request yields once before answering so concurrent callers
/// interleave.
#[derive(Default)]
pub struct FakeTransport {
    routes: std::sync::Mutex<HashMap<String, Result<Value, ToolError>>>,
    calls: std::sync::Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, path: &str, response: Value) {
        self.routes.lock().unwrap().insert(url(path), Ok(response));
    }

    pub fn fail(&self, path: &str, error: ToolError) {
        self.routes.lock().unwrap().insert(url(path), Err(error));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        let target = url(path);
        self.calls()
            .into_iter()
            .filter(|call| call.url == target)
            .collect()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("at least one request")
    }
}

#[async_trait]
impl GraphTransport for FakeTransport {
    async fn get(&self, url: &str, params: &QueryParams) -> Result<Value, ToolError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            params: params.clone(),
        });
        tokio::task::yield_now().await;
        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(ToolError::remote(format!("no scripted response for {}", url))))
    }
}

pub fn env_with_config(config: Option<Value>) -> EnvSnapshot {
    EnvSnapshot {
        mcp_config: config.map(|value| value.to_string()),
        ..EnvSnapshot::default()
    }
}

pub fn build_app_with(transport: &Arc<FakeTransport>, env: EnvSnapshot, cli: CliOverrides) -> App {
    let transport: Arc<dyn GraphTransport> = transport.clone();
    App::initialize(AppOptions {
        cli,
        env: Some(env),
        transport: Some(transport),
        base_url: Some(BASE_URL.to_string()),
    })
    .expect("app")
}

/// App whose `MCP_CONFIG` is `config` and whose command line is empty.
pub fn build_app(transport: &Arc<FakeTransport>, config: Option<Value>) -> App {
    build_app_with(transport, env_with_config(config), CliOverrides::default())
}
