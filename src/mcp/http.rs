use crate::constants::http::{ALLOWED_ORIGIN, BIND_HOST, HEALTH_PATH, MCP_PATH};
use crate::errors::ToolError;
use crate::mcp::server::{McpServer, SERVER_NAME, SERVER_VERSION};
use crate::services::logger::Logger;
use crate::services::session::Session;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

#[derive(Clone)]
pub struct HttpState {
    server: Arc<McpServer>,
    session: Arc<Session>,
    logger: Logger,
}

/// Only the marketplace origin is echoed back. Credentials are allowed, so
/// methods and headers are mirrored rather than wildcarded.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([HeaderValue::from_static(ALLOWED_ORIGIN)]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn router(server: Arc<McpServer>, session: Arc<Session>, logger: Logger) -> Router {
    let state = HttpState {
        server,
        session,
        logger: logger.child("http"),
    };
    Router::new()
        .route(MCP_PATH, post(handle_mcp))
        .route(HEALTH_PATH, get(handle_health))
        .layer(middleware::from_fn_with_state(state.clone(), prime_token))
        .layer(cors_layer())
        .with_state(state)
}

/// Picks up a token from `MCP_CONFIG` before each request. Never fails the
/// request; tools report the missing credential themselves.
async fn prime_token(State(state): State<HttpState>, request: Request, next: Next) -> Response {
    if !state.session.prime_from_config().await {
        state.logger.debug("No access token available yet", None);
    }
    next.run(request).await
}

async fn handle_mcp(State(state): State<HttpState>, body: String) -> Response {
    match state.server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_health(State(state): State<HttpState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "logs": state.logger.stats(),
    }))
}

pub async fn serve(app: Router, port: u16, logger: &Logger) -> Result<(), ToolError> {
    let addr = SocketAddr::from((BIND_HOST, port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        ToolError::internal(format!("Failed to bind {}: {}", addr, err))
    })?;
    logger.info(
        "Serving MCP over HTTP",
        Some(&serde_json::json!({ "addr": addr.to_string(), "path": MCP_PATH })),
    );
    axum::serve(listener, app).await?;
    Ok(())
}
