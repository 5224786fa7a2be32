use crate::constants::limits::LOG_STRING_MAX;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::params::QueryParams;
use crate::services::session::Session;
use crate::services::transport::GraphTransport;
use crate::utils::redact::redact_text;
use serde_json::Value;
use std::sync::Arc;

/// Graph API access on behalf of the session: URL building, token
/// injection and failure logging around a [`GraphTransport`].
#[derive(Clone)]
pub struct GraphClient {
    logger: Logger,
    transport: Arc<dyn GraphTransport>,
    session: Arc<Session>,
    base_url: String,
}

impl GraphClient {
    pub fn new(
        logger: Logger,
        transport: Arc<dyn GraphTransport>,
        session: Arc<Session>,
        base_url: &str,
    ) -> Self {
        Self {
            logger: logger.child("graph"),
            transport,
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// `<base>/<path>`; an empty path addresses the batch root `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticated GET of `path` relative to the API root.
    pub async fn get(&self, path: &str, params: QueryParams) -> Result<Value, ToolError> {
        let token = self.session.access_token().await?;
        self.get_with_token(path, &token, params).await
    }

    /// Same as [`get`](Self::get) for callers already holding the session
    /// lock.
    pub async fn get_with_token(
        &self,
        path: &str,
        token: &str,
        params: QueryParams,
    ) -> Result<Value, ToolError> {
        let mut query = QueryParams::with_access_token(token);
        query.merge(params);
        self.request(&self.endpoint(path), &query).await
    }

    /// GET of a fully qualified URL that already carries its credentials,
    /// such as a `paging.next` link.
    pub async fn fetch_url(&self, url: &str) -> Result<Value, ToolError> {
        self.request(url, &QueryParams::new()).await
    }

    pub async fn request(&self, url: &str, params: &QueryParams) -> Result<Value, ToolError> {
        self.logger.debug(
            "GET",
            Some(&serde_json::json!({
                "url": redact_text(url, LOG_STRING_MAX),
                "query": params.redacted_query_string(),
            })),
        );
        match self.transport.get(url, params).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.logger.error(
                    "Graph API request failed",
                    Some(&serde_json::json!({
                        "url": redact_text(url, LOG_STRING_MAX),
                        "params": params.redacted(),
                        "code": err.code,
                        "error": redact_text(&err.message, LOG_STRING_MAX),
                    })),
                );
                Err(err)
            }
        }
    }
}
