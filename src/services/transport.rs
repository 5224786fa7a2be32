use crate::errors::ToolError;
use crate::services::params::QueryParams;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// One GET against the Graph API. Implementations fail on non-2xx status
/// and on bodies that are not JSON.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    async fn get(&self, url: &str, params: &QueryParams) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ToolError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("fb-ads-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GraphTransport for ReqwestTransport {
    async fn get(&self, url: &str, params: &QueryParams) -> Result<Value, ToolError> {
        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(&params.to_pairs());
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let error_body = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|parsed| parsed.get("error").cloned());
            let message = error_body
                .as_ref()
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(|message| format!("Graph API returned {}: {}", status.as_u16(), message))
                .unwrap_or_else(|| format!("Graph API returned {}", status.as_u16()));
            return Err(ToolError::remote(message).with_details(serde_json::json!({
                "status": status.as_u16(),
                "error": error_body,
            })));
        }

        serde_json::from_str(&body).map_err(|err| {
            ToolError::remote(format!("Graph API returned a malformed JSON body: {}", err))
                .with_details(serde_json::json!({"status": status.as_u16()}))
        })
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::timeout("HTTP request timed out");
    }
    // reqwest errors render the URL, which may carry the token.
    ToolError::remote(err.without_url().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sends_query_and_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v22.0/me")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("access_token".into(), "tok".into()),
                mockito::Matcher::UrlEncoded("fields".into(), "adaccounts{name}".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"1"}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new().expect("client");
        let mut params = QueryParams::with_access_token("tok");
        params.set("fields", "adaccounts{name}");
        let body = transport
            .get(&format!("{}/v22.0/me", server.url()), &params)
            .await
            .expect("ok");
        assert_eq!(body["id"], "1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_remote_error_with_graph_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v22.0/act_1")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new().expect("client");
        let err = transport
            .get(
                &format!("{}/v22.0/act_1", server.url()),
                &QueryParams::with_access_token("bad"),
            )
            .await
            .expect_err("400");
        assert_eq!(err.code, "REMOTE_CALL_FAILED");
        let details = err.details.expect("details");
        assert_eq!(details["status"], 400);
        assert_eq!(details["error"]["code"], 190);
        assert!(err.message.contains("Invalid OAuth access token."));
    }

    #[tokio::test]
    async fn malformed_body_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let transport = ReqwestTransport::new().expect("client");
        let err = transport
            .get(&format!("{}/page", server.url()), &QueryParams::new())
            .await
            .expect_err("not json");
        assert_eq!(err.code, "REMOTE_CALL_FAILED");
    }
}
