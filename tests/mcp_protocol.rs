mod common;
use common::{build_app, FakeTransport};

use fb_ads_mcp::errors::ToolError;
use serde_json::{json, Value};

async fn call(server: &fb_ads_mcp::mcp::server::McpServer, request: Value) -> Value {
    let response = server
        .handle_message(&request.to_string())
        .await
        .expect("response");
    serde_json::to_value(response).expect("json")
}

#[tokio::test]
async fn initialize_and_list_tools() {
    let transport = FakeTransport::new();
    let app = build_app(&transport, None);
    let server = app.mcp_server();

    let init = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(init["result"]["serverInfo"]["name"], "fb-ads-mcp");
    assert!(init["result"]["capabilities"].get("tools").is_some());

    let list = call(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let tools = list["result"]["tools"].as_array().expect("tools");
    assert_eq!(tools.len(), 22);
    assert!(tools
        .iter()
        .all(|tool| tool["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn unknown_method_and_parse_errors() {
    let transport = FakeTransport::new();
    let app = build_app(&transport, None);
    let server = app.mcp_server();

    let unknown = call(&server, json!({"jsonrpc": "2.0", "id": "x", "method": "resources/list"})).await;
    assert_eq!(unknown["id"], "x");
    assert_eq!(unknown["error"]["code"], -32601);

    let parse = serde_json::to_value(server.handle_message("{").await.expect("response"))
        .expect("json");
    assert_eq!(parse["error"]["code"], -32700);
    assert_eq!(parse["id"], Value::Null);
}

#[tokio::test]
async fn tool_results_are_wrapped_as_text_content() {
    let transport = FakeTransport::new();
    transport.route("ad1", json!({ "id": "ad1", "name": "Spring" }));
    let app = build_app(&transport, Some(json!({ "fbToken": "tok" })));
    let server = app.mcp_server();

    let reply = call(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 5, "method": "tools/call",
            "params": { "name": "get_ad_by_id", "arguments": { "ad_id": "ad1" } }
        }),
    )
    .await;
    let content = &reply["result"]["content"][0];
    assert_eq!(content["type"], "text");
    let payload: Value =
        serde_json::from_str(content["text"].as_str().expect("text")).expect("payload");
    assert_eq!(payload, json!({ "id": "ad1", "name": "Spring" }));
}

#[tokio::test]
async fn schema_rejects_unknown_arguments_before_dispatch() {
    let transport = FakeTransport::new();
    let app = build_app(&transport, Some(json!({ "fbToken": "tok" })));
    let server = app.mcp_server();

    let reply = call(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": { "name": "get_ads_by_campaign", "arguments": { "campaign_id": "1", "date_format": "U" } }
        }),
    )
    .await;
    assert_eq!(reply["error"]["code"], -32602);
    assert!(reply["error"]["message"]
        .as_str()
        .expect("message")
        .contains("unknown field 'date_format'"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn unknown_tool_suggests_close_names() {
    let transport = FakeTransport::new();
    let app = build_app(&transport, None);
    let server = app.mcp_server();

    let reply = call(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 7, "method": "tools/call",
            "params": { "name": "get_ad_by_idd", "arguments": {} }
        }),
    )
    .await;
    assert_eq!(reply["error"]["code"], -32600);
    let message = reply["error"]["message"].as_str().expect("message");
    assert!(message.contains("code: NOT_FOUND"), "{}", message);
    assert!(message.contains("get_ad_by_id"), "{}", message);
}

#[tokio::test]
async fn remote_failures_surface_status_details() {
    let transport = FakeTransport::new();
    transport.fail(
        "act_3",
        ToolError::remote("Graph API returned HTTP 400").with_details(json!({
            "status": 400,
            "error": { "error": { "message": "Invalid OAuth access token", "code": 190 } }
        })),
    );
    let app = build_app(&transport, Some(json!({ "fbToken": "tok" })));
    let server = app.mcp_server();

    let reply = call(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 8, "method": "tools/call",
            "params": { "name": "get_details_of_ad_account", "arguments": { "act_id": "act_3" } }
        }),
    )
    .await;
    assert_eq!(reply["error"]["code"], -32603);
    let message = reply["error"]["message"].as_str().expect("message");
    assert!(message.contains("code: REMOTE_CALL_FAILED"), "{}", message);
    assert!(message.contains("\"status\":400"), "{}", message);
}

#[tokio::test]
async fn notifications_are_silent() {
    let transport = FakeTransport::new();
    let app = build_app(&transport, None);
    let server = app.mcp_server();

    let out = server
        .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{}}"#)
        .await;
    assert!(out.is_none());
}
