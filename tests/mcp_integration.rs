//! Integration tests for the MCP session: lifecycle, catalogue and tool calls.

use facebook_ads_mcp::graph::MockAdsApi;
use facebook_ads_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use facebook_ads_mcp::mcp::server::{McpServer, ServerState};
use facebook_ads_mcp::tools::Dispatcher;
use serde_json::{json, Value};

async fn send(server: &mut McpServer<MockAdsApi>, message: Value) -> Option<Value> {
    server
        .handle_line(&message.to_string())
        .await
        .map(|reply| serde_json::to_value(reply).unwrap())
}

async fn ready_server(mock: &MockAdsApi) -> McpServer<MockAdsApi> {
    let mut server = McpServer::new(Dispatcher::new(mock.clone(), "act_1"));
    let reply = send(
        &mut server,
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply["result"]["serverInfo"]["name"], "facebook-ads-mcp");
    assert_eq!(server.state(), ServerState::Initialising);

    let none = send(
        &mut server,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await;
    assert!(none.is_none());
    server
}

async fn call(server: &mut McpServer<MockAdsApi>, id: i64, name: &str, arguments: Value) -> Value {
    let reply = send(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply["id"], id);
    reply["result"].clone()
}

// =============================================================================
// Protocol parsing
// =============================================================================

#[test]
fn string_and_integer_ids() {
    let msg = parse_message(r#"{"jsonrpc":"2.0","id":"req-7","method":"ping"}"#).unwrap();
    assert_eq!(msg.id(), Some(&RequestId::String("req-7".to_string())));

    let IncomingMessage::Request(req) =
        parse_message(r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"x"}}"#)
            .unwrap()
    else {
        panic!("expected a request");
    };
    assert_eq!(req.id, RequestId::Number(8));
    assert_eq!(req.params.unwrap()["name"], "x");
}

#[test]
fn missing_version_is_rejected() {
    assert!(parse_message(r#"{"id":1,"method":"ping"}"#).is_err());
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn catalogue_advertises_schemas() {
    let mock = MockAdsApi::new();
    let mut server = ready_server(&mock).await;

    let reply = send(&mut server, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await
        .unwrap();
    let tools = reply["result"]["tools"].as_array().unwrap();
    let create = tools
        .iter()
        .find(|t| t["name"] == "create_ad_set")
        .expect("create_ad_set listed");
    assert_eq!(
        create["inputSchema"]["required"],
        json!(["campaignId", "name", "billingEvent", "optimizationGoal", "targeting"])
    );
    assert!(tools.iter().any(|t| t["name"] == "ads_management_overview"));
}

#[tokio::test]
async fn create_then_list_flow() {
    let mock = MockAdsApi::with_responses(vec![
        Ok(json!({"id": "c-1"})),
        Ok(json!({"data": [{"id": "c-1", "name": "Launch", "daily_budget": "1234"}]})),
    ]);
    let mut server = ready_server(&mock).await;

    let created = call(
        &mut server,
        2,
        "create_campaign",
        json!({"name": "Launch", "objective": "OUTCOME_AWARENESS", "dailyBudget": 12.34}),
    )
    .await;
    assert!(created.get("isError").is_none());
    let text = created["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["data"]["id"], "c-1");
    assert_eq!(envelope["data"]["dailyBudget"], json!(12.34));

    let listed = call(&mut server, 3, "list_campaigns", json!({})).await;
    let envelope: Value =
        serde_json::from_str(listed["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["data"][0]["dailyBudget"], json!(12.34));
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn failed_tools_report_is_error() {
    let mock = MockAdsApi::new();
    let mut server = ready_server(&mock).await;

    let result = call(
        &mut server,
        4,
        "create_ad_set",
        json!({
            "campaignId": "c-1", "name": "S", "billingEvent": "IMPRESSIONS",
            "optimizationGoal": "REACH", "targeting": {"geo_locations": {"countries": ["US"]}}
        }),
    )
    .await;
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["content"][0]["text"],
        "Either dailyBudget or lifetimeBudget must be set"
    );

    let result = call(&mut server, 5, "no_such_tool", json!({})).await;
    assert_eq!(result["isError"], true);
    assert_eq!(result["content"][0]["text"], "Unknown tool: no_such_tool");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn overview_needs_no_api() {
    let mock = MockAdsApi::new();
    let mut server = ready_server(&mock).await;
    let result = call(&mut server, 6, "ads_management_overview", Value::Null).await;
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("create_campaign"));
    assert_eq!(mock.call_count(), 0);
}
