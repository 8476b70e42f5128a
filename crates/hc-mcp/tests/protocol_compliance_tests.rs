//! MCP Protocol Compliance Integration Tests
//!
//! Tests that the MCP server correctly implements JSON-RPC 2.0 and
//! MCP protocol requirements, including ID preservation, error codes,
//! and end-to-end tool execution against a fake Home Connect backend.

use hc_mcp::HomeConnectMcpServer;
use hc_test_utils::MockHomeConnect;
use httpmock::Method::GET;
use rstest::rstest;
use serde_json::{Value, json};

/// Create an initialized server talking to the given fake upstream.
async fn setup_server(upstream: &MockHomeConnect) -> HomeConnectMcpServer {
    let mut server = HomeConnectMcpServer::new(&upstream.config()).unwrap();
    server.initialize().await.unwrap();
    server
}

async fn roundtrip(server: &HomeConnectMcpServer, request: &str) -> Value {
    serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap()
}

// ==========================================================================
// JSON-RPC 2.0 ID Preservation
// ==========================================================================

#[tokio::test]
async fn test_numeric_id_preserved_in_response() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":42,"method":"initialize","params":{}}"#,
    )
    .await;

    assert_eq!(response["id"], 42, "Numeric ID must be echoed back exactly");
    assert_eq!(response["jsonrpc"], "2.0");
}

#[tokio::test]
async fn test_string_id_preserved_in_response() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":"req-abc-123","method":"tools/list","params":{}}"#,
    )
    .await;

    assert_eq!(response["id"], "req-abc-123");
}

#[tokio::test]
async fn test_id_preserved_in_error_response() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":"err-test","method":"nonexistent/method","params":{}}"#,
    )
    .await;

    assert_eq!(
        response["id"], "err-test",
        "ID must be preserved even in error responses"
    );
    assert!(response.get("error").is_some());
}

// ==========================================================================
// Error Code Correctness
// ==========================================================================

#[tokio::test]
async fn test_method_not_found_returns_32601() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"completely/unknown","params":{}}"#,
    )
    .await;

    assert_eq!(response["error"]["code"], -32601);
    let msg = response["error"]["message"].as_str().unwrap();
    assert!(
        msg.contains("completely/unknown"),
        "Error message should include the unknown method name, got: {}",
        msg
    );
}

#[tokio::test]
async fn test_missing_method_field_is_parse_error() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let result = server
        .handle_message(r#"{"jsonrpc":"2.0","id":1,"params":{}}"#)
        .await;
    assert!(result.is_err(), "Missing 'method' field should fail deserialization");
}

#[rstest]
#[case(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":"not-an-object"}"#, json!(1))]
#[case(r#"{"jsonrpc":"2.0","id":"call-77","method":"tools/call","params":{"arguments":{}}}"#, json!("call-77"))]
#[tokio::test]
async fn test_malformed_tools_call_params_return_32602_with_id(
    #[case] request: &str,
    #[case] id: Value,
) {
    let upstream = MockHomeConnect::start().await;
    let any = upstream.mock_any().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(&server, request).await;

    assert_eq!(response["id"], id, "ID must be echoed for invalid params");
    assert_eq!(response["error"]["code"], -32602);
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_unknown_notification_gets_no_response() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let response = server
        .handle_message(r#"{"jsonrpc":"2.0","method":"vendor/heartbeat"}"#)
        .await
        .unwrap();

    assert!(response.is_empty(), "Notifications must not be answered");
}

#[tokio::test]
async fn test_unknown_tool_returns_32602_without_upstream_traffic() {
    let upstream = MockHomeConnect::start().await;
    let any = upstream.mock_any().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"open_door","arguments":{"haId":"X"}}}"#,
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
    assert!(
        response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("open_door")
    );
    any.assert_hits_async(0).await;
}

// ==========================================================================
// Protocol Version Negotiation
// ==========================================================================

#[tokio::test]
async fn test_initialize_returns_server_info() {
    let upstream = MockHomeConnect::start().await;
    let server = setup_server(&upstream).await;

    let request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;
    let response = roundtrip(&server, request).await;

    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "home-connect");
    let version = response["result"]["serverInfo"]["version"].as_str().unwrap();
    assert!(version.contains('.'), "Version should be semver-like, got: {}", version);
    assert!(response["result"]["capabilities"].get("tools").is_some());
}

// ==========================================================================
// Tool Listing
// ==========================================================================

#[tokio::test]
async fn test_tools_list_is_independent_of_credentials() {
    let upstream = MockHomeConnect::start().await;
    let mut bare = HomeConnectMcpServer::new(&upstream.config_with_tokens(None, None)).unwrap();
    bare.initialize().await.unwrap();
    let full = setup_server(&upstream).await;

    let request = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
    let with_tokens = roundtrip(&full, request).await;
    let without_tokens = roundtrip(&bare, request).await;

    assert_eq!(with_tokens["result"], without_tokens["result"]);
    let names: Vec<&str> = with_tokens["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "get_appliances",
            "get_appliance_status",
            "get_appliance_programs",
            "start_program",
            "stop_program",
            "get_settings",
            "update_setting",
            "get_auth_url",
        ]
    );
}

// ==========================================================================
// End-to-end Tool Execution
// ==========================================================================

#[tokio::test]
async fn test_tools_call_returns_pretty_printed_body() {
    let upstream = MockHomeConnect::start().await;
    let body = json!({
        "data": {
            "homeappliances": [
                { "haId": "SIEMENS-HCS01-1", "name": "Dishwasher", "connected": true }
            ]
        }
    });
    upstream
        .server()
        .mock_async(|when, then| {
            when.method(GET)
                .path(MockHomeConnect::api_path("/homeappliances"));
            then.status(200).json_body(body.clone());
        })
        .await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"get_appliances","arguments":{}}}"#,
    )
    .await;

    assert!(response["result"].get("isError").is_none());
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(text, serde_json::to_string_pretty(&body).unwrap());
    assert_eq!(response["result"]["content"][0]["type"], "text");
}

#[tokio::test]
async fn test_tools_call_upstream_failure_is_tool_error() {
    let upstream = MockHomeConnect::start().await;
    upstream
        .server()
        .mock_async(|when, then| {
            when.method(GET)
                .path(MockHomeConnect::api_path("/homeappliances/X/status"));
            then.status(404)
                .json_body(json!({ "error": { "key": "SDK.Error.HomeAppliance.Connection.Initialization.Failed" } }));
        })
        .await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"get_appliance_status","arguments":{"haId":"X"}}}"#,
    )
    .await;

    assert_eq!(response["id"], 8);
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Tool execution failed: Request failed with status code 404"));
}

#[tokio::test]
async fn test_tools_call_invalid_arguments_is_tool_error() {
    let upstream = MockHomeConnect::start().await;
    let any = upstream.mock_any().await;
    let server = setup_server(&upstream).await;

    let response = roundtrip(
        &server,
        r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"update_setting","arguments":{"haId":"X","settingKey":"K"}}}"#,
    )
    .await;

    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("missing required argument 'value'"));
    any.assert_hits_async(0).await;
}
