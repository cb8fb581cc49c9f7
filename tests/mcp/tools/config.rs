use keysift::mcp::{KeysiftMcpServer, types::GetConfigParams};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::{McpTestFixture, extract_tool_result_json};

#[tokio::test]
async fn test_get_config_defaults() {
    let fixture = McpTestFixture::new().unwrap();
    let server = KeysiftMcpServer::new();

    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], false);
    assert_eq!(json_result["config"]["minKeyLen"], 10);
    assert_eq!(json_result["config"]["maxCallDepth"], 10);
    assert_eq!(
        json_result["config"]["routeMarker"],
        "/embed-1/v2/e-1/getSources?id="
    );
    assert_eq!(json_result["config"]["strategies"]["apiTrace"], true);
    assert!(json_result["config"]["ignores"].is_array());
}

#[tokio::test]
async fn test_get_config_from_keysiftrc() {
    let fixture = McpTestFixture::new().unwrap();
    fixture
        .write_config(&json!({
            "minKeyLen": 24,
            "routeMarker": "/api/sources?id=",
            "strategies": { "fallback": false }
        }))
        .unwrap();

    let server = KeysiftMcpServer::new();
    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], true);
    assert_eq!(json_result["config"]["minKeyLen"], 24);
    assert_eq!(json_result["config"]["routeMarker"], "/api/sources?id=");
    assert_eq!(json_result["config"]["strategies"]["fallback"], false);
    assert_eq!(json_result["config"]["strategies"]["cryptoTrace"], true);
}

#[tokio::test]
async fn test_get_config_found_in_parent() {
    let fixture = McpTestFixture::new().unwrap();
    fixture.write_config(&json!({ "minKeyLen": 12 })).unwrap();
    fixture.write_payload("nested/dir/a.js", "").unwrap();

    let server = KeysiftMcpServer::new();
    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root_path().join("nested/dir").display().to_string(),
    });

    let result = server.get_config(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["fromFile"], true);
    assert_eq!(json_result["config"]["minKeyLen"], 12);
}

#[tokio::test]
async fn test_get_config_invalid_file_is_error() {
    let fixture = McpTestFixture::new().unwrap();
    fixture.write_config(&json!({ "nineCallArity": 1 })).unwrap();

    let server = KeysiftMcpServer::new();
    let params = Parameters(GetConfigParams {
        project_root_path: fixture.root(),
    });

    assert!(server.get_config(params).await.is_err());
}
