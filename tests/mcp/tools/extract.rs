use keysift::mcp::{KeysiftMcpServer, types::ExtractKeyParams};
use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::{CALL_CHAIN_KEY, CALL_CHAIN_PAYLOAD, McpTestFixture, extract_tool_result_json};

#[tokio::test]
async fn test_extract_key_from_file() {
    let fixture = McpTestFixture::new().unwrap();
    let path = fixture.write_payload("payload.js", CALL_CHAIN_PAYLOAD).unwrap();
    let server = KeysiftMcpServer::new();

    let params = Parameters(ExtractKeyParams {
        source_path: Some(path.clone()),
        source_text: None,
        project_root_path: None,
    });

    let result = server.extract_key(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["source"], path);
    assert_eq!(json_result["success"], true);
    assert_eq!(json_result["key"], CALL_CHAIN_KEY);
    assert_eq!(json_result["strategy"], "callConcatenation");
    assert_eq!(json_result["confidence"], "high");
    assert_eq!(json_result["diagnostics"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_extract_key_from_inline_text() {
    let fixture = McpTestFixture::new().unwrap();
    let server = KeysiftMcpServer::new();

    let params = Parameters(ExtractKeyParams {
        source_path: None,
        source_text: Some(CALL_CHAIN_PAYLOAD.to_string()),
        project_root_path: Some(fixture.root()),
    });

    let result = server.extract_key(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["source"], "<inline>");
    assert_eq!(json_result["key"], CALL_CHAIN_KEY);
}

#[tokio::test]
async fn test_extract_key_failure_is_not_a_tool_error() {
    let fixture = McpTestFixture::new().unwrap();
    let server = KeysiftMcpServer::new();

    let params = Parameters(ExtractKeyParams {
        source_path: None,
        source_text: Some("var unrelated = 1;".to_string()),
        project_root_path: Some(fixture.root()),
    });

    let result = server.extract_key(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["success"], false);
    assert!(json_result.get("key").is_none());
    let diagnostics = json_result["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 5);
    assert!(
        diagnostics
            .iter()
            .all(|d| d["outcome"]["status"] == "rejected")
    );
}

#[tokio::test]
async fn test_extract_key_honors_config() {
    let fixture = McpTestFixture::new().unwrap();
    fixture
        .write_config(&json!({ "strategies": { "callConcatenation": false } }))
        .unwrap();
    let path = fixture.write_payload("payload.js", CALL_CHAIN_PAYLOAD).unwrap();
    let server = KeysiftMcpServer::new();

    let params = Parameters(ExtractKeyParams {
        source_path: Some(path),
        source_text: None,
        project_root_path: None,
    });

    let result = server.extract_key(params).await.unwrap();
    let json_result = extract_tool_result_json(&result);

    assert_eq!(json_result["success"], false);
    assert_eq!(
        json_result["diagnostics"][0]["outcome"]["status"],
        "disabled"
    );
}

#[tokio::test]
async fn test_extract_key_requires_exactly_one_source() {
    let server = KeysiftMcpServer::new();

    let neither = Parameters(ExtractKeyParams {
        source_path: None,
        source_text: None,
        project_root_path: None,
    });
    assert!(server.extract_key(neither).await.is_err());

    let both = Parameters(ExtractKeyParams {
        source_path: Some("a.js".to_string()),
        source_text: Some("".to_string()),
        project_root_path: None,
    });
    assert!(server.extract_key(both).await.is_err());
}

#[tokio::test]
async fn test_extract_key_missing_file_is_error() {
    let fixture = McpTestFixture::new().unwrap();
    let server = KeysiftMcpServer::new();

    let params = Parameters(ExtractKeyParams {
        source_path: Some(fixture.root_path().join("missing.js").display().to_string()),
        source_text: None,
        project_root_path: None,
    });

    assert!(server.extract_key(params).await.is_err());
}
