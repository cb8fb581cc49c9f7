use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::TempDir;

mod tools;

/// Payload whose key is assembled from a chain of accessor calls.
pub const CALL_CHAIN_PAYLOAD: &str = r#"
var p1 = () => "Ab3$";
var p2 = () => { return "Cd5%"; };
var p3 = () => { return "Ef7&" + "Gh9*"; };
var assemble = () => { return p1() + p2() + p3(); };
"#;

pub const CALL_CHAIN_KEY: &str = "Ab3$Cd5%Ef7&Gh9*";

/// Test fixture for MCP integration tests
///
/// Manages a temporary directory holding payloads and an optional
/// `.keysiftrc.json`.
pub struct McpTestFixture {
    _temp_dir: TempDir,
    project_root: PathBuf,
}

impl McpTestFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_root = temp_dir.path().canonicalize()?;
        // Keep config lookup inside the fixture.
        fs::create_dir(project_root.join(".git"))?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_root,
        })
    }

    /// Write a payload file and return its absolute path as a string.
    pub fn write_payload(&self, relative_path: &str, content: &str) -> Result<String> {
        let path = self.project_root.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write payload: {}", path.display()))?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Write a .keysiftrc.json config file
    pub fn write_config(&self, content: &Value) -> Result<()> {
        let path = self.project_root.join(".keysiftrc.json");
        let json_str = serde_json::to_string_pretty(content)?;
        fs::write(&path, format!("{}\n", json_str))?;
        Ok(())
    }

    /// Get the project root path as a string (for MCP parameters)
    pub fn root(&self) -> String {
        self.project_root.to_string_lossy().to_string()
    }

    pub fn root_path(&self) -> &Path {
        &self.project_root
    }
}

/// Extract JSON from CallToolResult
pub fn extract_tool_result_json(result: &rmcp::model::CallToolResult) -> Value {
    if let Some(true) = result.is_error {
        panic!("Tool call returned an error: {:?}", result);
    }

    assert!(
        !result.content.is_empty(),
        "Tool result should have content"
    );

    let content_item = &result.content[0];
    let text_content = content_item
        .as_text()
        .expect("Tool result content should be text");

    serde_json::from_str(&text_content.text).expect("Tool result should be valid JSON")
}
