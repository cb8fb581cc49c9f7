use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use tracing::debug;

use crate::{
    config::load_config,
    core::Cascade,
    report::PayloadReport,
};

use super::types::{ConfigDto, ConfigValues, ExtractKeyParams, GetConfigParams};

#[derive(Clone)]
pub struct KeysiftMcpServer {
    tool_router: ToolRouter<Self>,
}

impl Default for KeysiftMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl KeysiftMcpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Run the extraction cascade on one payload
    #[tool(
        description = "Recover the decryption key from an obfuscated script payload, given as a file path or inline text. Returns the key, the strategy that found it, and the diagnostic trail."
    )]
    pub async fn extract_key(
        &self,
        params: Parameters<ExtractKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        let ExtractKeyParams {
            source_path,
            source_text,
            project_root_path,
        } = params.0;

        let (label, text, default_root) = match (source_path, source_text) {
            (Some(path), None) => {
                let text = fs::read(&path)
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .map_err(|e| {
                        McpError::invalid_params(format!("Failed to read {}: {}", path, e), None)
                    })?;
                let root = Path::new(&path)
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                (path, text, root)
            }
            (None, Some(text)) => {
                let root = env::current_dir().unwrap_or_default();
                ("<inline>".to_string(), text, root)
            }
            _ => {
                return Err(McpError::invalid_params(
                    "Provide exactly one of sourcePath and sourceText",
                    None,
                ));
            }
        };

        let root = project_root_path.map(PathBuf::from).unwrap_or(default_root);
        let config = load_config(&root)
            .map_err(|e| McpError::internal_error(format!("Failed to load config: {}", e), None))?
            .config;
        debug!(source = %label, "extract_key");

        let result = Cascade::new(config).extract(&text);
        let report = PayloadReport::new(label, &result);

        let json_str = serde_json::to_string_pretty(&report).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(json_str)]))
    }

    /// Get effective configuration
    #[tool(
        description = "Get the effective keysift configuration (thresholds, route marker, enabled strategies) for a directory."
    )]
    pub async fn get_config(
        &self,
        params: Parameters<GetConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = Path::new(&params.0.project_root_path);

        let result = load_config(path)
            .map_err(|e| McpError::internal_error(format!("Failed to load config: {}", e), None))?;

        let config_dto = ConfigDto {
            from_file: result.from_file,
            config: ConfigValues::from(result.config),
        };

        let json_str = serde_json::to_string_pretty(&config_dto).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(json_str)]))
    }
}

#[tool_handler]
impl ServerHandler for KeysiftMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "keysift MCP recovers decryption keys from obfuscated script payloads by static analysis.\n\n\
                 Available tools:\n\
                 1. extract_key - Run the strategy cascade on a payload file or inline text\n\
                 2. get_config - Get the effective configuration for a directory\n\n\
                 A failed extraction is not an error: the result has success=false and lists\n\
                 why each strategy was rejected, which usually points at the pattern that changed."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Entry point for MCP server
pub fn run_server() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let service = KeysiftMcpServer::new();
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
            Ok(())
        })
}
