//! Model Context Protocol (MCP) server implementation.
//!
//! This module provides an MCP server that exposes keysift extraction to AI
//! assistants over stdio.
//!
//! ## Module Structure
//!
//! - `server`: Main MCP server implementation
//! - `types`: MCP-specific type definitions

mod server;
pub mod types;

pub use server::{KeysiftMcpServer, run_server};
