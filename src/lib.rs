//! keysift - static key extraction from obfuscated script payloads
//!
//! keysift is a CLI tool and library that recovers the decryption key an
//! obfuscated script computes internally, without executing it. A cascade of
//! structural heuristics (array indirection, accessor-call concatenation,
//! route and decrypt-call tracing) is tried in priority order until one
//! yields a key that passes validation.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (scanner, strategies, cascade)
//! - `input`: Payload discovery and loading
//! - `mcp`: Model Context Protocol server implementation
//! - `report`: JSON report shared by the CLI and the MCP server

pub mod cli;
pub mod config;
pub mod core;
pub mod input;
pub mod mcp;
pub mod report;
