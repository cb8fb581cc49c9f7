//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Recover the key from one or more payloads
//! - `scan`: Show what the scanner sees in a payload
//! - `init`: Initialize keysift configuration file
//! - `serve`: Start MCP server for AI integration

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::StrategyKind;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Scan(cmd)) => cmd.common.verbose,
            Some(Command::Init) | Some(Command::Serve) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Payload files, directories of scripts, or `-` for stdin
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the JSON report to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip a strategy. Can be specified multiple times:
    /// --disable fallback --disable api-trace
    #[arg(long, value_enum)]
    pub disable: Vec<StrategyKind>,

    /// Minimum key length (overrides config file)
    #[arg(long)]
    pub min_key_len: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Payload file, or `-` for stdin
    pub input: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recover the decryption key from obfuscated payloads
    Extract(ExtractCommand),
    /// List candidate arrays, functions and call chains found in a payload
    Scan(ScanCommand),
    /// Initialize a new .keysiftrc.json configuration file
    Init,
    /// Start MCP server for AI coding agents
    Serve,
}
