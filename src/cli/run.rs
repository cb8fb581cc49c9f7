use std::process::ExitCode;

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{extract::extract, init::init, scan::scan},
    exit_status::ExitStatus,
};

/// Main entry point for the keysift CLI.
///
/// Dispatches to the appropriate command handler based on the parsed arguments.
/// `serve` is handled by the binary before this is called.
pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(Arguments { command }) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let status = match command {
        Some(Command::Extract(cmd)) => extract(cmd)?,
        Some(Command::Scan(cmd)) => scan(cmd)?,
        Some(Command::Init) => init()?,
        Some(Command::Serve) => {
            anyhow::bail!("Serve command should be handled before run_cli()")
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    };

    Ok(status.into())
}
