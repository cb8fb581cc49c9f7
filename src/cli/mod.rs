//! Command-line interface layer.

mod args;
mod commands;
mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, Command, CommonArgs, ExtractCommand, ScanCommand};
pub use exit_status::ExitStatus;
pub use run::run_cli;
