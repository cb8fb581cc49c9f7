use std::env;

use anyhow::Result;

use super::super::args::ScanCommand;
use super::super::exit_status::ExitStatus;
use super::super::report::{ScanView, print_scan};
use crate::config::load_config;
use crate::core::Analysis;
use crate::input::load_payloads;

pub fn scan(cmd: ScanCommand) -> Result<ExitStatus> {
    let config = load_config(&env::current_dir()?)?.config;
    let payloads = load_payloads(
        std::slice::from_ref(&cmd.input),
        &config.ignores,
        cmd.common.verbose,
    )?;

    for payload in &payloads {
        let analysis = Analysis::new(&payload.text, &config);
        let composers = analysis.call_graph().composers();
        if payloads.len() > 1 {
            println!("{}", payload.label);
        }
        print_scan(
            &ScanView {
                scan: &analysis.scan,
                composers: &composers,
                mapping_sites: &analysis.mapping_sites,
            },
            cmd.common.verbose,
        );
    }

    Ok(ExitStatus::Success)
}
