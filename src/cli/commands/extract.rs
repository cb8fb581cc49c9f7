use std::env;

use anyhow::{Result, bail};
use rayon::prelude::*;
use tracing::debug;

use super::super::args::ExtractCommand;
use super::super::exit_status::ExitStatus;
use super::super::report;
use crate::config::load_config;
use crate::core::Cascade;
use crate::input::load_payloads;
use crate::report::{ExtractionReport, PayloadReport};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let ExtractCommand {
        inputs,
        json,
        output,
        disable,
        min_key_len,
        common,
    } = cmd;

    let loaded = load_config(&env::current_dir()?)?;
    let mut config = loaded.config;
    debug!(from_file = loaded.from_file, "configuration loaded");
    for kind in disable {
        kind.disable(&mut config.strategies);
    }
    if let Some(min_key_len) = min_key_len {
        config.min_key_len = min_key_len;
    }
    config.validate()?;

    let payloads = load_payloads(&inputs, &config.ignores, common.verbose)?;
    if payloads.is_empty() {
        bail!("No payload files found");
    }

    let cascade = Cascade::new(config);
    let reports: Vec<PayloadReport> = payloads
        .par_iter()
        .map(|payload| {
            PayloadReport::new(payload.label.as_str(), &cascade.extract(&payload.text))
        })
        .collect();
    let report = ExtractionReport::new(reports);

    if let Some(path) = &output {
        report.write_to(path)?;
    }
    if json {
        println!("{}", report.to_json()?);
    } else {
        report::report(&report, common.verbose);
    }

    if report.failure_count() == 0 {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
