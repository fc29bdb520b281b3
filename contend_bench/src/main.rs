use anyhow::Context;
use clap::Parser;
use colored::*;
use contend_bench::cli::{self, Cli};
use contend_bench::{logging, render};
use contend_core::Suite;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = cli::exit_code(&err);
            // clap renders help, version and usage-bearing errors itself
            let _ = err.print();
            process::exit(code);
        }
    };

    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Configuration errors stop the program before any test runs
    let suite = Suite::new(cli.to_config()).context("invalid configuration")?;

    let mut sink = render::sink_for(cli.format);
    let summary = suite.run(sink.as_mut());

    tracing::debug!(
        runs = summary.runs(),
        failures = summary.failures,
        incorrect = summary.incorrect(),
        "suite complete"
    );
    Ok(())
}
