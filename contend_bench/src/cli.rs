// Command-line surface of the contend binary
use crate::render::OutputFormat;
use clap::builder::RangedU64ValueParser;
use clap::error::ErrorKind;
use clap::Parser;
use contend_core::config::{DEFAULT_INCREMENTS, DEFAULT_ITERATIONS, DEFAULT_WORKERS};
use contend_core::{BenchConfig, TestFilter};

#[derive(Parser, Debug, Clone)]
#[command(name = "contend")]
#[command(
    about = "Compare processes and threads incrementing a shared counter, with and without locking"
)]
#[command(version)]
pub struct Cli {
    /// Number of workers
    #[arg(short = 'w', value_name = "NUM", default_value_t = DEFAULT_WORKERS,
          value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub workers: usize,

    /// Increments per worker
    #[arg(short = 'i', value_name = "NUM", default_value_t = DEFAULT_INCREMENTS,
          value_parser = RangedU64ValueParser::<u64>::new().range(1..))]
    pub increments: u64,

    /// Test iterations
    #[arg(short = 'r', value_name = "NUM", default_value_t = DEFAULT_ITERATIONS,
          value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub iterations: usize,

    /// Only run process tests
    #[arg(short = 'p')]
    pub processes_only: bool,

    /// Only run thread tests
    #[arg(short = 't')]
    pub threads_only: bool,

    /// Only run tests with synchronization
    #[arg(short = 's')]
    pub sync_only: bool,

    /// Only run tests without synchronization
    #[arg(short = 'n')]
    pub unsync_only: bool,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log per-worker progress to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_config(&self) -> BenchConfig {
        BenchConfig {
            workers: self.workers,
            increments: self.increments,
            iterations: self.iterations,
            filter: TestFilter {
                processes_only: self.processes_only,
                threads_only: self.threads_only,
                sync_only: self.sync_only,
                unsync_only: self.unsync_only,
            },
        }
    }
}

/// Process exit status for a parse failure: 0 for help/version, 1 otherwise
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
