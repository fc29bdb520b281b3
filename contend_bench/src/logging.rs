// Logging setup for the contend binary
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "contend=warn,contend_bench=warn,contend_core=warn";
const VERBOSE_FILTER: &str = "contend=debug,contend_bench=debug,contend_core=debug";

/// Install the global subscriber; `RUST_LOG` wins over `verbose`
///
/// Must run before any worker is forked so children inherit it.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logging already initialised: {}", e);
    }
}
