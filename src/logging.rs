use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging.
///
/// `RUST_LOG` controls verbosity; when unset, this crate logs at `info`
/// and everything else stays quiet.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roi_report=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
