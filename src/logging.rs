//! Log output of the command line tool.
//!
//! Everything goes to stderr. `RUST_LOG` takes precedence over the level chosen
//! by command line flags:
//! ```bash
//! RUST_LOG=stowzip=trace stowzip -r out.zip dir
//! ```

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber, logging this crate up to `level`.
///
/// Call once at startup, later calls are ignored.
pub fn init(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn default_directive(level: Level) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), level.to_string().to_lowercase())
}
