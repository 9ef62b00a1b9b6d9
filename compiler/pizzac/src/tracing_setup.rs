//! Tracing initialization.
//!
//! Controlled by environment variables: `PIZZA_LOG` (in `RUST_LOG`
//! syntax), falling back to `RUST_LOG`, defaulting to `warn`. Output is
//! compact and goes to stderr.

use std::sync::OnceLock;

use tracing_subscriber::{prelude::*, EnvFilter, Registry};

static INIT: OnceLock<()> = OnceLock::new();

/// Initialize the tracing subscriber. Only the first call takes effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("PIZZA_LOG")
            .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        Registry::default()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .with(filter)
            .init();
    });
}
