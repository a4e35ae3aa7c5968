use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "discord_gtk=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        if let Err(err) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
        {
            eprintln!("failed to install tracing subscriber: {err}");
        }
    });
}
