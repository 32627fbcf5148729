//! Subscriber installation.
//!
//! Bridge, resolver and chat events go to stdout as one JSON object per
//! line, stamped with wall-clock time. `RUST_LOG` narrows or widens the
//! output; without it only `info` and above are kept, which covers logins,
//! refreshes and every tolerated storage or remote failure.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// [`init`] with a caller-chosen fallback filter, e.g. `"entbridge_client=debug"`
/// to follow token discovery and permission evaluation step by step.
pub fn init_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // The event target is the module path, which adds nothing for a
    // single-purpose client.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
