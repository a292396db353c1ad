//! Tracing setup for binaries and demos. The library itself only emits
//! events; installing a subscriber is the host's call.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "catalog_store=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`. Returns `false`
/// if a subscriber was already installed.
pub fn init() -> bool {
    init_with_default(DEFAULT_DIRECTIVES)
}

pub fn init_with_default(directives: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
