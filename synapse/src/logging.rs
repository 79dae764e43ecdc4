//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter, checked before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "SYNAPSE_LOG";

/// Directive used when neither variable is set
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Filter from `SYNAPSE_LOG`, then `RUST_LOG`, then [`DEFAULT_DIRECTIVE`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a formatting subscriber as the global default
///
/// Returns false, leaving the existing subscriber alone, when one is
/// already installed, so calling it more than once is harmless.
pub fn init() -> bool {
    fmt().with_env_filter(env_filter()).try_init().is_ok()
}
