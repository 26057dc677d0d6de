//! Log output for pages and native harnesses.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Installs a global `tracing` subscriber that prints to stderr.
///
/// Honours `RUST_LOG` (e.g. `RUST_LOG=airconsole_session=debug` to see
/// silenced and dropped traffic). Returns `false` if a global subscriber
/// was already installed, in which case nothing changes.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_second_call_returns_false() {
        init_tracing();
        assert!(!init_tracing());
    }
}
