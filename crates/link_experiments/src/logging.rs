//! Tracing subscriber setup for the sweep binary.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Directive that turns on per-frame engine tracing.
pub const VERBOSE_DIRECTIVE: &str = "link_core=trace";

/// `RUST_LOG` (or [`DEFAULT_FILTER`]), raised to trace the engine when verbose.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if !verbose {
        return filter;
    }
    match VERBOSE_DIRECTIVE.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(verbose)
        .try_init();
}
