//! Opt-in tracing setup for hosts embedding `plot-controls`.
//!
//! Registry and backend events use the `plot_controls` target: `debug` when
//! controls are built or callbacks registered, `trace` once per update
//! cascade, `warn` when a change event has to be dropped.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "plot_controls=warn";

/// Filter that also prints a summary line for every update cascade.
pub const CASCADE_FILTER: &str = "plot_controls=trace";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, or by
/// `fallback` when the variable is unset or invalid.
///
/// Returns `false` when the `telemetry` feature is disabled or the host
/// already installed a global subscriber.
#[must_use]
pub fn init_tracing(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}

/// [`init_tracing`] with [`DEFAULT_FILTER`].
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::{CASCADE_FILTER, init_tracing};

    #[cfg(not(feature = "telemetry"))]
    #[test]
    fn setup_is_a_no_op_without_the_feature() {
        assert!(!init_tracing(CASCADE_FILTER));
    }

    #[cfg(feature = "telemetry")]
    #[test]
    fn second_install_reports_existing_subscriber() {
        let _ = init_tracing(CASCADE_FILTER);
        assert!(!init_tracing(CASCADE_FILTER));
    }
}
