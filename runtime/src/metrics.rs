//! Store metric names and descriptions.
//!
//! The store records through the `metrics` facade. Nothing is exported from
//! this crate; a host application that installs a recorder gets these series
//! for free, and calls [`describe_store_metrics`] once to attach help texts.

use metrics::{describe_counter, describe_gauge, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Actions accepted by the store
pub const COMMANDS_TOTAL: &str = "store.commands.total";

/// Actions rejected because the store is shutting down
pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";

/// Reducer wall time per action
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Effects returned per action
pub const EFFECTS_COUNT: &str = "store.effects.count";

/// Effects executed, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Effects currently in flight
pub const EFFECTS_IN_FLIGHT: &str = "store.effects.in_flight";

/// Register descriptions for every store metric.
pub fn describe_store_metrics() {
    describe_counter!(COMMANDS_TOTAL, "Total number of actions dispatched to the store");
    describe_counter!(
        SHUTDOWN_REJECTED,
        "Actions rejected because the store was shutting down"
    );
    describe_histogram!(REDUCER_DURATION, "Time taken to run the reducer for one action");
    describe_histogram!(EFFECTS_COUNT, "Number of effects returned by the reducer per action");
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects executed, by type");
    describe_gauge!(EFFECTS_IN_FLIGHT, "Effects (requests) currently awaiting a response");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_without_recorder_is_noop() {
        // No recorder installed: describing must not panic
        describe_store_metrics();
    }

    #[test]
    fn test_metric_names_are_namespaced() {
        for name in [
            COMMANDS_TOTAL,
            SHUTDOWN_REJECTED,
            REDUCER_DURATION,
            EFFECTS_COUNT,
            EFFECTS_EXECUTED,
            EFFECTS_IN_FLIGHT,
        ] {
            assert!(name.starts_with("store."), "{name} should be namespaced");
        }
    }
}
