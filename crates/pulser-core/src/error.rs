//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout pulser. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Configuration errors are raised at build time, before a single tick
//!   is simulated or a line of gateware is emitted. They carry the
//!   offending index and value so the caller can point at the bad input.
//! - Per-tick behavior never fails. Every input combination of a stage or
//!   gate has a defined next state, so there is no runtime error variant
//!   for the state machines.
//! - A trigger arriving at an already-armed stage is absorbed silently.
//!   It is documented behavior and has no error variant.

use thiserror::Error;

/// Top-level error type for pulser.
#[derive(Error, Debug)]
pub enum PulserError {
    /// The pulse-train configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PulserError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for PulserError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// A pulse-train configuration that cannot be elaborated.
///
/// Fatal and never retried: no partial chain is built when any of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The duration list has no entries.
    #[error("duration list is empty; a pulse train needs at least one stage")]
    EmptyDurations,

    /// A duration is zero or negative.
    #[error("duration at index {index} is {value}; every duration must be at least 1 tick")]
    NonPositiveDuration {
        /// Position in the duration list.
        index: usize,
        /// The rejected value, in ticks.
        value: i64,
    },

    /// A duration does not fit the stage counter.
    #[error("duration at index {index} is {value}; the stage counter holds at most {max} ticks")]
    DurationOverflow {
        /// Position in the duration list.
        index: usize,
        /// The rejected value, in ticks.
        value: i64,
        /// Largest accepted duration.
        max: u32,
    },

    /// The sum of all durations (plus gate padding) overflows the tick counter.
    #[error("total pulse-train length overflows the {max}-tick window counter")]
    TotalOverflow {
        /// Largest accepted window.
        max: u32,
    },

    /// Clock frequency outside what the clock source can produce.
    #[error("clock frequency {mhz} MHz is outside the supported range {min}..={max} MHz")]
    FrequencyOutOfRange {
        /// Requested frequency.
        mhz: u32,
        /// Lowest supported frequency.
        min: u32,
        /// Highest supported frequency.
        max: u32,
    },

    /// Clock period is not a positive finite number.
    #[error("clock period must be a positive number of nanoseconds, got {0}")]
    InvalidPeriod(f64),

    /// Both a frequency and a period were supplied.
    #[error("specify only one of clock frequency or clock period")]
    ConflictingClock,

    /// A nanosecond value is not a non-negative finite number.
    #[error("time at index {index} is {value} ns; times must be finite and non-negative")]
    InvalidTime {
        /// Position in the duration list.
        index: usize,
        /// The rejected value, in nanoseconds.
        value: f64,
    },

    /// A cycle count that is not a whole number.
    #[error("duration at index {index} is {value}; cycle counts must be whole numbers")]
    FractionalCycles {
        /// Position in the duration list.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// Odd stage counts leave the output inverted at the end of the train.
    #[error("pulse train has {0} stages; an even count is required so the output returns to its initial level (set allow_odd to override)")]
    OddStageCount(usize),

    /// A gated trigger window that closes before the train completes.
    #[error("gate blocking window of {block} ticks is shorter than the {total}-tick pulse train")]
    GateWindowTooShort {
        /// Configured blocking window.
        block: u32,
        /// Sum of all durations.
        total: u64,
    },

    /// A standalone cycle count of zero.
    #[error("a cycle count must be at least 1 tick")]
    ZeroCycles,

    /// A generated module name that is not a legal Verilog identifier.
    #[error("module name {0:?} is not a valid Verilog identifier")]
    InvalidModuleName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_duration_names_index_and_value() {
        let err = ConfigError::NonPositiveDuration { index: 2, value: 0 };
        let msg = err.to_string();
        assert!(msg.contains("index 2"), "{msg}");
        assert!(msg.contains("is 0"), "{msg}");
    }

    #[test]
    fn config_error_lifts_into_pulser_error() {
        let err: PulserError = ConfigError::EmptyDurations.into();
        assert!(matches!(err, PulserError::Config(ConfigError::EmptyDurations)));
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn serde_errors_become_serialization() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: PulserError = json_err.into();
        assert!(matches!(err, PulserError::Serialization(_)));
    }
}
