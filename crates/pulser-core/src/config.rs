//! # Pulse-Train Configuration
//!
//! The configuration layer turns user input (a YAML/JSON file, command-line
//! flags, or both) into a [`ResolvedTrain`], which is what the sequence
//! builder and the gateware emitter consume.
//!
//! ```yaml
//! clock_mhz: 204
//! unit: ns
//! durations: [5, 15, 15, 15]
//! initial_level: false
//! allow_odd: false
//! trigger:
//!   mode: gated
//!   padding: 12
//! ```
//!
//! Resolution is where every configuration error surfaces. A resolved
//! train always has a non-empty list of positive tick counts and a valid
//! clock. Its trigger window, when gated, covers the whole train.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::ClockSpec;
use crate::error::{ConfigError, PulserError};
use crate::timing::DurationList;

/// Ticks added to the gate window beyond the length of the train.
///
/// A gate window that closes exactly on the last toggle can drop the
/// enable before the final edge is driven out; the extra ticks keep the
/// chain enabled until the output has settled.
pub const DEFAULT_GATE_PADDING: u32 = 12;

/// Unit of the values in [`PulseTrainConfig::durations`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Values are clock ticks.
    #[default]
    Cycles,
    /// Values are nanoseconds, truncated to whole ticks at the configured clock.
    Ns,
}

/// How the trigger line reaches the chain, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TriggerConfig {
    /// The raw input line enables and arms the chain.
    Direct,
    /// An edge gate debounces the input and holds the enable for a window.
    Gated {
        /// Ticks added to the train length to size the window.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        padding: Option<u32>,
        /// Explicit window length; overrides `padding`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block: Option<u32>,
    },
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::Gated {
            padding: None,
            block: None,
        }
    }
}

/// Resolved trigger wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TriggerSource {
    /// The raw input line is the shared trigger.
    Direct,
    /// An edge gate with a `block`-tick window drives the shared trigger.
    Gated {
        /// Blocking window in ticks.
        block: u32,
    },
}

impl TriggerSource {
    /// Gate sized to cover `durations` plus `padding` ticks.
    pub fn padded(durations: &DurationList, padding: u32) -> Result<Self, ConfigError> {
        let block = durations.total() + u64::from(padding);
        let block = u32::try_from(block).map_err(|_| ConfigError::TotalOverflow { max: u32::MAX })?;
        Ok(Self::Gated { block })
    }

    /// Gate with an explicit window, which must cover the whole train.
    pub fn with_block(durations: &DurationList, block: u32) -> Result<Self, ConfigError> {
        let total = durations.total();
        if u64::from(block) < total {
            return Err(ConfigError::GateWindowTooShort { block, total });
        }
        Ok(Self::Gated { block })
    }
}

/// Pulse-train configuration as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseTrainConfig {
    /// Clock frequency in MHz. Mutually exclusive with `period_ns`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_mhz: Option<u32>,
    /// Clock period in ns. Mutually exclusive with `clock_mhz`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_ns: Option<f64>,
    /// Unit of `durations`.
    pub unit: TimeUnit,
    /// Time before each output toggle; the first is the delay after the trigger.
    pub durations: Vec<f64>,
    /// Output level before the first toggle and whenever the trigger is low.
    pub initial_level: bool,
    /// Trigger wiring.
    pub trigger: TriggerConfig,
    /// Accept an odd number of stages, leaving the output inverted at the end.
    pub allow_odd: bool,
}

/// A validated pulse train, ready to be elaborated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrain {
    /// Stage durations in ticks.
    pub durations: DurationList,
    /// The clock the durations are counted in.
    pub clock: ClockSpec,
    /// Output level before the first toggle.
    pub initial_level: bool,
    /// Trigger wiring.
    pub trigger: TriggerSource,
}

impl PulseTrainConfig {
    /// Load a configuration file. YAML and JSON are both accepted.
    pub fn from_path(path: &Path) -> Result<Self, PulserError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), stages = config.durations.len(), "loaded pulse-train configuration");
        Ok(config)
    }

    /// Resolve the clock this configuration names.
    pub fn clock(&self) -> Result<ClockSpec, ConfigError> {
        match (self.clock_mhz, self.period_ns) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingClock),
            (Some(mhz), None) => ClockSpec::from_mhz(mhz),
            (None, Some(period)) => ClockSpec::from_period_ns(period),
            (None, None) => Ok(ClockSpec::default()),
        }
    }

    /// Validate the configuration into a [`ResolvedTrain`].
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: a bad clock, an empty or non-positive duration
    /// (after unit conversion), an odd stage count without `allow_odd`, or
    /// a gate window that does not cover the train.
    pub fn resolve(&self) -> Result<ResolvedTrain, ConfigError> {
        let clock = self.clock()?;

        let mut raw = Vec::with_capacity(self.durations.len());
        for (index, &value) in self.durations.iter().enumerate() {
            let ticks = match self.unit {
                TimeUnit::Cycles => whole_cycles(index, value)?,
                TimeUnit::Ns => clock.ns_to_cycles(index, value)?,
            };
            raw.push(ticks);
        }
        let durations = DurationList::new(&raw)?;

        if !self.allow_odd && durations.len() % 2 == 1 {
            return Err(ConfigError::OddStageCount(durations.len()));
        }

        let trigger = match self.trigger {
            TriggerConfig::Direct => TriggerSource::Direct,
            TriggerConfig::Gated { block: Some(block), .. } => {
                TriggerSource::with_block(&durations, block)?
            }
            TriggerConfig::Gated { padding, block: None } => {
                TriggerSource::padded(&durations, padding.unwrap_or(DEFAULT_GATE_PADDING))?
            }
        };

        tracing::debug!(
            clock = %clock,
            stages = durations.len(),
            total_ticks = durations.total(),
            "resolved pulse train"
        );

        Ok(ResolvedTrain {
            durations,
            clock,
            initial_level: self.initial_level,
            trigger,
        })
    }
}

fn whole_cycles(index: usize, value: f64) -> Result<i64, ConfigError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ConfigError::FractionalCycles { index, value });
    }
    if value > i64::MAX as f64 || value < i64::MIN as f64 {
        return Err(ConfigError::DurationOverflow {
            index,
            value: if value > 0.0 { i64::MAX } else { i64::MIN },
            max: crate::timing::MAX_DURATION,
        });
    }
    Ok(value as i64)
}
