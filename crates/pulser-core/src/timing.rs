//! # Timing Newtypes: Validated Tick Counts
//!
//! A tick is one cycle of the single clock domain and the only unit of time
//! inside the core. Durations are [`Cycles`], a non-zero tick count.
//! An ordered train of them is a [`DurationList`].
//!
//! ## Validation
//!
//! Both types validate at construction. A [`DurationList`] is never empty,
//! and each entry is at least one tick. A zero duration has no meaningful
//! "fire immediately" reading for a registered primitive, so it is rejected
//! rather than guessed at. Downstream code (the stage chain, the gateware
//! emitter) takes these types and never re-checks.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest duration a single stage counter accepts.
pub const MAX_DURATION: u32 = u32::MAX;

/// A positive number of clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Cycles(NonZeroU32);

impl Cycles {
    /// One tick, the shortest possible stage.
    pub const ONE: Cycles = Cycles(NonZeroU32::MIN);

    /// Create a tick count, returning `None` for zero.
    pub fn new(ticks: u32) -> Option<Self> {
        NonZeroU32::new(ticks).map(Self)
    }

    /// The tick count.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for Cycles {
    type Error = ConfigError;

    fn try_from(ticks: u32) -> Result<Self, Self::Error> {
        Self::new(ticks).ok_or(ConfigError::ZeroCycles)
    }
}

impl From<Cycles> for u32 {
    fn from(c: Cycles) -> u32 {
        c.get()
    }
}

impl std::fmt::Display for Cycles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, non-empty list of stage durations.
///
/// Entry `i` is the number of ticks between toggle `i - 1` and toggle `i`.
/// The first entry is the delay after the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u32>")]
pub struct DurationList(Vec<Cycles>);

impl DurationList {
    /// Validate raw tick counts.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyDurations`] for an empty slice.
    /// - [`ConfigError::NonPositiveDuration`] for the first entry below 1.
    /// - [`ConfigError::DurationOverflow`] for the first entry above
    ///   [`MAX_DURATION`].
    pub fn new(raw: &[i64]) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::EmptyDurations);
        }
        let mut stages = Vec::with_capacity(raw.len());
        for (index, &value) in raw.iter().enumerate() {
            if value < 1 {
                return Err(ConfigError::NonPositiveDuration { index, value });
            }
            let ticks = u32::try_from(value).map_err(|_| ConfigError::DurationOverflow {
                index,
                value,
                max: MAX_DURATION,
            })?;
            // value >= 1 was checked above.
            stages.push(Cycles::new(ticks).ok_or(ConfigError::NonPositiveDuration { index, value })?);
        }
        Ok(Self(stages))
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the durations in order.
    pub fn iter(&self) -> impl Iterator<Item = Cycles> + '_ {
        self.0.iter().copied()
    }

    /// Sum of all durations: ticks from trigger to the last toggle.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|c| u64::from(c.get())).sum()
    }

    /// Offsets, relative to the trigger tick, at which the output toggles.
    ///
    /// These are the running sums `d0`, `d0 + d1`, ..., `sum(d)`.
    pub fn toggle_offsets(&self) -> Vec<u64> {
        self.0
            .iter()
            .scan(0u64, |acc, c| {
                *acc += u64::from(c.get());
                Some(*acc)
            })
            .collect()
    }

    /// Output level after every stage has toggled once, starting from `initial`.
    pub fn final_level(&self, initial: bool) -> bool {
        initial ^ (self.0.len() % 2 == 1)
    }
}

impl TryFrom<Vec<i64>> for DurationList {
    type Error = ConfigError;

    fn try_from(raw: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<DurationList> for Vec<u32> {
    fn from(list: DurationList) -> Vec<u32> {
        list.0.into_iter().map(Cycles::get).collect()
    }
}
