//! # Clock Specification
//!
//! The tick source itself is external (a PLL on the target board). The
//! core only needs its frequency, to turn nanosecond requests into tick
//! counts and to scale exported waveforms.
//!
//! The accepted range, 16..=275 MHz, is what the iCE40 PLL can synthesize
//! from a 12 MHz reference.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lowest supported clock frequency in MHz.
pub const MIN_MHZ: u32 = 16;
/// Highest supported clock frequency in MHz.
pub const MAX_MHZ: u32 = 275;
/// Clock frequency used when none is configured.
pub const DEFAULT_MHZ: u32 = 60;

/// Frequency of the single clock domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ClockSpec {
    mhz: u32,
}

impl ClockSpec {
    /// Clock running at `mhz` megahertz.
    pub fn from_mhz(mhz: u32) -> Result<Self, ConfigError> {
        if !(MIN_MHZ..=MAX_MHZ).contains(&mhz) {
            return Err(ConfigError::FrequencyOutOfRange {
                mhz,
                min: MIN_MHZ,
                max: MAX_MHZ,
            });
        }
        Ok(Self { mhz })
    }

    /// Clock with the given period. The frequency is `floor(1000 / period_ns)`
    /// MHz, so periods that do not divide 1000 evenly round the clock down.
    pub fn from_period_ns(period_ns: f64) -> Result<Self, ConfigError> {
        if !period_ns.is_finite() || period_ns <= 0.0 {
            return Err(ConfigError::InvalidPeriod(period_ns));
        }
        let mhz = (1.0e3 / period_ns).floor();
        if mhz > f64::from(u32::MAX) {
            return Err(ConfigError::FrequencyOutOfRange {
                mhz: u32::MAX,
                min: MIN_MHZ,
                max: MAX_MHZ,
            });
        }
        Self::from_mhz(mhz as u32)
    }

    /// Frequency in MHz.
    pub fn mhz(&self) -> u32 {
        self.mhz
    }

    /// Tick period in picoseconds, rounded to the nearest picosecond.
    pub fn period_ps(&self) -> u64 {
        let mhz = u64::from(self.mhz);
        (1_000_000 + mhz / 2) / mhz
    }

    /// Convert a time in nanoseconds to whole ticks, truncating.
    ///
    /// `index` is only used to label the error.
    pub fn ns_to_cycles(&self, index: usize, ns: f64) -> Result<i64, ConfigError> {
        if !ns.is_finite() || ns < 0.0 {
            return Err(ConfigError::InvalidTime { index, value: ns });
        }
        let ticks = (ns * f64::from(self.mhz) / 1.0e3).floor();
        if ticks > i64::MAX as f64 {
            return Err(ConfigError::DurationOverflow {
                index,
                value: i64::MAX,
                max: crate::timing::MAX_DURATION,
            });
        }
        Ok(ticks as i64)
    }

    /// Time in nanoseconds covered by `ticks` ticks.
    pub fn cycles_to_ns(&self, ticks: u64) -> f64 {
        ticks as f64 * 1.0e3 / f64::from(self.mhz)
    }
}

impl Default for ClockSpec {
    fn default() -> Self {
        Self { mhz: DEFAULT_MHZ }
    }
}

impl TryFrom<u32> for ClockSpec {
    type Error = ConfigError;

    fn try_from(mhz: u32) -> Result<Self, Self::Error> {
        Self::from_mhz(mhz)
    }
}

impl From<ClockSpec> for u32 {
    fn from(c: ClockSpec) -> u32 {
        c.mhz
    }
}

impl std::fmt::Display for ClockSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} MHz", self.mhz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_enforced() {
        assert!(ClockSpec::from_mhz(15).is_err());
        assert!(ClockSpec::from_mhz(16).is_ok());
        assert!(ClockSpec::from_mhz(275).is_ok());
        assert!(matches!(
            ClockSpec::from_mhz(276),
            Err(ConfigError::FrequencyOutOfRange { mhz: 276, .. })
        ));
    }

    #[test]
    fn period_truncates_to_whole_mhz() {
        assert_eq!(ClockSpec::from_period_ns(10.0).unwrap().mhz(), 100);
        assert_eq!(ClockSpec::from_period_ns(3.7).unwrap().mhz(), 270);
        assert_eq!(ClockSpec::from_period_ns(16.0).unwrap().mhz(), 62);
    }

    #[test]
    fn period_must_be_positive() {
        assert_eq!(ClockSpec::from_period_ns(0.0), Err(ConfigError::InvalidPeriod(0.0)));
        assert!(ClockSpec::from_period_ns(-1.0).is_err());
        assert!(ClockSpec::from_period_ns(f64::NAN).is_err());
        // 100 ns is 10 MHz, below the PLL range.
        assert!(ClockSpec::from_period_ns(100.0).is_err());
    }

    #[test]
    fn ns_conversion_truncates() {
        let clock = ClockSpec::from_mhz(204).unwrap();
        // 15 ns at 204 MHz is 3.06 ticks.
        assert_eq!(clock.ns_to_cycles(0, 15.0).unwrap(), 3);
        let clock = ClockSpec::from_mhz(100).unwrap();
        assert_eq!(clock.ns_to_cycles(0, 250.0).unwrap(), 25);
        assert_eq!(clock.ns_to_cycles(0, 5.0).unwrap(), 0);
    }

    #[test]
    fn ns_conversion_rejects_negative() {
        let clock = ClockSpec::default();
        assert_eq!(
            clock.ns_to_cycles(3, -1.0),
            Err(ConfigError::InvalidTime { index: 3, value: -1.0 })
        );
    }

    #[test]
    fn period_in_picoseconds() {
        assert_eq!(ClockSpec::from_mhz(100).unwrap().period_ps(), 10_000);
        assert_eq!(ClockSpec::from_mhz(60).unwrap().period_ps(), 16_667);
        assert!((ClockSpec::from_mhz(100).unwrap().cycles_to_ns(25) - 250.0).abs() < 1e-9);
    }
}
