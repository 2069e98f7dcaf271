//! # Trigger Stimulus
//!
//! A periodic trigger waveform for driving a chain in simulation: the line
//! goes high at `start`, stays high for `hold` ticks, and optionally
//! repeats every `period` ticks.

use serde::{Deserialize, Serialize};

/// A rectangular, optionally repeating trigger waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stimulus {
    /// First tick on which the trigger is high.
    pub start: u64,
    /// Number of consecutive high ticks per assertion.
    pub hold: u64,
    /// Ticks between successive rising edges; `None` asserts once.
    pub period: Option<u64>,
}

impl Stimulus {
    /// A single assertion.
    pub fn once(start: u64, hold: u64) -> Self {
        Self {
            start,
            hold,
            period: None,
        }
    }

    /// An assertion repeating every `period` ticks.
    pub fn repeating(start: u64, hold: u64, period: u64) -> Self {
        Self {
            start,
            hold,
            period: Some(period),
        }
    }

    /// Trigger level on `tick`.
    pub fn level_at(&self, tick: u64) -> bool {
        if tick < self.start {
            return false;
        }
        let offset = tick - self.start;
        let phase = match self.period {
            Some(period) if period > 0 => offset % period,
            _ => offset,
        };
        phase < self.hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_assertion() {
        let s = Stimulus::once(3, 4);
        let levels: Vec<bool> = (0..9).map(|t| s.level_at(t)).collect();
        assert_eq!(
            levels,
            vec![false, false, false, true, true, true, true, false, false]
        );
    }

    #[test]
    fn repeating_assertion() {
        let s = Stimulus::repeating(3, 13, 22);
        assert!(s.level_at(15));
        assert!(!s.level_at(16));
        assert!(!s.level_at(24));
        assert!(s.level_at(25));
        assert!(s.level_at(47));
        assert!(!s.level_at(46));
    }

    #[test]
    fn hold_longer_than_period_stays_high() {
        let s = Stimulus::repeating(0, 10, 5);
        assert!((0..30).all(|t| s.level_at(t)));
    }
}
