//! # Output Trace
//!
//! An ordered log of `(tick, trigger, level)` samples recorded while a
//! chain runs. This is the only artifact the core persists. It serializes
//! to JSON for inspection and to a minimal Value Change Dump for waveform
//! viewers.
//!
//! The VCD writer emits one timescale, two 1-bit wires (`trig_in`,
//! `pulse_out`), and a value change only when a wire actually changes.
//! Tick `n` is placed at `n * period` picoseconds relative to the first
//! sample.

use std::io::Write;

use serde::{Deserialize, Serialize};

use pulser_core::{ClockSpec, PulserError};

/// One recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceSample {
    /// Tick index since the chain was built or last reset.
    pub tick: u64,
    /// Raw trigger input on this tick.
    pub trigger: bool,
    /// Chain output level on this tick.
    pub level: bool,
}

/// An ordered log of samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    samples: Vec<TraceSample>,
}

const TRIGGER_ID: char = '!';
const OUTPUT_ID: char = '"';

impl Trace {
    /// An empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty trace with room for `ticks` samples.
    pub fn with_capacity(ticks: usize) -> Self {
        Self {
            samples: Vec::with_capacity(ticks),
        }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: TraceSample) {
        self.samples.push(sample);
    }

    /// All samples in tick order.
    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Output levels in tick order.
    pub fn levels(&self) -> Vec<bool> {
        self.samples.iter().map(|s| s.level).collect()
    }

    /// Ticks on which the output differs from the previous sample.
    pub fn toggles(&self) -> Vec<u64> {
        self.samples
            .windows(2)
            .filter(|w| w[0].level != w[1].level)
            .map(|w| w[1].tick)
            .collect()
    }

    /// Output level recorded on `tick`, if it was sampled.
    pub fn level_at(&self, tick: u64) -> Option<bool> {
        self.samples.iter().find(|s| s.tick == tick).map(|s| s.level)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PulserError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a trace previously written by [`Trace::to_json`].
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or when sample ticks are not strictly
    /// increasing.
    pub fn from_json(s: &str) -> Result<Self, PulserError> {
        let trace: Self = serde_json::from_str(s)?;
        if let Some(w) = trace.samples.windows(2).find(|w| w[1].tick <= w[0].tick) {
            return Err(PulserError::Serialization(format!(
                "trace tick {} follows tick {}; samples must be in increasing tick order",
                w[1].tick, w[0].tick
            )));
        }
        Ok(trace)
    }

    /// Write the trace as a Value Change Dump scaled to `clock`.
    pub fn write_vcd<W: Write>(&self, out: &mut W, clock: &ClockSpec) -> Result<(), PulserError> {
        writeln!(out, "$version pulser {} $end", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "$comment clock {clock} $end")?;
        writeln!(out, "$timescale 1ps $end")?;
        writeln!(out, "$scope module pulser $end")?;
        writeln!(out, "$var wire 1 {TRIGGER_ID} trig_in $end")?;
        writeln!(out, "$var wire 1 {OUTPUT_ID} pulse_out $end")?;
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;

        let Some(first) = self.samples.first() else {
            return Ok(());
        };
        let period = clock.period_ps();

        writeln!(out, "#0")?;
        writeln!(out, "$dumpvars")?;
        writeln!(out, "{}{TRIGGER_ID}", u8::from(first.trigger))?;
        writeln!(out, "{}{OUTPUT_ID}", u8::from(first.level))?;
        writeln!(out, "$end")?;

        let mut last = *first;
        for sample in &self.samples[1..] {
            if sample.trigger == last.trigger && sample.level == last.level {
                continue;
            }
            writeln!(out, "#{}", offset_ps(sample.tick, first.tick, period))?;
            if sample.trigger != last.trigger {
                writeln!(out, "{}{TRIGGER_ID}", u8::from(sample.trigger))?;
            }
            if sample.level != last.level {
                writeln!(out, "{}{OUTPUT_ID}", u8::from(sample.level))?;
            }
            last = *sample;
        }
        if let Some(end) = self.samples.last() {
            if end.tick != last.tick {
                let stop = offset_ps(end.tick, first.tick, period).saturating_add(period);
                writeln!(out, "#{stop}")?;
            }
        }
        Ok(())
    }

    /// Render the VCD into a string.
    pub fn to_vcd(&self, clock: &ClockSpec) -> Result<String, PulserError> {
        let mut buf = Vec::new();
        self.write_vcd(&mut buf, clock)?;
        String::from_utf8(buf).map_err(|e| PulserError::Serialization(e.to_string()))
    }
}

fn offset_ps(tick: u64, origin: u64, period: u64) -> u64 {
    tick.saturating_sub(origin).saturating_mul(period)
}

impl FromIterator<TraceSample> for Trace {
    fn from_iter<I: IntoIterator<Item = TraceSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(levels: &[(bool, bool)]) -> Trace {
        levels
            .iter()
            .enumerate()
            .map(|(t, &(trigger, level))| TraceSample {
                tick: t as u64,
                trigger,
                level,
            })
            .collect()
    }

    #[test]
    fn toggles_are_level_changes() {
        let t = trace(&[
            (false, false),
            (true, false),
            (true, true),
            (true, true),
            (true, false),
        ]);
        assert_eq!(t.toggles(), vec![2, 4]);
        assert_eq!(t.level_at(3), Some(true));
        assert_eq!(t.level_at(9), None);
    }

    #[test]
    fn json_keeps_sample_order() {
        let t = trace(&[(false, false), (true, true)]);
        let json = t.to_json().unwrap();
        assert!(json.contains("\"samples\""));
        let back = Trace::from_json(&json).unwrap();
        assert_eq!(back.samples()[1].tick, 1);
        assert!(back.samples()[1].level);
    }

    #[test]
    fn vcd_records_only_changes() {
        let t = trace(&[(false, false), (true, false), (true, true), (true, true), (false, false)]);
        let clock = ClockSpec::from_mhz(100).unwrap();
        let vcd = t.to_vcd(&clock).unwrap();
        assert!(vcd.contains("$timescale 1ps $end"));
        assert!(vcd.contains("$var wire 1 ! trig_in $end"));
        assert!(vcd.contains("$var wire 1 \" pulse_out $end"));
        assert!(vcd.contains("#10000\n1!\n"));
        assert!(vcd.contains("#20000\n1\"\n"));
        assert!(vcd.contains("#40000\n0!\n0\"\n"));
        assert!(!vcd.contains("#30000"));
    }

    #[test]
    fn empty_trace_has_header_only() {
        let vcd = Trace::new().to_vcd(&ClockSpec::default()).unwrap();
        assert!(vcd.ends_with("$enddefinitions $end\n"));
    }

    #[test]
    fn with_capacity_starts_empty() {
        let mut t = Trace::with_capacity(4);
        assert!(t.is_empty());
        t.push(TraceSample {
            tick: 0,
            trigger: true,
            level: false,
        });
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn out_of_order_json_rejected() {
        let json = r#"{"samples": [
            {"tick": 5, "trigger": true, "level": true},
            {"tick": 2, "trigger": false, "level": false}
        ]}"#;
        let err = Trace::from_json(json).unwrap_err();
        assert!(matches!(err, PulserError::Serialization(_)));
        assert!(err.to_string().contains("increasing tick order"), "{err}");

        let repeated = r#"{"samples": [
            {"tick": 1, "trigger": false, "level": false},
            {"tick": 1, "trigger": true, "level": true}
        ]}"#;
        assert!(Trace::from_json(repeated).is_err());
    }

    #[test]
    fn out_of_order_samples_still_render() {
        let t: Trace = [(5, true, true), (2, false, false), (3, false, false)]
            .into_iter()
            .map(|(tick, trigger, level)| TraceSample { tick, trigger, level })
            .collect();
        let vcd = t.to_vcd(&ClockSpec::from_mhz(100).unwrap()).unwrap();
        assert!(vcd.contains("#0\n0!\n0\"\n"), "{vcd}");
        assert!(vcd.contains("#10000\n"), "{vcd}");
    }
}
