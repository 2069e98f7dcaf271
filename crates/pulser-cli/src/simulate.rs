//! # Simulate: Drive a Chain and Record Its Output
//!
//! Asserts the trigger at `--trigger-at` for `--hold` ticks (optionally
//! repeating every `--repeat` ticks), runs the chain for `--ticks` ticks,
//! and writes the recorded trace as JSON or a Value Change Dump.
//!
//! ```bash
//! pulser simulate --direct --trigger-at 3 --hold 13 --repeat 22 --ticks 48 1 2 3 4
//! pulser simulate --format vcd --out train.vcd -f 100 5 5
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use pulser_core::ClockSpec;
use pulser_state::{PulseChain, Stimulus, Trace};

use crate::train::TrainArgs;

/// Extra ticks recorded after the train would have finished.
const TAIL_TICKS: u64 = 4;

/// Longest simulation accepted, in ticks.
pub const MAX_TICKS: u64 = 10_000_000;

/// Trace output format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceFormat {
    /// Pretty-printed JSON samples.
    #[default]
    Json,
    /// Value Change Dump for waveform viewers.
    Vcd,
}

/// Arguments for `pulser simulate`.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Tick on which the trigger first goes high.
    #[arg(long, default_value_t = 1)]
    pub trigger_at: u64,

    /// Ticks the trigger stays high. Defaults to the train length plus one.
    #[arg(long)]
    pub hold: Option<u64>,

    /// Re-assert the trigger every N ticks.
    #[arg(long, value_name = "N")]
    pub repeat: Option<u64>,

    /// Ticks to simulate. Defaults to enough to see the whole train.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Trace format.
    #[arg(long, value_enum, default_value_t = TraceFormat::Json)]
    pub format: TraceFormat,

    /// Write the trace to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl SimulateArgs {
    /// The trigger waveform these arguments describe for `chain`.
    pub fn stimulus(&self, chain: &PulseChain) -> Stimulus {
        let hold = self
            .hold
            .unwrap_or_else(|| chain.total_ticks().saturating_add(1));
        match self.repeat {
            Some(period) => Stimulus::repeating(self.trigger_at, hold, period),
            None => Stimulus::once(self.trigger_at, hold),
        }
    }

    /// Number of ticks to simulate for `chain`.
    ///
    /// # Errors
    ///
    /// Fails when the derived span overflows or the count exceeds
    /// [`MAX_TICKS`].
    pub fn tick_count(&self, chain: &PulseChain, stimulus: &Stimulus) -> Result<u64> {
        let ticks = match self.ticks {
            Some(ticks) => ticks,
            None => default_tick_count(chain, stimulus).with_context(|| {
                format!(
                    "simulation span overflows: trigger at tick {}, hold {}, repeat {:?}",
                    stimulus.start, stimulus.hold, stimulus.period
                )
            })?,
        };
        if ticks > MAX_TICKS {
            bail!("simulation of {ticks} ticks exceeds the {MAX_TICKS}-tick limit; pass a smaller --ticks");
        }
        Ok(ticks)
    }
}

fn default_tick_count(chain: &PulseChain, stimulus: &Stimulus) -> Option<u64> {
    let span = stimulus.hold.max(chain.total_ticks().checked_add(1)?);
    let span = match stimulus.period {
        Some(p) => span.max(p).checked_add(p)?,
        None => span,
    };
    stimulus.start.checked_add(span)?.checked_add(TAIL_TICKS)
}

/// Serialize `trace` in `format`.
pub fn render_trace(trace: &Trace, format: TraceFormat, clock: &ClockSpec) -> Result<String> {
    let text = match format {
        TraceFormat::Json => trace.to_json()?,
        TraceFormat::Vcd => trace.to_vcd(clock)?,
    };
    Ok(text)
}

/// Execute `pulser simulate`.
pub fn run_simulate(args: &SimulateArgs, config: Option<&Path>) -> Result<u8> {
    let (train, mut chain) = args.train.build(config)?;
    let stimulus = args.stimulus(&chain);
    let ticks = args.tick_count(&chain, &stimulus)?;

    let trace = chain.simulate(&stimulus, ticks);
    tracing::info!(
        ticks,
        toggles = trace.toggles().len(),
        "simulation finished"
    );

    let text = render_trace(&trace, args.format, &train.clock)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write trace to {}", path.display()))?;
            tracing::info!(path = %path.display(), "trace written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(durations: &[f64]) -> SimulateArgs {
        SimulateArgs {
            train: TrainArgs {
                direct: true,
                durations: durations.to_vec(),
                ..Default::default()
            },
            trigger_at: 1,
            hold: None,
            repeat: None,
            ticks: None,
            format: TraceFormat::Json,
            out: None,
        }
    }

    #[test]
    fn default_window_covers_train() {
        let a = args(&[2.0, 3.0]);
        let (_, chain) = a.train.build(None).unwrap();
        let stim = a.stimulus(&chain);
        assert_eq!(stim, Stimulus::once(1, 6));
        assert_eq!(a.tick_count(&chain, &stim).unwrap(), 1 + 6 + TAIL_TICKS);
    }

    #[test]
    fn late_trigger_span_overflow_is_an_error() {
        let a = SimulateArgs {
            trigger_at: u64::MAX - 2,
            ..args(&[2.0, 2.0])
        };
        let (_, chain) = a.train.build(None).unwrap();
        let stim = a.stimulus(&chain);
        let err = a.tick_count(&chain, &stim).unwrap_err();
        assert!(format!("{err:#}").contains("simulation span overflows"));

        let a = SimulateArgs {
            repeat: Some(u64::MAX),
            ..args(&[2.0, 2.0])
        };
        let stim = a.stimulus(&chain);
        assert!(a.tick_count(&chain, &stim).is_err());
    }

    #[test]
    fn tick_count_is_capped() {
        let a = SimulateArgs {
            ticks: Some(MAX_TICKS + 1),
            ..args(&[2.0, 2.0])
        };
        let (_, chain) = a.train.build(None).unwrap();
        let stim = a.stimulus(&chain);
        let err = a.tick_count(&chain, &stim).unwrap_err();
        assert!(err.to_string().contains("tick limit"));

        let a = SimulateArgs {
            trigger_at: MAX_TICKS,
            ..args(&[2.0, 2.0])
        };
        assert!(run_simulate(&a, None).is_err());
    }

    #[test]
    fn writes_json_trace() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trace.json");
        let a = SimulateArgs {
            out: Some(out.clone()),
            ..args(&[1.0, 2.0, 3.0, 4.0])
        };
        assert_eq!(run_simulate(&a, None).unwrap(), 0);

        let trace = Trace::from_json(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(trace.toggles(), vec![2, 4, 7, 11]);
    }

    #[test]
    fn writes_vcd_trace() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trace.vcd");
        let a = SimulateArgs {
            format: TraceFormat::Vcd,
            out: Some(out.clone()),
            ..args(&[2.0, 2.0])
        };
        run_simulate(&a, None).unwrap();
        let vcd = std::fs::read_to_string(&out).unwrap();
        assert!(vcd.starts_with("$version pulser"));
        assert!(vcd.contains("$var wire 1 \" pulse_out $end"));
    }

    #[test]
    fn repeating_trigger_replays_train() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trace.json");
        let a = SimulateArgs {
            trigger_at: 3,
            hold: Some(13),
            repeat: Some(22),
            ticks: Some(48),
            out: Some(out.clone()),
            ..args(&[1.0, 2.0, 3.0, 4.0])
        };
        run_simulate(&a, None).unwrap();
        let trace = Trace::from_json(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(trace.toggles(), vec![4, 6, 9, 13, 26, 28, 31, 35]);
    }

    #[test]
    fn unwritable_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = SimulateArgs {
            out: Some(dir.path().join("missing").join("trace.json")),
            ..args(&[2.0, 2.0])
        };
        let err = run_simulate(&a, None).unwrap_err();
        assert!(format!("{err:#}").contains("failed to write trace"));
    }
}
