//! # Shared Pulse-Train Flags
//!
//! Every subcommand describes its pulse train the same way: an optional
//! configuration file (the global `--config`) overlaid with command-line
//! flags. Flags win over the file; positional durations replace the
//! file's list entirely.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use pulser_core::{PulseTrainConfig, ResolvedTrain, TimeUnit, TriggerConfig};
use pulser_state::PulseChain;

/// Pulse-train description shared by all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct TrainArgs {
    /// Clock frequency in MHz (16..=275).
    #[arg(short = 'f', long = "freq", value_name = "MHZ", conflicts_with = "period")]
    pub freq: Option<u32>,

    /// Clock period in nanoseconds.
    #[arg(short = 'p', long = "period", value_name = "NS")]
    pub period: Option<f64>,

    /// Durations are nanoseconds instead of clock cycles.
    #[arg(short = 'n', long = "ns")]
    pub ns: bool,

    /// Accept an odd number of durations.
    #[arg(long)]
    pub allow_odd: bool,

    /// Require an even number of durations, even if the file allows odd.
    #[arg(long, conflicts_with = "allow_odd")]
    pub require_even: bool,

    /// Drive the chain straight from the trigger line, without an edge gate.
    #[arg(long, conflicts_with_all = ["padding", "block"])]
    pub direct: bool,

    /// Ticks the gate window extends past the end of the train.
    #[arg(long, value_name = "TICKS")]
    pub padding: Option<u32>,

    /// Explicit gate window length in ticks.
    #[arg(long, value_name = "TICKS", conflicts_with = "padding")]
    pub block: Option<u32>,

    /// Hold the output high before the first toggle.
    #[arg(long)]
    pub initial_high: bool,

    /// Hold the output low before the first toggle, even if the file says high.
    #[arg(long, conflicts_with = "initial_high")]
    pub initial_low: bool,

    /// Time before each output toggle; the first is the delay after the trigger.
    #[arg(value_name = "T", allow_negative_numbers = true)]
    pub durations: Vec<f64>,
}

impl TrainArgs {
    /// Overlay these flags on `base`.
    pub fn apply(&self, mut base: PulseTrainConfig) -> PulseTrainConfig {
        if let Some(mhz) = self.freq {
            base.clock_mhz = Some(mhz);
            base.period_ns = None;
        }
        if let Some(period) = self.period {
            base.period_ns = Some(period);
            base.clock_mhz = None;
        }
        if self.ns {
            base.unit = TimeUnit::Ns;
        }
        if self.allow_odd {
            base.allow_odd = true;
        } else if self.require_even {
            base.allow_odd = false;
        }
        if self.initial_high {
            base.initial_level = true;
        } else if self.initial_low {
            base.initial_level = false;
        }
        if self.direct {
            base.trigger = TriggerConfig::Direct;
        } else if self.padding.is_some() || self.block.is_some() {
            base.trigger = TriggerConfig::Gated {
                padding: self.padding,
                block: self.block,
            };
        }
        if !self.durations.is_empty() {
            base.durations = self.durations.clone();
        }
        base
    }

    /// Load `config` if given, overlay the flags, and validate the result.
    pub fn resolve(&self, config: Option<&Path>) -> Result<ResolvedTrain> {
        let base = match config {
            Some(path) => PulseTrainConfig::from_path(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => PulseTrainConfig::default(),
        };
        let train = self
            .apply(base)
            .resolve()
            .context("invalid pulse train")?;
        tracing::info!(
            clock = %train.clock,
            stages = train.durations.len(),
            total_ticks = train.durations.total(),
            "pulse train resolved"
        );
        Ok(train)
    }

    /// Resolve and elaborate the chain.
    pub fn build(&self, config: Option<&Path>) -> Result<(ResolvedTrain, PulseChain)> {
        let train = self.resolve(config)?;
        let chain = PulseChain::from_train(&train);
        Ok((train, chain))
    }
}
