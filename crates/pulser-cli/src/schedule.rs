//! # Schedule: Inspect a Resolved Pulse Train
//!
//! Prints the stage durations in cycles, the tick (and time) of every
//! output toggle relative to the trigger, and the final output polarity.
//!
//! ```bash
//! pulser schedule -f 100 -n 50 100 50 100
//! pulser --config train.yaml schedule --json
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use pulser_core::{ResolvedTrain, TriggerSource};

use crate::train::TrainArgs;

/// Arguments for `pulser schedule`.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Print the schedule as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One row of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleStage {
    /// Stage index.
    pub index: usize,
    /// Stage duration in cycles.
    pub cycles: u32,
    /// Ticks after the trigger at which this stage toggles the output.
    pub toggle_at: u64,
    /// The same offset in nanoseconds.
    pub toggle_ns: f64,
    /// Output level from this toggle on.
    pub level: bool,
}

/// Timing summary of a resolved pulse train.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    /// Clock frequency in MHz.
    pub clock_mhz: u32,
    /// Trigger wiring.
    pub trigger: TriggerSource,
    /// Output level before the first toggle.
    pub initial_level: bool,
    /// Output level after the last toggle.
    pub final_level: bool,
    /// Ticks from trigger to the last toggle.
    pub total_ticks: u64,
    /// One row per stage.
    pub stages: Vec<ScheduleStage>,
}

impl Schedule {
    /// Tabulate `train`.
    pub fn new(train: &ResolvedTrain) -> Self {
        let mut level = train.initial_level;
        let stages = train
            .durations
            .iter()
            .zip(train.durations.toggle_offsets())
            .enumerate()
            .map(|(index, (cycles, toggle_at))| {
                level = !level;
                ScheduleStage {
                    index,
                    cycles: cycles.get(),
                    toggle_at,
                    toggle_ns: train.clock.cycles_to_ns(toggle_at),
                    level,
                }
            })
            .collect();
        Self {
            clock_mhz: train.clock.mhz(),
            trigger: train.trigger,
            initial_level: train.initial_level,
            final_level: train.durations.final_level(train.initial_level),
            total_ticks: train.durations.total(),
            stages,
        }
    }

    /// Human-readable table.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.stages.len() + 6);
        lines.push(format!("clock:   {} MHz", self.clock_mhz));
        lines.push(match self.trigger {
            TriggerSource::Direct => "trigger: direct".to_string(),
            TriggerSource::Gated { block } => format!("trigger: gated, {block}-tick window"),
        });
        lines.push(format!("initial: {}", level_name(self.initial_level)));
        lines.push(format!("{:>5}  {:>10}  {:>10}  {:>12}  level", "stage", "cycles", "toggle@", "ns"));
        for s in &self.stages {
            lines.push(format!(
                "{:>5}  {:>10}  {:>10}  {:>12.3}  {}",
                s.index,
                s.cycles,
                s.toggle_at,
                s.toggle_ns,
                level_name(s.level)
            ));
        }
        lines.push(format!("total:   {} ticks", self.total_ticks));
        let note = if self.final_level == self.initial_level {
            "returns to initial level"
        } else {
            "ends inverted"
        };
        lines.push(format!("final:   {} ({note})", level_name(self.final_level)));
        lines.join("\n")
    }
}

fn level_name(level: bool) -> &'static str {
    if level {
        "high"
    } else {
        "low"
    }
}

/// Execute `pulser schedule`.
pub fn run_schedule(args: &ScheduleArgs, config: Option<&Path>) -> Result<u8> {
    let train = args.train.resolve(config)?;
    let schedule = Schedule::new(&train);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        println!("{}", schedule.render());
    }
    Ok(0)
}
