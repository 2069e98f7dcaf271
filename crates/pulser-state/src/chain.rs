//! # Pulse Chain and Sequence Builder
//!
//! Assembles `n` [`PulseStep`]s into a chain that realizes a pulse train.
//!
//! ## Wiring
//!
//! ```text
//!                 +--------------------+     +--------------------+
//! initial ------> | input ─[^]─ output | --> | input ─[^]─ output | --> pulse_out
//!                 |         ▲          |     |         ▲          |
//!                 |  d0     │          |     |  d1     │          |
//! trigger ─┬────> | prev ─{ctr}─ prop. | --> | prev ─{ctr}─ prop. | --> ...
//!          └─ en ─┴────────────────────┴─ en ┴────────────────────┘
//! ```
//!
//! - `s[0].prev = trigger` and `s[0].input = initial_level`.
//! - `s[i].prev = s[i-1].propagate` and `s[i].input = s[i-1].output`.
//! - Every stage is enabled by the same trigger. Dropping it returns the
//!   whole chain to bypass in one tick, with no extra reset wiring.
//!
//! The trigger is either the raw input line or the window of an
//! [`EdgeGate`] placed in front of the chain.
//!
//! Triggered on tick `t`, the output toggles on ticks `t + d0`,
//! `t + d0 + d1`, …, `t + sum(d)`. Each stage counts from the propagate
//! pulse of its predecessor, so no error can accumulate along the chain.
//!
//! ## Evaluation
//!
//! Stages live in a `Vec` sized once at build time and link by index.
//! A tick is evaluated in two phases:
//!
//! 1. [`PulseChain::settle`] computes every combinational signal from the
//!    current registered state and the trigger input.
//! 2. [`PulseChain::next_states`] computes every stage's next state from
//!    that snapshot, then [`PulseChain::tick`] commits them together.
//!
//! Stages communicate only through registered propagate pulses and the
//! combinational XOR path, never through a same-tick read of another
//! stage's next state. The evaluation order therefore does not matter.

use pulser_core::{
    ConfigError, Cycles, DurationList, ResolvedTrain, TriggerSource, DEFAULT_GATE_PADDING,
};

use crate::pulse_step::{PulseStep, StepInputs, StepOutputs, StepPhase, StepState};
use crate::stimulus::Stimulus;
use crate::trace::{Trace, TraceSample};
use crate::trigger::{EdgeGate, GateOutputs, GateState};

/// Trigger wiring requested on a [`SequenceBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GatePlan {
    Direct,
    Padded(u32),
    Block(u32),
}

/// Builds a [`PulseChain`] from raw durations.
///
/// Validation happens in [`SequenceBuilder::build`]. Either the whole
/// chain is built or a [`ConfigError`] names the offending entry.
///
/// ```
/// use pulser_state::SequenceBuilder;
///
/// let chain = SequenceBuilder::new([1, 2, 3, 4]).build().unwrap();
/// assert_eq!(chain.len(), 4);
/// assert_eq!(chain.expected_toggles(3), vec![4, 6, 9, 13]);
///
/// assert!(SequenceBuilder::new(Vec::new()).build().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    durations: Vec<i64>,
    initial_level: bool,
    gate: GatePlan,
}

impl SequenceBuilder {
    /// Start a chain with one stage per duration, in ticks.
    ///
    /// The chain is driven directly by the trigger line and starts low
    /// unless configured otherwise.
    pub fn new<I: IntoIterator<Item = i64>>(durations: I) -> Self {
        Self {
            durations: durations.into_iter().collect(),
            initial_level: false,
            gate: GatePlan::Direct,
        }
    }

    /// Output level before the first toggle.
    pub fn initial_level(mut self, level: bool) -> Self {
        self.initial_level = level;
        self
    }

    /// Drive the chain straight from the trigger line.
    pub fn direct(mut self) -> Self {
        self.gate = GatePlan::Direct;
        self
    }

    /// Put an edge gate in front of the chain, with a window
    /// [`DEFAULT_GATE_PADDING`] ticks longer than the train.
    pub fn gated(self) -> Self {
        self.gate_padding(DEFAULT_GATE_PADDING)
    }

    /// Put an edge gate in front of the chain, with a window `padding`
    /// ticks longer than the train.
    pub fn gate_padding(mut self, padding: u32) -> Self {
        self.gate = GatePlan::Padded(padding);
        self
    }

    /// Put an edge gate with an explicit `block`-tick window in front of
    /// the chain. The window must cover the whole train.
    pub fn gate_block(mut self, block: u32) -> Self {
        self.gate = GatePlan::Block(block);
        self
    }

    /// Validate and elaborate the chain.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyDurations`] when no durations were given.
    /// - [`ConfigError::NonPositiveDuration`] / [`ConfigError::DurationOverflow`]
    ///   naming the first bad entry.
    /// - [`ConfigError::GateWindowTooShort`] / [`ConfigError::TotalOverflow`]
    ///   for a gate window that cannot cover the train.
    pub fn build(self) -> Result<PulseChain, ConfigError> {
        let durations = DurationList::new(&self.durations)?;
        let trigger = match self.gate {
            GatePlan::Direct => TriggerSource::Direct,
            GatePlan::Padded(padding) => TriggerSource::padded(&durations, padding)?,
            GatePlan::Block(block) => TriggerSource::with_block(&durations, block)?,
        };
        Ok(PulseChain::elaborate(&durations, self.initial_level, trigger))
    }
}

/// Combinational signals of a chain on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSignals {
    /// Raw trigger input.
    pub trigger_in: bool,
    /// Gate outputs, when the chain is gated.
    pub gate: Option<GateOutputs>,
    /// Shared trigger: arms stage 0 and enables every stage.
    pub enable: bool,
    /// Inputs each stage samples this tick, by stage index.
    pub inputs: Vec<StepInputs>,
    /// Outputs each stage drives this tick, by stage index.
    pub outputs: Vec<StepOutputs>,
    /// Level on the output tap.
    pub output: bool,
}

/// What the chain reported on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTick {
    /// Tick index.
    pub tick: u64,
    /// Raw trigger input.
    pub trigger_in: bool,
    /// Shared trigger after the gate.
    pub enable: bool,
    /// Level on the output tap.
    pub output: bool,
    /// No stage was armed on this tick.
    pub idle: bool,
}

/// A built chain of pulse steps, optionally behind an edge gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseChain {
    stages: Vec<PulseStep>,
    gate: Option<EdgeGate>,
    initial_level: bool,
    tick: u64,
}

impl PulseChain {
    /// Elaborate a chain from validated parts.
    pub fn elaborate(durations: &DurationList, initial_level: bool, trigger: TriggerSource) -> Self {
        let stages: Vec<PulseStep> = durations.iter().map(PulseStep::new).collect();
        let gate = match trigger {
            TriggerSource::Direct => None,
            TriggerSource::Gated { block } => Some(EdgeGate::new(block)),
        };
        tracing::debug!(
            stages = stages.len(),
            total_ticks = durations.total(),
            gated = gate.is_some(),
            "elaborated pulse chain"
        );
        Self {
            stages,
            gate,
            initial_level,
            tick: 0,
        }
    }

    /// Elaborate the chain a resolved configuration describes.
    pub fn from_train(train: &ResolvedTrain) -> Self {
        Self::elaborate(&train.durations, train.initial_level, train.trigger)
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false: a chain has at least one stage.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The stages in chain order.
    pub fn stages(&self) -> &[PulseStep] {
        &self.stages
    }

    /// The edge gate in front of the chain, if any.
    pub fn gate(&self) -> Option<&EdgeGate> {
        self.gate.as_ref()
    }

    /// Trigger wiring of this chain.
    pub fn trigger_source(&self) -> TriggerSource {
        match &self.gate {
            None => TriggerSource::Direct,
            Some(g) => TriggerSource::Gated { block: g.block() },
        }
    }

    /// Output level before the first toggle.
    pub fn initial_level(&self) -> bool {
        self.initial_level
    }

    /// Stage durations in chain order.
    pub fn durations(&self) -> Vec<Cycles> {
        self.stages.iter().map(PulseStep::duration).collect()
    }

    /// Ticks from trigger to the last toggle.
    pub fn total_ticks(&self) -> u64 {
        self.stages.iter().map(|s| u64::from(s.duration().get())).sum()
    }

    /// Ticks on which the output toggles when triggered on `trigger_tick`.
    pub fn expected_toggles(&self, trigger_tick: u64) -> Vec<u64> {
        self.stages
            .iter()
            .scan(trigger_tick, |at, s| {
                *at += u64::from(s.duration().get());
                Some(*at)
            })
            .collect()
    }

    /// Output level once every stage has toggled.
    pub fn final_level(&self) -> bool {
        self.initial_level ^ (self.stages.len() % 2 == 1)
    }

    /// Number of ticks evaluated since elaboration or the last reset.
    pub fn ticks_elapsed(&self) -> u64 {
        self.tick
    }

    /// No stage is counting. Chains can be composed on this status.
    pub fn is_idle(&self) -> bool {
        !self.stages.iter().any(PulseStep::is_armed)
    }

    /// Every stage has fired in the current enable window.
    pub fn is_complete(&self) -> bool {
        self.stages.iter().all(|s| s.phase() == StepPhase::Fired)
    }

    /// Lifecycle phase of each stage.
    pub fn phases(&self) -> Vec<StepPhase> {
        self.stages.iter().map(PulseStep::phase).collect()
    }

    /// Phase 1: combinational signals for this tick.
    pub fn settle(&self, trigger_in: bool) -> ChainSignals {
        let gate = self.gate.as_ref().map(|g| g.outputs(trigger_in));
        let enable = gate.map_or(trigger_in, |g| g.window);

        let mut inputs = Vec::with_capacity(self.stages.len());
        let mut outputs = Vec::with_capacity(self.stages.len());
        let mut input = self.initial_level;
        let mut prev = enable;
        for stage in &self.stages {
            let step_in = StepInputs {
                input,
                prev,
                enable,
            };
            let step_out = stage.outputs(step_in);
            inputs.push(step_in);
            outputs.push(step_out);
            input = step_out.output;
            prev = step_out.propagate;
        }

        ChainSignals {
            trigger_in,
            gate,
            enable,
            inputs,
            outputs,
            output: input,
        }
    }

    /// Phase 2: next registered state of every stage, from one snapshot.
    pub fn next_states(&self, signals: &ChainSignals) -> Vec<StepState> {
        self.stages
            .iter()
            .zip(&signals.inputs)
            .map(|(stage, &inputs)| stage.next_state(inputs))
            .collect()
    }

    /// Next registered state of the gate, if any.
    pub fn next_gate_state(&self, signals: &ChainSignals) -> Option<GateState> {
        self.gate.as_ref().map(|g| g.next_state(signals.trigger_in))
    }

    /// Evaluate one tick: settle, compute every next state, commit them all.
    pub fn tick(&mut self, trigger_in: bool) -> ChainTick {
        let idle = self.is_idle();
        let signals = self.settle(trigger_in);
        let next_gate = self.next_gate_state(&signals);
        let next = self.next_states(&signals);

        if let (Some(gate), Some(state)) = (self.gate.as_mut(), next_gate) {
            gate.commit(state);
        }
        for (stage, state) in self.stages.iter_mut().zip(next) {
            debug_assert!(
                !signals.enable
                    || stage.phase() == state.phase()
                    || stage.phase().valid_transitions().contains(&state.phase()),
                "stage moved {} -> {} with enable held",
                stage.phase(),
                state.phase()
            );
            stage.commit(state);
        }

        let report = ChainTick {
            tick: self.tick,
            trigger_in,
            enable: signals.enable,
            output: signals.output,
            idle,
        };
        self.tick += 1;
        report
    }

    /// Drive the chain with `inputs`, one per tick, and record the output.
    pub fn run<I: IntoIterator<Item = bool>>(&mut self, inputs: I) -> Trace {
        let inputs = inputs.into_iter();
        let mut trace = Trace::with_capacity(inputs.size_hint().0);
        let mut last = None;
        for trigger in inputs {
            let t = self.tick(trigger);
            if last.is_some_and(|l| l != t.output) {
                tracing::debug!(tick = t.tick, level = t.output, "output toggled");
            }
            last = Some(t.output);
            trace.push(TraceSample {
                tick: t.tick,
                trigger,
                level: t.output,
            });
        }
        trace
    }

    /// Drive the chain with `stimulus` for `ticks` ticks.
    pub fn simulate(&mut self, stimulus: &Stimulus, ticks: u64) -> Trace {
        let offset = self.tick;
        self.run((0..ticks).map(|t| stimulus.level_at(offset.saturating_add(t))))
    }

    /// Return every stage and the gate to idle and restart the tick count.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        if let Some(gate) = self.gate.as_mut() {
            gate.reset();
        }
        self.tick = 0;
    }
}
