//! # Pulse Step: Chainable Countdown/Toggle Primitive
//!
//! A pulse step waits for an arming pulse, counts a fixed number of ticks,
//! then on a single tick both toggles its level output and raises a
//! one-tick propagate pulse that arms the next step in a chain.
//!
//! ## Phases
//!
//! ```text
//!            enable & prev           counter == duration - 1
//!   IDLE ───────────────────▶ COUNTING ───────────────────────▶ FIRED
//!    ▲                                                            │
//!    └──────────────────────── !enable (from any phase) ──────────┘
//! ```
//!
//! With `duration == 1` the arming tick is also the firing tick, and the
//! step goes straight from `IDLE` to `FIRED`.
//!
//! ## Register Semantics
//!
//! The step is a synchronous circuit. [`PulseStep::outputs`] is the
//! combinational view: a function of the registered state and this tick's
//! inputs. [`transition`] computes the registered state of the next tick.
//! Neither reads the next state, so any number of steps evaluated from the
//! same snapshot agree regardless of evaluation order.
//!
//! Observed from outside, a step armed on tick `t` reports `propagate` and
//! its toggled level on tick `t + duration` and on no other tick.
//!
//! ## Absorbed Triggers
//!
//! An arming pulse that arrives while the step is `COUNTING` is ignored: no
//! re-arm, no counter reset. A `FIRED` step holds its toggled level and
//! does not re-arm until `enable` drops, so a held trigger level fires it
//! exactly once.

use serde::{Deserialize, Serialize};

use pulser_core::Cycles;

/// Inputs sampled by a pulse step on one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StepInputs {
    /// Level passed through to the output, XOR'd with the toggle state.
    pub input: bool,
    /// Arming pulse, usually the previous step's propagate output.
    pub prev: bool,
    /// Shared trigger; low forces bypass and resets the step.
    pub enable: bool,
}

/// Combinational outputs of a pulse step on one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepOutputs {
    /// Output level: `input` while bypassed, `input ^ toggled` while enabled.
    pub output: bool,
    /// One-tick pulse marking the firing tick.
    pub propagate: bool,
}

/// Registered state of a pulse step.
///
/// Invariant: either idle (`armed == false`, `counter == 0`) or counting
/// (`armed == true`, `0 < counter < duration`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepState {
    /// Counting toward the firing tick.
    pub armed: bool,
    /// Ticks elapsed since arming, the arming tick included.
    pub counter: u32,
    /// The step has fired since `enable` last rose; its output is inverted.
    pub toggled: bool,
    /// The step fired on the previous tick.
    pub propagate: bool,
}

/// Lifecycle phase of a pulse step, derived from its registered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepPhase {
    /// Waiting for an arming pulse.
    Idle,
    /// Armed and counting down.
    Counting,
    /// Fired; holding the toggled level until `enable` drops.
    Fired,
}

impl StepPhase {
    /// The canonical name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Counting => "COUNTING",
            Self::Fired => "FIRED",
        }
    }

    /// Phases reachable in one tick with `enable` held high.
    ///
    /// Dropping `enable` returns any phase to `IDLE`; that reset edge is
    /// not listed here.
    pub fn valid_transitions(&self) -> &'static [StepPhase] {
        match self {
            Self::Idle => &[Self::Counting, Self::Fired],
            Self::Counting => &[Self::Fired],
            Self::Fired => &[],
        }
    }
}

impl std::fmt::Display for StepPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StepState {
    /// The lifecycle phase this state encodes.
    pub fn phase(&self) -> StepPhase {
        if self.armed {
            StepPhase::Counting
        } else if self.toggled {
            StepPhase::Fired
        } else {
            StepPhase::Idle
        }
    }
}

/// Combinational outputs of a step in `state` given this tick's inputs.
pub fn outputs(state: StepState, inputs: StepInputs) -> StepOutputs {
    if !inputs.enable {
        return StepOutputs {
            output: inputs.input,
            propagate: false,
        };
    }
    StepOutputs {
        output: inputs.input ^ state.toggled,
        propagate: state.propagate,
    }
}

/// Registered state of the next tick.
///
/// Total over every input combination; pure, so a step can be stepped in
/// isolation or as part of a snapshot-then-commit round.
pub fn transition(duration: Cycles, state: StepState, inputs: StepInputs) -> StepState {
    if !inputs.enable {
        return StepState::default();
    }

    let elapsed = if state.armed {
        state.counter
    } else if inputs.prev && !state.toggled {
        0
    } else {
        return StepState {
            propagate: false,
            ..state
        };
    };

    if elapsed + 1 >= duration.get() {
        StepState {
            armed: false,
            counter: 0,
            toggled: !state.toggled,
            propagate: true,
        }
    } else {
        StepState {
            armed: true,
            counter: elapsed + 1,
            toggled: state.toggled,
            propagate: false,
        }
    }
}

/// One countdown/toggle stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseStep {
    duration: Cycles,
    state: StepState,
}

impl PulseStep {
    /// A new idle step firing `duration` ticks after it is armed.
    pub fn new(duration: Cycles) -> Self {
        Self {
            duration,
            state: StepState::default(),
        }
    }

    /// Ticks from arming to firing.
    pub fn duration(&self) -> Cycles {
        self.duration
    }

    /// Current registered state.
    pub fn state(&self) -> StepState {
        self.state
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> StepPhase {
        self.state.phase()
    }

    /// Whether the step is counting toward its firing tick.
    pub fn is_armed(&self) -> bool {
        self.state.armed
    }

    /// Combinational outputs for this tick.
    pub fn outputs(&self, inputs: StepInputs) -> StepOutputs {
        outputs(self.state, inputs)
    }

    /// Registered state after this tick, without committing it.
    pub fn next_state(&self, inputs: StepInputs) -> StepState {
        transition(self.duration, self.state, inputs)
    }

    /// Latch a previously computed next state.
    pub fn commit(&mut self, next: StepState) {
        self.state = next;
    }

    /// Evaluate one tick in isolation: report this tick's outputs, then
    /// latch the next state.
    pub fn tick(&mut self, inputs: StepInputs) -> StepOutputs {
        let out = self.outputs(inputs);
        self.state = self.next_state(inputs);
        out
    }

    /// Return to the idle bypass state.
    pub fn reset(&mut self) {
        self.state = StepState::default();
    }
}
