//! # pulser-state: Clocked State Machines
//!
//! Implements the synchronous machines behind a pulse train. Every machine
//! splits into a pure combinational view and a pure transition function
//! over a plain registered-state struct, so a tick can be evaluated as a
//! snapshot followed by one commit.
//!
//! ## State Machines
//!
//! - **Pulse step** (`pulse_step.rs`): `IDLE → COUNTING → FIRED`, with a
//!   shared enable that returns any phase to `IDLE`. Counts a fixed number
//!   of ticks after an arming pulse, then toggles its output and raises a
//!   one-tick propagate pulse.
//!
//! - **Edge gate** (`trigger.rs`): rising-edge detector with a blocking
//!   window that swallows bounce on the trigger line.
//!
//! - **Pulse chain** (`chain.rs`): `n` pulse steps wired in series by
//!   [`SequenceBuilder`], evaluated two-phase per tick.
//!
//! ## Simulation Support
//!
//! - [`Stimulus`] generates periodic trigger waveforms.
//! - [`Trace`] records `(tick, trigger, level)` samples and exports them as
//!   JSON or a Value Change Dump.

pub mod chain;
pub mod pulse_step;
pub mod stimulus;
pub mod trace;
pub mod trigger;

// ─── Chain re-exports ───────────────────────────────────────────────

pub use chain::{ChainSignals, ChainTick, PulseChain, SequenceBuilder};

// ─── Primitive re-exports ───────────────────────────────────────────

pub use pulse_step::{PulseStep, StepInputs, StepOutputs, StepPhase, StepState};
pub use trigger::{EdgeGate, GateOutputs, GateState};

// ─── Simulation re-exports ──────────────────────────────────────────

pub use stimulus::Stimulus;
pub use trace::{Trace, TraceSample};
