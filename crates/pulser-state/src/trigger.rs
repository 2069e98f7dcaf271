//! # Edge Gate: Rising-Edge Trigger with Blocking Window
//!
//! Watches a raw input line for a rising edge. On an edge it emits a
//! one-tick pulse, then ignores the input for `block` ticks. Bounce or
//! noise inside the window can never produce a second pulse.
//!
//! The gate also exposes a `window` level: high on the firing tick and on
//! each of the `block` ticks that follow. When a chain is driven through a
//! gate, the window is the shared trigger that both arms the first stage and
//! enables every stage. The window must therefore be at least as long as
//! the train.
//!
//! The last input sample is updated on every tick, including blocked ones.
//! An input that is still high when the window closes does not count as a
//! fresh edge.

use serde::{Deserialize, Serialize};

/// Combinational outputs of the gate on one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateOutputs {
    /// One-tick pulse on an accepted rising edge.
    pub pulse: bool,
    /// High from the accepted edge through the end of the blocking window.
    pub window: bool,
}

/// Registered state of the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateState {
    /// Input level sampled on the previous tick.
    pub last_input: bool,
    /// Remaining blocked ticks; edges are ignored while non-zero.
    pub block_counter: u32,
}

/// Combinational outputs for `state` with `input` sampled this tick.
pub fn gate_outputs(state: GateState, input: bool) -> GateOutputs {
    let pulse = state.block_counter == 0 && input && !state.last_input;
    GateOutputs {
        pulse,
        window: pulse || state.block_counter > 0,
    }
}

/// Registered state of the next tick.
pub fn gate_transition(block: u32, state: GateState, input: bool) -> GateState {
    let fired = gate_outputs(state, input).pulse;
    GateState {
        last_input: input,
        block_counter: if fired {
            block
        } else {
            state.block_counter.saturating_sub(1)
        },
    }
}

/// A rising-edge detector with a fixed blocking window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeGate {
    block: u32,
    state: GateState,
}

impl EdgeGate {
    /// A gate that ignores its input for `block` ticks after each edge.
    pub fn new(block: u32) -> Self {
        Self {
            block,
            state: GateState::default(),
        }
    }

    /// Length of the blocking window in ticks.
    pub fn block(&self) -> u32 {
        self.block
    }

    /// Current registered state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Whether the gate is inside a blocking window.
    pub fn is_blocking(&self) -> bool {
        self.state.block_counter > 0
    }

    /// Combinational outputs for this tick.
    pub fn outputs(&self, input: bool) -> GateOutputs {
        gate_outputs(self.state, input)
    }

    /// Registered state after this tick, without committing it.
    pub fn next_state(&self, input: bool) -> GateState {
        gate_transition(self.block, self.state, input)
    }

    /// Latch a previously computed next state.
    pub fn commit(&mut self, next: GateState) {
        self.state = next;
    }

    /// Evaluate one tick in isolation.
    pub fn tick(&mut self, input: bool) -> GateOutputs {
        let out = self.outputs(input);
        self.state = self.next_state(input);
        out
    }

    /// Return to the idle state with a low input history.
    pub fn reset(&mut self) {
        self.state = GateState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(block: u32, inputs: &[bool]) -> Vec<GateOutputs> {
        let mut gate = EdgeGate::new(block);
        inputs.iter().map(|&i| gate.tick(i)).collect()
    }

    fn pulses(outs: &[GateOutputs]) -> Vec<usize> {
        outs.iter()
            .enumerate()
            .filter(|(_, o)| o.pulse)
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn clean_edge_gives_single_pulse() {
        let outs = run(3, &[false, false, true, true, true, true, true, false]);
        assert_eq!(pulses(&outs), vec![2]);
    }

    #[test]
    fn window_covers_edge_plus_block() {
        let outs = run(3, &[false, true, false, false, false, false, false]);
        let window: Vec<bool> = outs.iter().map(|o| o.window).collect();
        assert_eq!(window, vec![false, true, true, true, true, false, false]);
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let inputs = [false, true, false, true, false, true, true, false, false];
        let outs = run(5, &inputs);
        assert_eq!(pulses(&outs), vec![1]);
    }

    #[test]
    fn edge_after_window_is_accepted() {
        // Window blocks ticks 2..=3; the low at 3 re-primes the edge detector.
        let outs = run(2, &[false, true, true, false, true, false]);
        assert_eq!(pulses(&outs), vec![1, 4]);
    }

    #[test]
    fn held_input_does_not_refire_after_window() {
        let outs = run(2, &[true; 10]);
        assert_eq!(pulses(&outs), vec![0]);
    }

    #[test]
    fn zero_block_detects_every_edge() {
        let outs = run(0, &[true, false, true, false, true]);
        assert_eq!(pulses(&outs), vec![0, 2, 4]);
        assert!(outs.iter().all(|o| o.window == o.pulse));
    }

    #[test]
    fn reset_forgets_history() {
        let mut gate = EdgeGate::new(4);
        gate.tick(true);
        assert!(gate.is_blocking());
        gate.reset();
        assert!(!gate.is_blocking());
        assert!(gate.tick(true).pulse);
    }
}
