//! # pulser-gateware: Verilog Emission
//!
//! Turns a built [`pulser_state::PulseChain`] into a synthesizable
//! single-clock module. The emitted registers follow the same transition
//! rules the simulator steps through, so a simulated trace is a faithful
//! preview of the hardware output.
//!
//! Synthesis, place-and-route and flashing are left to external tools.

pub mod verilog;

pub use verilog::{
    counter_width, emit_verilog, is_valid_identifier, resources, GatewareModule, ResourceSummary,
    VerilogOptions, DEFAULT_MODULE_NAME,
};
