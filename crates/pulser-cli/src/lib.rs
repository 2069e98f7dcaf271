//! # pulser-cli: Pulse-Train Command-Line Interface
//!
//! A clap-based front end over the pulser library crates.
//!
//! ## Subcommands
//!
//! - `schedule`: resolved cycles, toggle offsets, and final polarity
//! - `simulate`: drive a chain with a trigger waveform and dump the trace
//! - `emit`: render the chain as a Verilog module
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from behavior: handlers take parsed
//!   argument structs and delegate to `pulser-state` and `pulser-gateware`.
//! - Handlers return `anyhow::Result<u8>`; the exit code is the `Ok` value.

pub mod emit;
pub mod schedule;
pub mod simulate;
pub mod train;
