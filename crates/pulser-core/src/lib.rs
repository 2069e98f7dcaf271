//! # pulser-core: Foundational Types for pulser
//!
//! Defines the primitives every other pulser crate builds on. It depends on
//! no other `pulser-*` crate.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes for timing.** [`Cycles`] is a non-zero tick count
//!    and [`DurationList`] is a non-empty ordered list of them. Code that
//!    holds one never has to re-check for an empty train or a zero-length
//!    stage.
//!
//! 2. **Errors at elaboration, never at run time.** Every rejection is a
//!    [`ConfigError`] raised while resolving a configuration or building a
//!    chain. Per-tick state transitions are total.
//!
//! 3. **The clock is data.** [`ClockSpec`] records the frequency of the
//!    single clock domain. It is used only for unit conversion and
//!    waveform scaling, never for behavior.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod config;
pub mod error;
pub mod timing;

pub use clock::{ClockSpec, DEFAULT_MHZ, MAX_MHZ, MIN_MHZ};
pub use config::{
    PulseTrainConfig, ResolvedTrain, TimeUnit, TriggerConfig, TriggerSource, DEFAULT_GATE_PADDING,
};
pub use error::{ConfigError, PulserError};
pub use timing::{Cycles, DurationList, MAX_DURATION};
