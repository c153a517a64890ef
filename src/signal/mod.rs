//! Intersection signal control
//!
//! Two cycles compete for right-of-way. The controller is the only writer of
//! light state; everything else reads it.

pub mod constants;
pub mod controller;
pub mod cycle;
pub mod phase;

pub use constants::*;
pub use controller::SignalPhaseController;
pub use cycle::{LightState, SignalCycle, SignalHead};
pub use phase::{CycleCompletion, PhaseState, SubPhase, SwitchOutcome};
