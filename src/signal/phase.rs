//! Phase state of the two-cycle controller

use serde::{Deserialize, Serialize};

use crate::core::types::CycleId;

/// Stage of an in-flight transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubPhase {
    #[default]
    Idle,
    /// Outgoing cycle shows Yellow
    YellowHold,
    /// Outgoing cycle turned Red; passes straight through to GreenHold
    RedSettle,
    /// Incoming cycle shows Green for the minimum hold
    GreenHold,
}

/// Complete phase state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseState {
    /// Cycle currently holding right-of-way
    pub granted: Option<CycleId>,
    pub sub_phase: SubPhase,
    /// Remaining hold in the current sub-phase
    pub timer: f32,
    /// Target of the in-flight transition
    pub requested: Option<CycleId>,
    /// Cycle that was granted when the in-flight transition started
    pub source: Option<CycleId>,
}

impl PhaseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_transitioning(&self) -> bool {
        self.sub_phase != SubPhase::Idle
    }
}

/// Emitted when a switch finishes and the target becomes granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCompletion {
    pub cycle: CycleId,
}

/// Result of a switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchOutcome {
    Accepted,
    /// Target already holds right-of-way
    AlreadyGranted,
    /// Another transition has not finished yet
    InFlight,
    /// Controller was disabled at startup
    Disabled,
}

impl SwitchOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwitchOutcome::Accepted)
    }
}
