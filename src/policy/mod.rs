//! Decision policy boundary
//!
//! Architecture: Trait + config selection
//! - DecisionPolicy trait is the interface for swappable policies
//! - PolicyKind picks the implementation from config
//! - Observation carries the ordered vehicle positions

pub mod manual;
pub mod random;
pub mod scripted;

pub use manual::ManualPolicy;
pub use random::RandomPolicy;
pub use scripted::{FixedCyclePolicy, ScriptedPolicy};

use serde::{Deserialize, Serialize};

use crate::core::config::PolicyConfig;
use crate::core::error::SignalError;
use crate::core::types::{CycleId, Vec3};

/// Discrete policy output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// No switch request
    #[default]
    Hold = 0,
    RequestA = 1,
    RequestB = 2,
}

impl Action {
    /// Cycle this action asks to turn green
    pub fn target(&self) -> Option<CycleId> {
        match self {
            Action::Hold => None,
            Action::RequestA => Some(CycleId::A),
            Action::RequestB => Some(CycleId::B),
        }
    }

    pub fn request(cycle: CycleId) -> Self {
        match cycle {
            CycleId::A => Action::RequestA,
            CycleId::B => Action::RequestB,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Action {
    type Error = SignalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Hold),
            1 => Ok(Action::RequestA),
            2 => Ok(Action::RequestB),
            other => Err(SignalError::InvalidAction(other)),
        }
    }
}

/// Vehicle positions handed to the policy, one slot per roster entry.
/// A slot is None while that vehicle's tracker cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub vehicle_positions: Vec<Option<Vec3>>,
}

impl Observation {
    pub fn new(vehicle_positions: Vec<Option<Vec3>>) -> Self {
        Self { vehicle_positions }
    }

    pub fn len(&self) -> usize {
        self.vehicle_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_positions.is_empty()
    }

    /// Slots holding a position this tick
    pub fn readable_count(&self) -> usize {
        self.vehicle_positions.iter().filter(|p| p.is_some()).count()
    }

    /// Flatten to `[x0, y0, z0, x1, ...]`, unreadable slots as zeros
    pub fn to_vector(&self) -> Vec<f32> {
        self.vehicle_positions
            .iter()
            .flat_map(|p| p.unwrap_or_default().to_array())
            .collect()
    }
}

/// Trait for decision policies
pub trait DecisionPolicy {
    /// Choose an action for this decision window
    fn decide(&mut self, observation: &Observation, manual_override: Option<Action>) -> Action;

    /// Called on ticks where the decision window is closed
    fn discard_input(&mut self) {}

    /// Called after every episode reset
    fn on_episode_start(&mut self) {}

    fn name(&self) -> &str;
}

/// Policy implementation selected at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Operator input (keyboard heuristic)
    Manual,
    /// Alternate A and B on a fixed decision count
    #[default]
    FixedCycle,
    /// Seeded random switching
    Random,
    /// Replay of a fixed action list (empty by default)
    Scripted,
}

/// Build the configured policy
pub fn build_policy(config: &PolicyConfig) -> Box<dyn DecisionPolicy> {
    match config.kind {
        PolicyKind::Manual => Box::new(ManualPolicy::new()),
        PolicyKind::FixedCycle => Box::new(FixedCyclePolicy::new(config.fixed_interval)),
        PolicyKind::Random => Box::new(RandomPolicy::new(config.seed, config.switch_probability)),
        PolicyKind::Scripted => Box::new(ScriptedPolicy::new(Vec::new())),
    }
}
