//! Signal cycles - groups of heads that always show the same light

use serde::{Deserialize, Serialize};

use crate::core::config::CycleConfig;
use crate::core::types::{CycleId, SignalHeadId};

/// Light shown by a signal head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightState {
    #[default]
    Red,
    Yellow,
    Green,
}

/// A single signal head handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalHead {
    pub id: SignalHeadId,
    pub label: String,
    state: LightState,
}

impl SignalHead {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: SignalHeadId::new(),
            label: label.into(),
            state: LightState::Red,
        }
    }

    pub fn state(&self) -> LightState {
        self.state
    }
}

/// A named group of signal heads transitioning together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalCycle {
    pub id: CycleId,
    pub name: String,
    heads: Vec<SignalHead>,
    state: LightState,
}

impl SignalCycle {
    /// Create a cycle with every head Red
    pub fn new(id: CycleId, name: impl Into<String>, heads: Vec<SignalHead>) -> Self {
        let mut cycle = Self {
            id,
            name: name.into(),
            heads,
            state: LightState::Red,
        };
        cycle.set_state(LightState::Red);
        cycle
    }

    pub fn from_config(config: &CycleConfig) -> Self {
        let heads = config.heads.iter().map(SignalHead::new).collect();
        let name = if config.name.is_empty() {
            format!("cycle {}", config.id)
        } else {
            config.name.clone()
        };
        Self::new(config.id, name, heads)
    }

    /// Apply a light to every head of the cycle in one step
    pub fn set_state(&mut self, state: LightState) {
        self.state = state;
        for head in &mut self.heads {
            head.state = state;
        }
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn is_green(&self) -> bool {
        self.state == LightState::Green
    }

    pub fn heads(&self) -> &[SignalHead] {
        &self.heads
    }
}
