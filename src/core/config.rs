//! Intersection configuration with documented constants
//!
//! Every tunable number of the controller, scheduler, reward evaluator and
//! episode budget lives here. Files are TOML (see `data/intersection.toml`);
//! any section left out falls back to its `Default`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SignalError};
use crate::core::types::CycleId;
use crate::policy::PolicyKind;
use crate::signal::constants::{COOLDOWN_AFTER_A, COOLDOWN_AFTER_B, GREEN_HOLD, YELLOW_HOLD};
use crate::simulation::traffic::TrafficConfig;

/// One configured signal cycle: an identity plus its ordered signal heads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    pub id: CycleId,
    /// Human readable name (e.g. "north-south")
    #[serde(default)]
    pub name: String,
    /// Labels of the signal heads driven by this cycle, in order
    #[serde(default)]
    pub heads: Vec<String>,
}

/// Transition timing, in simulation time units
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long the outgoing cycle shows Yellow before going Red
    pub yellow_hold: f32,
    /// Minimum Green shown by the incoming cycle before it counts as granted.
    /// Switch requests are rejected for the whole hold.
    pub green_hold: f32,
    /// Decision cooldown set after cycle A finishes taking right-of-way
    pub cooldown_after_a: f32,
    /// Decision cooldown set after cycle B finishes taking right-of-way.
    /// Defaults differ per direction (0.0 for A, 9.0 for B).
    pub cooldown_after_b: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            yellow_hold: YELLOW_HOLD,
            green_hold: GREEN_HOLD,
            cooldown_after_a: COOLDOWN_AFTER_A,
            cooldown_after_b: COOLDOWN_AFTER_B,
        }
    }
}

impl TimingConfig {
    pub fn cooldown_for(&self, cycle: CycleId) -> f32 {
        match cycle {
            CycleId::A => self.cooldown_after_a,
            CycleId::B => self.cooldown_after_b,
        }
    }
}

/// Reward magnitudes (all stored positive, sign applied by the evaluator)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Per-tick cost, scaled by the share of vehicles still travelling
    pub step_penalty: f32,
    /// Numerator of the vehicle completion bonus (`bonus / reward_timer`)
    pub completion_bonus: f32,
    /// Cost charged each time a full cycle switch completes
    pub cycle_cost: f32,
    /// Terminal bonus when every vehicle completed inside the budget
    pub success_bonus: f32,
    /// Terminal cost per vehicle still incomplete when the budget runs out
    pub timeout_penalty: f32,
    /// Value the reward timer starts from at each episode start.
    /// Must be positive, it divides the completion bonus.
    pub initial_reward_timer: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: 0.05,
            completion_bonus: 3.0,
            cycle_cost: 2.0,
            success_bonus: 10.0,
            timeout_penalty: 1.0,
            initial_reward_timer: 1.0,
        }
    }
}

/// Episode budget and tick size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Wall-clock budget of one episode
    pub time_budget: f32,
    /// Fixed timestep fed to every control tick
    pub fixed_dt: f32,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            time_budget: 30.0,
            fixed_dt: 0.02,
        }
    }
}

/// Which decision policy drives the scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub kind: PolicyKind,
    /// Seed for the random policy
    pub seed: u64,
    /// Decisions between alternations for the fixed-cycle policy
    pub fixed_interval: u32,
    /// Chance per decision that the random policy asks for a switch
    pub switch_probability: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::FixedCycle,
            seed: 42,
            fixed_interval: 150,
            switch_probability: 0.05,
        }
    }
}

/// Complete intersection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionConfig {
    #[serde(default = "default_cycles")]
    pub cycles: Vec<CycleConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub episode: EpisodeConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub traffic: TrafficConfig,
}

fn default_cycles() -> Vec<CycleConfig> {
    vec![
        CycleConfig {
            id: CycleId::A,
            name: "north-south".to_string(),
            heads: vec!["north".to_string(), "south".to_string()],
        },
        CycleConfig {
            id: CycleId::B,
            name: "east-west".to_string(),
            heads: vec!["east".to_string(), "west".to_string()],
        },
    ]
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
            timing: TimingConfig::default(),
            rewards: RewardConfig::default(),
            episode: EpisodeConfig::default(),
            policy: PolicyConfig::default(),
            traffic: TrafficConfig::default(),
        }
    }
}

impl IntersectionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: IntersectionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate numeric settings for internal consistency.
    ///
    /// Missing or duplicated cycles are not rejected here: the controller
    /// disables itself for those and reports the diagnostic at startup.
    pub fn validate(&self) -> Result<()> {
        let timing = [
            ("timing.yellow_hold", self.timing.yellow_hold),
            ("timing.green_hold", self.timing.green_hold),
            ("timing.cooldown_after_a", self.timing.cooldown_after_a),
            ("timing.cooldown_after_b", self.timing.cooldown_after_b),
        ];
        for (name, value) in timing {
            if !value.is_finite() || value < 0.0 {
                return Err(SignalError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !(self.episode.fixed_dt > 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "episode.fixed_dt must be positive, got {}",
                self.episode.fixed_dt
            )));
        }

        if !(self.episode.time_budget > 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "episode.time_budget must be positive, got {}",
                self.episode.time_budget
            )));
        }

        if !(self.rewards.initial_reward_timer > 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "rewards.initial_reward_timer must be positive, got {}",
                self.rewards.initial_reward_timer
            )));
        }

        if !(0.0..=1.0).contains(&self.policy.switch_probability) {
            return Err(SignalError::InvalidConfig(format!(
                "policy.switch_probability must be within 0..=1, got {}",
                self.policy.switch_probability
            )));
        }

        if self.policy.fixed_interval == 0 {
            return Err(SignalError::InvalidConfig(
                "policy.fixed_interval must be at least 1".into(),
            ));
        }

        self.traffic.validate()?;

        Ok(())
    }
}

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> Result<IntersectionConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config = IntersectionConfig::from_toml_str(&contents)?;
    tracing::debug!("Loaded intersection config from {:?}", path);
    Ok(config)
}
