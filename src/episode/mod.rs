//! Episode layer - decision gating, rewards, budget and termination
//!
//! - vehicles: read-only roster and the vehicle/scene boundaries
//! - scheduler: decision window and post-switch cooldown
//! - reward: per-tick and terminal reward contributions
//! - manager: budget, terminal check, episode summaries
//! - events: per-episode event log

pub mod events;
pub mod manager;
pub mod reward;
pub mod scheduler;
pub mod vehicles;

pub use events::{EpisodeEvent, EpisodeEventLog, EpisodeEventType};
pub use manager::{EpisodeBudget, EpisodeManager, EpisodeOutcome, EpisodePhase, EpisodeSummary};
pub use reward::{RewardAccumulator, RewardBreakdown, RewardEvaluator};
pub use scheduler::{DecisionOutcome, DecisionScheduler, DecisionWindow};
pub use vehicles::{
    RosterCounts, RosterEntry, SceneReset, VehicleProgress, VehicleProgressSnapshot, VehicleRoster,
};
