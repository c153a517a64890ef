//! Reward evaluation
//!
//! Contributions per tick:
//! - step penalty scaled by the share of tracked vehicles still travelling
//! - completion bonus, once per vehicle, shrinking as the reward timer grows
//! - fixed cost per completed cycle switch
//! - terminal success bonus or per-vehicle timeout penalty
//!
//! Everything is additive. Nothing is rolled back within an episode.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::config::RewardConfig;
use crate::core::types::VehicleId;
use crate::episode::manager::EpisodeOutcome;
use crate::episode::vehicles::{RosterCounts, VehicleRoster};
use crate::signal::CycleCompletion;

/// Signed contributions of a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub step_penalty: f32,
    pub completion_bonus: f32,
    pub cycle_cost: f32,
    pub terminal: f32,
}

impl RewardBreakdown {
    pub fn total(&self) -> f32 {
        self.step_penalty + self.completion_bonus + self.cycle_cost + self.terminal
    }
}

/// Episode scalar plus the breakdown of the tick in progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    pub episode_total: f32,
    pub tick: RewardBreakdown,
}

impl RewardAccumulator {
    fn begin_tick(&mut self) {
        self.tick = RewardBreakdown::default();
    }

    fn add_step_penalty(&mut self, value: f32) {
        self.tick.step_penalty += value;
        self.episode_total += value;
    }

    fn add_completion_bonus(&mut self, value: f32) {
        self.tick.completion_bonus += value;
        self.episode_total += value;
    }

    fn add_cycle_cost(&mut self, value: f32) {
        self.tick.cycle_cost += value;
        self.episode_total += value;
    }

    fn add_terminal(&mut self, value: f32) {
        self.tick.terminal += value;
        self.episode_total += value;
    }
}

#[derive(Debug, Clone)]
pub struct RewardEvaluator {
    config: RewardConfig,
    /// Grows by dt every tick, divides the completion bonus
    reward_timer: f32,
    /// Vehicles whose completion has been paid this episode
    rewarded: AHashSet<VehicleId>,
    accumulator: RewardAccumulator,
}

impl RewardEvaluator {
    pub fn new(config: RewardConfig) -> Self {
        Self {
            reward_timer: config.initial_reward_timer,
            config,
            rewarded: AHashSet::new(),
            accumulator: RewardAccumulator::default(),
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn reward_timer(&self) -> f32 {
        self.reward_timer
    }

    pub fn accumulator(&self) -> &RewardAccumulator {
        &self.accumulator
    }

    pub fn tick_breakdown(&self) -> RewardBreakdown {
        self.accumulator.tick
    }

    pub fn episode_total(&self) -> f32 {
        self.accumulator.episode_total
    }

    /// Vehicles already paid a completion bonus this episode
    pub fn rewarded_count(&self) -> usize {
        self.rewarded.len()
    }

    pub fn begin_tick(&mut self) {
        self.accumulator.begin_tick();
    }

    pub fn advance_timer(&mut self, dt: f32) {
        self.reward_timer += dt;
    }

    /// Score the post-transition state of a tick.
    ///
    /// Returns the vehicles paid a completion bonus for the first time.
    pub fn score_tick(
        &mut self,
        roster: &VehicleRoster,
        counts: &RosterCounts,
        completion: Option<CycleCompletion>,
    ) -> Vec<VehicleId> {
        if counts.active > 0 && counts.tracked > 0 {
            let share = counts.active as f32 / counts.tracked as f32;
            self.accumulator.add_step_penalty(-self.config.step_penalty * share);
        }

        let mut newly_completed = Vec::new();
        for entry in roster.iter() {
            let completed = entry.progress.map(|p| p.completed).unwrap_or(false);
            if completed && self.rewarded.insert(entry.id) {
                let bonus = self.config.completion_bonus / self.reward_timer;
                self.accumulator.add_completion_bonus(bonus);
                newly_completed.push(entry.id);
                tracing::trace!("Vehicle {:?} completed, bonus {:.3}", entry.id, bonus);
            }
        }

        if let Some(completion) = completion {
            self.accumulator.add_cycle_cost(-self.config.cycle_cost);
            tracing::trace!("Cycle {} completed, cost {}", completion.cycle, self.config.cycle_cost);
        }

        newly_completed
    }

    /// Apply the terminal contribution of an episode
    pub fn score_terminal(&mut self, outcome: EpisodeOutcome, counts: &RosterCounts) -> f32 {
        let value = match outcome {
            EpisodeOutcome::Success => self.config.success_bonus,
            EpisodeOutcome::Timeout => {
                let incomplete = counts.active + counts.unreadable;
                -self.config.timeout_penalty * incomplete as f32
            }
        };
        self.accumulator.add_terminal(value);
        value
    }

    /// Zero everything for a new episode
    pub fn reset(&mut self) {
        self.reward_timer = self.config.initial_reward_timer;
        self.rewarded.clear();
        self.accumulator = RewardAccumulator::default();
    }
}
