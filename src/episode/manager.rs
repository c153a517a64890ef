//! Episode budget and termination
//!
//! Running -> Terminating -> Reset -> Running. Terminal rules fire once per
//! episode; the environment then reloads the scene and re-initialises state.

use serde::{Deserialize, Serialize};

use crate::core::config::EpisodeConfig;
use crate::core::types::Tick;
use crate::episode::vehicles::RosterCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpisodePhase {
    #[default]
    Running,
    Terminating,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// Every vehicle completed inside the budget
    Success,
    /// Budget ran out with vehicles still travelling
    Timeout,
}

/// Remaining time and roster tallies, refreshed every tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeBudget {
    pub remaining_time: f32,
    pub elapsed: f32,
    pub active_vehicle_count: usize,
    pub tracked_vehicle_count: usize,
    pub unreadable_vehicle_count: usize,
}

impl EpisodeBudget {
    pub fn new(time_budget: f32) -> Self {
        Self {
            remaining_time: time_budget,
            ..Self::default()
        }
    }
}

/// Result of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub outcome: EpisodeOutcome,
    pub ticks: Tick,
    pub elapsed: f32,
    pub total_reward: f32,
    pub completed_vehicles: usize,
    pub incomplete_vehicles: usize,
    pub cycle_switches: u32,
}

#[derive(Debug, Clone)]
pub struct EpisodeManager {
    config: EpisodeConfig,
    budget: EpisodeBudget,
    phase: EpisodePhase,
    episode: u32,
    ticks: Tick,
}

impl EpisodeManager {
    pub fn new(config: EpisodeConfig) -> Self {
        Self {
            budget: EpisodeBudget::new(config.time_budget),
            config,
            phase: EpisodePhase::Running,
            episode: 0,
            ticks: 0,
        }
    }

    pub fn budget(&self) -> &EpisodeBudget {
        &self.budget
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Zero-based index of the current episode
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Ticks run in the current episode
    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    pub fn fixed_dt(&self) -> f32 {
        self.config.fixed_dt
    }

    /// Spend `dt` of the budget and take the latest roster tallies
    pub fn update_budget(&mut self, dt: f32, counts: &RosterCounts) {
        self.ticks += 1;
        self.budget.elapsed += dt;
        self.budget.remaining_time = (self.budget.remaining_time - dt).max(0.0);
        self.budget.active_vehicle_count = counts.active;
        self.budget.tracked_vehicle_count = counts.tracked;
        self.budget.unreadable_vehicle_count = counts.unreadable;
    }

    /// Decide whether the episode ends this tick.
    ///
    /// Success wins over timeout when both hold. Only a running episode can
    /// terminate, so the outcome is reported once.
    pub fn check_terminal(&mut self) -> Option<EpisodeOutcome> {
        if self.phase != EpisodePhase::Running {
            return None;
        }

        let outcome = if self.budget.active_vehicle_count == 0 && self.budget.unreadable_vehicle_count == 0 {
            EpisodeOutcome::Success
        } else if self.budget.remaining_time <= 0.0 {
            EpisodeOutcome::Timeout
        } else {
            return None;
        };

        self.phase = EpisodePhase::Terminating;
        Some(outcome)
    }

    /// Close the terminating episode and build its summary
    pub fn finish(
        &mut self,
        outcome: EpisodeOutcome,
        total_reward: f32,
        counts: &RosterCounts,
        cycle_switches: u32,
    ) -> EpisodeSummary {
        self.phase = EpisodePhase::Reset;
        let summary = EpisodeSummary {
            episode: self.episode,
            outcome,
            ticks: self.ticks,
            elapsed: self.budget.elapsed,
            total_reward,
            completed_vehicles: counts.completed,
            incomplete_vehicles: counts.active + counts.unreadable,
            cycle_switches,
        };
        tracing::info!(
            "Episode {} ended: {:?} after {} ticks, reward {:.3}",
            summary.episode,
            summary.outcome,
            summary.ticks,
            summary.total_reward
        );
        summary
    }

    /// Fresh budget for the next episode
    pub fn begin_episode(&mut self) {
        self.episode += 1;
        self.budget = EpisodeBudget::new(self.config.time_budget);
        self.phase = EpisodePhase::Running;
        self.ticks = 0;
        tracing::debug!("Episode {} started, budget {:.2}", self.episode, self.config.time_budget);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(time_budget: f32) -> EpisodeManager {
        EpisodeManager::new(EpisodeConfig { time_budget, fixed_dt: 0.5 })
    }

    fn counts(active: usize, completed: usize, unreadable: usize) -> RosterCounts {
        RosterCounts { tracked: active + completed, active, completed, unreadable }
    }

    #[test]
    fn test_budget_counts_down_clamped() {
        let mut manager = manager(1.0);
        for _ in 0..4 {
            manager.update_budget(0.5, &counts(1, 0, 0));
        }
        assert_eq!(manager.budget().remaining_time, 0.0);
        assert_eq!(manager.budget().elapsed, 2.0);
        assert_eq!(manager.ticks(), 4);
    }

    #[test]
    fn test_running_while_vehicles_active() {
        let mut manager = manager(10.0);
        manager.update_budget(0.5, &counts(2, 1, 0));
        assert_eq!(manager.check_terminal(), None);
        assert_eq!(manager.phase(), EpisodePhase::Running);
    }

    #[test]
    fn test_success_when_no_active() {
        let mut manager = manager(10.0);
        manager.update_budget(0.5, &counts(0, 3, 0));
        assert_eq!(manager.check_terminal(), Some(EpisodeOutcome::Success));
        assert_eq!(manager.phase(), EpisodePhase::Terminating);
    }

    #[test]
    fn test_unreadable_blocks_success() {
        let mut manager = manager(10.0);
        manager.update_budget(0.5, &counts(0, 1, 1));
        assert_eq!(manager.check_terminal(), None);
    }

    #[test]
    fn test_timeout_when_budget_spent() {
        let mut manager = manager(1.0);
        manager.update_budget(0.5, &counts(2, 0, 0));
        assert_eq!(manager.check_terminal(), None);
        manager.update_budget(0.5, &counts(2, 0, 0));
        assert_eq!(manager.check_terminal(), Some(EpisodeOutcome::Timeout));
    }

    #[test]
    fn test_success_wins_over_timeout() {
        let mut manager = manager(0.5);
        manager.update_budget(0.5, &counts(0, 2, 0));
        assert_eq!(manager.check_terminal(), Some(EpisodeOutcome::Success));
    }

    #[test]
    fn test_terminal_reported_once() {
        let mut manager = manager(0.5);
        manager.update_budget(0.5, &counts(1, 0, 0));
        assert!(manager.check_terminal().is_some());
        assert!(manager.check_terminal().is_none());
    }

    #[test]
    fn test_finish_and_begin_next_episode() {
        let mut manager = manager(0.5);
        let tally = counts(2, 1, 0);
        manager.update_budget(0.5, &tally);
        let outcome = manager.check_terminal().unwrap();

        let summary = manager.finish(outcome, -2.5, &tally, 3);
        assert_eq!(summary.episode, 0);
        assert_eq!(summary.outcome, EpisodeOutcome::Timeout);
        assert_eq!(summary.incomplete_vehicles, 2);
        assert_eq!(summary.completed_vehicles, 1);
        assert_eq!(summary.cycle_switches, 3);
        assert_eq!(manager.phase(), EpisodePhase::Reset);

        manager.begin_episode();
        assert_eq!(manager.episode(), 1);
        assert_eq!(manager.phase(), EpisodePhase::Running);
        assert_eq!(manager.budget(), &EpisodeBudget::new(0.5));
        assert_eq!(manager.ticks(), 0);
    }
}
