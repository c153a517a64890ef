//! Control tick - orchestrates one fixed timestep
//!
//! Order is fixed:
//! budget update -> decision window -> phase advance -> reward scoring -> terminal check
//!
//! Terminal rewards are applied once, then the scene is reloaded and every
//! piece of owned state starts over.

use serde::{Deserialize, Serialize};

use crate::core::config::IntersectionConfig;
use crate::core::types::Tick;
use crate::episode::events::{EpisodeEventLog, EpisodeEventType};
use crate::episode::manager::{EpisodeManager, EpisodeSummary};
use crate::episode::reward::{RewardBreakdown, RewardEvaluator};
use crate::episode::scheduler::{DecisionOutcome, DecisionScheduler};
use crate::episode::vehicles::{SceneReset, VehicleProgress};
use crate::policy::{build_policy, Action, DecisionPolicy};
use crate::signal::{CycleCompletion, SignalPhaseController};

/// External input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Operator action, only read by policies that accept overrides
    pub manual_override: Option<Action>,
}

impl TickInput {
    pub fn manual(action: Action) -> Self {
        Self { manual_override: Some(action) }
    }
}

/// Everything the caller learns from one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    pub reward: f32,
    pub breakdown: RewardBreakdown,
    /// None when the controller is disabled
    pub decision: Option<DecisionOutcome>,
    pub completion: Option<CycleCompletion>,
    pub terminal: Option<EpisodeSummary>,
    pub events: EpisodeEventLog,
}

/// Owns the controller and the episode layer and runs the control tick
pub struct IntersectionEnv {
    config: IntersectionConfig,
    controller: SignalPhaseController,
    scheduler: DecisionScheduler,
    rewards: RewardEvaluator,
    episodes: EpisodeManager,
    policy: Box<dyn DecisionPolicy>,
    current_tick: Tick,
    episode_log: EpisodeEventLog,
    last_episode_log: EpisodeEventLog,
}

impl IntersectionEnv {
    /// Build with the policy selected in `config.policy`
    pub fn new(config: IntersectionConfig) -> Self {
        let policy = build_policy(&config.policy);
        Self::with_policy(config, policy)
    }

    pub fn with_policy(config: IntersectionConfig, policy: Box<dyn DecisionPolicy>) -> Self {
        let controller = SignalPhaseController::from_config(&config);
        let scheduler = DecisionScheduler::new(config.timing.clone());
        let rewards = RewardEvaluator::new(config.rewards.clone());
        let episodes = EpisodeManager::new(config.episode.clone());

        let mut episode_log = EpisodeEventLog::new();
        episode_log.push(
            EpisodeEventType::EpisodeStarted { episode: 0 },
            format!("Episode 0 started with {} policy", policy.name()),
            0,
        );

        Self {
            config,
            controller,
            scheduler,
            rewards,
            episodes,
            policy,
            current_tick: 0,
            episode_log,
            last_episode_log: EpisodeEventLog::new(),
        }
    }

    pub fn config(&self) -> &IntersectionConfig {
        &self.config
    }

    pub fn controller(&self) -> &SignalPhaseController {
        &self.controller
    }

    pub fn scheduler(&self) -> &DecisionScheduler {
        &self.scheduler
    }

    pub fn rewards(&self) -> &RewardEvaluator {
        &self.rewards
    }

    pub fn episodes(&self) -> &EpisodeManager {
        &self.episodes
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Ticks run since construction, across episodes
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Events of the episode in progress
    pub fn episode_log(&self) -> &EpisodeEventLog {
        &self.episode_log
    }

    /// Events of the most recently finished episode
    pub fn last_episode_log(&self) -> &EpisodeEventLog {
        &self.last_episode_log
    }

    /// Run one tick with the configured fixed timestep
    pub fn tick<W>(&mut self, world: &mut W, input: TickInput) -> TickReport
    where
        W: VehicleProgress + SceneReset,
    {
        let dt = self.episodes.fixed_dt();
        self.tick_with_dt(world, input, dt)
    }

    pub fn tick_with_dt<W>(&mut self, world: &mut W, input: TickInput, dt: f32) -> TickReport
    where
        W: VehicleProgress + SceneReset,
    {
        if !self.controller.is_enabled() {
            return TickReport {
                tick: self.current_tick,
                ..TickReport::default()
            };
        }

        self.current_tick += 1;
        let tick = self.current_tick;
        let mut events = EpisodeEventLog::new();
        self.rewards.begin_tick();

        // 1. Budget
        let counts = world.roster().counts();
        self.episodes.update_budget(dt, &counts);
        self.rewards.advance_timer(dt);

        // 2. Decision window
        let observation = world.roster().observation();
        let decision = self.scheduler.tick(
            dt,
            self.policy.as_mut(),
            &observation,
            input.manual_override,
            &mut self.controller,
        );
        match decision {
            DecisionOutcome::Suppressed { dropped_input: true } => {
                events.push(
                    EpisodeEventType::InputDropped,
                    format!("Input dropped, window opens in {:.2}", self.scheduler.countdown()),
                    tick,
                );
            }
            DecisionOutcome::Decided { action, .. } if decision.accepted_switch() => {
                if let Some(target) = action.target() {
                    events.push(
                        EpisodeEventType::SwitchRequested { target },
                        format!("{} requested cycle {}", self.policy.name(), target),
                        tick,
                    );
                }
            }
            _ => {}
        }

        // 3. Phase advance
        let completion = self.controller.advance(dt);
        if let Some(done) = completion {
            self.scheduler.begin_cooldown(done.cycle);
            events.push(
                EpisodeEventType::CycleGranted { cycle: done.cycle },
                format!(
                    "Cycle {} granted, cooldown {:.2}",
                    done.cycle,
                    self.scheduler.countdown()
                ),
                tick,
            );
        }

        // 4. Rewards
        let newly_completed = self.rewards.score_tick(world.roster(), &counts, completion);
        for vehicle in newly_completed {
            events.push(
                EpisodeEventType::VehicleCompleted { vehicle },
                format!("Vehicle {:?} completed", vehicle.0),
                tick,
            );
        }

        // 5. Terminal check
        let mut terminal = None;
        if let Some(outcome) = self.episodes.check_terminal() {
            let value = self.rewards.score_terminal(outcome, &counts);
            let summary = self.episodes.finish(
                outcome,
                self.rewards.episode_total(),
                &counts,
                self.controller.switches_completed(),
            );
            events.push(
                EpisodeEventType::EpisodeEnded { outcome },
                format!("Episode {} ended {:?}, terminal reward {:.2}", summary.episode, outcome, value),
                tick,
            );
            terminal = Some(summary);
        }

        let breakdown = self.rewards.tick_breakdown();
        self.episode_log.extend(&events);

        if terminal.is_some() {
            world.reload_scene();
            self.start_next_episode();
        }

        TickReport {
            tick,
            reward: breakdown.total(),
            breakdown,
            decision: Some(decision),
            completion,
            terminal,
            events,
        }
    }

    /// Abandon the running episode without terminal rewards and start over
    pub fn reset<W: SceneReset>(&mut self, world: &mut W) {
        tracing::info!("Episode {} abandoned", self.episodes.episode());
        world.reload_scene();
        self.start_next_episode();
    }

    fn start_next_episode(&mut self) {
        self.controller.reset();
        self.scheduler.reset();
        self.rewards.reset();
        self.episodes.begin_episode();
        self.policy.on_episode_start();

        let episode = self.episodes.episode();
        self.last_episode_log = std::mem::take(&mut self.episode_log);
        self.episode_log.push(
            EpisodeEventType::EpisodeStarted { episode },
            format!("Episode {} started", episode),
            self.current_tick,
        );
    }
}
