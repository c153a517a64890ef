//! Decision scheduler - how often the policy gets to act
//!
//! While the countdown runs the policy is not consulted and operator input is
//! dropped. At zero the policy is asked every tick until a completed switch
//! starts the next cooldown.

use serde::{Deserialize, Serialize};

use crate::core::config::TimingConfig;
use crate::core::types::CycleId;
use crate::policy::{Action, DecisionPolicy, Observation};
use crate::signal::{SignalPhaseController, SwitchOutcome};

/// Countdown plus the last action taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionWindow {
    /// Never negative
    pub countdown: f32,
    pub pending: Action,
}

/// What happened in the decision step of a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecisionOutcome {
    /// Window closed; `dropped_input` is true when an override was discarded
    Suppressed { dropped_input: bool },
    /// Policy consulted; `switch` is set for non-zero actions
    Decided {
        action: Action,
        switch: Option<SwitchOutcome>,
    },
}

impl DecisionOutcome {
    pub fn accepted_switch(&self) -> bool {
        match self {
            DecisionOutcome::Decided { switch: Some(outcome), .. } => outcome.is_accepted(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionScheduler {
    window: DecisionWindow,
    timing: TimingConfig,
    decisions: u64,
    dropped_inputs: u64,
}

impl DecisionScheduler {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            window: DecisionWindow::default(),
            timing,
            decisions: 0,
            dropped_inputs: 0,
        }
    }

    pub fn window(&self) -> &DecisionWindow {
        &self.window
    }

    pub fn countdown(&self) -> f32 {
        self.window.countdown
    }

    /// True when the next tick will consult the policy
    pub fn is_open(&self) -> bool {
        self.window.countdown <= 0.0
    }

    /// Policy decisions made since the last reset
    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Operator inputs discarded since the last reset
    pub fn dropped_inputs(&self) -> u64 {
        self.dropped_inputs
    }

    /// Run the decision step of one tick
    pub fn tick(
        &mut self,
        dt: f32,
        policy: &mut dyn DecisionPolicy,
        observation: &Observation,
        manual_override: Option<Action>,
        controller: &mut SignalPhaseController,
    ) -> DecisionOutcome {
        if !self.is_open() {
            self.window.countdown = (self.window.countdown - dt).max(0.0);
            policy.discard_input();

            let dropped_input = manual_override.is_some();
            if dropped_input {
                self.dropped_inputs += 1;
                tracing::trace!(
                    "Input dropped, decision window opens in {:.2}",
                    self.window.countdown
                );
            }
            return DecisionOutcome::Suppressed { dropped_input };
        }

        let action = policy.decide(observation, manual_override);
        self.window.pending = action;
        self.decisions += 1;

        let switch = action.target().map(|target| controller.request_switch(target));
        tracing::debug!(
            "{} policy decided {:?} ({}) with {}/{} vehicles readable, switch {:?}",
            policy.name(),
            action,
            action.as_u8(),
            observation.readable_count(),
            observation.len(),
            switch
        );

        DecisionOutcome::Decided { action, switch }
    }

    /// Start the post-switch cooldown for the cycle that was just granted
    pub fn begin_cooldown(&mut self, cycle: CycleId) {
        self.window.countdown = self.timing.cooldown_for(cycle).max(0.0);
        self.window.pending = Action::Hold;
    }

    pub fn reset(&mut self) {
        self.window = DecisionWindow::default();
        self.decisions = 0;
        self.dropped_inputs = 0;
    }
}
