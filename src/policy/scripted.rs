//! Deterministic policies: fixed alternation and action replay

use std::collections::VecDeque;

use crate::core::types::CycleId;
use crate::policy::{Action, DecisionPolicy, Observation};

/// Alternates between A and B every `interval` decisions, starting with A
#[derive(Debug, Clone)]
pub struct FixedCyclePolicy {
    interval: u32,
    decisions: u32,
    next: CycleId,
}

impl FixedCyclePolicy {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            decisions: 0,
            next: CycleId::A,
        }
    }
}

impl DecisionPolicy for FixedCyclePolicy {
    fn decide(&mut self, _observation: &Observation, _manual_override: Option<Action>) -> Action {
        let action = if self.decisions % self.interval == 0 {
            let action = Action::request(self.next);
            self.next = self.next.other();
            action
        } else {
            Action::Hold
        };
        self.decisions = self.decisions.wrapping_add(1);
        action
    }

    fn on_episode_start(&mut self) {
        self.decisions = 0;
        self.next = CycleId::A;
    }

    fn name(&self) -> &str {
        "fixed_cycle"
    }
}

/// Replays a fixed list of actions, one per decision, then holds.
/// The list restarts at every episode.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    script: Vec<Action>,
    remaining: VecDeque<Action>,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<Action>) -> Self {
        Self {
            remaining: script.iter().copied().collect(),
            script,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl DecisionPolicy for ScriptedPolicy {
    fn decide(&mut self, _observation: &Observation, _manual_override: Option<Action>) -> Action {
        self.remaining.pop_front().unwrap_or(Action::Hold)
    }

    fn on_episode_start(&mut self) {
        self.remaining = self.script.iter().copied().collect();
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_cycle_alternates() {
        let mut policy = FixedCyclePolicy::new(3);
        let obs = Observation::default();
        let actions: Vec<Action> = (0..7).map(|_| policy.decide(&obs, None)).collect();

        assert_eq!(
            actions,
            vec![
                Action::RequestA,
                Action::Hold,
                Action::Hold,
                Action::RequestB,
                Action::Hold,
                Action::Hold,
                Action::RequestA,
            ]
        );
    }

    #[test]
    fn test_fixed_cycle_ignores_override() {
        let mut policy = FixedCyclePolicy::new(5);
        assert_eq!(
            policy.decide(&Observation::default(), Some(Action::RequestB)),
            Action::RequestA
        );
    }

    #[test]
    fn test_fixed_cycle_restarts_each_episode() {
        let mut policy = FixedCyclePolicy::new(1);
        let obs = Observation::default();
        policy.decide(&obs, None);
        policy.on_episode_start();
        assert_eq!(policy.decide(&obs, None), Action::RequestA);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let mut policy = FixedCyclePolicy::new(0);
        let obs = Observation::default();
        assert_eq!(policy.decide(&obs, None), Action::RequestA);
        assert_eq!(policy.decide(&obs, None), Action::RequestB);
    }

    #[test]
    fn test_scripted_replays_then_holds() {
        let mut policy = ScriptedPolicy::new(vec![Action::RequestB, Action::RequestA]);
        let obs = Observation::default();

        assert_eq!(policy.decide(&obs, None), Action::RequestB);
        assert_eq!(policy.decide(&obs, None), Action::RequestA);
        assert_eq!(policy.decide(&obs, None), Action::Hold);
        assert_eq!(policy.remaining(), 0);

        policy.on_episode_start();
        assert_eq!(policy.remaining(), 2);
    }
}
