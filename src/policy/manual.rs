//! Operator-driven policy
//!
//! Plays whatever the operator pressed this tick. Input arriving while the
//! decision window is closed never reaches the policy.

use crate::policy::{Action, DecisionPolicy, Observation};

#[derive(Debug, Clone, Default)]
pub struct ManualPolicy {
    last_action: Action,
}

impl ManualPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key map used by the terminal front end: `s` requests A, `a` requests B
    pub fn action_for_key(key: char) -> Option<Action> {
        match key.to_ascii_lowercase() {
            's' => Some(Action::RequestA),
            'a' => Some(Action::RequestB),
            _ => None,
        }
    }

    /// Last action this policy produced
    pub fn last_action(&self) -> Action {
        self.last_action
    }
}

impl DecisionPolicy for ManualPolicy {
    fn decide(&mut self, _observation: &Observation, manual_override: Option<Action>) -> Action {
        self.last_action = manual_override.unwrap_or(Action::Hold);
        self.last_action
    }

    fn discard_input(&mut self) {
        self.last_action = Action::Hold;
    }

    fn name(&self) -> &str {
        "manual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map() {
        assert_eq!(ManualPolicy::action_for_key('s'), Some(Action::RequestA));
        assert_eq!(ManualPolicy::action_for_key('A'), Some(Action::RequestB));
        assert_eq!(ManualPolicy::action_for_key('x'), None);
    }

    #[test]
    fn test_no_input_holds() {
        let mut policy = ManualPolicy::new();
        assert_eq!(policy.decide(&Observation::default(), None), Action::Hold);
    }

    #[test]
    fn test_override_is_played() {
        let mut policy = ManualPolicy::new();
        let action = policy.decide(&Observation::default(), Some(Action::RequestB));
        assert_eq!(action, Action::RequestB);
        assert_eq!(policy.last_action(), Action::RequestB);

        policy.discard_input();
        assert_eq!(policy.last_action(), Action::Hold);
    }
}
