//! Seeded random policy, the untrained baseline

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::CycleId;
use crate::policy::{Action, DecisionPolicy, Observation};

pub struct RandomPolicy {
    rng: ChaCha8Rng,
    switch_probability: f32,
}

impl RandomPolicy {
    /// Create with specific RNG seed for deterministic behavior
    pub fn new(seed: u64, switch_probability: f32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            switch_probability: switch_probability.clamp(0.0, 1.0),
        }
    }
}

impl DecisionPolicy for RandomPolicy {
    fn decide(&mut self, _observation: &Observation, _manual_override: Option<Action>) -> Action {
        if self.rng.gen::<f32>() >= self.switch_probability {
            return Action::Hold;
        }
        let cycle = if self.rng.gen_bool(0.5) { CycleId::A } else { CycleId::B };
        Action::request(cycle)
    }

    fn name(&self) -> &str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: u64, n: usize) -> Vec<Action> {
        let mut policy = RandomPolicy::new(seed, 0.5);
        let obs = Observation::default();
        (0..n).map(|_| policy.decide(&obs, None)).collect()
    }

    #[test]
    fn test_same_seed_same_actions() {
        assert_eq!(sample(7, 64), sample(7, 64));
    }

    #[test]
    fn test_zero_probability_always_holds() {
        let mut policy = RandomPolicy::new(1, 0.0);
        let obs = Observation::default();
        assert!((0..100).all(|_| policy.decide(&obs, None) == Action::Hold));
    }

    #[test]
    fn test_full_probability_always_requests() {
        let mut policy = RandomPolicy::new(1, 1.0);
        let obs = Observation::default();
        assert!((0..100).all(|_| policy.decide(&obs, None) != Action::Hold));
    }
}
