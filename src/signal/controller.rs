//! Two-cycle signal phase controller
//!
//! Transition: source Yellow -> source Red -> target Green (minimum hold) -> granted.
//! At most one cycle is ever Green; the source is Red before the target turns Green.

use crate::core::config::{IntersectionConfig, TimingConfig};
use crate::core::error::SignalError;
use crate::core::types::CycleId;
use crate::signal::constants::TIMER_EPSILON;
use crate::signal::cycle::{LightState, SignalCycle};
use crate::signal::phase::{CycleCompletion, PhaseState, SubPhase, SwitchOutcome};

/// Owns both cycles and is the only writer of their light state
#[derive(Debug, Clone)]
pub struct SignalPhaseController {
    /// `[A, B]` when enabled, empty when disabled
    cycles: Vec<SignalCycle>,
    state: PhaseState,
    timing: TimingConfig,
    disabled_reason: Option<String>,
    switches_completed: u32,
}

impl SignalPhaseController {
    /// Build a controller from configured cycles.
    ///
    /// Needs one A and one B cycle. Otherwise the controller disables itself,
    /// logs a warning and ignores every later request and tick.
    pub fn new(cycles: Vec<SignalCycle>, timing: TimingConfig) -> Self {
        let configured = cycles.len();
        let mut a = None;
        let mut b = None;
        for cycle in cycles {
            let id = cycle.id;
            match id {
                CycleId::A if a.is_none() => a = Some(cycle),
                CycleId::B if b.is_none() => b = Some(cycle),
                id => tracing::warn!("Ignoring duplicate signal cycle {}", id),
            }
        }

        let (cycles, disabled_reason) = match (a, b) {
            (Some(mut a), Some(mut b)) => {
                a.set_state(LightState::Red);
                b.set_state(LightState::Red);
                (vec![a, b], None)
            }
            _ => {
                let err = SignalError::MissingCycles { configured };
                tracing::warn!("There are no usable signal cycles, controller disabled: {}", err);
                (Vec::new(), Some(err.to_string()))
            }
        };

        Self {
            cycles,
            state: PhaseState::new(),
            timing,
            disabled_reason,
            switches_completed: 0,
        }
    }

    pub fn from_config(config: &IntersectionConfig) -> Self {
        let cycles = config.cycles.iter().map(SignalCycle::from_config).collect();
        Self::new(cycles, config.timing.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled_reason.is_none()
    }

    /// Startup diagnostic when the controller disabled itself
    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn granted(&self) -> Option<CycleId> {
        self.state.granted
    }

    pub fn cycle(&self, id: CycleId) -> Option<&SignalCycle> {
        self.cycles.get(id.index())
    }

    pub fn cycles(&self) -> &[SignalCycle] {
        &self.cycles
    }

    /// Current light of a cycle (Red for a disabled controller)
    pub fn light(&self, id: CycleId) -> LightState {
        self.cycle(id).map(|c| c.state()).unwrap_or(LightState::Red)
    }

    pub fn green_count(&self) -> usize {
        self.cycles.iter().filter(|c| c.is_green()).count()
    }

    /// Number of switches completed since the last reset
    pub fn switches_completed(&self) -> u32 {
        self.switches_completed
    }

    /// Ask for `target` to receive right-of-way.
    ///
    /// Duplicate, stale and in-flight requests are debounced: nothing changes
    /// and the reason is returned.
    pub fn request_switch(&mut self, target: CycleId) -> SwitchOutcome {
        if !self.is_enabled() {
            return SwitchOutcome::Disabled;
        }
        if self.state.is_transitioning() {
            return SwitchOutcome::InFlight;
        }
        if self.state.granted == Some(target) {
            return SwitchOutcome::AlreadyGranted;
        }

        self.state.requested = Some(target);
        self.state.source = self.state.granted;

        match self.state.source {
            Some(source) => {
                self.set_light(source, LightState::Yellow);
                self.enter(SubPhase::YellowHold, self.timing.yellow_hold);
                tracing::debug!("Cycle {} yellow, switching to {}", source, target);
            }
            None => {
                // Nothing to clear, go straight to green
                self.enter_green_hold(target);
            }
        }

        SwitchOutcome::Accepted
    }

    /// Advance the in-flight transition by `dt`.
    ///
    /// Returns the completion when the target becomes granted this tick.
    pub fn advance(&mut self, dt: f32) -> Option<CycleCompletion> {
        if !self.is_enabled() || !self.state.is_transitioning() {
            return None;
        }

        self.state.timer = (self.state.timer - dt).max(0.0);
        let expired = self.state.timer <= TIMER_EPSILON;

        match self.state.sub_phase {
            SubPhase::Idle => None,
            SubPhase::YellowHold => {
                if expired {
                    self.settle_red();
                }
                None
            }
            SubPhase::RedSettle => {
                self.settle_red();
                None
            }
            SubPhase::GreenHold => {
                if expired {
                    self.complete()
                } else {
                    None
                }
            }
        }
    }

    /// Back to the initial state: both cycles Red, nothing granted
    pub fn reset(&mut self) {
        for cycle in &mut self.cycles {
            cycle.set_state(LightState::Red);
        }
        self.state = PhaseState::new();
        self.switches_completed = 0;
    }

    fn enter(&mut self, sub_phase: SubPhase, hold: f32) {
        self.state.sub_phase = sub_phase;
        self.state.timer = hold;
    }

    fn settle_red(&mut self) {
        self.enter(SubPhase::RedSettle, 0.0);
        if let Some(source) = self.state.source {
            self.set_light(source, LightState::Red);
        }
        self.state.granted = None;

        match self.state.requested {
            Some(target) => self.enter_green_hold(target),
            None => self.state = PhaseState::new(),
        }
    }

    fn enter_green_hold(&mut self, target: CycleId) {
        // Competing cycle must already be Red here
        debug_assert_eq!(self.light(target.other()), LightState::Red);
        self.set_light(target, LightState::Green);
        debug_assert_eq!(self.green_count(), 1);
        self.enter(SubPhase::GreenHold, self.timing.green_hold);
        tracing::debug!("Cycle {} green, holding {:.2}", target, self.timing.green_hold);
    }

    fn complete(&mut self) -> Option<CycleCompletion> {
        let target = self.state.requested?;
        self.state = PhaseState {
            granted: Some(target),
            ..PhaseState::default()
        };
        self.switches_completed += 1;
        tracing::debug!("Cycle {} granted", target);
        Some(CycleCompletion { cycle: target })
    }

    fn set_light(&mut self, id: CycleId, state: LightState) {
        if let Some(cycle) = self.cycles.get_mut(id.index()) {
            cycle.set_state(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::cycle::SignalHead;

    fn controller() -> SignalPhaseController {
        SignalPhaseController::from_config(&IntersectionConfig::default())
    }

    fn run(controller: &mut SignalPhaseController, dt: f32, ticks: usize) -> Vec<CycleCompletion> {
        (0..ticks).filter_map(|_| controller.advance(dt)).collect()
    }

    #[test]
    fn test_initial_state_all_red() {
        let controller = controller();
        assert!(controller.is_enabled());
        assert_eq!(controller.light(CycleId::A), LightState::Red);
        assert_eq!(controller.light(CycleId::B), LightState::Red);
        assert_eq!(controller.granted(), None);
        assert_eq!(controller.state().sub_phase, SubPhase::Idle);
    }

    #[test]
    fn test_request_from_all_red_skips_yellow() {
        let mut controller = controller();

        assert_eq!(controller.request_switch(CycleId::A), SwitchOutcome::Accepted);
        assert_eq!(controller.state().sub_phase, SubPhase::GreenHold);
        assert_eq!(controller.light(CycleId::A), LightState::Green);
        assert_eq!(controller.granted(), None);

        // 1.5 units at dt 0.5
        assert!(controller.advance(0.5).is_none());
        assert!(controller.advance(0.5).is_none());
        let done = controller.advance(0.5);
        assert_eq!(done, Some(CycleCompletion { cycle: CycleId::A }));
        assert_eq!(controller.granted(), Some(CycleId::A));
        assert_eq!(controller.state().sub_phase, SubPhase::Idle);
    }

    #[test]
    fn test_full_switch_sequence() {
        let mut controller = controller();
        controller.request_switch(CycleId::A);
        run(&mut controller, 0.5, 3);

        assert!(controller.request_switch(CycleId::B).is_accepted());
        assert_eq!(controller.light(CycleId::A), LightState::Yellow);
        assert_eq!(controller.light(CycleId::B), LightState::Red);

        // Yellow 2.0 at dt 0.5: A goes red on the 4th tick and B turns green
        assert!(run(&mut controller, 0.5, 3).is_empty());
        assert_eq!(controller.light(CycleId::A), LightState::Yellow);
        assert!(controller.advance(0.5).is_none());
        assert_eq!(controller.light(CycleId::A), LightState::Red);
        assert_eq!(controller.light(CycleId::B), LightState::Green);
        assert_eq!(controller.granted(), None);

        let completions = run(&mut controller, 0.5, 3);
        assert_eq!(completions, vec![CycleCompletion { cycle: CycleId::B }]);
        assert_eq!(controller.granted(), Some(CycleId::B));
        assert_eq!(controller.switches_completed(), 2);
    }

    #[test]
    fn test_request_granted_cycle_is_noop() {
        let mut controller = controller();
        controller.request_switch(CycleId::A);
        run(&mut controller, 0.5, 3);

        let before = controller.state().clone();
        for _ in 0..5 {
            assert_eq!(controller.request_switch(CycleId::A), SwitchOutcome::AlreadyGranted);
        }
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_request_during_transition_keeps_timer() {
        let mut controller = controller();
        controller.request_switch(CycleId::A);
        controller.advance(0.5);
        let timer = controller.state().timer;

        assert_eq!(controller.request_switch(CycleId::A), SwitchOutcome::InFlight);
        assert_eq!(controller.request_switch(CycleId::B), SwitchOutcome::InFlight);
        assert_eq!(controller.state().timer, timer);
        assert_eq!(controller.state().requested, Some(CycleId::A));
    }

    #[test]
    fn test_advance_when_idle_does_nothing() {
        let mut controller = controller();
        assert!(controller.advance(10.0).is_none());
        assert_eq!(controller.state(), &PhaseState::new());
    }

    #[test]
    fn test_reset_returns_to_all_red() {
        let mut controller = controller();
        controller.request_switch(CycleId::B);
        controller.advance(0.5);
        controller.reset();

        assert_eq!(controller.green_count(), 0);
        assert_eq!(controller.state(), &PhaseState::new());
        assert_eq!(controller.switches_completed(), 0);
    }

    #[test]
    fn test_missing_cycle_disables_controller() {
        let only_a = vec![SignalCycle::new(CycleId::A, "a", vec![SignalHead::new("n")])];
        let mut controller = SignalPhaseController::new(only_a, TimingConfig::default());

        assert!(!controller.is_enabled());
        assert!(controller.disabled_reason().is_some());
        assert_eq!(controller.request_switch(CycleId::B), SwitchOutcome::Disabled);
        assert!(controller.advance(1.0).is_none());
        assert_eq!(controller.green_count(), 0);
    }

    #[test]
    fn test_no_cycles_disables_controller() {
        let controller = SignalPhaseController::new(Vec::new(), TimingConfig::default());
        assert!(!controller.is_enabled());
        assert!(controller.cycles().is_empty());
    }

    #[test]
    fn test_cycles_reordered_by_id() {
        let cycles = vec![
            SignalCycle::new(CycleId::B, "b", Vec::new()),
            SignalCycle::new(CycleId::A, "a", Vec::new()),
        ];
        let controller = SignalPhaseController::new(cycles, TimingConfig::default());
        assert_eq!(controller.cycle(CycleId::A).unwrap().name, "a");
        assert_eq!(controller.cycle(CycleId::B).unwrap().name, "b");
    }

    #[test]
    fn test_zero_green_hold_completes_next_tick() {
        let timing = TimingConfig { green_hold: 0.0, ..TimingConfig::default() };
        let mut controller = SignalPhaseController::new(
            vec![
                SignalCycle::new(CycleId::A, "a", Vec::new()),
                SignalCycle::new(CycleId::B, "b", Vec::new()),
            ],
            timing,
        );
        controller.request_switch(CycleId::B);
        assert_eq!(controller.advance(0.02), Some(CycleCompletion { cycle: CycleId::B }));
    }
}
