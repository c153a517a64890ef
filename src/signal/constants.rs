//! Signal timing constants - defaults mirrored by `TimingConfig`

// Transition holds (simulation time units)
pub const YELLOW_HOLD: f32 = 2.0;
pub const GREEN_HOLD: f32 = 1.5;

// Post-cycle decision cooldowns, asymmetric per direction
pub const COOLDOWN_AFTER_A: f32 = 0.0;
pub const COOLDOWN_AFTER_B: f32 = 9.0;

// A hold timer this close to zero counts as expired
pub const TIMER_EPSILON: f32 = 1e-4;
