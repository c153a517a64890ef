//! Intersection RL - two-cycle signal controller with episode rewards

pub mod core;
pub mod episode;
pub mod policy;
pub mod signal;
pub mod simulation;
