//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a signal head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalHeadId(pub Uuid);

impl SignalHeadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SignalHeadId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a tracked vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

/// Control tick counter (fixed-timestep simulation steps)
pub type Tick = u64;

/// The two competing signal cycles at the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleId {
    A,
    B,
}

impl CycleId {
    /// The cycle competing with this one for right-of-way
    pub fn other(&self) -> CycleId {
        match self {
            CycleId::A => CycleId::B,
            CycleId::B => CycleId::A,
        }
    }

    /// Array slot used by the controller for this cycle
    pub fn index(&self) -> usize {
        match self {
            CycleId::A => 0,
            CycleId::B => 1,
        }
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleId::A => write!(f, "A"),
            CycleId::B => write!(f, "B"),
        }
    }
}

/// 3D world position reported by the vehicle subsystem
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_other() {
        assert_eq!(CycleId::A.other(), CycleId::B);
        assert_eq!(CycleId::B.other(), CycleId::A);
    }

    #[test]
    fn test_cycle_index_distinct() {
        assert_ne!(CycleId::A.index(), CycleId::B.index());
    }

    #[test]
    fn test_vec3_to_array() {
        assert_eq!(Vec3::new(1.0, -2.0, 0.5).to_array(), [1.0, -2.0, 0.5]);
    }

    #[test]
    fn test_vehicle_id_unique() {
        assert_ne!(VehicleId::new(), VehicleId::new());
    }
}
