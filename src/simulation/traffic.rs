//! Scripted traffic feed
//!
//! Stand-in for the vehicle subsystem: queues of vehicles on the two
//! approaches roll forward while their cycle shows Green and count score
//! gates. A vehicle already past the stop line keeps moving until it exits.
//! Deterministic for a given seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SignalError};
use crate::core::types::{CycleId, Vec3, VehicleId};
use crate::episode::vehicles::{SceneReset, VehicleProgress, VehicleProgressSnapshot, VehicleRoster};
use crate::signal::{LightState, SignalPhaseController};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Vehicles queued on each approach at scene load
    pub vehicles_per_approach: usize,
    /// Gap between queued vehicles
    pub spacing: f32,
    /// Distance from the stop line to the exit
    pub approach_length: f32,
    /// Score gates spread evenly up to the exit; all passed means completed
    pub gates: u32,
    pub speed: f32,
    /// Random extra gap added behind each queued vehicle
    pub spawn_jitter: f32,
    /// Chance per vehicle per tick that its tracker cannot be read
    pub read_miss_probability: f32,
    pub seed: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            vehicles_per_approach: 2,
            spacing: 4.0,
            approach_length: 10.0,
            gates: 2,
            speed: 5.0,
            spawn_jitter: 1.0,
            read_miss_probability: 0.0,
            seed: 7,
        }
    }
}

impl TrafficConfig {
    pub fn validate(&self) -> Result<()> {
        if self.gates == 0 {
            return Err(SignalError::InvalidConfig("traffic.gates must be at least 1".into()));
        }
        let positive = [
            ("traffic.approach_length", self.approach_length),
            ("traffic.speed", self.speed),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SignalError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        let non_negative = [
            ("traffic.spacing", self.spacing),
            ("traffic.spawn_jitter", self.spawn_jitter),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(SignalError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.read_miss_probability) {
            return Err(SignalError::InvalidConfig(format!(
                "traffic.read_miss_probability must be within 0..=1, got {}",
                self.read_miss_probability
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct TrafficVehicle {
    id: VehicleId,
    approach: CycleId,
    /// Negative while queued behind the stop line
    distance: f32,
    gates_passed: u32,
}

pub struct ScriptedTraffic {
    config: TrafficConfig,
    rng: ChaCha8Rng,
    vehicles: Vec<TrafficVehicle>,
    roster: VehicleRoster,
    reloads: u32,
}

impl ScriptedTraffic {
    pub fn new(config: TrafficConfig) -> Self {
        let mut traffic = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            vehicles: Vec::new(),
            roster: VehicleRoster::new(),
            reloads: 0,
        };
        traffic.spawn();
        traffic
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// Times the scene has been reloaded
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Move vehicles for one tick and refresh the roster
    pub fn step(&mut self, dt: f32, controller: &SignalPhaseController) {
        let gates = self.config.gates;
        let gate_spacing = self.config.approach_length / gates as f32;
        let travel = self.config.speed * dt;

        for vehicle in &mut self.vehicles {
            if vehicle.gates_passed >= gates {
                continue;
            }
            let green = controller.light(vehicle.approach) == LightState::Green;
            if green || vehicle.distance > 0.0 {
                vehicle.distance += travel;
            }
            let passed = (vehicle.distance / gate_spacing).floor().max(0.0) as u32;
            vehicle.gates_passed = passed.min(gates);
        }

        self.refresh_roster();
    }

    fn spawn(&mut self) {
        self.vehicles.clear();
        self.roster.clear();

        for approach in [CycleId::A, CycleId::B] {
            for k in 0..self.config.vehicles_per_approach {
                let jitter = self.rng.gen::<f32>() * self.config.spawn_jitter;
                let distance = -(k as f32 * self.config.spacing + jitter);
                let vehicle = TrafficVehicle {
                    id: VehicleId::new(),
                    approach,
                    distance,
                    gates_passed: 0,
                };
                let snapshot = self.snapshot(&vehicle);
                self.roster.insert(vehicle.id, Some(snapshot));
                self.vehicles.push(vehicle);
            }
        }

        tracing::debug!("Spawned {} vehicles", self.vehicles.len());
    }

    fn refresh_roster(&mut self) {
        let miss = self.config.read_miss_probability;
        for idx in 0..self.vehicles.len() {
            let id = self.vehicles[idx].id;
            if miss > 0.0 && self.rng.gen::<f32>() < miss {
                self.roster.mark_unreadable(id);
            } else {
                let snapshot = self.snapshot(&self.vehicles[idx]);
                self.roster.update(id, snapshot);
            }
        }
    }

    fn snapshot(&self, vehicle: &TrafficVehicle) -> VehicleProgressSnapshot {
        let position = match vehicle.approach {
            CycleId::A => Vec3::new(0.0, 0.0, vehicle.distance),
            CycleId::B => Vec3::new(vehicle.distance, 0.0, 0.0),
        };
        let remaining = self.config.gates.saturating_sub(vehicle.gates_passed);
        VehicleProgressSnapshot::new(position, remaining)
    }
}

impl VehicleProgress for ScriptedTraffic {
    fn roster(&self) -> &VehicleRoster {
        &self.roster
    }
}

impl SceneReset for ScriptedTraffic {
    fn reload_scene(&mut self) {
        self.reloads += 1;
        self.spawn();
    }
}
