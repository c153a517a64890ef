//! Vehicle-progress boundary
//!
//! The vehicle subsystem owns the roster and refreshes it through explicit
//! add/update/remove calls. The core only ever reads it.

use serde::{Deserialize, Serialize};

use crate::core::types::{Vec3, VehicleId};
use crate::policy::Observation;

/// Progress reported by the external tracker for one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleProgressSnapshot {
    pub position: Vec3,
    /// Score gates still to pass
    pub remaining_count: u32,
    pub completed: bool,
}

impl VehicleProgressSnapshot {
    pub fn new(position: Vec3, remaining_count: u32) -> Self {
        Self {
            position,
            remaining_count,
            completed: remaining_count == 0,
        }
    }
}

/// Roster entry; `progress` is None while the tracker cannot be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: VehicleId,
    pub progress: Option<VehicleProgressSnapshot>,
}

/// Per-tick tallies of the roster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCounts {
    /// Vehicles with a readable snapshot
    pub tracked: usize,
    /// Readable and not yet completed
    pub active: usize,
    pub completed: usize,
    /// Transient read misses, excluded from every other count
    pub unreadable: usize,
}

/// Ordered set of vehicles currently in the scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleRoster {
    entries: Vec<RosterEntry>,
}

impl VehicleRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vehicle (or replace its snapshot if already present)
    pub fn insert(&mut self, id: VehicleId, progress: Option<VehicleProgressSnapshot>) {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry.progress = progress,
            None => self.entries.push(RosterEntry { id, progress }),
        }
    }

    /// Refresh the snapshot of a known vehicle. Returns false if unknown.
    pub fn update(&mut self, id: VehicleId, progress: VehicleProgressSnapshot) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.progress = Some(progress);
                true
            }
            None => false,
        }
    }

    /// Record that the tracker could not be read this tick
    pub fn mark_unreadable(&mut self, id: VehicleId) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.progress = None;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: VehicleId) -> Option<RosterEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: VehicleId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn counts(&self) -> RosterCounts {
        let mut counts = RosterCounts::default();
        for entry in &self.entries {
            match &entry.progress {
                Some(p) => {
                    counts.tracked += 1;
                    if p.completed {
                        counts.completed += 1;
                    } else {
                        counts.active += 1;
                    }
                }
                None => counts.unreadable += 1,
            }
        }
        counts
    }

    /// One slot per vehicle in roster order; unreadable vehicles keep their slot
    pub fn observation(&self) -> Observation {
        Observation::new(
            self.entries
                .iter()
                .map(|e| e.progress.map(|p| p.position))
                .collect(),
        )
    }
}

/// Read access to the vehicle subsystem
pub trait VehicleProgress {
    fn roster(&self) -> &VehicleRoster;
}

/// Scene reload primitive invoked when an episode ends
pub trait SceneReset {
    fn reload_scene(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(remaining: u32) -> VehicleProgressSnapshot {
        VehicleProgressSnapshot::new(Vec3::new(remaining as f32, 0.0, 0.0), remaining)
    }

    #[test]
    fn test_snapshot_completion_from_count() {
        assert!(!snapshot(2).completed);
        assert!(snapshot(0).completed);
    }

    #[test]
    fn test_counts_split_states() {
        let mut roster = VehicleRoster::new();
        roster.insert(VehicleId::new(), Some(snapshot(2)));
        roster.insert(VehicleId::new(), Some(snapshot(0)));
        roster.insert(VehicleId::new(), None);

        let counts = roster.counts();
        assert_eq!(counts.tracked, 2);
        assert_eq!(counts.active, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.unreadable, 1);
    }

    #[test]
    fn test_insert_existing_replaces() {
        let mut roster = VehicleRoster::new();
        let id = VehicleId::new();
        roster.insert(id, Some(snapshot(2)));
        roster.insert(id, Some(snapshot(1)));

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(id).unwrap().progress.unwrap().remaining_count, 1);
    }

    #[test]
    fn test_update_unknown_vehicle() {
        let mut roster = VehicleRoster::new();
        assert!(!roster.update(VehicleId::new(), snapshot(1)));
        assert!(!roster.mark_unreadable(VehicleId::new()));
    }

    #[test]
    fn test_read_miss_then_recover() {
        let mut roster = VehicleRoster::new();
        let id = VehicleId::new();
        roster.insert(id, Some(snapshot(2)));

        assert!(roster.mark_unreadable(id));
        assert_eq!(roster.counts().active, 0);
        assert_eq!(roster.counts().unreadable, 1);

        assert!(roster.update(id, snapshot(1)));
        assert_eq!(roster.counts().active, 1);
    }

    #[test]
    fn test_observation_keeps_slot_for_unreadable() {
        let mut roster = VehicleRoster::new();
        roster.insert(VehicleId::new(), Some(snapshot(3)));
        roster.insert(VehicleId::new(), None);
        roster.insert(VehicleId::new(), Some(snapshot(1)));

        let obs = roster.observation();
        assert_eq!(
            obs.vehicle_positions,
            vec![Some(Vec3::new(3.0, 0.0, 0.0)), None, Some(Vec3::new(1.0, 0.0, 0.0))]
        );
    }

    #[test]
    fn test_read_miss_does_not_shift_later_vehicles() {
        let mut roster = VehicleRoster::new();
        let first = VehicleId::new();
        roster.insert(first, Some(snapshot(1)));
        roster.insert(VehicleId::new(), Some(snapshot(2)));
        roster.insert(VehicleId::new(), Some(snapshot(3)));
        roster.mark_unreadable(first);

        let obs = roster.observation();
        assert_eq!(obs.len(), roster.len());
        assert_eq!(obs.to_vector(), vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_remove() {
        let mut roster = VehicleRoster::new();
        let id = VehicleId::new();
        roster.insert(id, Some(snapshot(1)));
        assert!(roster.remove(id).is_some());
        assert!(roster.remove(id).is_none());
        assert!(roster.is_empty());
    }
}
