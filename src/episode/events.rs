//! Per-episode event log

use serde::{Deserialize, Serialize};

use crate::core::types::{CycleId, Tick, VehicleId};
use crate::episode::manager::EpisodeOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeEvent {
    pub tick: Tick,
    pub event_type: EpisodeEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EpisodeEventType {
    EpisodeStarted { episode: u32 },
    SwitchRequested { target: CycleId },
    CycleGranted { cycle: CycleId },
    InputDropped,
    VehicleCompleted { vehicle: VehicleId },
    EpisodeEnded { outcome: EpisodeOutcome },
}

/// Events of a tick or of a whole episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeEventLog {
    pub events: Vec<EpisodeEvent>,
}

impl EpisodeEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: EpisodeEventType, description: String, tick: Tick) {
        self.events.push(EpisodeEvent {
            tick,
            event_type,
            description,
        });
    }

    pub fn extend(&mut self, other: &EpisodeEventLog) {
        self.events.extend(other.events.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpisodeEvent> {
        self.events.iter()
    }

    pub fn count(&self, matches: impl Fn(&EpisodeEventType) -> bool) -> usize {
        self.events.iter().filter(|e| matches(&e.event_type)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_count() {
        let mut log = EpisodeEventLog::new();
        log.push(EpisodeEventType::CycleGranted { cycle: CycleId::A }, "A granted".into(), 3);
        log.push(EpisodeEventType::InputDropped, "dropped".into(), 4);
        log.push(EpisodeEventType::CycleGranted { cycle: CycleId::B }, "B granted".into(), 9);

        assert_eq!(log.len(), 3);
        assert_eq!(log.count(|e| matches!(e, EpisodeEventType::CycleGranted { .. })), 2);
        assert_eq!(log.events[1].tick, 4);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut tick_log = EpisodeEventLog::new();
        tick_log.push(EpisodeEventType::SwitchRequested { target: CycleId::B }, "req".into(), 1);
        let mut episode_log = EpisodeEventLog::new();
        episode_log.push(EpisodeEventType::EpisodeStarted { episode: 0 }, "start".into(), 0);

        episode_log.extend(&tick_log);
        assert_eq!(episode_log.events[0].tick, 0);
        assert_eq!(episode_log.events[1].event_type, EpisodeEventType::SwitchRequested { target: CycleId::B });
    }
}
