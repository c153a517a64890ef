//! Simulation layer - control tick plus the scripted traffic feed

pub mod tick;
pub mod traffic;

pub use tick::{IntersectionEnv, TickInput, TickReport};
pub use traffic::{ScriptedTraffic, TrafficConfig};

use crate::core::config::IntersectionConfig;
use crate::core::error::{Result, SignalError};
use crate::episode::events::EpisodeEventLog;
use crate::episode::manager::EpisodeSummary;
use crate::policy::DecisionPolicy;

/// Called after each finished episode with its summary and event log
pub type EpisodeCallback<'a> = &'a mut dyn FnMut(&EpisodeSummary, &EpisodeEventLog);

/// Run `episodes` complete episodes headless against scripted traffic
pub fn run_episodes(
    config: &IntersectionConfig,
    policy: Box<dyn DecisionPolicy>,
    episodes: usize,
    mut on_episode: Option<EpisodeCallback<'_>>,
) -> Result<Vec<EpisodeSummary>> {
    let mut env = IntersectionEnv::with_policy(config.clone(), policy);
    if !env.controller().is_enabled() {
        return Err(SignalError::MissingCycles {
            configured: config.cycles.len(),
        });
    }

    let mut traffic = ScriptedTraffic::new(config.traffic.clone());
    let dt = config.episode.fixed_dt;
    let mut summaries = Vec::with_capacity(episodes);

    while summaries.len() < episodes {
        traffic.step(dt, env.controller());
        let report = env.tick(&mut traffic, TickInput::default());
        if let Some(summary) = report.terminal {
            if let Some(callback) = on_episode.as_mut() {
                callback(&summary, env.last_episode_log());
            }
            summaries.push(summary);
        }
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{build_policy, ScriptedPolicy};

    #[test]
    fn test_run_episodes_returns_each_summary() {
        let config = IntersectionConfig::default();
        let summaries = run_episodes(&config, build_policy(&config.policy), 2, None).unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].episode, 0);
        assert_eq!(summaries[1].episode, 1);
    }

    #[test]
    fn test_holding_policy_times_out() {
        let config = IntersectionConfig::default();
        let summaries = run_episodes(&config, Box::new(ScriptedPolicy::new(Vec::new())), 1, None).unwrap();

        let summary = &summaries[0];
        assert_eq!(summary.outcome, crate::episode::EpisodeOutcome::Timeout);
        assert_eq!(summary.incomplete_vehicles, 4);
        assert_eq!(summary.cycle_switches, 0);
    }

    #[test]
    fn test_callback_sees_each_finished_episode() {
        use crate::episode::EpisodeEventType;

        let config = IntersectionConfig::default();
        let mut seen = Vec::new();
        let mut record = |summary: &EpisodeSummary, log: &EpisodeEventLog| {
            let ended = log
                .iter()
                .any(|e| matches!(e.event_type, EpisodeEventType::EpisodeEnded { .. }));
            seen.push((summary.episode, ended));
        };

        let summaries =
            run_episodes(&config, build_policy(&config.policy), 2, Some(&mut record)).unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(seen, vec![(0, true), (1, true)]);
    }

    #[test]
    fn test_disabled_controller_is_error() {
        let mut config = IntersectionConfig::default();
        config.cycles.clear();
        let result = run_episodes(&config, Box::new(ScriptedPolicy::new(Vec::new())), 1, None);
        assert!(matches!(result, Err(SignalError::MissingCycles { configured: 0 })));
    }
}
