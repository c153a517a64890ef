//! Headless Episode Runner
//!
//! Runs episodes of a chosen policy against scripted traffic and outputs
//! JSON or text summaries for policy evaluation.

use intersection_rl::core::config::{load_config, IntersectionConfig};
use intersection_rl::core::error::{Result, SignalError};
use intersection_rl::episode::{EpisodeEventLog, EpisodeOutcome, EpisodeSummary};
use intersection_rl::policy::{build_policy, Action, DecisionPolicy, PolicyKind, ScriptedPolicy};
use intersection_rl::simulation::{run_episodes, EpisodeCallback};
use clap::Parser;
use serde::Serialize;

/// Headless Episode Runner - evaluate signal policies
#[derive(Parser, Debug)]
#[command(name = "episode_runner")]
#[command(about = "Run signal control episodes and output reward summaries")]
struct Args {
    /// Intersection config file (TOML)
    #[arg(long, default_value = "data/intersection.toml")]
    config: String,

    /// Policy override: fixed_cycle, random or scripted
    #[arg(long)]
    policy: Option<String>,

    /// Comma separated raw actions for the scripted policy (0 hold, 1 A, 2 B)
    #[arg(long)]
    actions: Option<String>,

    /// Number of episodes to run
    #[arg(long, default_value_t = 5)]
    episodes: usize,

    /// Seed for the random policy and the traffic spawner
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every episode's event log to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    policy: String,
    seed: u64,
    episodes: Vec<EpisodeSummary>,
    mean_reward: f32,
    success_rate: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("intersection_rl=warn")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = load_config(&args.config).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config '{}': {}", args.config, e);
        eprintln!("Using default config");
        IntersectionConfig::default()
    });

    if let Some(name) = &args.policy {
        config.policy.kind = parse_policy_kind(name)?;
    }
    if let Some(seed) = args.seed {
        config.policy.seed = seed;
        config.traffic.seed = seed;
    }
    if config.policy.kind == PolicyKind::Manual {
        return Err(SignalError::InvalidConfig(
            "the manual policy needs an operator, use the interactive binary".into(),
        ));
    }

    let policy: Box<dyn DecisionPolicy> = match &args.actions {
        Some(list) => Box::new(ScriptedPolicy::new(parse_actions(list)?)),
        None => build_policy(&config.policy),
    };

    let policy_name = policy.name().to_string();

    let mut dump_log = |summary: &EpisodeSummary, log: &EpisodeEventLog| {
        eprintln!("=== Episode {} ===", summary.episode);
        for event in log.iter() {
            eprintln!("  [{}] {:?}: {}", event.tick, event.event_type, event.description);
        }
        eprintln!();
    };
    let on_episode: Option<EpisodeCallback<'_>> = if args.verbose { Some(&mut dump_log) } else { None };
    let summaries = run_episodes(&config, policy, args.episodes, on_episode)?;

    let count = summaries.len().max(1) as f32;
    let result = RunResult {
        policy: policy_name,
        seed: config.policy.seed,
        mean_reward: summaries.iter().map(|s| s.total_reward).sum::<f32>() / count,
        success_rate: summaries
            .iter()
            .filter(|s| s.outcome == EpisodeOutcome::Success)
            .count() as f32
            / count,
        episodes: summaries,
    };

    match args.format.as_str() {
        "text" => print_text(&result),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn parse_policy_kind(name: &str) -> Result<PolicyKind> {
    let kind = serde_json::from_value(serde_json::Value::String(name.to_string()))?;
    Ok(kind)
}

fn parse_actions(list: &str) -> Result<Vec<Action>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let raw = s
                .parse::<u8>()
                .map_err(|_| SignalError::InvalidConfig(format!("not an action: {}", s)))?;
            Action::try_from(raw)
        })
        .collect()
}

fn print_text(result: &RunResult) {
    println!("Episode Results");
    println!("===============");
    for summary in &result.episodes {
        println!(
            "#{:<3} {:<8} ticks {:>5}  reward {:>8.3}  completed {}/{}  switches {}",
            summary.episode,
            format!("{:?}", summary.outcome),
            summary.ticks,
            summary.total_reward,
            summary.completed_vehicles,
            summary.completed_vehicles + summary.incomplete_vehicles,
            summary.cycle_switches
        );
    }
    println!();
    println!("Policy: {}", result.policy);
    println!("Mean reward: {:.3}", result.mean_reward);
    println!("Success rate: {:.1}%", result.success_rate * 100.0);
    println!("Seed: {}", result.seed);
}
