//! Intersection RL - Entry Point
//!
//! Interactive terminal front end. The operator drives the manual policy
//! against scripted traffic, one tick or a batch of ticks at a time.

use intersection_rl::core::config::{load_config, IntersectionConfig};
use intersection_rl::core::error::Result;
use intersection_rl::core::types::CycleId;
use intersection_rl::policy::ManualPolicy;
use intersection_rl::simulation::{IntersectionEnv, ScriptedTraffic, TickInput, TickReport};

use std::io::{self, Write};

const CONFIG_PATH: &str = "data/intersection.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intersection_rl=info".into()),
        )
        .init();

    tracing::info!("Intersection RL starting...");

    let config = load_config(CONFIG_PATH).unwrap_or_else(|e| {
        tracing::warn!("Could not load {}: {} - using defaults", CONFIG_PATH, e);
        IntersectionConfig::default()
    });

    let mut traffic = ScriptedTraffic::new(config.traffic.clone());
    let mut env = IntersectionEnv::with_policy(config, Box::new(ManualPolicy::new()));

    if let Some(reason) = env.controller().disabled_reason() {
        println!("Controller disabled: {}", reason);
    }

    println!("\n=== INTERSECTION RL ===");
    println!("Two signal cycles, one green at a time");
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance one tick without input");
    println!("  s               - Request cycle A, then tick");
    println!("  a               - Request cycle B, then tick");
    println!("  run <n>         - Run n ticks without input");
    println!("  status          - Show detailed status");
    println!("  reset           - Abandon the episode and reload the scene");
    println!("  quit / q        - Exit");
    println!();

    loop {
        // Display current status
        display_status(&env);

        // Prompt
        print!("> ");
        io::stdout().flush()?;

        // Read input
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        // Handle empty input
        if input.is_empty() {
            continue;
        }

        // Handle quit command
        if input == "quit" || input == "q" {
            break;
        }

        // Handle tick command
        if input == "tick" || input == "t" {
            let report = step(&mut env, &mut traffic, TickInput::default());
            print_report(&report);
            continue;
        }

        // Handle status command
        if input == "status" {
            display_detailed_status(&env, &traffic);
            continue;
        }

        // Handle reset command
        if input == "reset" {
            env.reset(&mut traffic);
            println!("Scene reloaded, episode {}.", env.episodes().episode());
            continue;
        }

        // Handle run command
        if let Some(count) = input.strip_prefix("run ") {
            match count.trim().parse::<u32>() {
                Ok(n) => {
                    println!("Running {} ticks...", n);
                    let mut reward = 0.0;
                    for _ in 0..n {
                        let report = step(&mut env, &mut traffic, TickInput::default());
                        reward += report.reward;
                        if let Some(summary) = &report.terminal {
                            println!(
                                "Episode {} ended: {:?}, reward {:.3}",
                                summary.episode, summary.outcome, summary.total_reward
                            );
                        }
                    }
                    println!("Completed {} ticks, reward {:.3}. Now at tick {}.", n, reward, env.current_tick());
                }
                Err(_) => println!("Usage: run <number>"),
            }
            continue;
        }

        // Single key maps to a manual request
        let mut chars = input.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            if let Some(action) = ManualPolicy::action_for_key(key) {
                let report = step(&mut env, &mut traffic, TickInput::manual(action));
                print_report(&report);
                continue;
            }
        }

        println!("Unknown command: {}", input);
    }

    tracing::info!("Intersection RL shutting down");
    Ok(())
}

fn step(env: &mut IntersectionEnv, traffic: &mut ScriptedTraffic, input: TickInput) -> TickReport {
    traffic.step(env.config().episode.fixed_dt, env.controller());
    env.tick(traffic, input)
}

fn print_report(report: &TickReport) {
    for event in report.events.iter() {
        println!("  [{}] {}", event.tick, event.description);
    }
    println!("Tick {} reward {:+.3}", report.tick, report.reward);
    if let Some(summary) = &report.terminal {
        println!(
            "Episode {} ended: {:?} after {} ticks, total reward {:.3}",
            summary.episode, summary.outcome, summary.ticks, summary.total_reward
        );
    }
}

fn display_status(env: &IntersectionEnv) {
    let controller = env.controller();
    let budget = env.episodes().budget();
    println!(
        "--- Episode {} | A: {:?} | B: {:?} | {:.2} left | reward {:.3} ---",
        env.episodes().episode(),
        controller.light(CycleId::A),
        controller.light(CycleId::B),
        budget.remaining_time,
        env.rewards().episode_total()
    );
}

fn display_detailed_status(env: &IntersectionEnv, traffic: &ScriptedTraffic) {
    use intersection_rl::episode::VehicleProgress;

    let controller = env.controller();
    let state = controller.state();
    let budget = env.episodes().budget();
    let counts = traffic.roster().counts();

    println!();
    println!("=== STATUS (tick {}) ===", env.current_tick());
    println!("Policy: {}", env.policy_name());
    for cycle in controller.cycles() {
        let heads: Vec<&str> = cycle.heads().iter().map(|h| h.label.as_str()).collect();
        println!("  Cycle {} ({}): {:?} [{}]", cycle.id, cycle.name, cycle.state(), heads.join(", "));
    }
    println!(
        "Phase: {:?}, granted {:?}, timer {:.2}, requested {:?}",
        state.sub_phase, state.granted, state.timer, state.requested
    );
    println!(
        "Decision window: {}",
        if env.scheduler().is_open() {
            "open".to_string()
        } else {
            format!("opens in {:.2}", env.scheduler().countdown())
        }
    );
    println!(
        "Vehicles: {} spawned, {} active, {} completed ({} rewarded), {} unreadable",
        traffic.vehicle_count(),
        counts.active,
        counts.completed,
        env.rewards().rewarded_count(),
        counts.unreadable
    );
    println!(
        "Budget: {:.2} left, {:.2} elapsed, reward timer {:.2}",
        budget.remaining_time,
        budget.elapsed,
        env.rewards().reward_timer()
    );
    println!("Switches completed: {}", controller.switches_completed());
    println!();
}
