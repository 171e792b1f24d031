//! Example: random agent flying the heading task against a toy simulator

use anyhow::Context;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use flight_task_core::{Property, Task, TaskConfig};
use flight_task_env::{make_task, PropertyTable, SingleControlEnv};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => TaskConfig::from_path(&path).with_context(|| format!("loading {path}"))?,
        None => TaskConfig {
            seed: Some(7),
            max_steps: 200,
            ..TaskConfig::default()
        },
    };
    let task = make_task("heading", config)?;
    let action_space = task.action_space().clone();

    // Sinks in proportion to how far the elevator is pushed down
    let sim = PropertyTable::new(1.0 / 60.0)?.with_dynamics(|values, dt| {
        let elevator = values.get(&Property::FcsElevatorCmdNorm).copied().unwrap_or_default();
        let sink = 30.0 * elevator;
        *values.entry(Property::PositionHSlM).or_default() -= sink * dt;
        values.insert(Property::VelocitiesVDownMps, sink);
        let target_ft = values.get(&Property::TargetAltitudeFt).copied().unwrap_or_default();
        let altitude = values.get(&Property::PositionHSlM).copied().unwrap_or_default();
        values.insert(Property::DeltaAltitude, target_ft * 0.3048 - altitude);
    });
    let mut env = SingleControlEnv::new(task, sim, "A0100")?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let num_episodes = 5;
    let mut episode_rewards = Vec::new();

    for episode in 0..num_episodes {
        env.reset(&[
            (Property::SimulationSimTimeSec, 0.0),
            (Property::PositionHSlM, 6000.0),
            (Property::TargetAltitudeFt, 6000.0 / 0.3048),
            (Property::TargetHeadingDeg, 0.0),
            (Property::TargetVelocitiesUMps, 240.0),
            (Property::HeadingCheckTime, 20.0),
        ])?;

        loop {
            let action = action_space.sample(&mut rng);
            let step = env.step(&action)?;
            if step.done {
                println!(
                    "Episode {}: reason = {:?}, steps = {}, turns = {}",
                    episode + 1,
                    step.info.termination,
                    env.current_step(),
                    env.heading_turn_counts()
                );
                break;
            }
        }

        let summary = env.episode().context("episode summary missing after reset")?;
        episode_rewards.push(summary.total_reward);
        println!("{}", serde_json::to_string(summary)?);
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_reward: f64 = episode_rewards.iter().sum::<f64>() / episode_rewards.len() as f64;
    println!("\nAverage Reward over {num_episodes} episodes: {avg_reward:.2}");

    Ok(())
}
