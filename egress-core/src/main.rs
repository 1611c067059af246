//! Egress CLI — run one decision episode against the locked-room world
//!
//! # Usage
//!
//! ```bash
//! # Door is unlocked: probe, then walk out
//! egress --scenario unlocked
//!
//! # Door is locked: probe, then take the window
//! egress --scenario locked --max-steps 10
//!
//! # Custom thresholds and machine-readable output
//! egress --scenario locked --config egress.toml --json
//! ```

use anyhow::Result;
use clap::{Parser, ValueEnum};
use egress_core::config::DecisionConfig;
use egress_core::contracts::MemoryRecorder;
use egress_core::episode::Orchestrator;
use egress_core::world::LockedRoomWorld;
use serde::Serialize;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which room to run: a locked or an unlocked door
    #[arg(long, value_enum, default_value_t = Scenario::Unlocked)]
    scenario: Scenario,

    /// Step budget for the episode
    #[arg(long, default_value_t = 20)]
    max_steps: u32,

    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit the report and step records as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scenario {
    /// The door opens; trying it escapes
    Unlocked,
    /// The door is locked; the window is the only way out
    Locked,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    report: &'a egress_core::episode::EpisodeReport,
    steps: &'a [egress_core::episode::StepRecord],
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::level_filters::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => DecisionConfig::from_toml_path(path)?,
        None => DecisionConfig::default(),
    };

    let unlocked = matches!(args.scenario, Scenario::Unlocked);
    let mut world = LockedRoomWorld::new(unlocked);
    let catalog = LockedRoomWorld::standard_catalog();
    let mut recorder = MemoryRecorder::new();

    let mut orchestrator = Orchestrator::new(catalog, config, args.max_steps)?;
    let report = orchestrator.run(&mut world, &mut recorder, None)?;

    if args.json {
        let output = JsonOutput {
            report: &report,
            steps: recorder.records(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("episode {}", report.episode_id);
        println!("outcome: {}", report.outcome);
        println!(
            "steps: {} (final belief {:.2})",
            report.steps_taken, report.final_belief
        );
        for record in recorder.records() {
            println!(
                "  [{:>2}] {:<14} state={:<10} belief {:.2} -> {:.2} ({})",
                record.step_index,
                record.action_name,
                record.critical_state.to_string(),
                record.belief_before,
                record.belief_after,
                record.observation,
            );
        }
    }
    Ok(())
}
