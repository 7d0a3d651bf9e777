//! Headless Squad Runner
//!
//! Walks a hero across open ground with one squad in tow, scripting a hold,
//! a double-activation formation cycle and a brush with hostiles, then
//! prints the resulting world snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use glam::Vec3;
use hero_squad::core::config::SquadConfig;
use hero_squad::core::error::Result;
use hero_squad::core::types::HeroId;
use hero_squad::squad::{
    ArchetypeRegistry, HeroSnapshot, InputAction, InputFrame, SquadArchetype, SquadEventLog,
    SquadEventType, SquadWorld, StepContext, WorldSnapshot,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Squad Runner - scripted formation scenario
#[derive(Parser, Debug)]
#[command(name = "squad_runner")]
#[command(about = "Run a scripted hero/squad scenario and print the final state")]
struct Args {
    /// Archetype name (builtin, or from --archetype-dir)
    #[arg(long, default_value = "legionaries")]
    archetype: String,

    /// Extra directory of archetype TOML files
    #[arg(long)]
    archetype_dir: Option<PathBuf>,

    /// Squad config TOML (defaults used when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of simulation steps
    #[arg(long, default_value_t = 400)]
    steps: u64,

    /// Step duration in seconds
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    archetype: String,
    steps: u64,
    seed: u64,
    formation_changes: usize,
    rejected_changes: usize,
    final_state: WorldSnapshot,
}

const HERO: HeroId = HeroId(1);
const HERO_SPEED: f32 = 2.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hero_squad=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SquadConfig::load(path)?,
        None => SquadConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    config.seed = seed;

    let mut registry = ArchetypeRegistry::with_defaults()?;
    if let Some(dir) = &args.archetype_dir {
        let loaded = registry.load_directory(dir)?;
        tracing::info!("Loaded {} archetypes from {:?}", loaded.len(), dir);
    }
    let archetype: Arc<SquadArchetype> = registry.require(&args.archetype)?;

    let mut world = SquadWorld::new(config)?;
    let squad = world.spawn_squad(HERO, archetype, Vec3::ZERO, Vec3::Z);

    let mut log = SquadEventLog::new();
    let mut hero = HeroSnapshot::new(Vec3::ZERO, Vec3::Z);

    for step in 0..args.steps {
        let time = step as f32 * args.dt;
        hero = scripted_hero(hero, time, args.dt);
        let mut ctx = StepContext::new(args.dt).with_hero(HERO, hero);
        if let Some(frame) = scripted_input(step, args.steps) {
            ctx = ctx.with_input(squad, frame);
        }
        if is_contact_phase(step, args.steps) {
            ctx = ctx.with_hostiles(squad);
        }

        world.step(&ctx);
        for event in world.take_events() {
            tracing::debug!("[{}] {}", event.tick, event.description);
            log.events.push(event);
        }
    }

    let result = RunResult {
        archetype: args.archetype.clone(),
        steps: args.steps,
        seed,
        formation_changes: log
            .iter()
            .filter(|e| matches!(e.event_type, SquadEventType::FormationChanged { .. }))
            .count(),
        rejected_changes: log
            .iter()
            .filter(|e| matches!(e.event_type, SquadEventType::FormationChangeRejected { .. }))
            .count(),
        final_state: world.snapshot(),
    };

    match args.format.as_str() {
        "text" => print_text(&result),
        "json" => print_json(&result),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            print_json(&result);
        }
    }

    Ok(())
}

fn print_json(result: &RunResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize result: {}", e),
    }
}

fn print_text(result: &RunResult) {
    println!("Squad Run");
    println!("=========");
    println!("Archetype: {}", result.archetype);
    println!("Steps: {} (t = {:.2}s)", result.steps, result.final_state.time);
    println!("Formation changes: {} ({} rejected)", result.formation_changes, result.rejected_changes);
    for squad in &result.final_state.squads {
        println!();
        println!(
            "Squad {}: {:?} in {:?}, intent {:?}",
            squad.id.index, squad.state, squad.formation, squad.intent.intent
        );
        for unit in &squad.units {
            println!(
                "  unit {:>2} slot {:?} {:?} at ({:.2}, {:.2}, {:.2})",
                unit.id.index, unit.slot, unit.state, unit.position.x, unit.position.y, unit.position.z
            );
        }
    }
    println!();
    println!("Seed: {}", result.seed);
}

/// Hero walks north for the first quarter, then east, then stands
fn scripted_hero(mut hero: HeroSnapshot, time: f32, dt: f32) -> HeroSnapshot {
    let direction = if time < 5.0 {
        Vec3::Z
    } else if time < 10.0 {
        Vec3::X
    } else {
        Vec3::ZERO
    };
    hero.position += direction * HERO_SPEED * dt;
    if direction != Vec3::ZERO {
        hero.forward = direction;
    }
    hero
}

/// Follow at the start, hold partway, double-activate later, follow at the end
fn scripted_input(step: u64, total: u64) -> Option<InputFrame> {
    let at = |fraction: f64| (total as f64 * fraction) as u64;
    let frame = InputFrame::new();
    if step == 0 {
        Some(frame.with_action(InputAction::FollowHero))
    } else if step == at(0.3) {
        Some(frame.with_action(InputAction::HoldOrCycle))
    } else if step == at(0.55) || step == at(0.55) + 2 {
        Some(frame.with_action(InputAction::HoldOrCycle))
    } else if step == at(0.8) {
        Some(frame.with_action(InputAction::FollowHero))
    } else {
        None
    }
}

fn is_contact_phase(step: u64, total: u64) -> bool {
    step * 10 >= total * 6 && step * 10 < total * 7
}
