//! Headless Difficulty Simulator
//!
//! Plays a synthetic session against the difficulty controller and prints
//! where the multipliers ended up. Useful for tuning profiles and config.

use clap::Parser;
use dda_engine::core::{DdaConfig, Result};
use dda_engine::difficulty::{
    DdaController, DecisionOutcome, DifficultyFactor, ProfileRegistry, StatsReport, Telemetry,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Headless difficulty simulator - synthetic player vs the DDA controller
#[derive(Parser, Debug)]
#[command(name = "dda_sim")]
#[command(about = "Simulate a play session and report how difficulty adapted")]
struct Args {
    /// Starting difficulty profile
    #[arg(long, default_value = "normal")]
    profile: String,

    /// Player skill (0.0 = helpless, 1.0 = flawless)
    #[arg(long, default_value_t = 0.7)]
    skill: f64,

    /// Session length in minutes of game time
    #[arg(long, default_value_t = 30.0)]
    minutes: f64,

    /// Simulated frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Controller config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra difficulty profiles (TOML)
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Restore controller state before the session
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save controller state after the session
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct SimulationResult {
    seed: u64,
    skill: f64,
    minutes: f64,
    decisions: usize,
    raised: usize,
    lowered: usize,
    multipliers: BTreeMap<&'static str, f64>,
    stats: StatsReport,
}

/// Cumulative telemetry of a synthetic player
struct SyntheticPlayer {
    skill: f64,
    telemetry: Telemetry,
}

impl SyntheticPlayer {
    fn new(skill: f64) -> Self {
        Self {
            skill: skill.clamp(0.0, 1.0),
            telemetry: Telemetry {
                success_rate: skill,
                ..Telemetry::zeroed()
            },
        }
    }

    /// Play `dt` seconds against the controller's current multipliers
    fn play(&mut self, dt: f64, controller: &DdaController, rng: &mut ChaCha8Rng) {
        let enemy = (controller.multiplier_for(DifficultyFactor::EnemyDamage)
            + controller.multiplier_for(DifficultyFactor::EnemyHp)
            + controller.multiplier_for(DifficultyFactor::EnemySpeed))
            / 3.0;
        let support = (controller.multiplier_for(DifficultyFactor::ResourceAbundance)
            + controller.multiplier_for(DifficultyFactor::ItemRarity))
            / 2.0;
        let challenge = enemy / support.max(0.1);

        let t = &mut self.telemetry;
        let noise: f64 = rng.gen_range(-0.05..0.05);
        t.success_rate = (self.skill * 1.2 / challenge + noise).clamp(0.0, 1.0);
        t.survival_time_seconds += dt;

        let kill_chance = (0.05 * self.skill / enemy.max(0.1) * dt).clamp(0.0, 1.0);
        if rng.gen_bool(kill_chance) {
            t.enemies_defeated += 1;
        }

        t.damage_dealt += 10.0 * self.skill * dt * rng.gen_range(0.5..1.5);
        t.damage_taken += 8.0 * challenge * (1.0 - 0.5 * self.skill) * dt * rng.gen_range(0.5..1.5);
        t.exploration_progress = (t.exploration_progress + 0.0005 * self.skill * dt).min(1.0);
        t.genetic_stability = 0.8;
        t.emotional_balance = (0.5 + 0.5 * self.skill - 0.1 * (challenge - 1.0)).clamp(0.0, 1.0);
        t.ai_adaptation = 0.5;
    }
}

fn build_controller(args: &Args) -> Result<DdaController> {
    let mut config = match &args.config {
        Some(path) => DdaConfig::load(path)?,
        None => DdaConfig::default(),
    };
    config.default_profile = args.profile.clone();

    let mut registry = ProfileRegistry::builtin();
    if let Some(path) = &args.profiles {
        let added = registry.extend_from_toml(&fs::read_to_string(path)?)?;
        tracing::info!("Loaded {} custom profiles from {:?}", added.len(), path);
    }

    let mut controller = DdaController::with_config(config, registry)?;
    if let Some(path) = &args.load {
        controller.load(path)?;
    }
    Ok(controller)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dda_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut controller = build_controller(&args)?;
    let mut player = SyntheticPlayer::new(args.skill);

    let dt = 1.0 / f64::from(args.fps.max(1));
    let frames = (args.minutes.max(0.0) * 60.0 / dt).round() as u64;

    let mut outcomes = Vec::new();
    for _ in 0..frames {
        player.play(dt, &controller, &mut rng);
        if let Some(outcome) = controller.update(dt, &player.telemetry) {
            outcomes.push(outcome);
        }
    }

    if let Some(path) = &args.save {
        controller.save(path)?;
    }

    let result = SimulationResult {
        seed,
        skill: args.skill,
        minutes: args.minutes,
        decisions: outcomes
            .iter()
            .filter(|o| !matches!(o, DecisionOutcome::InsufficientData { .. }))
            .count(),
        raised: outcomes
            .iter()
            .filter(|o| matches!(o, DecisionOutcome::Raised { .. }))
            .count(),
        lowered: outcomes
            .iter()
            .filter(|o| matches!(o, DecisionOutcome::Lowered { .. }))
            .count(),
        multipliers: DifficultyFactor::ALL
            .into_iter()
            .map(|f| (f.as_str(), controller.multiplier_for(f)))
            .collect(),
        stats: controller.stats(),
    };

    match args.format.as_str() {
        "text" => {
            println!("Difficulty Simulation");
            println!("=====================");
            println!(
                "Profile: {} ({})",
                result.stats.profile_name, result.stats.profile_key
            );
            println!("Skill: {:.2}  Minutes: {:.1}  Seed: {}", result.skill, result.minutes, seed);
            println!(
                "Decisions: {} (raised {}, lowered {})",
                result.decisions, result.raised, result.lowered
            );
            if let Some(recent) = &result.stats.performance_history {
                println!(
                    "Recent average score: {:.3} ({:?})",
                    recent.average_score, recent.trend
                );
            }
            println!();
            for (name, multiplier) in &result.multipliers {
                println!("  {:<20} x{:.3}", name, multiplier);
            }
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
