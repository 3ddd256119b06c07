//! Splatter - headless duel runner
//!
//! Spawns two fighters in one location, sets them on each other, and runs the
//! clock until one of them drops or the round limit is reached. Prints what a
//! bystander in the room would see.

use std::path::PathBuf;

use clap::Parser;
use splatter::combat::entry::JoinState;
use splatter::core::config::{set_config, EngineConfig};
use splatter::core::outbox::Recipient;
use splatter::core::types::LocationId;
use splatter::entity::{Character, Location, Weapon};
use splatter::simulation::Arena;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "splatter")]
#[command(about = "Run a seeded duel through the combat and medical engine")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many rounds
    #[arg(long, default_value_t = 50)]
    max_rounds: u32,

    /// Engine tuning file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Arm the second fighter with a pistol instead of a club
    #[arg(long)]
    pistol: bool,
}

fn load_config(path: &PathBuf) -> Result<EngineConfig, String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let config = EngineConfig::from_toml_str(&source).map_err(|e| e.to_string())?;
    config.validate()?;
    Ok(config)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("splatter=info")))
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        match load_config(path) {
            Ok(config) => {
                if set_config(config).is_err() {
                    tracing::warn!("engine config already set, ignoring file");
                }
            }
            Err(e) => {
                eprintln!("Failed to load config: {e}");
                std::process::exit(1);
            }
        }
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting duel");

    let mut arena = Arena::new(seed);
    let yard = LocationId(1);
    arena.add_location(Location::new(yard, "Salvage yard"));

    let kira = arena.spawn(Character::test_brawler("Kira", yard));
    let second = if args.pistol {
        Character::test_shooter("Dane", yard)
    } else {
        Character::new("Dane", yard).with_stats(4, 6, 2).with_weapon(Weapon::club())
    };
    let dane = arena.spawn(second);

    arena.add_to_combat(kira, Some(dane), JoinState::default());
    arena.add_to_combat(dane, Some(kira), JoinState::default());

    let round_seconds = u64::from(splatter::core::config::config().round_seconds);
    let mut rounds = 0;
    while rounds < args.max_rounds && arena.session(yard).is_some() {
        arena.advance(round_seconds);
        rounds += 1;

        for message in arena.drain_messages() {
            if let Recipient::Location { location, .. } = message.to {
                if location == yard {
                    println!("{}", message.text);
                }
            }
        }
    }

    println!();
    println!("=== After {rounds} rounds (seed {seed}) ===");
    for id in [kira, dane] {
        if let Some(character) = arena.world().get(id) {
            println!("{}: {}", character.name, character.medical.status_summary());
        }
    }
}
