//! Demo binary: loads a project and a battle config, then plays enemy group
//! 1 against the project's first two characters with the party on auto.
//!
//! Usage: `rpg-tukuru [project.ron] [config.ron]`

use rpg_tukuru::{text, BattleConfig, BattleEngine, BattleRunner, Encounter, ProjectData, SaveState};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_PARTY: [u32; 2] = [1, 2];
const DEMO_GROUP: u32 = 1;
const POTION: u32 = 1;
const MAX_TICKS: u64 = 100_000;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpg_tukuru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let project_path = args.next().map_or_else(|| PathBuf::from("data/demo.ron"), PathBuf::from);
    let config_path = args.next().map_or_else(|| PathBuf::from("data/config.ron"), PathBuf::from);

    let project = ProjectData::load_ron(&project_path)?;
    let config = BattleConfig::load(&config_path)?;
    info!(project = %project_path.display(), config = %config_path.display(), "loaded");

    let mut save = SaveState::new();
    for char_id in DEMO_PARTY {
        save.add_party_member(&project, char_id)?;
    }
    save.inventory_mut().add_item(POTION, 2);

    let engine = BattleEngine::new(&project, &mut save, Encounter::new(DEMO_GROUP), config)?;
    let summary = BattleRunner::new(engine).run_to_end(MAX_TICKS)?;

    for line in &summary.transcript {
        println!("{}", text::expand(line, &project, &save));
    }
    println!();
    println!(
        "Outcome: {:?} after {} turns ({} ticks)",
        summary.outcome, summary.turns, summary.ticks
    );
    for &char_id in save.party() {
        let status = save.status(char_id)?;
        println!(
            "  #{} Lv{} HP {}/{} MP {}/{} EXP {}",
            char_id,
            status.level(),
            status.hp(),
            status.max_hp(),
            status.mp(),
            status.max_mp(),
            status.exp()
        );
    }
    println!("  Money: {}", save.inventory().money());
    Ok(())
}
