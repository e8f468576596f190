// In: src/lib.rs

//! RPG Tukuru Battle Engine
//!
//! The turn-based battle core of an RPG Maker 2000 compatible player,
//! together with the project database and save state it reads. A battle is
//! a tick-driven state machine: the host calls `update` once per frame and
//! draws through a `RenderSurface`.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod project;
pub mod render;
pub mod save;
pub mod status;
pub mod text;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Record containers and the enums stored in project tables.
pub use schema::{
    Array1D, Array2D, EnemyActionKind, EnemyBasicAction, FieldError, ItemType, Param, Restriction,
    SkillScope, Value,
};

// --- From this crate's modules (`src/`) ---

// The battle engine and its drivers.
pub use battle::engine::{BattleEngine, Encounter};
pub use battle::menu::PartyCommand;
pub use battle::participant::{AttackInfo, AttackType, ParticipantId};
pub use battle::runner::{BattleRunner, BattleSummary};
pub use battle::state::{BattleOutcome, BattlePhase, BattleRng};

// Data the battle reads and writes.
pub use config::BattleConfig;
pub use project::ProjectData;
pub use save::{Inventory, SaveState};
pub use status::CharacterStatus;

pub use render::{CombatantGauge, RenderSurface, TextSurface};

// Crate-specific error and result types.
pub use errors::{
    BattleEngineError, BattleResult, ConfigError, DataResult, ProjectDataError, SaveResult,
    SaveStateError,
};
