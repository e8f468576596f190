use schema::FieldError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the battle engine.
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// Project data needed by the encounter is missing or malformed
    #[error("project data error: {0}")]
    ProjectData(#[from] ProjectDataError),
    /// The persistent save state does not hold what the battle needs
    #[error("save state error: {0}")]
    SaveState(#[from] SaveStateError),
    /// The party has no members to fight with
    #[error("the party is empty")]
    EmptyParty,
    /// The enemy group has no members
    #[error("enemy group {0} has no members")]
    EmptyEncounter(u32),
    /// An automated run did not reach the end of the battle
    #[error("battle still running after {0} ticks")]
    TickLimit(u64),
}

/// Errors raised while loading or reading the project database.
#[derive(Debug, Error)]
pub enum ProjectDataError {
    /// A lookup in a named table failed
    #[error("{table} row {row}: {source}")]
    Field {
        table: &'static str,
        row: u32,
        #[source]
        source: FieldError,
    },
    /// A vocabulary string the engine needs is not defined
    #[error("vocabulary entry 0x{0:02X} is not defined")]
    MissingVocabulary(u32),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed RON project data: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("project cache encoding failed: {0}")]
    Postcard(#[from] postcard::Error),
}

impl ProjectDataError {
    /// Builds a mapper that tags a `FieldError` with the table and row it
    /// came from.
    pub fn in_row(table: &'static str, row: u32) -> impl FnOnce(FieldError) -> Self {
        move |source| ProjectDataError::Field { table, row, source }
    }
}

/// Errors related to the persistent save state.
#[derive(Debug, Error)]
pub enum SaveStateError {
    /// A party member has no stored status
    #[error("no status stored for character {0}")]
    MissingStatus(u32),
    #[error("failed to access save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading a `BattleConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using ProjectDataError
pub type DataResult<T> = Result<T, ProjectDataError>;

/// Type alias for Results using SaveStateError
pub type SaveResult<T> = Result<T, SaveStateError>;
