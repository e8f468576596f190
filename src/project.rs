//! The project database: every table the battle core reads, plus typed views
//! over individual rows.

use crate::errors::{DataResult, ProjectDataError};
use schema::{Array1D, Array2D};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

mod views;

pub use views::{
    Character, Condition, ConditionEffect, Enemy, EnemyAction, EnemyGroup, GroupMember, Item,
    Record, Skill,
};

/// Read-only project database, loaded once per project.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectData {
    pub characters: Array2D,
    pub skills: Array2D,
    pub items: Array2D,
    pub enemies: Array2D,
    pub enemy_groups: Array2D,
    pub conditions: Array2D,
    pub vocabulary: Array1D,
}

impl ProjectData {
    /// Loads an authored project from a RON file.
    pub fn load_ron(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProjectDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> DataResult<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Compact binary form for caching a converted database.
    pub fn to_bytes(&self) -> DataResult<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> DataResult<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn vocabulary(&self, id: u32) -> DataResult<&str> {
        self.vocabulary
            .string(id)
            .map_err(|_| ProjectDataError::MissingVocabulary(id))
    }

    pub fn character(&self, id: u32) -> DataResult<Character<'_>> {
        Record::lookup(&self.characters, "character", id).map(Character)
    }

    pub fn skill(&self, id: u32) -> DataResult<Skill<'_>> {
        Record::lookup(&self.skills, "skill", id).map(Skill)
    }

    pub fn item(&self, id: u32) -> DataResult<Item<'_>> {
        Record::lookup(&self.items, "item", id).map(Item)
    }

    pub fn enemy(&self, id: u32) -> DataResult<Enemy<'_>> {
        Record::lookup(&self.enemies, "enemy", id).map(Enemy)
    }

    pub fn enemy_group(&self, id: u32) -> DataResult<EnemyGroup<'_>> {
        Record::lookup(&self.enemy_groups, "enemy group", id).map(EnemyGroup)
    }

    pub fn condition(&self, id: u32) -> DataResult<Condition<'_>> {
        Record::lookup(&self.conditions, "condition", id).map(Condition)
    }

    /// Conditions are optional metadata: `None` when the row is absent.
    pub fn condition_opt(&self, id: u32) -> Option<Condition<'_>> {
        self.conditions
            .get(id)
            .map(|row| Condition(Record::new("condition", id, row)))
    }
}
