//! Per-save mutable state: variables, switches, party and inventory.

use crate::errors::{DataResult, SaveResult, SaveStateError};
use crate::project::ProjectData;
use crate::status::CharacterStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MAX_MONEY: i32 = 999_999;
pub const MAX_ITEM_COUNT: u32 = 99;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    money: i32,
    items: BTreeMap<u32, u32>,
}

impl Inventory {
    pub fn money(&self) -> i32 {
        self.money
    }

    /// Negative amounts spend money; the total never leaves `0..=MAX_MONEY`.
    pub fn add_money(&mut self, amount: i32) {
        self.money = (self.money.saturating_add(amount)).clamp(0, MAX_MONEY);
    }

    pub fn item_num(&self, item_id: u32) -> u32 {
        self.items.get(&item_id).copied().unwrap_or(0)
    }

    /// Sets the held count, dropping the entry at zero.
    pub fn set_item_num(&mut self, item_id: u32, count: u32) {
        let count = count.min(MAX_ITEM_COUNT);
        if count == 0 {
            self.items.remove(&item_id);
        } else {
            self.items.insert(item_id, count);
        }
    }

    pub fn add_item(&mut self, item_id: u32, count: u32) {
        self.set_item_num(item_id, self.item_num(item_id).saturating_add(count));
    }

    /// Takes one unit; false if none was held.
    pub fn consume_item(&mut self, item_id: u32) -> bool {
        match self.item_num(item_id) {
            0 => false,
            held => {
                self.set_item_num(item_id, held - 1);
                true
            }
        }
    }

    pub fn items(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.items.iter().map(|(id, count)| (*id, *count))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveState {
    variables: BTreeMap<u32, i32>,
    switches: BTreeMap<u32, bool>,
    party: Vec<u32>,
    statuses: BTreeMap<u32, CharacterStatus>,
    inventory: Inventory,
}

impl SaveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a character to the party, creating their status from the
    /// database on first join.
    pub fn add_party_member(&mut self, project: &ProjectData, char_id: u32) -> DataResult<()> {
        if !self.statuses.contains_key(&char_id) {
            let status = CharacterStatus::for_player(project, char_id)?;
            self.statuses.insert(char_id, status);
        }
        if !self.party.contains(&char_id) {
            self.party.push(char_id);
        }
        Ok(())
    }

    pub fn party(&self) -> &[u32] {
        &self.party
    }

    pub fn status(&self, char_id: u32) -> SaveResult<&CharacterStatus> {
        self.statuses
            .get(&char_id)
            .ok_or(SaveStateError::MissingStatus(char_id))
    }

    pub fn status_mut(&mut self, char_id: u32) -> SaveResult<&mut CharacterStatus> {
        self.statuses
            .get_mut(&char_id)
            .ok_or(SaveStateError::MissingStatus(char_id))
    }

    pub fn set_status(&mut self, char_id: u32, status: CharacterStatus) {
        self.statuses.insert(char_id, status);
    }

    /// Unset variables read as zero.
    pub fn variable(&self, id: u32) -> i32 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    pub fn set_variable(&mut self, id: u32, value: i32) {
        self.variables.insert(id, value);
    }

    pub fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    pub fn set_switch(&mut self, id: u32, on: bool) {
        self.switches.insert(id, on);
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn add_money(&mut self, amount: i32) {
        self.inventory.add_money(amount);
    }

    pub fn set_item_num(&mut self, item_id: u32, count: u32) {
        self.inventory.set_item_num(item_id, count);
    }

    pub fn to_json(&self) -> SaveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> SaveResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SaveResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| SaveStateError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> SaveResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SaveStateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}
