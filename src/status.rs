//! Per-combatant mutable stats and the formulas for experience and levels.

use crate::battle::calculators::AttackResult;
use crate::errors::DataResult;
use crate::project::{ConditionEffect, ProjectData};
use schema::{ConditionKind, Param, Restriction};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

pub const MAX_EXP: i32 = 1_000_000;
pub const MAX_PARAM: i32 = 999;

/// The six parameters of a combatant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamSet([i32; 6]);

impl ParamSet {
    pub fn new(values: [i32; 6]) -> Self {
        Self(values)
    }

    pub fn get(&self, param: Param) -> i32 {
        self.0[param as usize]
    }

    pub fn set(&mut self, param: Param, value: i32) {
        self.0[param as usize] = value;
    }

    pub fn add(&mut self, param: Param, delta: i32) {
        self.0[param as usize] += delta;
    }
}

/// Who put a condition on its holder.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSource {
    Skill(u32),
    Item(u32),
    /// Already present when the battle started.
    Carried,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BadCondition {
    pub effect: ConditionEffect,
    pub source: ConditionSource,
    pub elapsed_turns: u32,
}

impl BadCondition {
    pub fn condition_id(&self) -> u32 {
        self.effect.condition_id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CharacterStatus {
    hp: i32,
    mp: i32,
    level: i32,
    exp: i32,
    base: ParamSet,
    /// Battle-only modifiers from skills.
    bonus: ParamSet,
    bad_conditions: Vec<BadCondition>,
    charged: bool,
    skills: Vec<u32>,
}

impl CharacterStatus {
    /// A fresh status with full HP/MP.
    pub fn new(level: i32, base: ParamSet) -> Self {
        Self {
            hp: base.get(Param::MaxHp),
            mp: base.get(Param::MaxMp),
            level,
            exp: 0,
            base,
            bonus: ParamSet::default(),
            bad_conditions: Vec::new(),
            charged: false,
            skills: Vec::new(),
        }
    }

    /// Builds a party member at their initial level from the database.
    pub fn for_player(project: &ProjectData, char_id: u32) -> DataResult<Self> {
        let character = project.character(char_id)?;
        let level = character.initial_level()?;
        let mut status = Self::new(level, player_params(project, char_id, level)?);
        status.exp = exp_for_level(character.exp_curve()?, level);
        for (learn_level, skill_id) in character.learned_skills()? {
            if learn_level <= level {
                status.learn_skill(skill_id);
            }
        }
        Ok(status)
    }

    pub fn for_enemy(project: &ProjectData, enemy_id: u32) -> DataResult<Self> {
        let enemy = project.enemy(enemy_id)?;
        let mut base = ParamSet::default();
        for param in Param::iter() {
            base.set(param, enemy.param(param)?);
        }
        Ok(Self::new(1, base))
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn exp(&self) -> i32 {
        self.exp
    }

    pub fn max_hp(&self) -> i32 {
        self.param(Param::MaxHp).max(1)
    }

    pub fn max_mp(&self) -> i32 {
        self.param(Param::MaxMp).max(0)
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    pub fn is_charged(&self) -> bool {
        self.charged
    }

    pub fn set_charged(&mut self, charged: bool) {
        self.charged = charged;
    }

    pub fn skills(&self) -> &[u32] {
        &self.skills
    }

    /// Returns false if the skill was already known.
    pub fn learn_skill(&mut self, skill_id: u32) -> bool {
        match self.skills.binary_search(&skill_id) {
            Ok(_) => false,
            Err(pos) => {
                self.skills.insert(pos, skill_id);
                true
            }
        }
    }

    /// Effective parameter: base plus battle bonus, scaled by every bad
    /// condition that affects it.
    pub fn param(&self, param: Param) -> i32 {
        let raw = self.base.get(param) + self.bonus.get(param);
        let modified = self
            .bad_conditions
            .iter()
            .fold(raw, |value, condition| condition.effect.modify(param, value));
        modified.clamp(0, MAX_PARAM * 10)
    }

    pub fn base_param(&self, param: Param) -> i32 {
        self.base.get(param)
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp());
        if self.hp == 0 {
            self.on_death();
        }
    }

    pub fn set_mp(&mut self, mp: i32) {
        self.mp = mp.clamp(0, self.max_mp());
    }

    pub fn bad_conditions(&self) -> &[BadCondition] {
        &self.bad_conditions
    }

    pub fn has_bad_condition(&self, condition_id: u32) -> bool {
        self.bad_conditions
            .iter()
            .any(|c| c.condition_id() == condition_id)
    }

    /// Adds a condition unless one with the same id is already present.
    pub fn add_bad_condition(&mut self, effect: ConditionEffect, source: ConditionSource) -> bool {
        if self.has_bad_condition(effect.condition_id) {
            return false;
        }
        self.bad_conditions.push(BadCondition {
            effect,
            source,
            elapsed_turns: 0,
        });
        true
    }

    pub fn remove_bad_condition(&mut self, condition_id: u32) -> bool {
        let before = self.bad_conditions.len();
        self.bad_conditions.retain(|c| c.condition_id() != condition_id);
        self.bad_conditions.len() != before
    }

    /// The highest-priority condition that restricts actions, if any.
    pub fn restricting_condition(&self) -> Option<&BadCondition> {
        self.bad_conditions
            .iter()
            .filter(|c| c.effect.restriction != Restriction::None)
            .max_by_key(|c| c.effect.priority)
    }

    pub fn restriction(&self) -> Restriction {
        self.restricting_condition()
            .map(|c| c.effect.restriction)
            .unwrap_or(Restriction::None)
    }

    /// Ages every condition by one turn and releases those past their hold
    /// time that pass the auto-release roll. Returns the released ids.
    pub fn advance_conditions(&mut self, mut release_roll: impl FnMut() -> i32) -> Vec<u32> {
        let mut released = Vec::new();
        for condition in &mut self.bad_conditions {
            condition.elapsed_turns += 1;
            let effect = &condition.effect;
            if effect.hold_turns > 0
                && condition.elapsed_turns >= effect.hold_turns
                && release_roll() < effect.auto_release_prob
            {
                released.push(effect.condition_id);
            }
        }
        self.bad_conditions
            .retain(|c| !released.contains(&c.condition_id()));
        released
    }

    /// The only place a resolved attack touches a status.
    pub fn apply_result(&mut self, result: &AttackResult) {
        if result.miss {
            return;
        }
        let sign = if result.cure { -1 } else { 1 };
        if result.hp_damage != 0 {
            self.set_hp(self.hp - sign * result.hp_damage);
        }
        if result.mp_damage != 0 {
            self.set_mp(self.mp - sign * result.mp_damage);
        }
        for (param, delta) in Param::BATTLE.iter().zip(result.stat_delta) {
            if delta != 0 {
                self.bonus.add(*param, -sign * delta);
            }
        }
        if self.is_dead() {
            return;
        }
        for change in &result.bad_conditions {
            if result.cure {
                self.remove_bad_condition(change.effect.condition_id);
            } else {
                self.add_bad_condition(change.effect.clone(), change.source);
            }
        }
    }

    /// Clears everything that only lasts for one battle.
    pub fn reset_battle(&mut self) {
        self.charged = false;
        self.bonus = ParamSet::default();
        self.bad_conditions
            .retain(|c| c.effect.kind == ConditionKind::Persistent);
    }

    fn on_death(&mut self) {
        self.charged = false;
        self.bad_conditions.clear();
    }

    /// Adds experience and raises the level as far as the curve allows.
    /// Returns the level before the gain.
    pub fn add_exp(&mut self, project: &ProjectData, char_id: u32, amount: i32) -> DataResult<i32> {
        let character = project.character(char_id)?;
        let curve = character.exp_curve()?;
        let final_level = character.final_level()?;
        let old_level = self.level;

        self.exp = (self.exp + amount).clamp(0, MAX_EXP - 1);
        while self.level < final_level && self.exp >= exp_for_level(curve, self.level + 1) {
            self.level += 1;
        }

        if self.level != old_level {
            let gained_hp = self.base.get(Param::MaxHp);
            let gained_mp = self.base.get(Param::MaxMp);
            self.base = player_params(project, char_id, self.level)?;
            // New max HP/MP is added on top of the current values.
            self.hp += self.base.get(Param::MaxHp) - gained_hp;
            self.mp += self.base.get(Param::MaxMp) - gained_mp;
            self.hp = self.hp.clamp(0, self.max_hp());
            self.mp = self.mp.clamp(0, self.max_mp());
            for (learn_level, skill_id) in character.learned_skills()? {
                if learn_level > old_level && learn_level <= self.level {
                    self.learn_skill(skill_id);
                }
            }
            debug!(char_id, old_level, new_level = self.level, "level up");
        }
        Ok(old_level)
    }
}

fn player_params(project: &ProjectData, char_id: u32, level: i32) -> DataResult<ParamSet> {
    let character = project.character(char_id)?;
    let mut params = ParamSet::default();
    for param in Param::iter() {
        params.set(param, character.param(param, level)?);
    }
    Ok(params)
}

/// Total experience needed to reach `level` on the RPG Maker 2000 curve.
pub fn exp_for_level((base, inflation, correction): (i32, i32, i32), level: i32) -> i32 {
    let mut standard = base as f64;
    let mut factor = 1.5 + inflation as f64 * 0.01;
    let mut total = 0i64;
    for _ in 1..level {
        total += (correction as f64 + standard) as i64;
        standard *= factor;
        factor = ((level + 1) as f64 * 0.002 + 0.8) * (factor - 1.0) + 1.0;
    }
    total.min(MAX_EXP as i64) as i32
}
