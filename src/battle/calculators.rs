use crate::battle::participant::BattleParticipant;
use crate::battle::state::BattleRng;
use crate::errors::DataResult;
use crate::project::{ConditionEffect, Item, ProjectData, Skill};
use crate::status::ConditionSource;
use schema::{ItemType, Param};
use tracing::warn;

/// Base hit chance of a normal attack, in percent.
const BASE_HIT: i32 = 90;
/// Hit chance against an enemy flagged as evasive.
const EVASIVE_HIT: i32 = 70;
const NORMAL_VARIANCE: i32 = 20;
const CRITICAL_MULTIPLIER: i32 = 3;
const CHARGED_MULTIPLIER: i32 = 2;

/// A condition a result puts on (or, for a cure, takes off) its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionChange {
    pub effect: ConditionEffect,
    pub source: ConditionSource,
}

/// The outcome of one resolution against one target. Magnitudes are never
/// negative; `cure` says which way they apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackResult {
    pub miss: bool,
    pub critical: bool,
    pub cure: bool,
    pub hp_damage: i32,
    pub mp_damage: i32,
    /// Attack, defense, spirit and agility, in `Param::BATTLE` order.
    pub stat_delta: [i32; 4],
    pub bad_conditions: Vec<ConditionChange>,
}

impl AttackResult {
    pub fn missed() -> Self {
        Self {
            miss: true,
            ..Self::default()
        }
    }
}

/// Spreads `value` uniformly by `percent` in both directions.
fn apply_variance(value: i32, percent: i32, rng: &mut BattleRng) -> i32 {
    let spread = value * percent / 100;
    if spread <= 0 {
        return value;
    }
    value - spread + rng.below((spread * 2 + 1) as u32, "damage variance") as i32
}

/// Resolves a basic weapon attack. Reads both participants, mutates neither.
pub fn normal_attack(
    attacker: &BattleParticipant,
    target: &BattleParticipant,
    rng: &mut BattleRng,
) -> AttackResult {
    let base_hit = if target.evasive { EVASIVE_HIT } else { BASE_HIT };
    let attacker_agility = attacker.status.param(Param::Agility).max(1);
    let target_agility = target.status.param(Param::Agility).max(1);
    // Faster targets dodge more often, slower ones less.
    let miss_chance = (100 - base_hit) * (attacker_agility + target_agility) / (2 * attacker_agility);
    let to_hit = (100 - miss_chance).clamp(0, 100);
    if rng.percent("attack hit") >= to_hit {
        return AttackResult::missed();
    }

    let critical = attacker.critical
        && attacker.critical_chance > 0
        && rng.below(attacker.critical_chance as u32, "critical hit") == 0;

    let base = (attacker.status.param(Param::Attack) / 2 - target.status.param(Param::Defense) / 4).max(0);
    let mut damage = apply_variance(base, NORMAL_VARIANCE, rng);
    if critical {
        damage *= CRITICAL_MULTIPLIER;
    }
    if attacker.status.is_charged() {
        damage *= CHARGED_MULTIPLIER;
    }
    if target.is_defending() {
        damage /= 2;
    }

    AttackResult {
        critical,
        hp_damage: damage.max(0),
        ..AttackResult::default()
    }
}

/// Resolves a skill against one target.
pub fn skill_attack(
    project: &ProjectData,
    skill: &Skill<'_>,
    source: ConditionSource,
    attacker: &BattleParticipant,
    target: &BattleParticipant,
    rng: &mut BattleRng,
) -> DataResult<AttackResult> {
    if rng.percent("skill hit") >= skill.hit()? {
        return Ok(AttackResult::missed());
    }

    let cure = skill.scope()?.targets_friends();
    let physical = skill.physical_rate()?;
    let magical = skill.magical_rate()?;
    let mut effect = skill.power()?
        + attacker.status.param(Param::Attack) * physical / 20
        + attacker.status.param(Param::Spirit) * magical / 40;
    if !cure {
        effect -= target.status.param(Param::Defense) * physical / 40
            + target.status.param(Param::Spirit) * magical / 80;
    }
    let effect = apply_variance(effect.max(0), skill.variance()? * 5, rng).max(0);

    let mut result = AttackResult {
        cure,
        ..AttackResult::default()
    };
    if skill.affects_hp()? {
        result.hp_damage = effect;
    }
    if skill.affects_mp()? {
        result.mp_damage = effect.min(if cure { effect } else { target.status.mp() });
    }
    for (slot, param) in Param::BATTLE.iter().enumerate() {
        if skill.affects_param(*param)? {
            result.stat_delta[slot] = effect;
        }
    }
    for condition_id in skill.conditions()? {
        match project.condition_opt(condition_id) {
            Some(condition) => result.bad_conditions.push(ConditionChange {
                effect: condition.effect()?,
                source,
            }),
            None => warn!(skill_id = skill.id(), condition_id, "skill references an undefined condition"),
        }
    }
    Ok(result)
}

/// Resolves a medicine item on one target.
pub fn medicine(item: &Item<'_>, target: &BattleParticipant) -> DataResult<AttackResult> {
    debug_assert_eq!(item.item_type()?, ItemType::Medicine);
    let (hp_rate, hp_flat) = item.recover_hp()?;
    let (mp_rate, mp_flat) = item.recover_mp()?;
    Ok(AttackResult {
        cure: true,
        hp_damage: target.status.max_hp() * hp_rate / 100 + hp_flat,
        mp_damage: target.status.max_mp() * mp_rate / 100 + mp_flat,
        ..AttackResult::default()
    })
}
