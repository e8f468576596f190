//! Resolution of the current attacker's action and the battle text it
//! produces. Every line is appended before the target's status changes.

use crate::battle::calculators::{self, AttackResult};
use crate::battle::engine::{lookup, BattleEngine};
use crate::battle::participant::{AttackType, CombatantKind, ParticipantId};
use crate::errors::{BattleResult, DataResult};
use crate::project::Skill;
use crate::status::ConditionSource;
use schema::fields::{condition, vocabulary};
use schema::{ItemType, Param, SkillScope};
use tracing::{debug, warn};

impl<'a> BattleEngine<'a> {
    /// Resolves the action of `battle_order[current_attacker]` and queues its
    /// messages with one line revealed.
    pub(super) fn set_animation_message(&mut self) -> BattleResult<()> {
        self.messages.clear_messages();
        self.messages.set_line_limit(1);
        self.attack_results.clear();
        self.attacked_targets.clear();
        self.animation_target_index = None;
        self.skill_anime_ticks = 0;
        let Some(&attacker) = self.battle_order.get(self.current_attacker) else {
            return Ok(());
        };

        let info = self.participant(attacker).attack_info;
        debug!(?attacker, ?info, "resolving action");
        match info.attack_type {
            AttackType::None => {}
            AttackType::Immobile => self.resolve_immobile(attacker, info.id)?,
            AttackType::Attack => self.resolve_attack(attacker, info.target, 1)?,
            AttackType::DoubleAttack => self.resolve_attack(attacker, info.target, 2)?,
            AttackType::Skill => self.resolve_skill(attacker, info.id, info.target)?,
            AttackType::Item => self.resolve_item(attacker, info.id, info.target)?,
            AttackType::Defence => self.announce(attacker, vocabulary::DEFENDING)?,
            AttackType::Charge => {
                self.announce(attacker, vocabulary::CHARGING)?;
                self.participant_mut(attacker).status.set_charged(true);
            }
            AttackType::WaitAndSee => self.announce(attacker, vocabulary::OBSERVING)?,
            AttackType::SuicideBombing => self.resolve_suicide_bombing(attacker)?,
            AttackType::Escape => {
                self.announce(attacker, vocabulary::ENEMY_ESCAPED)?;
                let ticks = self.config.dead_anime_ticks;
                let exclude = self.config.fleeing_enemy_excluded;
                self.participant_mut(attacker).play_dead_anime(ticks, exclude);
            }
            AttackType::Transform => self.announce(attacker, vocabulary::ENEMY_TRANSFORMED)?,
        }
        Ok(())
    }

    pub fn attack_results(&self) -> &[AttackResult] {
        &self.attack_results
    }

    pub fn attacked_targets(&self) -> &[ParticipantId] {
        &self.attacked_targets
    }

    fn vocab(&self, id: u32) -> DataResult<&'a str> {
        self.project.vocabulary(id)
    }

    fn name_of(&self, id: ParticipantId) -> String {
        self.participant(id).name.clone()
    }

    /// `<name><vocabulary>` for the untargeted basic actions.
    fn announce(&mut self, attacker: ParticipantId, text: u32) -> DataResult<()> {
        let line = format!("{}{}", self.name_of(attacker), self.vocab(text)?);
        self.messages.add_message(line);
        Ok(())
    }

    /// Uniform pick among the non-excluded members of `kind`.
    fn random_target(&mut self, attacker: ParticipantId, kind: CombatantKind) -> ParticipantId {
        let pool: Vec<ParticipantId> = self
            .side(kind)
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_excluded())
            .map(|(index, _)| ParticipantId { kind, index })
            .collect();
        assert!(
            !pool.is_empty(),
            "{} has no target left on the {:?} side",
            self.participant(attacker).name,
            kind
        );
        pool[self.rng.pick(pool.len(), "random target")]
    }

    /// The chosen target, or a random one on `kind` if it is gone.
    fn retarget(
        &mut self,
        attacker: ParticipantId,
        chosen: Option<ParticipantId>,
        kind: CombatantKind,
    ) -> ParticipantId {
        match chosen {
            Some(target) if !self.participant(target).is_excluded() => target,
            Some(target) => self.random_target(attacker, target.kind),
            None => self.random_target(attacker, kind),
        }
    }

    fn all_active(&self, kind: CombatantKind) -> Vec<ParticipantId> {
        self.side(kind)
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_excluded())
            .map(|(index, _)| ParticipantId { kind, index })
            .collect()
    }

    fn scope_targets(
        &mut self,
        attacker: ParticipantId,
        scope: SkillScope,
        chosen: Option<ParticipantId>,
    ) -> Vec<ParticipantId> {
        let opponents = attacker.kind.opponent();
        match scope {
            SkillScope::EnemySingle => vec![self.retarget(attacker, chosen, opponents)],
            SkillScope::FriendSingle => vec![self.retarget(attacker, chosen, attacker.kind)],
            SkillScope::Myself => vec![attacker],
            SkillScope::EnemyAll => self.all_active(opponents),
            SkillScope::FriendAll => self.all_active(attacker.kind),
        }
    }

    /// Applies a result already described in the message window.
    fn land(&mut self, target: ParticipantId, result: AttackResult) {
        self.participant_mut(target).add_damage(&result);
        self.attacked_targets.push(target);
        self.attack_results.push(result);
    }

    fn resolve_immobile(&mut self, attacker: ParticipantId, condition_id: u32) -> DataResult<()> {
        let Some(cond) = self.project.condition_opt(condition_id) else {
            return Ok(());
        };
        if let Some(text) = cond.message(condition::MESSAGE_AFFECTED)? {
            let line = format!("{}{}", self.name_of(attacker), text);
            self.messages.add_message(line);
        }
        Ok(())
    }

    fn resolve_attack(
        &mut self,
        attacker: ParticipantId,
        chosen: Option<ParticipantId>,
        hits: usize,
    ) -> DataResult<()> {
        self.announce(attacker, vocabulary::ATTACKING)?;
        let target = self.retarget(attacker, chosen, attacker.kind.opponent());
        for _ in 0..hits {
            let result = calculators::normal_attack(
                lookup(&self.players, &self.enemies, attacker),
                lookup(&self.players, &self.enemies, target),
                &mut self.rng,
            );
            self.push_hit_messages(target, &result)?;
            self.land(target, result);
            if self.participant(target).status.is_dead() {
                break;
            }
        }
        self.participant_mut(attacker).status.set_charged(false);
        Ok(())
    }

    fn resolve_suicide_bombing(&mut self, attacker: ParticipantId) -> DataResult<()> {
        self.announce(attacker, vocabulary::AUTODESTRUCTION)?;
        self.participant_mut(attacker).set_excluded(true);
        for target in self.all_active(attacker.kind.opponent()) {
            let result = calculators::normal_attack(
                lookup(&self.players, &self.enemies, attacker),
                lookup(&self.players, &self.enemies, target),
                &mut self.rng,
            );
            self.push_hit_messages(target, &result)?;
            self.land(target, result);
        }
        Ok(())
    }

    fn resolve_skill(
        &mut self,
        attacker: ParticipantId,
        skill_id: u32,
        chosen: Option<ParticipantId>,
    ) -> DataResult<()> {
        let skill = self.project.skill(skill_id)?;
        let cost = skill.mp_cost()?;
        let status = &mut self.participant_mut(attacker).status;
        status.set_mp(status.mp() - cost);

        let name = self.name_of(attacker);
        self.messages
            .add_message(format!("{}{}", name, skill.using_message1()?));
        if let Some(second) = skill.using_message2()? {
            self.messages.add_message(format!("{}{}", name, second));
        }
        self.cast(attacker, &skill, ConditionSource::Skill(skill_id), chosen)?;
        self.participant_mut(attacker).status.set_charged(false);
        Ok(())
    }

    fn cast(
        &mut self,
        attacker: ParticipantId,
        skill: &Skill<'a>,
        source: ConditionSource,
        chosen: Option<ParticipantId>,
    ) -> DataResult<()> {
        for target in self.scope_targets(attacker, skill.scope()?, chosen) {
            self.magic_sub(attacker, target, skill, source)?;
        }
        if skill.animation()?.is_some() {
            self.skill_anime_ticks = self.config.skill_anime_ticks;
        }
        Ok(())
    }

    fn magic_sub(
        &mut self,
        attacker: ParticipantId,
        target: ParticipantId,
        skill: &Skill<'a>,
        source: ConditionSource,
    ) -> DataResult<()> {
        let result = calculators::skill_attack(
            self.project,
            skill,
            source,
            lookup(&self.players, &self.enemies, attacker),
            lookup(&self.players, &self.enemies, target),
            &mut self.rng,
        )?;
        let name = self.name_of(target);
        if result.miss {
            let failure = self.vocab(vocabulary::SKILL_FAILURE_BASE + skill.failure_message()?)?;
            self.messages.add_message(format!("{}{}", name, failure));
            self.land(target, result);
            return Ok(());
        }

        let behavior = self.participant(target).behavior();
        if skill.affects_hp()? {
            let line = if result.cure {
                format!(
                    "{}の{}が{}{}",
                    name,
                    self.vocab(vocabulary::HEALTH_POINTS)?,
                    result.hp_damage,
                    self.vocab(vocabulary::HP_RECOVERED)?
                )
            } else if result.hp_damage == 0 {
                format!("{}{}", name, self.vocab(behavior.undamaged)?)
            } else {
                format!(
                    "{}{}{}{}",
                    name,
                    behavior.damage_particle,
                    result.hp_damage,
                    self.vocab(behavior.damaged)?
                )
            };
            self.messages.add_message(line);
        }
        let direction = if result.cure {
            vocabulary::PARAMETER_INCREASE
        } else {
            vocabulary::PARAMETER_DECREASE
        };
        if skill.affects_mp()? {
            let line = format!(
                "{}の{}{}が{}",
                name,
                self.vocab(vocabulary::SPIRIT_POINTS)?,
                result.mp_damage,
                self.vocab(direction)?
            );
            self.messages.add_message(line);
        }
        for (slot, param) in Param::BATTLE.iter().enumerate() {
            if skill.affects_param(*param)? {
                let line = format!(
                    "{}の{}が{}{}",
                    name,
                    self.vocab(vocabulary::PARAM_LABEL_BASE + slot as u32)?,
                    result.stat_delta[slot],
                    self.vocab(direction)?
                );
                self.messages.add_message(line);
            }
        }
        self.push_condition_messages(target, &result)?;
        self.land(target, result);
        Ok(())
    }

    fn resolve_item(
        &mut self,
        attacker: ParticipantId,
        item_id: u32,
        chosen: Option<ParticipantId>,
    ) -> DataResult<()> {
        let item = self.project.item(item_id)?;
        if attacker.kind == CombatantKind::Player && !self.save.inventory_mut().consume_item(item_id) {
            warn!(item_id, "item used in battle is not in the inventory");
        }
        let line = format!(
            "{}は{}{}",
            self.name_of(attacker),
            item.name()?,
            self.vocab(vocabulary::USE_ITEM)?
        );
        self.messages.add_message(line);

        match item.item_type()? {
            ItemType::Medicine => {
                for target in self.scope_targets(attacker, item.scope()?, chosen.or(Some(attacker))) {
                    let result = calculators::medicine(&item, self.participant(target))?;
                    let name = self.name_of(target);
                    if result.hp_damage != 0 {
                        let line = format!(
                            "{}の{}が{}{}",
                            name,
                            self.vocab(vocabulary::HEALTH_POINTS)?,
                            result.hp_damage,
                            self.vocab(vocabulary::HP_RECOVERED)?
                        );
                        self.messages.add_message(line);
                    }
                    if result.mp_damage != 0 {
                        let line = format!(
                            "{}の{}が{}{}",
                            name,
                            self.vocab(vocabulary::SPIRIT_POINTS)?,
                            result.mp_damage,
                            self.vocab(vocabulary::PARAMETER_INCREASE)?
                        );
                        self.messages.add_message(line);
                    }
                    self.land(target, result);
                }
            }
            ItemType::Special => {
                if let Some(skill_id) = item.skill_id()? {
                    let skill = self.project.skill(skill_id)?;
                    self.cast(attacker, &skill, ConditionSource::Item(item_id), chosen)?;
                }
            }
            other => debug!(item_id, ?other, "item has no battle effect"),
        }
        self.participant_mut(attacker).status.set_charged(false);
        Ok(())
    }

    /// Miss, critical and damage lines of a weapon hit.
    fn push_hit_messages(&mut self, target: ParticipantId, result: &AttackResult) -> DataResult<()> {
        let name = self.name_of(target);
        if result.miss {
            let line = format!("{}{}", name, self.vocab(vocabulary::DODGE)?);
            self.messages.add_message(line);
            return Ok(());
        }
        let behavior = self.participant(target).behavior();
        if result.critical {
            let line = self.vocab(behavior.critical)?;
            self.messages.add_message(line);
        }
        let line = if result.hp_damage == 0 {
            format!("{}{}", name, self.vocab(behavior.undamaged)?)
        } else {
            format!(
                "{}{}{}{}",
                name,
                behavior.damage_particle,
                result.hp_damage,
                self.vocab(behavior.damaged)?
            )
        };
        self.messages.add_message(line);
        self.push_condition_messages(target, result)
    }

    fn push_condition_messages(&mut self, target: ParticipantId, result: &AttackResult) -> DataResult<()> {
        let name = self.name_of(target);
        let afflicted = self.participant(target).behavior().afflicted_message;
        for change in &result.bad_conditions {
            let cond = self.project.condition(change.effect.condition_id)?;
            let already = self
                .participant(target)
                .status
                .has_bad_condition(change.effect.condition_id);
            let field = match (result.cure, already) {
                (true, true) => condition::MESSAGE_RECOVERY,
                (true, false) => continue,
                (false, true) => condition::MESSAGE_ALREADY,
                (false, false) => afflicted,
            };
            if let Some(text) = cond.message(field)? {
                self.messages.add_message(format!("{}{}", name, text));
            }
        }
        Ok(())
    }
}
