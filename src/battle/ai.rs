//! Automatic action selection for players on "auto" and for every enemy.

use crate::battle::participant::{AttackInfo, AttackType, BattleParticipant, CombatantKind, ParticipantId};
use crate::battle::state::BattleRng;
use crate::errors::DataResult;
use crate::project::{EnemyAction, ProjectData};
use crate::save::SaveState;
use schema::{ActionCondition, EnemyActionKind, EnemyBasicAction, SkillScope};
use tracing::trace;

/// Enemy actions this far below the best rated one are never picked.
const RATING_WINDOW: i32 = 10;

/// Read-only view of the battle handed to a strategy.
pub struct BattleView<'a> {
    pub project: &'a ProjectData,
    pub save: &'a SaveState,
    pub players: &'a [BattleParticipant],
    pub enemies: &'a [BattleParticipant],
    pub turn_num: u32,
}

impl<'a> BattleView<'a> {
    pub fn side(&self, kind: CombatantKind) -> &'a [BattleParticipant] {
        match kind {
            CombatantKind::Player => self.players,
            CombatantKind::Enemy => self.enemies,
        }
    }

    pub fn participant(&self, id: ParticipantId) -> &'a BattleParticipant {
        &self.side(id.kind)[id.index]
    }

    /// Living, non-excluded members of one side.
    pub fn active(&self, kind: CombatantKind) -> Vec<ParticipantId> {
        self.side(kind)
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active())
            .map(|(index, _)| ParticipantId { kind, index })
            .collect()
    }

    /// Uniform pick among the active members of `kind`; `None` if nobody is left.
    pub fn random_active(&self, kind: CombatantKind, rng: &mut BattleRng) -> Option<ParticipantId> {
        let pool = self.active(kind);
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.pick(pool.len(), "random target")])
    }
}

/// Decides what a participant does this turn.
pub trait ActionStrategy {
    fn choose_action(
        &self,
        view: &BattleView<'_>,
        actor: ParticipantId,
        rng: &mut BattleRng,
    ) -> DataResult<AttackInfo>;
}

/// Players use their strongest affordable attack skill, else a basic
/// attack. Enemies follow their action table by rating.
#[derive(Debug, Default, Clone, Copy)]
pub struct RatingStrategy;

impl RatingStrategy {
    pub fn new() -> Self {
        Self
    }

    fn choose_player_action(
        &self,
        view: &BattleView<'_>,
        actor: ParticipantId,
        rng: &mut BattleRng,
    ) -> DataResult<AttackInfo> {
        let me = view.participant(actor);
        let mut best_skill: Option<(u32, SkillScope, i32)> = None;
        for &skill_id in me.status.skills() {
            let skill = view.project.skill(skill_id)?;
            if !skill.is_offensive()? || skill.mp_cost()? > me.status.mp() {
                continue;
            }
            let power = skill.power()?;
            if best_skill.map_or(true, |(_, _, best)| power > best) {
                best_skill = Some((skill_id, skill.scope()?, power));
            }
        }

        let target = view.random_active(actor.kind.opponent(), rng);
        Ok(match best_skill {
            Some((skill_id, scope, _)) => {
                let target = if scope.is_single() { target } else { None };
                AttackInfo::new(AttackType::Skill, target, skill_id)
            }
            None => AttackInfo::new(AttackType::Attack, target, 0),
        })
    }

    fn condition_met(&self, view: &BattleView<'_>, actor: ParticipantId, action: &EnemyAction) -> bool {
        let (low, high) = (action.param_a, action.param_b);
        let in_range = |value: i32| value >= low && value <= high;
        let me = view.participant(actor);
        match action.condition {
            ActionCondition::Always => true,
            ActionCondition::Switch => action.switch_id.is_some_and(|id| view.save.switch(id)),
            ActionCondition::Turns => {
                let turn = view.turn_num as i32;
                if high == 0 {
                    turn == low
                } else {
                    turn >= low && (turn - low) % high == 0
                }
            }
            ActionCondition::MonsterCount => in_range(view.active(CombatantKind::Enemy).len() as i32),
            ActionCondition::HpRange => in_range(me.status.hp() * 100 / me.status.max_hp().max(1)),
            ActionCondition::MpRange => {
                let max_mp = me.status.max_mp();
                max_mp > 0 && in_range(me.status.mp() * 100 / max_mp)
            }
            ActionCondition::PartyLevel => {
                let party = view.active(CombatantKind::Player);
                !party.is_empty()
                    && in_range(
                        party.iter().map(|id| view.participant(*id).status.level()).sum::<i32>()
                            / party.len() as i32,
                    )
            }
            ActionCondition::PartyFatigue => {
                let party = view.active(CombatantKind::Player);
                !party.is_empty()
                    && in_range(
                        party
                            .iter()
                            .map(|id| {
                                let status = &view.participant(*id).status;
                                100 - status.hp() * 100 / status.max_hp().max(1)
                            })
                            .sum::<i32>()
                            / party.len() as i32,
                    )
            }
        }
    }

    fn choose_enemy_action(
        &self,
        view: &BattleView<'_>,
        actor: ParticipantId,
        rng: &mut BattleRng,
    ) -> DataResult<AttackInfo> {
        let me = view.participant(actor);
        let actions = view.project.enemy(me.data_id)?.actions()?;
        let mut usable = Vec::with_capacity(actions.len());
        for action in actions {
            if !self.condition_met(view, actor, &action) {
                continue;
            }
            if action.kind == EnemyActionKind::Skill {
                match action.skill_id {
                    Some(skill_id) if view.project.skill(skill_id)?.mp_cost()? <= me.status.mp() => {}
                    _ => continue,
                }
            }
            usable.push(action);
        }

        let Some(best) = usable.iter().map(|a| a.rating).max() else {
            trace!(enemy = me.data_id, "no usable action, attacking");
            return Ok(AttackInfo::new(
                AttackType::Attack,
                view.random_active(CombatantKind::Player, rng),
                0,
            ));
        };
        let floor = best - RATING_WINDOW;
        let weighted: Vec<(EnemyAction, i32)> = usable
            .into_iter()
            .filter(|a| a.rating > floor)
            .map(|a| (a, a.rating - floor))
            .collect();
        let total: i32 = weighted.iter().map(|(_, w)| w).sum();
        let mut roll = rng.below(total as u32, "enemy action") as i32;
        let mut chosen = weighted[0].0;
        for (action, weight) in &weighted {
            if roll < *weight {
                chosen = *action;
                break;
            }
            roll -= weight;
        }
        self.to_attack_info(view, actor, &chosen, rng)
    }

    fn to_attack_info(
        &self,
        view: &BattleView<'_>,
        actor: ParticipantId,
        action: &EnemyAction,
        rng: &mut BattleRng,
    ) -> DataResult<AttackInfo> {
        let opponent = actor.kind.opponent();
        Ok(match action.kind {
            EnemyActionKind::Basic => match action.basic {
                EnemyBasicAction::Attack => {
                    AttackInfo::new(AttackType::Attack, view.random_active(opponent, rng), 0)
                }
                EnemyBasicAction::DoubleAttack => {
                    AttackInfo::new(AttackType::DoubleAttack, view.random_active(opponent, rng), 0)
                }
                EnemyBasicAction::Defence => AttackInfo::untargeted(AttackType::Defence),
                EnemyBasicAction::WaitAndSee => AttackInfo::untargeted(AttackType::WaitAndSee),
                EnemyBasicAction::Charge => AttackInfo::untargeted(AttackType::Charge),
                EnemyBasicAction::SuicideBombing => AttackInfo::untargeted(AttackType::SuicideBombing),
                EnemyBasicAction::Escape => AttackInfo::untargeted(AttackType::Escape),
                EnemyBasicAction::Nothing => AttackInfo::untargeted(AttackType::None),
            },
            EnemyActionKind::Skill => {
                let skill_id = action.skill_id.unwrap_or_default();
                let scope = view.project.skill(skill_id)?.scope()?;
                let target = match scope {
                    SkillScope::EnemySingle => view.random_active(opponent, rng),
                    SkillScope::FriendSingle => view.random_active(actor.kind, rng),
                    SkillScope::Myself => Some(actor),
                    SkillScope::EnemyAll | SkillScope::FriendAll => None,
                };
                AttackInfo::new(AttackType::Skill, target, skill_id)
            }
            EnemyActionKind::Transform => {
                AttackInfo::new(AttackType::Transform, None, action.transform_into.unwrap_or(actor_id(view, actor)))
            }
        })
    }
}

fn actor_id(view: &BattleView<'_>, actor: ParticipantId) -> u32 {
    view.participant(actor).data_id
}

impl ActionStrategy for RatingStrategy {
    fn choose_action(
        &self,
        view: &BattleView<'_>,
        actor: ParticipantId,
        rng: &mut BattleRng,
    ) -> DataResult<AttackInfo> {
        match actor.kind {
            CombatantKind::Player => self.choose_player_action(view, actor, rng),
            CombatantKind::Enemy => self.choose_enemy_action(view, actor, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{CharacterStatus, ParamSet};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::fields::{enemy, skill};
    use schema::{Array1D, Array2D};

    fn action(basic: i32, rating: i32) -> Array1D {
        Array1D::new()
            .with(enemy::action::KIND, 0)
            .with(enemy::action::BASIC, basic)
            .with(enemy::action::RATING, rating)
    }

    fn project(actions: Array2D) -> ProjectData {
        let mut project = ProjectData::default();
        project.enemies.insert(
            1,
            Array1D::new()
                .with(enemy::NAME, "Bat")
                .with(enemy::ACTIONS, actions),
        );
        project.skills.insert(
            7,
            Array1D::new()
                .with(skill::NAME, "Spark")
                .with(skill::POWER, 20)
                .with(skill::MP_COST, 4),
        );
        project
    }

    fn unit(kind: CombatantKind, data_id: u32) -> BattleParticipant {
        BattleParticipant::new(
            kind,
            data_id,
            "Unit",
            CharacterStatus::new(3, ParamSet::new([100, 10, 10, 10, 10, 10])),
        )
    }

    #[rstest]
    // Ratings 50 (attack) and 45 (defence): weights 10 and 5.
    #[case(vec![0], AttackType::Attack)]
    #[case(vec![9], AttackType::Attack)]
    #[case(vec![10], AttackType::Defence)]
    #[case(vec![14], AttackType::Defence)]
    fn test_enemy_weighted_choice(#[case] rolls: Vec<u32>, #[case] expected: AttackType) {
        // Arrange
        let actions = Array2D::new()
            .with(1, action(0, 50))
            .with(2, action(2, 45))
            .with(3, action(3, 40));
        let project = project(actions);
        let save = SaveState::new();
        let players = vec![unit(CombatantKind::Player, 1)];
        let enemies = vec![unit(CombatantKind::Enemy, 1)];
        let view = BattleView {
            project: &project,
            save: &save,
            players: &players,
            enemies: &enemies,
            turn_num: 1,
        };
        let mut rng = BattleRng::new_for_test(rolls);

        // Act
        let info = RatingStrategy::new()
            .choose_action(&view, ParticipantId::enemy(0), &mut rng)
            .unwrap();

        // Assert
        assert_eq!(info.attack_type, expected);
    }

    #[test]
    fn test_switch_condition_gates_action() {
        let actions = Array2D::new().with(
            1,
            action(6, 90)
                .with(enemy::action::CONDITION_TYPE, 1)
                .with(enemy::action::SWITCH_ID, 4),
        );
        let project = project(actions);
        let mut save = SaveState::new();
        let players = vec![unit(CombatantKind::Player, 1)];
        let enemies = vec![unit(CombatantKind::Enemy, 1)];
        let mut rng = BattleRng::new_for_test(vec![0]);

        let view = BattleView { project: &project, save: &save, players: &players, enemies: &enemies, turn_num: 1 };
        let off = RatingStrategy.choose_action(&view, ParticipantId::enemy(0), &mut rng).unwrap();
        assert_eq!(off.attack_type, AttackType::Attack);
        assert_eq!(off.target, Some(ParticipantId::player(0)));

        save.set_switch(4, true);
        let view = BattleView { project: &project, save: &save, players: &players, enemies: &enemies, turn_num: 1 };
        let on = RatingStrategy.choose_action(&view, ParticipantId::enemy(0), &mut rng).unwrap();
        assert_eq!(on.attack_type, AttackType::Escape);
    }

    #[rstest]
    #[case(1, 0, 1, true)]
    #[case(1, 0, 2, false)]
    #[case(3, 0, 2, false)]
    #[case(2, 3, 2, true)]
    #[case(2, 3, 4, false)]
    #[case(2, 3, 5, true)]
    #[case(2, 3, 1, false)]
    fn test_turns_condition(#[case] from: i32, #[case] every: i32, #[case] turn_num: u32, #[case] met: bool) {
        // Arrange
        let actions = Array2D::new().with(
            1,
            action(2, 50)
                .with(enemy::action::CONDITION_TYPE, 2)
                .with(enemy::action::PARAM_A, from)
                .with(enemy::action::PARAM_B, every),
        );
        let project = project(actions);
        let save = SaveState::new();
        let players = vec![unit(CombatantKind::Player, 1)];
        let enemies = vec![unit(CombatantKind::Enemy, 1)];
        let view = BattleView { project: &project, save: &save, players: &players, enemies: &enemies, turn_num };
        let mut rng = BattleRng::new_for_test(vec![0]);

        // Act
        let info = RatingStrategy.choose_action(&view, ParticipantId::enemy(0), &mut rng).unwrap();

        // Assert
        let expected = if met { AttackType::Defence } else { AttackType::Attack };
        assert_eq!(info.attack_type, expected);
    }

    #[test]
    fn test_player_prefers_affordable_skill() {
        let project = project(Array2D::new());
        let save = SaveState::new();
        let mut caster = unit(CombatantKind::Player, 1);
        caster.status.learn_skill(7);
        let players = vec![caster];
        let enemies = vec![unit(CombatantKind::Enemy, 1)];
        let view = BattleView { project: &project, save: &save, players: &players, enemies: &enemies, turn_num: 1 };
        let mut rng = BattleRng::new_for_test(vec![0]);

        let info = RatingStrategy.choose_action(&view, ParticipantId::player(0), &mut rng).unwrap();

        assert_eq!(info, AttackInfo::new(AttackType::Skill, Some(ParticipantId::enemy(0)), 7));
    }

    #[test]
    fn test_player_without_mp_attacks() {
        let project = project(Array2D::new());
        let save = SaveState::new();
        let mut caster = unit(CombatantKind::Player, 1);
        caster.status.learn_skill(7);
        caster.status.set_mp(3);
        let players = vec![caster];
        let enemies = vec![unit(CombatantKind::Enemy, 1)];
        let view = BattleView { project: &project, save: &save, players: &players, enemies: &enemies, turn_num: 1 };
        let mut rng = BattleRng::new_for_test(vec![0]);

        let info = RatingStrategy.choose_action(&view, ParticipantId::player(0), &mut rng).unwrap();

        assert_eq!(info.attack_type, AttackType::Attack);
    }
}
