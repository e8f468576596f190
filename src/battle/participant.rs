use crate::battle::calculators::AttackResult;
use crate::errors::DataResult;
use crate::project::ProjectData;
use crate::status::CharacterStatus;
use ordered_float::OrderedFloat;
use schema::fields::{condition, vocabulary};
use schema::Param;
use serde::{Deserialize, Serialize};

/// Which side a combatant fights on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CombatantKind {
    Player,
    Enemy,
}

/// Everything that differs between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindBehavior {
    /// Particle joining the target name and the damage number.
    pub damage_particle: &'static str,
    /// Vocabulary when this kind takes damage.
    pub damaged: u32,
    /// Vocabulary when this kind takes none.
    pub undamaged: u32,
    /// Vocabulary for a critical hit landing on this kind.
    pub critical: u32,
    /// Condition message field used when this kind is afflicted.
    pub afflicted_message: u32,
    /// Dead players drop out at once; enemies fade first.
    pub excluded_on_death: bool,
}

const PLAYER_BEHAVIOR: KindBehavior = KindBehavior {
    damage_particle: "は",
    damaged: vocabulary::ACTOR_DAMAGED,
    undamaged: vocabulary::ACTOR_UNDAMAGED,
    critical: vocabulary::ACTOR_CRITICAL,
    afflicted_message: condition::MESSAGE_ACTOR,
    excluded_on_death: true,
};

const ENEMY_BEHAVIOR: KindBehavior = KindBehavior {
    damage_particle: "に",
    damaged: vocabulary::ENEMY_DAMAGED,
    undamaged: vocabulary::ENEMY_UNDAMAGED,
    critical: vocabulary::ENEMY_CRITICAL,
    afflicted_message: condition::MESSAGE_ENEMY,
    excluded_on_death: false,
};

impl CombatantKind {
    pub fn behavior(self) -> &'static KindBehavior {
        match self {
            CombatantKind::Player => &PLAYER_BEHAVIOR,
            CombatantKind::Enemy => &ENEMY_BEHAVIOR,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            CombatantKind::Player => CombatantKind::Enemy,
            CombatantKind::Enemy => CombatantKind::Player,
        }
    }
}

/// Non-owning handle to a participant inside the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId {
    pub kind: CombatantKind,
    pub index: usize,
}

impl ParticipantId {
    pub fn player(index: usize) -> Self {
        Self {
            kind: CombatantKind::Player,
            index,
        }
    }

    pub fn enemy(index: usize) -> Self {
        Self {
            kind: CombatantKind::Enemy,
            index,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttackType {
    #[default]
    None,
    Attack,
    DoubleAttack,
    Skill,
    Item,
    Defence,
    Charge,
    WaitAndSee,
    SuicideBombing,
    Escape,
    Transform,
    /// A restricting condition keeps the unit from acting this turn.
    Immobile,
}

/// The action a participant will take this turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackInfo {
    pub attack_type: AttackType,
    pub target: Option<ParticipantId>,
    /// Skill, item, enemy (for transform) or condition id, by attack type.
    pub id: u32,
}

impl AttackInfo {
    pub fn new(attack_type: AttackType, target: Option<ParticipantId>, id: u32) -> Self {
        Self {
            attack_type,
            target,
            id,
        }
    }

    pub fn untargeted(attack_type: AttackType) -> Self {
        Self::new(attack_type, None, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Damage,
    Dead { exclude_on_finish: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub kind: AnimationKind,
    pub remaining: u32,
}

/// One combatant: a status plus everything that only exists during battle.
#[derive(Debug, Clone)]
pub struct BattleParticipant {
    pub kind: CombatantKind,
    /// Character id for players, enemy id for enemies.
    pub data_id: u32,
    pub name: String,
    pub status: CharacterStatus,
    pub attack_info: AttackInfo,
    pub attack_priority: OrderedFloat<f64>,
    pub position: (i32, i32),
    pub critical: bool,
    pub critical_chance: i32,
    pub evasive: bool,
    excluded: bool,
    animation: Option<Animation>,
}

impl BattleParticipant {
    pub fn new(kind: CombatantKind, data_id: u32, name: &str, status: CharacterStatus) -> Self {
        // A party member that enters the fight already down takes no part in it.
        let excluded = kind == CombatantKind::Player && status.is_dead();
        Self {
            kind,
            data_id,
            name: name.to_string(),
            status,
            attack_info: AttackInfo::default(),
            attack_priority: OrderedFloat(0.0),
            position: (0, 0),
            critical: false,
            critical_chance: 0,
            evasive: false,
            excluded,
            animation: None,
        }
    }

    pub fn for_player(project: &ProjectData, char_id: u32, status: CharacterStatus) -> DataResult<Self> {
        let character = project.character(char_id)?;
        let mut participant = Self::new(CombatantKind::Player, char_id, character.name()?, status);
        participant.critical = character.critical()?;
        participant.critical_chance = character.critical_chance()?;
        Ok(participant)
    }

    pub fn for_enemy(project: &ProjectData, enemy_id: u32, position: (i32, i32)) -> DataResult<Self> {
        let enemy = project.enemy(enemy_id)?;
        let status = CharacterStatus::for_enemy(project, enemy_id)?;
        let mut participant = Self::new(CombatantKind::Enemy, enemy_id, enemy.name()?, status);
        participant.position = position;
        participant.critical = enemy.critical()?;
        participant.critical_chance = enemy.critical_chance()?;
        participant.evasive = enemy.evasive()?;
        Ok(participant)
    }

    pub fn behavior(&self) -> &'static KindBehavior {
        self.kind.behavior()
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub fn set_excluded(&mut self, excluded: bool) {
        self.excluded = excluded;
    }

    /// Alive and still in the fight.
    pub fn is_active(&self) -> bool {
        !self.excluded && !self.status.is_dead()
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    pub fn play_damage_anime(&mut self, ticks: u32) {
        if ticks > 0 {
            self.animation = Some(Animation {
                kind: AnimationKind::Damage,
                remaining: ticks,
            });
        }
    }

    /// Dead players drop out at once. Enemies fade for `ticks` and, if
    /// `exclude_on_finish` is set, drop out when the fade ends.
    pub fn play_dead_anime(&mut self, ticks: u32, exclude_on_finish: bool) {
        if self.behavior().excluded_on_death && self.status.is_dead() {
            self.excluded = true;
            self.animation = None;
            return;
        }
        if ticks == 0 {
            self.excluded |= exclude_on_finish;
            return;
        }
        self.animation = Some(Animation {
            kind: AnimationKind::Dead { exclude_on_finish },
            remaining: ticks,
        });
    }

    /// Advances the running animation by one tick.
    pub fn tick_animation(&mut self) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        animation.remaining = animation.remaining.saturating_sub(1);
        if animation.remaining == 0 {
            if let AnimationKind::Dead { exclude_on_finish } = animation.kind {
                self.excluded |= exclude_on_finish;
            }
            self.animation = None;
        }
    }

    /// Speed-derived base priority; the engine adds jitter when ordering.
    pub fn base_priority(&self) -> f64 {
        self.status.param(Param::Agility) as f64
    }

    pub fn is_defending(&self) -> bool {
        self.attack_info.attack_type == AttackType::Defence
    }

    /// The only mutating step of an attack.
    pub fn add_damage(&mut self, result: &AttackResult) {
        self.status.apply_result(result);
    }
}
