use crate::record::{Array1D, FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, FromRepr};

/// Enumerations stored as small integers inside a record.
pub trait FieldEnum: Sized + Copy {
    fn from_field_value(value: i32) -> Option<Self>;
}

macro_rules! field_enum {
    ($($name:ident),* $(,)?) => {
        $(
            impl FieldEnum for $name {
                fn from_field_value(value: i32) -> Option<Self> {
                    u8::try_from(value).ok().and_then($name::from_repr)
                }
            }
        )*
    };
}

impl Array1D {
    /// Required enum-valued field.
    pub fn enumeration<T: FieldEnum>(&self, field: u32) -> FieldResult<T> {
        let value = self.int(field)?;
        T::from_field_value(value).ok_or(FieldError::OutOfRange { field, value })
    }

    pub fn enumeration_or<T: FieldEnum>(&self, field: u32, default: T) -> FieldResult<T> {
        if self.exists(field) {
            self.enumeration(field)
        } else {
            Ok(default)
        }
    }
}

/// Targeting rule of a skill or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum SkillScope {
    EnemySingle = 0,
    EnemyAll,
    Myself,
    FriendSingle,
    FriendAll,
}

impl SkillScope {
    /// True when the skill lands on the user's own side.
    pub fn targets_friends(self) -> bool {
        matches!(
            self,
            SkillScope::Myself | SkillScope::FriendSingle | SkillScope::FriendAll
        )
    }

    pub fn is_single(self) -> bool {
        matches!(self, SkillScope::EnemySingle | SkillScope::FriendSingle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum ItemType {
    Normal = 0,
    Weapon,
    Shield,
    Armor,
    Helmet,
    Accessory,
    Medicine,
    Book,
    Seed,
    Special,
    Switch,
}

/// What a bad condition stops its holder from doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum Restriction {
    None = 0,
    NoAction,
    AttackEnemy,
    AttackAlly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum ConditionKind {
    BattleOnly = 0,
    Persistent,
}

/// How a condition scales the parameters it flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum AffectType {
    Half = 0,
    Double,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum Param {
    MaxHp = 0,
    MaxMp,
    Attack,
    Defense,
    Spirit,
    Agility,
}

impl Param {
    /// The four parameters skills and conditions can modify, in field order.
    pub const BATTLE: [Param; 4] = [Param::Attack, Param::Defense, Param::Spirit, Param::Agility];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum EnemyActionKind {
    Basic = 0,
    Skill,
    Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum EnemyBasicAction {
    Attack = 0,
    DoubleAttack,
    Defence,
    WaitAndSee,
    Charge,
    SuicideBombing,
    Escape,
    Nothing,
}

/// Activation condition of an enemy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum ActionCondition {
    Always = 0,
    Switch,
    Turns,
    MonsterCount,
    HpRange,
    MpRange,
    PartyLevel,
    PartyFatigue,
}

field_enum!(
    SkillScope,
    ItemType,
    Restriction,
    ConditionKind,
    AffectType,
    Param,
    EnemyActionKind,
    EnemyBasicAction,
    ActionCondition,
);
