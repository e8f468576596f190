use crate::errors::{DataResult, ProjectDataError};
use schema::fields::{character, condition, enemy, enemy_group, item, skill};
use schema::{
    ActionCondition, AffectType, Array1D, Array2D, ConditionKind, EnemyActionKind,
    EnemyBasicAction, FieldEnum, ItemType, Param, Restriction, SkillScope,
};
use serde::{Deserialize, Serialize};

/// One row of a named table. Every accessor reports failures with the table
/// name and row id attached.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'static str,
    id: u32,
    row: &'a Array1D,
}

impl<'a> Record<'a> {
    pub fn new(table: &'static str, id: u32, row: &'a Array1D) -> Self {
        Self { table, id, row }
    }

    pub(crate) fn lookup(rows: &'a Array2D, table: &'static str, id: u32) -> DataResult<Self> {
        let row = rows.row(id).map_err(ProjectDataError::in_row(table, id))?;
        Ok(Self::new(table, id, row))
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn raw(&self) -> &'a Array1D {
        self.row
    }

    pub fn exists(&self, field: u32) -> bool {
        self.row.exists(field)
    }

    pub fn int(&self, field: u32) -> DataResult<i32> {
        self.row.int(field).map_err(self.tag())
    }

    pub fn int_or(&self, field: u32, default: i32) -> DataResult<i32> {
        self.row.int_or(field, default).map_err(self.tag())
    }

    pub fn bool_or(&self, field: u32, default: bool) -> DataResult<bool> {
        self.row.bool_or(field, default).map_err(self.tag())
    }

    pub fn string(&self, field: u32) -> DataResult<&'a str> {
        self.row.string(field).map_err(self.tag())
    }

    pub fn string_opt(&self, field: u32) -> DataResult<Option<&'a str>> {
        self.row.string_opt(field).map_err(self.tag())
    }

    pub fn ints_or_empty(&self, field: u32) -> DataResult<&'a [i32]> {
        self.row.ints_or_empty(field).map_err(self.tag())
    }

    pub fn table_opt(&self, field: u32) -> DataResult<Option<&'a Array2D>> {
        self.row.table_opt(field).map_err(self.tag())
    }

    pub fn enumeration_or<T: FieldEnum>(&self, field: u32, default: T) -> DataResult<T> {
        self.row.enumeration_or(field, default).map_err(self.tag())
    }

    fn tag(&self) -> impl FnOnce(schema::FieldError) -> ProjectDataError {
        ProjectDataError::in_row(self.table, self.id)
    }
}

/// Reads an id-valued field; zero and negatives mean "none".
fn optional_id(record: &Record<'_>, field: u32) -> DataResult<Option<u32>> {
    let value = record.int_or(field, 0)?;
    Ok(u32::try_from(value).ok().filter(|id| *id > 0))
}

macro_rules! row_view {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name<'a>(pub(crate) Record<'a>);

            impl<'a> $name<'a> {
                pub fn id(&self) -> u32 {
                    self.0.id()
                }

                pub fn record(&self) -> &Record<'a> {
                    &self.0
                }

                pub fn name(&self) -> DataResult<&'a str> {
                    self.0.string(0x01)
                }
            }
        )*
    };
}

row_view!(Character, Skill, Item, Enemy, EnemyGroup, Condition);

impl<'a> Character<'a> {
    pub fn initial_level(&self) -> DataResult<i32> {
        Ok(self.0.int_or(character::INITIAL_LEVEL, 1)?.max(1))
    }

    pub fn final_level(&self) -> DataResult<i32> {
        Ok(self.0.int_or(character::FINAL_LEVEL, 50)?.max(1))
    }

    pub fn critical(&self) -> DataResult<bool> {
        self.0.bool_or(character::CRITICAL, true)
    }

    pub fn critical_chance(&self) -> DataResult<i32> {
        self.0.int_or(character::CRITICAL_CHANCE, 30)
    }

    pub fn exp_curve(&self) -> DataResult<(i32, i32, i32)> {
        Ok((
            self.0.int_or(character::EXP_BASE, 30)?,
            self.0.int_or(character::EXP_INFLATION, 30)?,
            self.0.int_or(character::EXP_CORRECTION, 0)?,
        ))
    }

    /// Parameter value at `level`, read from the parameter-major table.
    /// Levels past the end of the table repeat the last entry.
    pub fn param(&self, param: Param, level: i32) -> DataResult<i32> {
        let table = self.0.ints_or_empty(character::PARAMETERS)?;
        let levels = table.len() / 6;
        if levels == 0 {
            return Err(ProjectDataError::in_row("character", self.id())(
                schema::FieldError::MissingField(character::PARAMETERS),
            ));
        }
        let level = (level.max(1) as usize).min(levels);
        Ok(table[param as usize * levels + level - 1])
    }

    /// `(level, skill id)` pairs in ascending level; ties keep table order.
    pub fn learned_skills(&self) -> DataResult<Vec<(i32, u32)>> {
        let Some(table) = self.0.table_opt(character::SKILLS)? else {
            return Ok(Vec::new());
        };
        let mut learned = Vec::with_capacity(table.len());
        for (row_id, row) in table.iter() {
            let entry = Record::new("character skill", row_id, row);
            let level = entry.int(character::learning::LEVEL)?;
            if let Some(skill_id) = optional_id(&entry, character::learning::SKILL_ID)? {
                learned.push((level, skill_id));
            }
        }
        learned.sort_by_key(|(level, _)| *level);
        Ok(learned)
    }
}

impl<'a> Skill<'a> {
    pub fn using_message1(&self) -> DataResult<&'a str> {
        Ok(self.0.string_opt(skill::USING_MESSAGE1)?.unwrap_or(""))
    }

    pub fn using_message2(&self) -> DataResult<Option<&'a str>> {
        self.0.string_opt(skill::USING_MESSAGE2)
    }

    /// Offset into the four skill failure vocabulary strings.
    pub fn failure_message(&self) -> DataResult<u32> {
        Ok(self.0.int_or(skill::FAILURE_MESSAGE, 0)?.clamp(0, 3) as u32)
    }

    pub fn mp_cost(&self) -> DataResult<i32> {
        self.0.int_or(skill::MP_COST, 0)
    }

    pub fn scope(&self) -> DataResult<SkillScope> {
        self.0.enumeration_or(skill::SCOPE, SkillScope::EnemySingle)
    }

    pub fn animation(&self) -> DataResult<Option<u32>> {
        optional_id(&self.0, skill::ANIMATION)
    }

    pub fn power(&self) -> DataResult<i32> {
        self.0.int_or(skill::POWER, 0)
    }

    pub fn physical_rate(&self) -> DataResult<i32> {
        self.0.int_or(skill::PHYSICAL_RATE, 0)
    }

    pub fn magical_rate(&self) -> DataResult<i32> {
        self.0.int_or(skill::MAGICAL_RATE, 3)
    }

    pub fn variance(&self) -> DataResult<i32> {
        self.0.int_or(skill::VARIANCE, 4)
    }

    pub fn hit(&self) -> DataResult<i32> {
        self.0.int_or(skill::HIT, 100)
    }

    pub fn affects_hp(&self) -> DataResult<bool> {
        self.0.bool_or(skill::AFFECT_HP, true)
    }

    pub fn affects_mp(&self) -> DataResult<bool> {
        self.0.bool_or(skill::AFFECT_MP, false)
    }

    /// Whether the skill changes one of the four battle parameters.
    pub fn affects_param(&self, param: Param) -> DataResult<bool> {
        let field = match param {
            Param::Attack => skill::AFFECT_ATTACK,
            Param::Defense => skill::AFFECT_DEFENSE,
            Param::Spirit => skill::AFFECT_SPIRIT,
            Param::Agility => skill::AFFECT_AGILITY,
            Param::MaxHp | Param::MaxMp => return Ok(false),
        };
        self.0.bool_or(field, false)
    }

    pub fn conditions(&self) -> DataResult<Vec<u32>> {
        Ok(self
            .0
            .ints_or_empty(skill::CONDITIONS)?
            .iter()
            .filter_map(|id| u32::try_from(*id).ok())
            .collect())
    }

    /// An attack skill deals damage to the opposing side.
    pub fn is_offensive(&self) -> DataResult<bool> {
        Ok(!self.scope()?.targets_friends() && self.affects_hp()? && self.power()? > 0)
    }
}

impl<'a> Item<'a> {
    pub fn item_type(&self) -> DataResult<ItemType> {
        self.0.enumeration_or(item::TYPE, ItemType::Normal)
    }

    pub fn scope(&self) -> DataResult<SkillScope> {
        Ok(if self.0.bool_or(item::SCOPE, false)? {
            SkillScope::FriendAll
        } else {
            SkillScope::FriendSingle
        })
    }

    pub fn recover_hp(&self) -> DataResult<(i32, i32)> {
        Ok((
            self.0.int_or(item::RECOVER_HP_RATE, 0)?,
            self.0.int_or(item::RECOVER_HP, 0)?,
        ))
    }

    pub fn recover_mp(&self) -> DataResult<(i32, i32)> {
        Ok((
            self.0.int_or(item::RECOVER_MP_RATE, 0)?,
            self.0.int_or(item::RECOVER_MP, 0)?,
        ))
    }

    /// Skill a special item casts.
    pub fn skill_id(&self) -> DataResult<Option<u32>> {
        optional_id(&self.0, item::SKILL_ID)
    }
}

impl<'a> Enemy<'a> {
    pub fn param(&self, param: Param) -> DataResult<i32> {
        let field = match param {
            Param::MaxHp => enemy::MAX_HP,
            Param::MaxMp => enemy::MAX_MP,
            Param::Attack => enemy::ATTACK,
            Param::Defense => enemy::DEFENSE,
            Param::Spirit => enemy::SPIRIT,
            Param::Agility => enemy::AGILITY,
        };
        self.0.int(field)
    }

    pub fn exp(&self) -> DataResult<i32> {
        self.0.int_or(enemy::EXP, 0)
    }

    pub fn money(&self) -> DataResult<i32> {
        self.0.int_or(enemy::MONEY, 0)
    }

    /// Drop item and its probability in percent.
    pub fn drop(&self) -> DataResult<Option<(u32, i32)>> {
        let Some(item_id) = optional_id(&self.0, enemy::DROP_ID)? else {
            return Ok(None);
        };
        Ok(Some((item_id, self.0.int_or(enemy::DROP_PROB, 100)?)))
    }

    pub fn critical(&self) -> DataResult<bool> {
        self.0.bool_or(enemy::CRITICAL, false)
    }

    pub fn critical_chance(&self) -> DataResult<i32> {
        self.0.int_or(enemy::CRITICAL_CHANCE, 30)
    }

    /// Enemies flagged here are harder to hit.
    pub fn evasive(&self) -> DataResult<bool> {
        self.0.bool_or(enemy::MISS, false)
    }

    pub fn actions(&self) -> DataResult<Vec<EnemyAction>> {
        let Some(table) = self.0.table_opt(enemy::ACTIONS)? else {
            return Ok(Vec::new());
        };
        table
            .iter()
            .map(|(row_id, row)| EnemyAction::read(&Record::new("enemy action", row_id, row)))
            .collect()
    }
}

/// One entry of an enemy's action table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAction {
    pub kind: EnemyActionKind,
    pub basic: EnemyBasicAction,
    pub skill_id: Option<u32>,
    pub transform_into: Option<u32>,
    pub condition: ActionCondition,
    pub param_a: i32,
    pub param_b: i32,
    pub switch_id: Option<u32>,
    pub rating: i32,
}

impl EnemyAction {
    fn read(record: &Record<'_>) -> DataResult<Self> {
        use enemy::action;
        Ok(Self {
            kind: record.enumeration_or(action::KIND, EnemyActionKind::Basic)?,
            basic: record.enumeration_or(action::BASIC, EnemyBasicAction::Attack)?,
            skill_id: optional_id(record, action::SKILL_ID)?,
            transform_into: optional_id(record, action::ENEMY_ID)?,
            condition: record.enumeration_or(action::CONDITION_TYPE, ActionCondition::Always)?,
            param_a: record.int_or(action::PARAM_A, 0)?,
            param_b: record.int_or(action::PARAM_B, 0)?,
            switch_id: optional_id(record, action::SWITCH_ID)?,
            rating: record.int_or(action::RATING, 50)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember {
    pub enemy_id: u32,
    pub x: i32,
    pub y: i32,
}

impl<'a> EnemyGroup<'a> {
    pub fn members(&self) -> DataResult<Vec<GroupMember>> {
        let Some(table) = self.0.table_opt(enemy_group::MEMBERS)? else {
            return Ok(Vec::new());
        };
        let mut members = Vec::with_capacity(table.len());
        for (row_id, row) in table.iter() {
            use enemy_group::member;
            let record = Record::new("enemy group member", row_id, row);
            let Some(enemy_id) = optional_id(&record, member::ENEMY_ID)? else {
                continue;
            };
            members.push(GroupMember {
                enemy_id,
                x: record.int_or(member::X, 0)?,
                y: record.int_or(member::Y, 0)?,
            });
        }
        Ok(members)
    }
}

impl<'a> Condition<'a> {
    pub fn kind(&self) -> DataResult<ConditionKind> {
        self.0.enumeration_or(condition::KIND, ConditionKind::BattleOnly)
    }

    pub fn priority(&self) -> DataResult<i32> {
        self.0.int_or(condition::PRIORITY, 50)
    }

    pub fn restriction(&self) -> DataResult<Restriction> {
        self.0.enumeration_or(condition::RESTRICTION, Restriction::None)
    }

    /// Optional message field; absent reads as `None`.
    pub fn message(&self, field: u32) -> DataResult<Option<&'a str>> {
        self.0.string_opt(field)
    }

    pub fn effect(&self) -> DataResult<ConditionEffect> {
        let params = [
            (Param::Attack, condition::AFFECT_ATTACK),
            (Param::Defense, condition::AFFECT_DEFENSE),
            (Param::Spirit, condition::AFFECT_SPIRIT),
            (Param::Agility, condition::AFFECT_AGILITY),
        ];
        let mut affected = Vec::new();
        for (param, field) in params {
            if self.0.bool_or(field, false)? {
                affected.push(param);
            }
        }
        Ok(ConditionEffect {
            condition_id: self.id(),
            kind: self.kind()?,
            priority: self.priority()?,
            restriction: self.restriction()?,
            hold_turns: self.0.int_or(condition::HOLD_TURN, 0)?.max(0) as u32,
            auto_release_prob: self.0.int_or(condition::AUTO_RELEASE_PROB, 0)?,
            affect: self.0.enumeration_or(condition::AFFECT_TYPE, AffectType::Nothing)?,
            affected,
        })
    }
}

/// The battle-relevant metadata of a condition, copied out of the database
/// when the condition is inflicted so statuses can be evaluated without it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConditionEffect {
    pub condition_id: u32,
    pub kind: ConditionKind,
    pub priority: i32,
    pub restriction: Restriction,
    pub hold_turns: u32,
    pub auto_release_prob: i32,
    pub affect: AffectType,
    pub affected: Vec<Param>,
}

impl ConditionEffect {
    /// Scales `value` if this condition modifies `param`.
    pub fn modify(&self, param: Param, value: i32) -> i32 {
        if !self.affected.contains(&param) {
            return value;
        }
        match self.affect {
            AffectType::Half => value / 2,
            AffectType::Double => value * 2,
            AffectType::Nothing => value,
        }
    }
}
