use crate::battle::engine::{BattleEngine, Encounter};
use crate::battle::state::BattleRng;
use crate::config::BattleConfig;
use crate::errors::BattleResult;
use crate::project::ProjectData;
use crate::save::SaveState;
use schema::fields::{character, enemy, enemy_group, item, vocabulary};
use schema::{Array1D, Array2D};

/// Hero at level 1: 60 HP, 20 MP, attack 30, defense 10, spirit 10, agility 20.
pub const HERO: u32 = 1;
/// Mage at level 1: 40 HP, 40 MP, attack 12, defense 6, spirit 30, agility 10.
pub const MAGE: u32 = 2;
/// 20 HP, attack 10, defense 4, agility 10. Pays 10 exp, 5 money and a potion.
pub const SLIME: u32 = 1;
pub const POTION: u32 = 1;

/// Parameter-major table holding the same values at every level.
pub fn flat_params(levels: usize, values: [i32; 6]) -> Vec<i32> {
    values
        .iter()
        .flat_map(|value| std::iter::repeat(*value).take(levels))
        .collect()
}

pub fn character_row(name: &str, values: [i32; 6]) -> Array1D {
    Array1D::new()
        .with(character::NAME, name)
        .with(character::INITIAL_LEVEL, 1)
        .with(character::FINAL_LEVEL, 50)
        .with(character::CRITICAL, false)
        .with(character::EXP_BASE, 10)
        .with(character::EXP_INFLATION, 0)
        .with(character::PARAMETERS, flat_params(10, values))
}

/// `[max hp, max mp, attack, defense, spirit, agility]`
pub fn enemy_row(name: &str, values: [i32; 6]) -> Array1D {
    Array1D::new()
        .with(enemy::NAME, name)
        .with(enemy::MAX_HP, values[0])
        .with(enemy::MAX_MP, values[1])
        .with(enemy::ATTACK, values[2])
        .with(enemy::DEFENSE, values[3])
        .with(enemy::SPIRIT, values[4])
        .with(enemy::AGILITY, values[5])
}

/// Every battle string the engine reads, in plain English.
pub fn test_vocabulary() -> Array1D {
    let mut voc = Array1D::new()
        .with(vocabulary::ENEMY_APPEARED, " appeared!")
        .with(vocabulary::FIRST_ATTACK, "You struck first!")
        .with(vocabulary::ESCAPE_SUCCESS, "You got away!")
        .with(vocabulary::ESCAPE_FAILURE, "Could not escape!")
        .with(vocabulary::VICTORY, "Victory!")
        .with(vocabulary::DEFEAT, "The party fell...")
        .with(vocabulary::EXP_RECEIVED, " EXP gained.")
        .with(vocabulary::MONEY_RECEIVED_A, "Found ")
        .with(vocabulary::MONEY_RECEIVED_B, ".")
        .with(vocabulary::ITEM_RECEIVED, " obtained.")
        .with(vocabulary::ATTACKING, " attacks!")
        .with(vocabulary::ACTOR_CRITICAL, "A painful blow!")
        .with(vocabulary::ENEMY_CRITICAL, "A critical hit!")
        .with(vocabulary::DEFENDING, " guards.")
        .with(vocabulary::OBSERVING, " watches.")
        .with(vocabulary::CHARGING, " charges up.")
        .with(vocabulary::AUTODESTRUCTION, " explodes!")
        .with(vocabulary::ENEMY_ESCAPED, " ran away.")
        .with(vocabulary::ENEMY_TRANSFORMED, " changed shape.")
        .with(vocabulary::ENEMY_DAMAGED, " damage!")
        .with(vocabulary::ENEMY_UNDAMAGED, " is unharmed.")
        .with(vocabulary::ACTOR_DAMAGED, " damage taken.")
        .with(vocabulary::ACTOR_UNDAMAGED, " took no damage.")
        .with(vocabulary::SKILL_FAILURE_BASE, " resisted.")
        .with(vocabulary::SKILL_FAILURE_BASE + 1, " was unaffected.")
        .with(vocabulary::SKILL_FAILURE_BASE + 2, " avoided it.")
        .with(vocabulary::DODGE, " dodged!")
        .with(vocabulary::USE_ITEM, " used.")
        .with(vocabulary::HP_RECOVERED, " recovered.")
        .with(vocabulary::PARAMETER_INCREASE, " up.")
        .with(vocabulary::PARAMETER_DECREASE, " down.")
        .with(vocabulary::LEVEL_UP, " reached!")
        .with(vocabulary::SKILL_LEARNED, " learned!")
        .with(vocabulary::GOLD, "G")
        .with(vocabulary::LEVEL, "Lv")
        .with(vocabulary::HEALTH_POINTS, "HP")
        .with(vocabulary::SPIRIT_POINTS, "MP");
    for (offset, label) in ["Attack", "Defense", "Spirit", "Agility"].iter().enumerate() {
        voc.set(vocabulary::PARAM_LABEL_BASE + offset as u32, *label);
    }
    voc
}

/// A builder for small project databases with sensible defaults: a hero, a
/// mage, a slime, a potion and enemy group 1 holding one slime. The party is
/// the hero alone unless `with_party` says otherwise.
///
/// # Example
/// ```ignore
/// let builder = TestProjectBuilder::new().with_enemy_group(2, &[SLIME, SLIME]);
/// let project = builder.build();
/// let mut save = builder.save(&project);
/// ```
pub struct TestProjectBuilder {
    project: ProjectData,
    party: Vec<u32>,
}

impl TestProjectBuilder {
    pub fn new() -> Self {
        let mut project = ProjectData {
            vocabulary: test_vocabulary(),
            ..ProjectData::default()
        };
        project
            .characters
            .insert(HERO, character_row("Hero", [60, 20, 30, 10, 10, 20]));
        project
            .characters
            .insert(MAGE, character_row("Mage", [40, 40, 12, 6, 30, 10]));
        project.enemies.insert(
            SLIME,
            enemy_row("Slime", [20, 0, 10, 4, 5, 10])
                .with(enemy::EXP, 10)
                .with(enemy::MONEY, 5)
                .with(enemy::DROP_ID, POTION as i32)
                .with(enemy::DROP_PROB, 100),
        );
        project.items.insert(
            POTION,
            Array1D::new()
                .with(item::NAME, "Potion")
                .with(item::TYPE, 6)
                .with(item::RECOVER_HP, 30),
        );
        Self {
            project,
            party: vec![HERO],
        }
        .with_enemy_group(1, &[SLIME])
    }

    pub fn with_character(mut self, id: u32, row: Array1D) -> Self {
        self.project.characters.insert(id, row);
        self
    }

    pub fn with_enemy(mut self, id: u32, row: Array1D) -> Self {
        self.project.enemies.insert(id, row);
        self
    }

    pub fn with_skill(mut self, id: u32, row: Array1D) -> Self {
        self.project.skills.insert(id, row);
        self
    }

    pub fn with_item(mut self, id: u32, row: Array1D) -> Self {
        self.project.items.insert(id, row);
        self
    }

    pub fn with_condition(mut self, id: u32, row: Array1D) -> Self {
        self.project.conditions.insert(id, row);
        self
    }

    /// Members are placed left to right in the order given.
    pub fn with_enemy_group(mut self, id: u32, members: &[u32]) -> Self {
        let mut table = Array2D::new();
        for (slot, enemy_id) in members.iter().enumerate() {
            table.insert(
                slot as u32 + 1,
                Array1D::new()
                    .with(enemy_group::member::ENEMY_ID, *enemy_id as i32)
                    .with(enemy_group::member::X, 80 * slot as i32)
                    .with(enemy_group::member::Y, 120),
            );
        }
        self.project.enemy_groups.insert(
            id,
            Array1D::new()
                .with(enemy_group::NAME, "Group")
                .with(enemy_group::MEMBERS, table),
        );
        self
    }

    pub fn with_party(mut self, party: &[u32]) -> Self {
        self.party = party.to_vec();
        self
    }

    pub fn build(&self) -> ProjectData {
        self.project.clone()
    }

    /// A fresh save holding the configured party.
    pub fn save(&self, project: &ProjectData) -> SaveState {
        let mut save = SaveState::new();
        for char_id in &self.party {
            if let Err(err) = save.add_party_member(project, *char_id) {
                panic!("Failed to add party member {}: {}", char_id, err);
            }
        }
        save
    }
}

/// Config with every wait shortened to a single tick.
pub fn quick_config() -> BattleConfig {
    BattleConfig {
        start_ticks: 0,
        first_attack_ticks: 0,
        escape_ticks: 0,
        result_line_interval: 0,
        damage_anime_ticks: 1,
        dead_anime_ticks: 1,
        skill_anime_ticks: 1,
        ..BattleConfig::default()
    }
}

/// A scripted rng that always draws 0: every roll hits, never crits on a
/// non-critical attacker, and variance always takes its lowest value.
pub fn fixed_rng() -> BattleRng {
    BattleRng::new_for_test(vec![0])
}

/// Starts an encounter against `group` with the given rng.
pub fn start_battle<'a>(
    project: &'a ProjectData,
    save: &'a mut SaveState,
    encounter: Encounter,
    config: BattleConfig,
    rng: BattleRng,
) -> BattleEngine<'a> {
    assert_ok(BattleEngine::new(project, save, encounter, config)).with_rng(rng)
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

/// Ticks the engine until `done` holds, panicking after `limit` ticks.
pub fn tick_until(engine: &mut BattleEngine<'_>, limit: usize, done: impl Fn(&BattleEngine<'_>) -> bool) {
    for _ in 0..limit {
        if done(engine) {
            return;
        }
        assert_ok(engine.update());
    }
    assert!(done(engine), "condition not reached within {} ticks", limit);
}
