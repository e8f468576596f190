use crate::battle::ai::{ActionStrategy, BattleView, RatingStrategy};
use crate::battle::calculators::AttackResult;
use crate::battle::menu::{BattleMenu, PartyCommand};
use crate::battle::messages::MessageSequencer;
use crate::battle::participant::{
    AttackInfo, AttackType, BattleParticipant, CombatantKind, ParticipantId,
};
use crate::battle::state::{BattleOutcome, BattlePhase, BattleRng};
use crate::config::BattleConfig;
use crate::errors::{BattleEngineError, BattleResult};
use crate::project::ProjectData;
use crate::render::{CombatantGauge, RenderSurface};
use crate::save::SaveState;
use ordered_float::OrderedFloat;
use schema::fields::vocabulary;
use schema::{Param, Restriction};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Attack priority jitter is drawn from `[0, PRIORITY_JITTER)`.
const PRIORITY_JITTER: f64 = 0.1;

/// What the battle is fought against and how it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encounter {
    pub enemy_group: u32,
    /// The party strikes first; enemies sit out the opening turn.
    pub first_attack: bool,
    pub enable_escape: bool,
}

impl Encounter {
    pub fn new(enemy_group: u32) -> Self {
        Self {
            enemy_group,
            first_attack: false,
            enable_escape: true,
        }
    }
}

/// Picks a participant out of the two sides without borrowing the whole engine.
pub(super) fn lookup<'p>(
    players: &'p [BattleParticipant],
    enemies: &'p [BattleParticipant],
    id: ParticipantId,
) -> &'p BattleParticipant {
    match id.kind {
        CombatantKind::Player => &players[id.index],
        CombatantKind::Enemy => &enemies[id.index],
    }
}

/// Runs one encounter from the opening message to the write-back of the
/// party's statuses. Drive it with `update()` once per tick.
pub struct BattleEngine<'a> {
    pub(super) project: &'a ProjectData,
    pub(super) save: &'a mut SaveState,
    pub(super) config: BattleConfig,
    pub(super) strategy: Box<dyn ActionStrategy>,
    pub(super) rng: BattleRng,
    pub(super) players: Vec<BattleParticipant>,
    pub(super) enemies: Vec<BattleParticipant>,
    pub(super) menu: BattleMenu,
    pub(super) messages: MessageSequencer,
    pub(super) phase: BattlePhase,
    pub(super) state_counter: u32,
    pub(super) first_attack: bool,
    pub(super) enable_escape: bool,
    pub(super) escape_success: bool,
    pub(super) escape_num: u32,
    pub(super) turn_num: u32,
    pub(super) outcome: Option<BattleOutcome>,
    pub(super) battle_order: Vec<ParticipantId>,
    pub(super) current_attacker: usize,
    pub(super) attack_results: Vec<AttackResult>,
    pub(super) attacked_targets: Vec<ParticipantId>,
    pub(super) animation_target_index: Option<usize>,
    pub(super) skill_anime_ticks: u32,
}

impl<'a> BattleEngine<'a> {
    /// Sets up the encounter and enters `Start`. Fails fast if the party or
    /// the enemy group cannot be built from the project data.
    pub fn new(
        project: &'a ProjectData,
        save: &'a mut SaveState,
        encounter: Encounter,
        config: BattleConfig,
    ) -> BattleResult<Self> {
        let party = save.party().to_vec();
        if party.is_empty() {
            return Err(BattleEngineError::EmptyParty);
        }
        let mut players = Vec::with_capacity(party.len());
        for char_id in party {
            let status = save.status(char_id)?.clone();
            players.push(BattleParticipant::for_player(project, char_id, status)?);
        }

        let members = project.enemy_group(encounter.enemy_group)?.members()?;
        if members.is_empty() {
            return Err(BattleEngineError::EmptyEncounter(encounter.enemy_group));
        }
        let mut enemies = Vec::with_capacity(members.len());
        for member in members {
            enemies.push(BattleParticipant::for_enemy(project, member.enemy_id, (member.x, member.y))?);
        }

        let rng = config.seed.map(BattleRng::seeded).unwrap_or_else(BattleRng::from_os);
        let mut engine = Self {
            project,
            save,
            config,
            strategy: Box::new(RatingStrategy::new()),
            rng,
            players,
            enemies,
            menu: BattleMenu::new(),
            messages: MessageSequencer::new(),
            phase: BattlePhase::Start,
            state_counter: 0,
            first_attack: encounter.first_attack,
            enable_escape: encounter.enable_escape,
            escape_success: false,
            escape_num: 0,
            turn_num: 0,
            outcome: None,
            battle_order: Vec::new(),
            current_attacker: 0,
            attack_results: Vec::new(),
            attacked_targets: Vec::new(),
            animation_target_index: None,
            skill_anime_ticks: 0,
        };
        info!(
            enemy_group = encounter.enemy_group,
            players = engine.players.len(),
            enemies = engine.enemies.len(),
            "battle start"
        );
        engine.set_state(BattlePhase::Start)?;
        Ok(engine)
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ActionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_rng(mut self, rng: BattleRng) -> Self {
        self.rng = rng;
        self
    }

    // --- Queries ---

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn turn_num(&self) -> u32 {
        self.turn_num
    }

    pub fn escape_num(&self) -> u32 {
        self.escape_num
    }

    pub fn state_counter(&self) -> u32 {
        self.state_counter
    }

    pub fn players(&self) -> &[BattleParticipant] {
        &self.players
    }

    pub fn enemies(&self) -> &[BattleParticipant] {
        &self.enemies
    }

    pub fn participant(&self, id: ParticipantId) -> &BattleParticipant {
        lookup(&self.players, &self.enemies, id)
    }

    pub(super) fn participant_mut(&mut self, id: ParticipantId) -> &mut BattleParticipant {
        match id.kind {
            CombatantKind::Player => &mut self.players[id.index],
            CombatantKind::Enemy => &mut self.enemies[id.index],
        }
    }

    pub fn battle_order(&self) -> &[ParticipantId] {
        &self.battle_order
    }

    pub fn messages(&self) -> &MessageSequencer {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageSequencer {
        &mut self.messages
    }

    pub fn menu(&self) -> &BattleMenu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut BattleMenu {
        &mut self.menu
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn save(&self) -> &SaveState {
        &*self.save
    }

    /// Every enemy is out of the fight.
    pub fn is_win(&self) -> bool {
        self.enemies.iter().all(|e| e.is_excluded())
    }

    /// Every party member is out of the fight.
    pub fn is_lose(&self) -> bool {
        self.players.iter().all(|p| p.is_excluded())
    }

    // --- Tick ---

    pub fn update(&mut self) -> BattleResult<()> {
        for participant in self.players.iter_mut().chain(self.enemies.iter_mut()) {
            participant.tick_animation();
        }
        self.skill_anime_ticks = self.skill_anime_ticks.saturating_sub(1);

        match self.phase {
            BattlePhase::Start => {
                self.state_counter += 1;
                if self.state_counter > self.config.start_ticks {
                    let next = if self.first_attack {
                        BattlePhase::FirstAttack
                    } else {
                        BattlePhase::Menu
                    };
                    self.set_state(next)?;
                }
            }
            BattlePhase::FirstAttack => {
                self.state_counter += 1;
                if self.state_counter > self.config.first_attack_ticks {
                    self.set_state(BattlePhase::Menu)?;
                }
            }
            BattlePhase::Menu => {
                if let Some(command) = self.menu.take_decision() {
                    self.turn_num += 1;
                    debug!(?command, turn = self.turn_num, "party command");
                    match command {
                        PartyCommand::Manual => {
                            for index in 0..self.players.len() {
                                let info = self.menu.player_command(index).unwrap_or_default();
                                self.players[index].attack_info = info;
                            }
                            self.set_state(BattlePhase::Animation)?;
                        }
                        PartyCommand::Auto => {
                            for index in 0..self.players.len() {
                                self.set_attack_info_auto(ParticipantId::player(index))?;
                            }
                            self.set_state(BattlePhase::Animation)?;
                        }
                        PartyCommand::Escape => self.set_state(BattlePhase::Escape)?,
                    }
                }
            }
            BattlePhase::Escape => {
                self.state_counter += 1;
                if self.state_counter > self.config.escape_ticks {
                    if self.escape_success {
                        self.outcome = Some(BattleOutcome::Escaped);
                        self.set_state(BattlePhase::End)?;
                    } else {
                        for player in &mut self.players {
                            player.attack_info = AttackInfo::default();
                        }
                        self.set_state(BattlePhase::Animation)?;
                    }
                }
            }
            BattlePhase::Animation => self.update_animation()?,
            BattlePhase::Lose => {
                self.state_counter += 1;
                if self.messages.clicked() {
                    self.set_state(BattlePhase::End)?;
                }
            }
            BattlePhase::Result => {
                self.state_counter += 1;
                if self.state_counter > self.config.result_line_interval {
                    if self.messages.reveal_next() {
                        self.state_counter = 0;
                    } else {
                        self.messages.set_enable_click(true);
                        if self.messages.clicked() {
                            self.set_state(BattlePhase::End)?;
                        }
                    }
                }
            }
            BattlePhase::End => {}
        }
        Ok(())
    }

    /// Draws the current frame. Never mutates the battle.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        surface.begin_frame(self.phase);
        for participant in self.players.iter().chain(self.enemies.iter()) {
            if participant.kind == CombatantKind::Enemy && participant.is_excluded() {
                continue;
            }
            surface.draw_combatant(&CombatantGauge {
                kind: participant.kind,
                name: &participant.name,
                hp: participant.status.hp(),
                max_hp: participant.status.max_hp(),
                mp: participant.status.mp(),
                max_mp: participant.status.max_mp(),
                excluded: participant.is_excluded(),
                animation: participant.animation(),
            });
        }
        for (row, line) in self.messages.revealed().iter().enumerate() {
            surface.draw_text_line(row, line);
        }
    }

    // --- Phase entry ---

    pub(super) fn set_state(&mut self, phase: BattlePhase) -> BattleResult<()> {
        debug!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
        self.state_counter = 0;
        self.menu.freeze(phase != BattlePhase::Menu);
        self.messages.freeze(phase == BattlePhase::Menu);

        match phase {
            BattlePhase::Start => {
                self.messages.reset();
                let appeared = self.project.vocabulary(vocabulary::ENEMY_APPEARED)?;
                for enemy in &self.enemies {
                    self.messages.add_message(format!("{}{}", enemy.name, appeared));
                }
                self.messages.show_all();
            }
            BattlePhase::FirstAttack => {
                self.messages.reset();
                self.messages
                    .add_message(self.project.vocabulary(vocabulary::FIRST_ATTACK)?);
                self.messages.show_all();
            }
            BattlePhase::Menu => {
                self.refresh_bad_conditions();
                for participant in self.players.iter_mut().chain(self.enemies.iter_mut()) {
                    participant.attack_info = AttackInfo::default();
                }
                self.menu.reset();
                self.messages.reset();
            }
            BattlePhase::Escape => {
                self.messages.reset();
                self.escape_success = self.roll_escape();
                let text = if self.escape_success {
                    vocabulary::ESCAPE_SUCCESS
                } else {
                    vocabulary::ESCAPE_FAILURE
                };
                self.messages.add_message(self.project.vocabulary(text)?);
                self.messages.show_all();
                self.escape_num += 1;
                self.first_attack = false;
            }
            BattlePhase::Animation => self.enter_animation()?,
            BattlePhase::Lose => {
                for player in &mut self.players {
                    player.set_excluded(true);
                }
                self.outcome = Some(BattleOutcome::Defeat);
                self.messages.reset();
                self.messages.set_enable_click(true);
                self.messages
                    .add_message(self.project.vocabulary(vocabulary::DEFEAT)?);
                self.messages.show_all();
            }
            BattlePhase::Result => {
                for enemy in &mut self.enemies {
                    enemy.set_excluded(true);
                }
                self.outcome = Some(BattleOutcome::Victory);
                self.messages.reset();
                self.set_result_message()?;
                self.messages.set_line_limit(1);
            }
            BattlePhase::End => self.write_back()?,
        }
        Ok(())
    }

    fn refresh_bad_conditions(&mut self) {
        for participant in self.players.iter_mut().chain(self.enemies.iter_mut()) {
            if participant.is_excluded() || participant.status.is_dead() {
                continue;
            }
            let released = participant
                .status
                .advance_conditions(|| self.rng.percent("condition release"));
            if !released.is_empty() {
                debug!(name = %participant.name, ?released, "conditions released");
            }
        }
    }

    /// Success chance from average agilities plus 10% per earlier attempt.
    /// Both averages cover the whole side, fallen and fled members included.
    fn roll_escape(&mut self) -> bool {
        let average = |side: &[BattleParticipant]| {
            if side.is_empty() {
                return 0.0;
            }
            let total: i32 = side.iter().map(|p| p.status.param(Param::Agility)).sum();
            total as f64 / side.len() as f64
        };
        let players_speed = average(&self.players).max(1.0);
        let enemies_speed = average(&self.enemies);
        let ratio = (((1.5 - enemies_speed / players_speed) * 100.0).round() as i32
            + self.escape_num as i32 * 10)
            .clamp(0, 100);
        let roll = self.rng.percent("escape");
        let mut success = roll < ratio;
        if self.config.always_escape || self.first_attack {
            success = true;
        }
        if !self.enable_escape {
            success = false;
        }
        debug!(ratio, roll, success, attempt = self.escape_num, "escape roll");
        success
    }

    pub(super) fn set_attack_info_auto(&mut self, actor: ParticipantId) -> BattleResult<()> {
        let view = BattleView {
            project: self.project,
            save: &*self.save,
            players: &self.players,
            enemies: &self.enemies,
            turn_num: self.turn_num,
        };
        let info = self.strategy.choose_action(&view, actor, &mut self.rng)?;
        self.participant_mut(actor).attack_info = info;
        Ok(())
    }

    /// A restricting condition overrides whatever was chosen.
    fn apply_restriction(&mut self, actor: ParticipantId) {
        let Some((restriction, condition_id)) = self
            .participant(actor)
            .status
            .restricting_condition()
            .map(|c| (c.effect.restriction, c.condition_id()))
        else {
            return;
        };
        let side = match restriction {
            Restriction::None => return,
            Restriction::NoAction => {
                self.participant_mut(actor).attack_info =
                    AttackInfo::new(AttackType::Immobile, None, condition_id);
                return;
            }
            Restriction::AttackEnemy => actor.kind.opponent(),
            Restriction::AttackAlly => actor.kind,
        };
        let pool: Vec<ParticipantId> = self
            .side(side)
            .iter()
            .enumerate()
            .map(|(index, _)| ParticipantId { kind: side, index })
            .filter(|id| *id != actor && self.participant(*id).is_active())
            .collect();
        let info = if pool.is_empty() {
            AttackInfo::new(AttackType::Immobile, None, condition_id)
        } else {
            let target = pool[self.rng.pick(pool.len(), "restricted target")];
            AttackInfo::new(AttackType::Attack, Some(target), 0)
        };
        self.participant_mut(actor).attack_info = info;
    }

    pub(super) fn side(&self, kind: CombatantKind) -> &[BattleParticipant] {
        match kind {
            CombatantKind::Player => &self.players,
            CombatantKind::Enemy => &self.enemies,
        }
    }

    fn enter_animation(&mut self) -> BattleResult<()> {
        self.messages.reset();
        for index in 0..self.players.len() {
            let id = ParticipantId::player(index);
            if !self.players[index].is_active() {
                self.players[index].attack_info = AttackInfo::default();
            } else if self.players[index].attack_info.attack_type != AttackType::None {
                // A failed escape leaves the party with nothing to override.
                self.apply_restriction(id);
            }
        }
        if !self.first_attack {
            for index in 0..self.enemies.len() {
                let id = ParticipantId::enemy(index);
                if self.enemies[index].is_active() {
                    self.set_attack_info_auto(id)?;
                    self.apply_restriction(id);
                } else {
                    self.enemies[index].attack_info = AttackInfo::default();
                }
            }
        }
        self.calc_battle_order();
        self.first_attack = false;

        if self.battle_order.is_empty() {
            return self.finish_turn();
        }
        self.set_animation_message()
    }

    /// Orders every acting participant by agility plus a small random offset,
    /// fastest first. Ties keep party-then-enemy order.
    pub(super) fn calc_battle_order(&mut self) {
        self.current_attacker = 0;
        self.battle_order.clear();
        let sides = [
            (CombatantKind::Player, true),
            (CombatantKind::Enemy, !self.first_attack),
        ];
        for (kind, included) in sides {
            if !included {
                continue;
            }
            let side = match kind {
                CombatantKind::Player => &self.players,
                CombatantKind::Enemy => &self.enemies,
            };
            for (index, participant) in side.iter().enumerate() {
                if participant.attack_info.attack_type != AttackType::None && !participant.is_excluded() {
                    self.battle_order.push(ParticipantId { kind, index });
                }
            }
        }
        for id in self.battle_order.clone() {
            let jitter = self.rng.unit("attack priority") * PRIORITY_JITTER;
            let participant = self.participant_mut(id);
            participant.attack_priority = OrderedFloat(participant.base_priority() + jitter);
        }
        let (players, enemies) = (&self.players, &self.enemies);
        self.battle_order
            .sort_by_key(|id| Reverse(lookup(players, enemies, *id).attack_priority));
        debug!(order = ?self.battle_order, "battle order");
    }

    fn update_animation(&mut self) -> BattleResult<()> {
        if self.battle_order.is_empty() {
            return self.finish_turn();
        }
        match self.animation_target_index {
            None => {
                let attacker = self.battle_order[self.current_attacker];
                if self.skill_anime_ticks > 0 || self.participant(attacker).is_animated() {
                    return Ok(());
                }
                self.animation_target_index = Some(0);
                if let Some(&first) = self.attacked_targets.first() {
                    let ticks = self.config.damage_anime_ticks;
                    self.participant_mut(first).play_damage_anime(ticks);
                }
                self.messages.reveal_next();
            }
            Some(index) if index < self.attacked_targets.len() => {
                let target = self.attacked_targets[index];
                if self.participant(target).is_animated() {
                    return Ok(());
                }
                let dead_ticks = self.config.dead_anime_ticks;
                let participant = self.participant_mut(target);
                if participant.status.is_dead() && !participant.is_excluded() {
                    participant.play_dead_anime(dead_ticks, true);
                } else {
                    self.animation_target_index = Some(index + 1);
                    if let Some(&next) = self.attacked_targets.get(index + 1) {
                        let ticks = self.config.damage_anime_ticks;
                        self.participant_mut(next).play_damage_anime(ticks);
                    }
                }
                self.messages.reveal_next();
            }
            Some(_) => {
                if self.messages.reveal_next() {
                    return Ok(());
                }
                let animating = self
                    .players
                    .iter()
                    .chain(self.enemies.iter())
                    .any(|p| p.is_animated());
                if animating || self.skill_anime_ticks > 0 {
                    return Ok(());
                }
                self.finish_attacker()?;
            }
        }
        Ok(())
    }

    /// Called once the current attacker's animation is over.
    fn finish_attacker(&mut self) -> BattleResult<()> {
        if self.is_lose() {
            return self.set_state(BattlePhase::Lose);
        }
        if self.is_win() {
            return self.set_state(BattlePhase::Result);
        }
        let next = (self.current_attacker + 1..self.battle_order.len()).find(|&slot| {
            let participant = self.participant(self.battle_order[slot]);
            !participant.is_excluded() && !participant.status.is_dead()
        });
        match next {
            Some(slot) => {
                self.current_attacker = slot;
                self.state_counter = 0;
                self.messages.reset();
                self.set_animation_message()
            }
            None => self.set_state(BattlePhase::Menu),
        }
    }

    fn finish_turn(&mut self) -> BattleResult<()> {
        if self.is_lose() {
            self.set_state(BattlePhase::Lose)
        } else if self.is_win() {
            self.set_state(BattlePhase::Result)
        } else {
            self.set_state(BattlePhase::Menu)
        }
    }

    /// Copies every party member's status back into the save and clears the
    /// battle-only parts.
    fn write_back(&mut self) -> BattleResult<()> {
        for player in &self.players {
            let mut status = player.status.clone();
            status.reset_battle();
            self.save.set_status(player.data_id, status);
        }
        self.messages.freeze(false);
        info!(outcome = ?self.outcome, turns = self.turn_num, "battle end");
        Ok(())
    }
}
