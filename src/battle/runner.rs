use crate::battle::engine::BattleEngine;
use crate::battle::menu::PartyCommand;
use crate::battle::state::{BattleOutcome, BattlePhase};
use crate::errors::{BattleEngineError, BattleResult};
use tracing::debug;

/// Drives a `BattleEngine` without a player at the keyboard: answers every
/// menu with a fixed party command, acknowledges every prompt and records
/// each line as it is revealed.
pub struct BattleRunner<'a> {
    engine: BattleEngine<'a>,
    command: PartyCommand,
    transcript: Vec<String>,
    seen_generation: u64,
    seen_lines: usize,
    ticks: u64,
}

/// Result of an automated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleSummary {
    pub outcome: Option<BattleOutcome>,
    pub ticks: u64,
    pub turns: u32,
    pub transcript: Vec<String>,
}

impl<'a> BattleRunner<'a> {
    pub fn new(engine: BattleEngine<'a>) -> Self {
        let mut runner = Self {
            engine,
            command: PartyCommand::Auto,
            transcript: Vec::new(),
            seen_generation: 0,
            seen_lines: 0,
            ticks: 0,
        };
        runner.seen_generation = runner.engine.messages().generation();
        runner.collect_lines();
        runner
    }

    /// The command given at every party menu. `Manual` leaves the
    /// per-member commands to whoever holds `engine_mut()`.
    pub fn with_command(mut self, command: PartyCommand) -> Self {
        self.command = command;
        self
    }

    pub fn engine(&self) -> &BattleEngine<'a> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut BattleEngine<'a> {
        &mut self.engine
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Answers whatever the engine is waiting for, then advances one tick.
    pub fn tick(&mut self) -> BattleResult<()> {
        if self.engine.phase() == BattlePhase::Menu && self.engine.menu().decided().is_none() {
            self.engine.menu_mut().decide(self.command);
        }
        if self.engine.messages().is_click_enabled() {
            self.engine.messages_mut().click();
        }
        self.engine.update()?;
        self.ticks += 1;
        self.collect_lines();
        Ok(())
    }

    /// Ticks until `End`, failing if that takes more than `max_ticks`.
    pub fn run_to_end(mut self, max_ticks: u64) -> BattleResult<BattleSummary> {
        while !self.engine.phase().is_terminal() {
            if self.ticks >= max_ticks {
                return Err(BattleEngineError::TickLimit(max_ticks));
            }
            self.tick()?;
        }
        debug!(ticks = self.ticks, lines = self.transcript.len(), "automated run finished");
        Ok(BattleSummary {
            outcome: self.engine.outcome(),
            ticks: self.ticks,
            turns: self.engine.turn_num(),
            transcript: self.transcript,
        })
    }

    fn collect_lines(&mut self) {
        let messages = self.engine.messages();
        if messages.generation() != self.seen_generation {
            self.seen_generation = messages.generation();
            self.seen_lines = 0;
        }
        let revealed = messages.revealed();
        if revealed.len() > self.seen_lines {
            self.transcript
                .extend(revealed[self.seen_lines..].iter().cloned());
            self.seen_lines = revealed.len();
        }
    }
}
