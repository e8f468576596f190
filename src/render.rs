//! Presentation seam. The engine describes a frame through `RenderSurface`
//! and never reads anything back.

use crate::battle::participant::{Animation, AnimationKind, CombatantKind};
use crate::battle::state::BattlePhase;
use std::fmt::Write as _;

/// What a surface needs to draw one combatant.
#[derive(Debug, Clone, Copy)]
pub struct CombatantGauge<'a> {
    pub kind: CombatantKind,
    pub name: &'a str,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub excluded: bool,
    pub animation: Option<Animation>,
}

pub trait RenderSurface {
    fn begin_frame(&mut self, phase: BattlePhase);
    fn draw_combatant(&mut self, gauge: &CombatantGauge<'_>);
    /// `row` counts from the top of the message window.
    fn draw_text_line(&mut self, row: usize, text: &str);
}

/// Renders frames as plain text, one combatant or message per line.
#[derive(Debug, Default, Clone)]
pub struct TextSurface {
    frame: String,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently drawn frame.
    pub fn frame(&self) -> &str {
        &self.frame
    }
}

impl RenderSurface for TextSurface {
    fn begin_frame(&mut self, phase: BattlePhase) {
        self.frame.clear();
        let _ = writeln!(self.frame, "== {:?} ==", phase);
    }

    fn draw_combatant(&mut self, gauge: &CombatantGauge<'_>) {
        let side = match gauge.kind {
            CombatantKind::Player => "P",
            CombatantKind::Enemy => "E",
        };
        let marker = match gauge.animation.map(|a| a.kind) {
            Some(AnimationKind::Damage) => " *",
            Some(AnimationKind::Dead { .. }) => " x",
            None if gauge.excluded => " -",
            None => "",
        };
        let _ = writeln!(
            self.frame,
            "[{}] {} HP {}/{} MP {}/{}{}",
            side, gauge.name, gauge.hp, gauge.max_hp, gauge.mp, gauge.max_mp, marker
        );
    }

    fn draw_text_line(&mut self, row: usize, text: &str) {
        let _ = writeln!(self.frame, "{:>2}| {}", row, text);
    }
}
