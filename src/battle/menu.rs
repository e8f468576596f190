use crate::battle::participant::AttackInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level party command.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyCommand {
    /// Per-member commands were entered through `set_player_command`.
    Manual,
    /// Every member picks its own action.
    Auto,
    Escape,
}

/// The party command menu as the engine sees it: a polled decision plus
/// whatever per-member commands the player entered.
#[derive(Debug, Clone, Default)]
pub struct BattleMenu {
    decision: Option<PartyCommand>,
    frozen: bool,
    player_commands: BTreeMap<usize, AttackInfo>,
}

impl BattleMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input side. Ignored while frozen.
    pub fn decide(&mut self, command: PartyCommand) -> bool {
        if self.frozen {
            return false;
        }
        self.decision = Some(command);
        true
    }

    pub fn decided(&self) -> Option<PartyCommand> {
        self.decision
    }

    pub fn take_decision(&mut self) -> Option<PartyCommand> {
        self.decision.take()
    }

    pub fn set_player_command(&mut self, player_index: usize, info: AttackInfo) {
        self.player_commands.insert(player_index, info);
    }

    pub fn player_command(&self, player_index: usize) -> Option<AttackInfo> {
        self.player_commands.get(&player_index).copied()
    }

    /// Clears the decision and the entered commands for a new turn.
    pub fn reset(&mut self) {
        self.decision = None;
        self.player_commands.clear();
    }

    pub fn freeze(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::participant::AttackType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frozen_menu_ignores_input() {
        let mut menu = BattleMenu::new();
        menu.freeze(true);

        assert!(!menu.decide(PartyCommand::Auto));
        assert_eq!(menu.decided(), None);

        menu.freeze(false);
        assert!(menu.decide(PartyCommand::Auto));
        assert_eq!(menu.take_decision(), Some(PartyCommand::Auto));
        assert_eq!(menu.decided(), None);
    }

    #[test]
    fn test_reset_drops_commands() {
        let mut menu = BattleMenu::new();
        menu.set_player_command(0, AttackInfo::untargeted(AttackType::Defence));
        menu.decide(PartyCommand::Manual);

        menu.reset();

        assert_eq!(menu.player_command(0), None);
        assert_eq!(menu.decided(), None);
    }
}
