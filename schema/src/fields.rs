//! Field identifiers for the database tables the battle core reads.
//!
//! Numbering follows the RPG Maker 2000 LDB chunk layout, so a converted
//! database keeps its ids unchanged.

pub mod character {
    pub const NAME: u32 = 0x01;
    pub const TITLE: u32 = 0x02;
    pub const INITIAL_LEVEL: u32 = 0x07;
    pub const FINAL_LEVEL: u32 = 0x08;
    pub const CRITICAL: u32 = 0x09;
    pub const CRITICAL_CHANCE: u32 = 0x0A;
    /// Flat int array, parameter-major: six parameters, one run of per-level
    /// values each. The level count is `len / 6`.
    pub const PARAMETERS: u32 = 0x1F;
    pub const EXP_BASE: u32 = 0x29;
    pub const EXP_INFLATION: u32 = 0x2A;
    pub const EXP_CORRECTION: u32 = 0x2B;
    /// Skill learning table, one row per entry.
    pub const SKILLS: u32 = 0x3F;

    pub mod learning {
        pub const LEVEL: u32 = 0x01;
        pub const SKILL_ID: u32 = 0x02;
    }
}

pub mod skill {
    pub const NAME: u32 = 0x01;
    pub const DESCRIPTION: u32 = 0x02;
    pub const USING_MESSAGE1: u32 = 0x03;
    pub const USING_MESSAGE2: u32 = 0x04;
    pub const FAILURE_MESSAGE: u32 = 0x07;
    pub const KIND: u32 = 0x08;
    pub const MP_COST: u32 = 0x0B;
    pub const SCOPE: u32 = 0x0C;
    pub const ANIMATION: u32 = 0x0E;
    pub const PHYSICAL_RATE: u32 = 0x15;
    pub const MAGICAL_RATE: u32 = 0x16;
    pub const VARIANCE: u32 = 0x17;
    pub const POWER: u32 = 0x18;
    pub const HIT: u32 = 0x19;
    pub const AFFECT_HP: u32 = 0x1F;
    pub const AFFECT_MP: u32 = 0x20;
    pub const AFFECT_ATTACK: u32 = 0x21;
    pub const AFFECT_DEFENSE: u32 = 0x22;
    pub const AFFECT_SPIRIT: u32 = 0x23;
    pub const AFFECT_AGILITY: u32 = 0x24;
    pub const ABSORB: u32 = 0x25;
    pub const IGNORE_DEFENSE: u32 = 0x26;
    /// Int array of condition ids the skill inflicts (or cures).
    pub const CONDITIONS: u32 = 0x2A;
}

pub mod item {
    pub const NAME: u32 = 0x01;
    pub const DESCRIPTION: u32 = 0x02;
    pub const TYPE: u32 = 0x03;
    pub const PRICE: u32 = 0x05;
    pub const USES: u32 = 0x06;
    pub const SCOPE: u32 = 0x1F;
    pub const RECOVER_HP_RATE: u32 = 0x20;
    pub const RECOVER_HP: u32 = 0x21;
    pub const RECOVER_MP_RATE: u32 = 0x22;
    pub const RECOVER_MP: u32 = 0x23;
    pub const ONLY_ON_MAP: u32 = 0x25;
    pub const DEAD_ONLY: u32 = 0x26;
    /// Skill invoked by a special item.
    pub const SKILL_ID: u32 = 0x35;
}

pub mod enemy {
    pub const NAME: u32 = 0x01;
    pub const GRAPHIC: u32 = 0x02;
    pub const MAX_HP: u32 = 0x04;
    pub const MAX_MP: u32 = 0x05;
    pub const ATTACK: u32 = 0x06;
    pub const DEFENSE: u32 = 0x07;
    pub const SPIRIT: u32 = 0x08;
    pub const AGILITY: u32 = 0x09;
    pub const EXP: u32 = 0x0B;
    pub const MONEY: u32 = 0x0C;
    pub const DROP_ID: u32 = 0x0D;
    pub const DROP_PROB: u32 = 0x0E;
    pub const CRITICAL: u32 = 0x15;
    pub const CRITICAL_CHANCE: u32 = 0x16;
    pub const MISS: u32 = 0x1A;
    pub const ACTIONS: u32 = 0x2A;

    pub mod action {
        pub const KIND: u32 = 0x01;
        pub const BASIC: u32 = 0x02;
        pub const SKILL_ID: u32 = 0x03;
        pub const ENEMY_ID: u32 = 0x04;
        pub const CONDITION_TYPE: u32 = 0x05;
        pub const PARAM_A: u32 = 0x06;
        pub const PARAM_B: u32 = 0x07;
        pub const SWITCH_ID: u32 = 0x08;
        pub const RATING: u32 = 0x0D;
    }
}

pub mod enemy_group {
    pub const NAME: u32 = 0x01;
    pub const MEMBERS: u32 = 0x02;

    pub mod member {
        pub const ENEMY_ID: u32 = 0x01;
        pub const X: u32 = 0x02;
        pub const Y: u32 = 0x03;
    }
}

pub mod condition {
    /// Row id of the built-in "dead" condition.
    pub const DEATH: u32 = 1;

    pub const NAME: u32 = 0x01;
    pub const KIND: u32 = 0x02;
    pub const PRIORITY: u32 = 0x04;
    pub const RESTRICTION: u32 = 0x05;
    pub const HOLD_TURN: u32 = 0x10;
    pub const AUTO_RELEASE_PROB: u32 = 0x11;
    pub const AFFECT_TYPE: u32 = 0x1E;
    pub const AFFECT_ATTACK: u32 = 0x1F;
    pub const AFFECT_DEFENSE: u32 = 0x20;
    pub const AFFECT_SPIRIT: u32 = 0x21;
    pub const AFFECT_AGILITY: u32 = 0x22;
    pub const MESSAGE_ACTOR: u32 = 0x33;
    pub const MESSAGE_ENEMY: u32 = 0x34;
    pub const MESSAGE_ALREADY: u32 = 0x35;
    pub const MESSAGE_AFFECTED: u32 = 0x36;
    pub const MESSAGE_RECOVERY: u32 = 0x37;
}

/// Vocabulary string ids used by the battle engine.
pub mod vocabulary {
    pub const ENEMY_APPEARED: u32 = 0x01;
    pub const FIRST_ATTACK: u32 = 0x02;
    pub const ESCAPE_SUCCESS: u32 = 0x03;
    pub const ESCAPE_FAILURE: u32 = 0x04;
    pub const VICTORY: u32 = 0x05;
    pub const DEFEAT: u32 = 0x06;
    pub const EXP_RECEIVED: u32 = 0x07;
    pub const MONEY_RECEIVED_A: u32 = 0x08;
    pub const MONEY_RECEIVED_B: u32 = 0x09;
    pub const ITEM_RECEIVED: u32 = 0x0A;
    pub const ATTACKING: u32 = 0x0B;
    pub const ACTOR_CRITICAL: u32 = 0x0C;
    pub const ENEMY_CRITICAL: u32 = 0x0D;
    pub const DEFENDING: u32 = 0x0E;
    pub const OBSERVING: u32 = 0x0F;
    pub const CHARGING: u32 = 0x10;
    pub const AUTODESTRUCTION: u32 = 0x11;
    pub const ENEMY_ESCAPED: u32 = 0x12;
    pub const ENEMY_TRANSFORMED: u32 = 0x13;
    pub const ENEMY_DAMAGED: u32 = 0x14;
    pub const ENEMY_UNDAMAGED: u32 = 0x15;
    pub const ACTOR_DAMAGED: u32 = 0x16;
    pub const ACTOR_UNDAMAGED: u32 = 0x17;
    /// First of four skill failure messages; a skill's failure message field
    /// is an offset from here.
    pub const SKILL_FAILURE_BASE: u32 = 0x18;
    pub const DODGE: u32 = 0x1B;
    pub const USE_ITEM: u32 = 0x1C;
    pub const HP_RECOVERED: u32 = 0x1D;
    pub const PARAMETER_INCREASE: u32 = 0x1E;
    pub const PARAMETER_DECREASE: u32 = 0x1F;
    pub const LEVEL_UP: u32 = 0x24;
    pub const SKILL_LEARNED: u32 = 0x25;
    pub const GOLD: u32 = 0x5F;
    pub const LEVEL: u32 = 0x7B;
    pub const HEALTH_POINTS: u32 = 0x7C;
    pub const SPIRIT_POINTS: u32 = 0x7D;
    /// Attack, defense, spirit and agility labels follow in order.
    pub const PARAM_LABEL_BASE: u32 = 0x84;
}
