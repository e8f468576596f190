use crate::battle::engine::BattleEngine;
use crate::errors::{BattleResult, DataResult};
use schema::fields::vocabulary;
use tracing::info;

/// What the defeated enemies hand over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewards {
    pub exp: i32,
    pub money: i32,
    pub items: Vec<u32>,
}

impl<'a> BattleEngine<'a> {
    /// Sums exp, money and drops over the dead enemies. Each drop is rolled
    /// against its probability.
    pub(super) fn collect_rewards(&mut self) -> DataResult<Rewards> {
        let mut rewards = Rewards::default();
        for index in 0..self.enemies.len() {
            if !self.enemies[index].status.is_dead() {
                continue;
            }
            let enemy = self.project.enemy(self.enemies[index].data_id)?;
            rewards.exp += enemy.exp()?;
            rewards.money += enemy.money()?;
            if let Some((item_id, probability)) = enemy.drop()? {
                if self.rng.percent("item drop") < probability {
                    rewards.items.push(item_id);
                }
            }
        }
        Ok(rewards)
    }

    /// Builds the victory text, pays the party and levels it up.
    pub(super) fn set_result_message(&mut self) -> BattleResult<()> {
        let project = self.project;
        let rewards = self.collect_rewards()?;
        info!(exp = rewards.exp, money = rewards.money, items = ?rewards.items, "victory rewards");

        self.messages.clear_messages();
        self.messages.add_message(project.vocabulary(vocabulary::VICTORY)?);
        self.messages.add_message(format!(
            "{}{}",
            rewards.exp,
            project.vocabulary(vocabulary::EXP_RECEIVED)?
        ));
        self.messages.add_message(format!(
            "{}{}{}{}",
            project.vocabulary(vocabulary::MONEY_RECEIVED_A)?,
            rewards.money,
            project.vocabulary(vocabulary::GOLD)?,
            project.vocabulary(vocabulary::MONEY_RECEIVED_B)?
        ));
        for &item_id in &rewards.items {
            self.messages.add_message(format!(
                "{}{}",
                project.item(item_id)?.name()?,
                project.vocabulary(vocabulary::ITEM_RECEIVED)?
            ));
        }

        for player in &mut self.players {
            if player.is_excluded() {
                continue;
            }
            let old_level = player.status.add_exp(project, player.data_id, rewards.exp)?;
            let new_level = player.status.level();
            if new_level <= old_level {
                continue;
            }
            info!(name = %player.name, old_level, new_level, "level up");
            self.messages.add_message(format!(
                "{}は{}{}{}",
                player.name,
                project.vocabulary(vocabulary::LEVEL)?,
                new_level,
                project.vocabulary(vocabulary::LEVEL_UP)?
            ));
            for (level, skill_id) in project.character(player.data_id)?.learned_skills()? {
                if level > old_level && level <= new_level {
                    self.messages.add_message(format!(
                        "{}{}",
                        project.skill(skill_id)?.name()?,
                        project.vocabulary(vocabulary::SKILL_LEARNED)?
                    ));
                }
            }
        }

        self.save.add_money(rewards.money);
        for item_id in rewards.items {
            self.save.inventory_mut().add_item(item_id, 1);
        }
        Ok(())
    }
}
