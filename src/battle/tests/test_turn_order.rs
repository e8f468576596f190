#[cfg(test)]
mod tests {
    use crate::battle::engine::Encounter;
    use crate::battle::participant::{AttackInfo, AttackType, ParticipantId};
    use crate::battle::state::BattleRng;
    use crate::battle::tests::common::{enemy_row, quick_config, start_battle, TestProjectBuilder, HERO, MAGE, SLIME};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const FAST_SLIME: u32 = 2;

    fn builder() -> TestProjectBuilder {
        TestProjectBuilder::new()
            .with_enemy(FAST_SLIME, enemy_row("Swift Slime", [20, 0, 10, 4, 5, 30]))
            .with_enemy_group(2, &[SLIME, FAST_SLIME])
            .with_party(&[HERO, MAGE])
    }

    #[rstest]
    #[case(
        "jitter breaks the slime and mage tie",
        // Draws in party-then-enemy order: hero, mage, slime, swift slime.
        vec![0, 0, 5000, 0],
        vec![ParticipantId::enemy(1), ParticipantId::player(0), ParticipantId::enemy(0), ParticipantId::player(1)]
    )]
    #[case(
        "equal jitter keeps party first on ties",
        vec![0],
        vec![ParticipantId::enemy(1), ParticipantId::player(0), ParticipantId::player(1), ParticipantId::enemy(0)]
    )]
    fn test_order_is_descending_priority(
        #[case] desc: &str,
        #[case] rolls: Vec<u32>,
        #[case] expected: Vec<ParticipantId>,
    ) {
        // Arrange
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(
            &project,
            &mut save,
            Encounter::new(2),
            quick_config(),
            BattleRng::new_for_test(rolls),
        );
        for participant in engine.players.iter_mut().chain(engine.enemies.iter_mut()) {
            participant.attack_info = AttackInfo::untargeted(AttackType::Defence);
        }

        // Act
        engine.calc_battle_order();

        // Assert
        assert_eq!(engine.battle_order(), expected.as_slice(), "{}", desc);
        let priorities: Vec<f64> = engine
            .battle_order()
            .iter()
            .map(|id| engine.participant(*id).attack_priority.into_inner())
            .collect();
        assert!(
            priorities.windows(2).all(|pair| pair[0] >= pair[1]),
            "{}: priorities not descending: {:?}",
            desc,
            priorities
        );
    }

    #[test]
    fn test_idle_and_excluded_units_are_left_out() {
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(2), quick_config(), BattleRng::new_for_test(vec![0]));
        engine.players[0].attack_info = AttackInfo::untargeted(AttackType::Defence);
        engine.players[1].attack_info = AttackInfo::default();
        engine.enemies[0].attack_info = AttackInfo::untargeted(AttackType::Defence);
        engine.enemies[1].attack_info = AttackInfo::untargeted(AttackType::Defence);
        engine.enemies[1].set_excluded(true);

        engine.calc_battle_order();

        assert_eq!(
            engine.battle_order(),
            [ParticipantId::player(0), ParticipantId::enemy(0)]
        );
    }

    #[test]
    fn test_surprise_turn_leaves_enemies_out() {
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let encounter = Encounter {
            first_attack: true,
            ..Encounter::new(2)
        };
        let mut engine = start_battle(&project, &mut save, encounter, quick_config(), BattleRng::new_for_test(vec![0]));
        for participant in engine.players.iter_mut().chain(engine.enemies.iter_mut()) {
            participant.attack_info = AttackInfo::untargeted(AttackType::Defence);
        }

        engine.calc_battle_order();

        assert_eq!(
            engine.battle_order(),
            [ParticipantId::player(0), ParticipantId::player(1)]
        );
    }

    #[test]
    fn test_priorities_recomputed_every_turn() {
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(2), quick_config(), BattleRng::new_for_test(vec![9999]));
        for participant in engine.players.iter_mut().chain(engine.enemies.iter_mut()) {
            participant.attack_info = AttackInfo::untargeted(AttackType::Defence);
        }

        engine.calc_battle_order();
        engine.calc_battle_order();

        // 20 agility plus at most one jitter, never two stacked.
        let hero = engine.participant(ParticipantId::player(0)).attack_priority.into_inner();
        assert!(hero >= 20.0 && hero < 20.1, "hero priority was {}", hero);
    }
}
