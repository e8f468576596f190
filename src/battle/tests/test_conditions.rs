#[cfg(test)]
mod tests {
    use crate::battle::engine::Encounter;
    use crate::battle::menu::PartyCommand;
    use crate::battle::participant::{AttackInfo, AttackType, ParticipantId};
    use crate::battle::state::BattlePhase;
    use crate::battle::tests::common::{
        fixed_rng, quick_config, start_battle, tick_until, TestProjectBuilder, HERO, MAGE,
    };
    use crate::status::ConditionSource;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::fields::condition;
    use schema::Array1D;

    const SLEEP: u32 = 4;
    const CONFUSION: u32 = 5;

    fn builder() -> TestProjectBuilder {
        TestProjectBuilder::new()
            .with_party(&[HERO, MAGE])
            .with_condition(
                SLEEP,
                Array1D::new()
                    .with(condition::NAME, "Sleep")
                    .with(condition::RESTRICTION, 1)
                    .with(condition::HOLD_TURN, 1)
                    .with(condition::AUTO_RELEASE_PROB, 100)
                    .with(condition::MESSAGE_AFFECTED, " is fast asleep."),
            )
            .with_condition(
                CONFUSION,
                Array1D::new()
                    .with(condition::NAME, "Confusion")
                    .with(condition::RESTRICTION, 3),
            )
    }

    #[rstest]
    #[case("sleep keeps the hero still", SLEEP, AttackType::Immobile, None)]
    #[case("confusion turns the hero on the mage", CONFUSION, AttackType::Attack, Some(ParticipantId::player(1)))]
    fn test_restriction_overrides_command(
        #[case] desc: &str,
        #[case] condition_id: u32,
        #[case] expected_type: AttackType,
        #[case] expected_target: Option<ParticipantId>,
    ) {
        // Arrange
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(1), quick_config(), fixed_rng());
        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Menu);
        let effect = project.condition(condition_id).unwrap().effect().unwrap();
        engine.players[0].status.add_bad_condition(effect, ConditionSource::Carried);
        engine
            .menu_mut()
            .set_player_command(0, AttackInfo::untargeted(AttackType::Defence));

        // Act
        engine.menu_mut().decide(PartyCommand::Manual);
        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Animation);

        // Assert
        let info = engine.players()[0].attack_info;
        assert_eq!(info.attack_type, expected_type, "{}", desc);
        assert_eq!(info.target, expected_target, "{}", desc);
    }

    #[test]
    fn test_sleeping_hero_skips_with_message() {
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(1), quick_config(), fixed_rng());
        engine.players[0].attack_info = AttackInfo::new(AttackType::Immobile, None, SLEEP);
        engine.battle_order = vec![ParticipantId::player(0)];
        engine.current_attacker = 0;

        engine.set_animation_message().unwrap();

        assert_eq!(engine.messages().messages(), ["Hero is fast asleep."]);
        assert!(engine.attacked_targets().is_empty());
    }

    #[test]
    fn test_conditions_wear_off_at_turn_start() {
        // Arrange
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(1), quick_config(), fixed_rng());
        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Menu);
        let sleep = project.condition(SLEEP).unwrap().effect().unwrap();
        engine.players[0].status.add_bad_condition(sleep, ConditionSource::Carried);

        // Act: one full turn of guarding.
        engine.menu_mut().decide(PartyCommand::Manual);
        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Animation);
        assert!(engine.players()[0].status.has_bad_condition(SLEEP));
        tick_until(&mut engine, 40, |e| e.phase() == BattlePhase::Menu);

        // Assert
        assert!(!engine.players()[0].status.has_bad_condition(SLEEP));
    }

    #[test]
    fn test_carried_condition_can_wear_off_before_the_first_turn() {
        // Arrange: sleep brought in from the field, already due for release.
        let builder = builder();
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(1), quick_config(), fixed_rng());
        let sleep = project.condition(SLEEP).unwrap().effect().unwrap();
        engine.players[0].status.add_bad_condition(sleep, ConditionSource::Carried);
        assert_eq!(engine.turn_num(), 0);

        // Act
        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Menu);

        // Assert
        assert_eq!(engine.turn_num(), 0);
        assert!(!engine.players()[0].status.has_bad_condition(SLEEP));
    }

    #[test]
    fn test_first_menu_ages_lasting_conditions() {
        let builder = builder().with_condition(
            SLEEP,
            Array1D::new()
                .with(condition::NAME, "Sleep")
                .with(condition::RESTRICTION, 1)
                .with(condition::HOLD_TURN, 2)
                .with(condition::AUTO_RELEASE_PROB, 100),
        );
        let project = builder.build();
        let mut save = builder.save(&project);
        let mut engine = start_battle(&project, &mut save, Encounter::new(1), quick_config(), fixed_rng());
        let sleep = project.condition(SLEEP).unwrap().effect().unwrap();
        engine.players[0].status.add_bad_condition(sleep, ConditionSource::Carried);

        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Menu);
        assert!(engine.players()[0].status.has_bad_condition(SLEEP));
        engine.menu_mut().decide(PartyCommand::Manual);
        tick_until(&mut engine, 5, |e| e.phase() == BattlePhase::Animation);
        tick_until(&mut engine, 40, |e| e.phase() == BattlePhase::Menu);

        assert!(!engine.players()[0].status.has_bad_condition(SLEEP));
    }
}
