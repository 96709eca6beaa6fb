use duel_engine::core::abilities::Ability;
use duel_engine::core::errors::Violation;
use duel_engine::core::factory::build_combatant;
use duel_engine::core::state::StatRecord;
use duel_engine::data::settings::GameSettings;

fn settings() -> GameSettings {
    GameSettings::default()
}

#[test]
fn test_build_wraps_abilities_and_describes_in_dispatch_order() {
    let combatant = build_combatant(
        StatRecord::new("Arthur", 10, 10, 10),
        &["Fireball", "Stealth"],
        &settings(),
    )
    .expect("valid combatant");

    assert_eq!(combatant.name(), "Arthur");
    assert_eq!(combatant.stack().depth(), 2);
    assert_eq!(
        combatant.description(),
        "Arthur (STR=10, AGI=10, INT=10) [Stealth, Fireball]"
    );
    assert_eq!(combatant.power_level(), 70);
}

#[test]
fn test_bare_combatant_has_no_ability_suffix() {
    let combatant = build_combatant(StatRecord::new("Bare", 8, 6, 8), &[] as &[&str], &settings())
        .expect("valid combatant");
    assert_eq!(combatant.description(), "Bare (STR=8, AGI=6, INT=8)");
    assert_eq!(combatant.power_level(), 8 * 2 + 6 * 2 + 8 * 3);
    assert!(combatant.abilities().is_empty());
}

#[test]
fn test_all_violations_are_collected() {
    let err = build_combatant(
        StatRecord::new("", -1, 20, 20),
        &["Fireball", "Stealth", "Heal", "Teleport"],
        &settings(),
    )
    .expect_err("invalid combatant");

    assert_eq!(err.len(), 5);
    assert!(err.contains(&Violation::EmptyName));
    assert!(err.contains(&Violation::NegativeStat {
        stat: "Strength",
        value: -1
    }));
    assert!(err.contains(&Violation::StatSumExceeded { total: 39, max: 30 }));
    assert!(err.contains(&Violation::TooManyAbilities { count: 4, max: 2 }));
    assert!(err.contains(&Violation::UnknownAbility("Teleport".to_string())));

    let message = err.to_string();
    assert!(message.starts_with("Multiple validation errors (5):\n  1. Name cannot be empty"));
}

#[test]
fn test_single_violation_message() {
    let long_name = "x".repeat(51);
    let err = build_combatant(StatRecord::new(long_name, 1, 1, 1), &[] as &[&str], &settings())
        .expect_err("name too long");
    assert_eq!(err.violations, vec![Violation::NameTooLong { len: 51, max: 50 }]);
    assert_eq!(err.to_string(), "Name too long (51 characters, max 50)");
}

#[test]
fn test_stat_budget_boundary() {
    assert!(build_combatant(StatRecord::new("Edge", 10, 10, 10), &[] as &[&str], &settings()).is_ok());

    let err = build_combatant(StatRecord::new("Over", 11, 10, 10), &[] as &[&str], &settings())
        .expect_err("over budget");
    assert_eq!(err.to_string(), "Total stats 31 exceeds maximum 30");
}

#[test]
fn test_whitespace_name_is_empty() {
    let err = build_combatant(StatRecord::new("   ", 1, 1, 1), &[] as &[&str], &settings())
        .expect_err("blank name");
    assert_eq!(err.violations, vec![Violation::EmptyName]);
}

#[test]
fn test_settings_raise_ability_limit() {
    let mut settings = settings();
    settings.max_abilities = 3;
    let combatant = build_combatant(
        StatRecord::new("Tri", 5, 5, 5),
        &["Heal", "Telepathy", "Surcharge"],
        &settings,
    )
    .expect("three abilities allowed");
    assert_eq!(combatant.abilities().len(), 3);
    assert_eq!(combatant.power_level(), 10 + 10 + 15 + 4);
}

#[test]
fn test_ability_names_are_case_and_alias_tolerant() {
    assert_eq!(Ability::from_name("boule de feu"), Some(Ability::fireball()));
    assert_eq!(Ability::from_name("Soin"), Some(Ability::heal()));
    assert_eq!(Ability::from_name("fire-resistance"), Some(Ability::FireResistance));
    assert_eq!(Ability::from_name("TELEPATHY"), Some(Ability::Telepathy));
    assert_eq!(Ability::from_name("teleport"), None);
}

#[test]
fn test_stat_sum_does_not_wrap() {
    let err = build_combatant(StatRecord::new("Big", i32::MAX, 1, 0), &[] as &[&str], &settings())
        .expect_err("over budget");
    assert_eq!(
        err.violations,
        vec![Violation::StatSumExceeded {
            total: i64::from(i32::MAX) + 1,
            max: 30
        }]
    );

    let err = build_combatant(
        StatRecord::new("Bigger", i32::MAX, i32::MAX, i32::MAX),
        &[] as &[&str],
        &settings(),
    )
    .expect_err("over budget");
    assert!(err.contains(&Violation::StatSumExceeded {
        total: 3 * i64::from(i32::MAX),
        max: 30
    }));
}
