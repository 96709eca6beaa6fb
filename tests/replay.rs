use duel_engine::ai::simple::run_auto_battle;
use duel_engine::core::battle::BattleEngine;
use duel_engine::core::errors::{EditError, ReplayError};
use duel_engine::core::factory::build_combatant;
use duel_engine::core::history::BattleHistory;
use duel_engine::core::log::{ActionOrigin, ActionOutcome, ActionType, BattleAction};
use duel_engine::core::replay::{apply_edit, replay_history, ReplayCursor};
use duel_engine::core::rng;
use duel_engine::core::state::{Autopilot, Combatant, Side, StatRecord};
use duel_engine::data::settings::GameSettings;
use duel_engine::data::skills::SkillBook;

fn engine() -> BattleEngine {
    BattleEngine::new(GameSettings::default(), SkillBook::minimal())
}

fn fighter(name: &str, strength: i32, agility: i32, intelligence: i32, abilities: &[&str]) -> Combatant {
    build_combatant(
        StatRecord::new(name, strength, agility, intelligence),
        abilities,
        &GameSettings::default(),
    )
    .expect("valid test fighter")
}

fn tactical_history(engine: &BattleEngine, seed: u64) -> BattleHistory {
    let mut battle = engine.start_battle(
        fighter("Ann", 10, 10, 10, &["Stealth", "Fireball"]),
        fighter("Bob", 12, 8, 10, &["Heal", "Surcharge"]),
        [Autopilot::Tactician; 2],
    );
    run_auto_battle(engine, &mut battle, &mut rng::seeded(seed)).expect("battle runs");
    battle.history
}

/// Pip (HP 10, no strength) against Brute (strength 20). Log: Start, Pip's
/// harmless attack, Brute's knockout, End.
fn knockout_history(engine: &BattleEngine) -> BattleHistory {
    let mut battle = engine.start_battle(
        fighter("Pip", 0, 0, 0, &[]),
        fighter("Brute", 20, 0, 0, &[]),
        [Autopilot::Attacker; 2],
    );
    run_auto_battle(engine, &mut battle, &mut rng::seeded(5)).expect("battle runs");
    battle.history
}

#[test]
fn test_replay_reproduces_history_exactly() {
    let engine = engine();
    let history = tactical_history(&engine, 42);
    let replayed = replay_history(&engine, &history).expect("replays");
    assert_eq!(replayed.history, history);
    assert!(replayed.is_finished());
    let last = history.log.last().expect("non-empty log");
    assert_eq!(replayed.hp(), last.hp_after);
}

#[test]
fn test_same_seed_same_log() {
    let engine = engine();
    let first = tactical_history(&engine, 9);
    let second = tactical_history(&engine, 9);
    assert_eq!(first.log, second.log);
    assert_eq!(first.winner, second.winner);
    assert_ne!(first.id, second.id);
}

#[test]
fn test_json_export_replays() {
    let engine = engine();
    let history = tactical_history(&engine, 17);
    let json = history.to_json().expect("serializes");
    let restored = BattleHistory::from_json(&json).expect("deserializes");
    assert_eq!(restored.id, history.id);
    assert_eq!(restored.log.len(), history.log.len());
    let replayed = replay_history(&engine, &restored).expect("replays");
    assert_eq!(replayed.winner(), history.winner);
}

#[test]
fn test_edit_keeps_prefix_and_regenerates_consistent_suffix() {
    let engine = engine();
    let history = tactical_history(&engine, 42);
    assert!(history.log.len() > 5);
    let index = 3;
    let original = history.log.get(index).expect("action exists").clone();

    let edit = BattleAction::edited(ActionType::Attack, original.actor, 0, "a whiff");
    let variant = apply_edit(&engine, &history, index, &edit, &mut rng::seeded(1234)).expect("edit applies");

    assert_eq!(&variant.log.actions()[..index], &history.log.actions()[..index]);
    let edited = &variant.log.actions()[index];
    assert_eq!(edited.origin, ActionOrigin::Edited);
    assert_eq!(edited.damage, 0);
    assert_eq!(edited.round, original.round);
    assert_eq!(edited.description, "a whiff");

    assert_ne!(variant.id, history.id);
    assert_eq!(variant.parent.as_ref(), Some(&history.id));
    assert_eq!(variant.display_name, format!("{} (Variant)", history.display_name));
    assert_eq!(variant.fighter_a, history.fighter_a);
    assert_eq!(variant.fighter_b, history.fighter_b);

    let replayed = replay_history(&engine, &variant).expect("variant replays");
    assert_eq!(replayed.winner(), variant.winner);
    assert_eq!(Some(replayed.hp()), variant.log.last().map(|a| a.hp_after));
    assert_eq!(replayed.history, variant);
}

#[test]
fn test_markers_cannot_be_edited() {
    let engine = engine();
    let history = tactical_history(&engine, 42);
    let snapshot = history.clone();
    let last = history.log.len() - 1;
    let edit = BattleAction::edited(ActionType::Attack, Side::A, 5, "");

    let err = apply_edit(&engine, &history, 0, &edit, &mut rng::seeded(1)).expect_err("start marker");
    assert_eq!(
        err,
        EditError::NotModifiable {
            index: 0,
            action_type: ActionType::Start
        }
    );
    let end_actor = history.log.actions()[last].actor;
    let edit_end = BattleAction::edited(ActionType::Attack, end_actor, 5, "");
    let err = apply_edit(&engine, &history, last, &edit_end, &mut rng::seeded(1)).expect_err("end marker");
    assert_eq!(
        err,
        EditError::NotModifiable {
            index: last,
            action_type: ActionType::End
        }
    );
    assert_eq!(history, snapshot);
}

#[test]
fn test_illegal_edits_are_rejected() {
    let engine = engine();
    let history = tactical_history(&engine, 42);
    let len = history.log.len();

    let edit = BattleAction::edited(ActionType::Attack, Side::A, 5, "");
    assert_eq!(
        apply_edit(&engine, &history, len, &edit, &mut rng::seeded(1)),
        Err(EditError::IndexOutOfBounds { index: len, len })
    );

    let marker = BattleAction::edited(ActionType::End, Side::A, 0, "");
    assert_eq!(
        apply_edit(&engine, &history, 1, &marker, &mut rng::seeded(1)),
        Err(EditError::MarkerNotAllowed(ActionType::End))
    );

    let negative = BattleAction::edited(ActionType::Attack, Side::A, -5, "");
    assert_eq!(
        apply_edit(&engine, &history, 1, &negative, &mut rng::seeded(1)),
        Err(EditError::NegativeDamage(-5))
    );

    // Index 1 is always fighter A's opening move.
    let swapped = BattleAction::edited(ActionType::Attack, Side::B, 5, "");
    assert_eq!(
        apply_edit(&engine, &history, 1, &swapped, &mut rng::seeded(1)),
        Err(EditError::ParticipantsChanged)
    );
}

#[test]
fn test_edit_to_recharging_skill_is_rejected() {
    let engine = engine();
    let mut battle = engine.start_battle(
        fighter("Ann", 10, 10, 10, &[]),
        fighter("Bob", 10, 10, 10, &[]),
        [Autopilot::Attacker; 2],
    );
    let mut draws = rng::seeded(8);
    engine
        .resolve_next_action(&mut battle, Some(ActionType::Surcharge), &mut draws)
        .expect("surcharge resolves");
    run_auto_battle(&engine, &mut battle, &mut draws).expect("battle runs");
    let history = battle.history;

    let recast = BattleAction::edited(ActionType::Surcharge, Side::A, 0, "");
    assert_eq!(
        apply_edit(&engine, &history, 3, &recast, &mut rng::seeded(1)),
        Err(EditError::SkillOnCooldown {
            index: 3,
            skill: ActionType::Surcharge,
            turns: 2
        })
    );

    let stealth = BattleAction::edited(ActionType::Stealth, Side::A, 0, "");
    let variant = apply_edit(&engine, &history, 3, &stealth, &mut rng::seeded(1)).expect("stealth is ready");
    assert_eq!(variant.log.actions()[3].action_type, ActionType::Stealth);
    replay_history(&engine, &variant).expect("variant replays");
}

#[test]
fn test_softening_a_knockout_regenerates_the_rest() {
    let engine = engine();
    let history = knockout_history(&engine);
    let types: Vec<ActionType> = history.log.actions().iter().map(|a| a.action_type).collect();
    assert_eq!(
        types,
        vec![ActionType::Start, ActionType::Attack, ActionType::Attack, ActionType::End]
    );
    assert_eq!(history.winner, Some(Side::B));

    let edit = BattleAction::edited(ActionType::Attack, Side::B, 0, "Brute pulls the punch");
    let variant = apply_edit(&engine, &history, 2, &edit, &mut rng::seeded(99)).expect("edit applies");

    let actions = variant.log.actions();
    assert_eq!(actions.len(), 6);
    assert_eq!(actions[2].damage, 0);
    assert_eq!(actions[2].outcome, ActionOutcome::Dodged);
    assert_eq!(actions[2].hp_after.a, 10);
    assert_eq!(actions[2].origin, ActionOrigin::Edited);
    assert_eq!(actions[3].actor, Side::A);
    assert_eq!(actions[3].origin, ActionOrigin::Engine);
    assert_eq!(actions[3].round, 2);
    assert_eq!(actions[4].actor, Side::B);
    assert!(actions[4].damage >= 20);
    assert_eq!(actions[5].action_type, ActionType::End);
    assert_eq!(variant.winner, Some(Side::B));

    assert_eq!(history.log.len(), 4);
    let replayed = replay_history(&engine, &variant).expect("variant replays");
    assert_eq!(replayed.history, variant);
}

#[test]
fn test_edit_into_knockout_ends_at_the_edit() {
    let engine = engine();
    let history = knockout_history(&engine);

    let edit = BattleAction::edited(ActionType::Attack, Side::A, 999, "");
    let variant = apply_edit(&engine, &history, 1, &edit, &mut rng::seeded(99)).expect("edit applies");

    let actions = variant.log.actions();
    assert_eq!(actions.len(), 3);
    assert_eq!(actions[1].damage, 999);
    assert_eq!(actions[1].hp_after.b, 0);
    assert_eq!(actions[2].action_type, ActionType::End);
    assert_eq!(variant.winner, Some(Side::A));
    replay_history(&engine, &variant).expect("variant replays");
}

#[test]
fn test_variants_can_be_edited_again() {
    let engine = engine();
    let history = knockout_history(&engine);
    let soften = BattleAction::edited(ActionType::Attack, Side::B, 0, "");
    let variant = apply_edit(&engine, &history, 2, &soften, &mut rng::seeded(99)).expect("first edit");
    let second = apply_edit(&engine, &variant, 4, &soften, &mut rng::seeded(100)).expect("second edit");

    assert_eq!(&second.log.actions()[..4], &variant.log.actions()[..4]);
    assert_eq!(second.parent.as_ref(), Some(&variant.id));
    assert_eq!(second.log.actions()[4].origin, ActionOrigin::Edited);
    replay_history(&engine, &second).expect("second variant replays");
}

#[test]
fn test_tampered_log_is_detected() {
    let engine = engine();
    let history = knockout_history(&engine);

    let mut tampered = history.clone();
    let mut forged = tampered.log.actions()[2].clone();
    forged.damage += 1;
    tampered.log.replace_at(2, forged).expect("index in range");
    assert_eq!(
        replay_history(&engine, &tampered).map(|b| b.history),
        Err(ReplayError::Diverged { index: 2 })
    );

    let empty = BattleHistory::new(history.fighter_a.clone(), history.fighter_b.clone(), history.autopilot);
    assert_eq!(
        replay_history(&engine, &empty).map(|b| b.history),
        Err(ReplayError::MissingStartMarker)
    );
}

#[test]
fn test_unfinished_history_resumes() {
    let engine = engine();
    let mut battle = engine.start_battle(
        fighter("Ann", 10, 10, 10, &[]),
        fighter("Bob", 10, 10, 10, &[]),
        [Autopilot::Attacker; 2],
    );
    let mut draws = rng::seeded(3);
    for _ in 0..3 {
        engine.resolve_next_action(&mut battle, None, &mut draws).expect("resolves");
    }
    let mut resumed = replay_history(&engine, &battle.history).expect("replays");
    assert_eq!(resumed, battle);
    run_auto_battle(&engine, &mut resumed, &mut draws).expect("finishes");
    assert!(resumed.is_finished());
}

#[test]
fn test_cursor_steps_over_snapshots() {
    let engine = engine();
    let history = knockout_history(&engine);
    let mut cursor = ReplayCursor::new(&history);

    assert_eq!(cursor.len(), 4);
    assert_eq!(cursor.current().map(|a| a.action_type), Some(ActionType::Start));
    let opening = cursor.hp().expect("snapshot");
    assert_eq!((opening.a, opening.b), (10, 200));

    assert!(cursor.step_back().is_none());
    for _ in 0..3 {
        assert!(cursor.step_forward().is_some());
    }
    assert!(cursor.is_at_end());
    assert!(cursor.step_forward().is_none());
    assert_eq!(cursor.position(), 3);
    assert_eq!(cursor.hp().map(|hp| hp.a), Some(0));

    assert_eq!(cursor.step_back().map(|a| a.actor), Some(Side::B));
    assert!(cursor.seek(1).is_some());
    assert!(cursor.seek(10).is_none());
    assert_eq!(cursor.position(), 1);
}
