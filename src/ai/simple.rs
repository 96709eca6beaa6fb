use crate::ai::eval::evaluate_battle;
use crate::core::battle::BattleEngine;
use crate::core::errors::BattleError;
use crate::core::log::ActionType;
use crate::core::state::{Autopilot, Battle, Side};
use crate::core::utils::percent_of;
use crate::data::skills::SkillBook;

const LOW_HP_FRACTION: f64 = 0.4;

/// Move the autopilot of `side` would play. Consumes no random draws.
pub fn choose_action(battle: &Battle, side: Side, skills: &SkillBook) -> ActionType {
    match battle.history.autopilot[side.index()] {
        Autopilot::Attacker => ActionType::Attack,
        Autopilot::Tactician => choose_tactical(battle, side, skills),
    }
}

pub fn choose_tactical(battle: &Battle, side: Side, skills: &SkillBook) -> ActionType {
    let me = battle.fighter(side);
    let ready = |skill: ActionType| skills.get(skill).is_some() && me.buffs.is_ready(skill);

    if percent_of(me.hp, me.max_hp) < LOW_HP_FRACTION && ready(ActionType::Heal) {
        return ActionType::Heal;
    }
    if evaluate_battle(battle, side) < 0.0
        && me.buffs.dodge_charges_remaining == 0
        && ready(ActionType::Stealth)
    {
        return ActionType::Stealth;
    }
    if ready(ActionType::Fireball) {
        return ActionType::Fireball;
    }
    if ready(ActionType::Surcharge) && !me.buffs.next_hit_empowered {
        return ActionType::Surcharge;
    }
    ActionType::Attack
}

/// Drives `battle` to its end with every side on autopilot.
pub fn run_auto_battle(
    engine: &BattleEngine,
    battle: &mut Battle,
    rng: &mut dyn FnMut() -> f64,
) -> Result<(), BattleError> {
    while !battle.is_finished() {
        engine.resolve_next_action(battle, None, rng)?;
    }
    Ok(())
}
