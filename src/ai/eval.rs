use crate::core::state::{Battle, Side};
use crate::core::utils::percent_of;

/// Remaining HP fraction of `side` minus the opponent's, in `-1.0..=1.0`.
pub fn evaluate_battle(battle: &Battle, side: Side) -> f64 {
    let me = battle.fighter(side);
    let foe = battle.fighter(side.other());
    percent_of(me.hp.max(0), me.max_hp) - percent_of(foe.hp.max(0), foe.max_hp)
}
