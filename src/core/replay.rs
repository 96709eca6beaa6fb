use crate::ai::simple::run_auto_battle;
use crate::core::battle::BattleEngine;
use crate::core::errors::{EditError, ReplayError};
use crate::core::history::{BattleHistory, BattleId};
use crate::core::log::{ActionOrigin, ActionType, BattleAction, HpSnapshot};
use crate::core::rng;
use crate::core::state::Battle;
use chrono::Utc;
use tracing::{info, warn};

/// Rebuilds the engine state of `history` from its pristine fighters.
///
/// Every recorded action is re-resolved with its own recorded draws (edited
/// actions are re-applied as forced outcomes) and must come out identical.
/// An unfinished history yields a battle that can be resumed.
pub fn replay_history(engine: &BattleEngine, history: &BattleHistory) -> Result<Battle, ReplayError> {
    let battle = replay_until(engine, history, history.log.len())?;
    if battle.history.winner != history.winner {
        return Err(ReplayError::UnexpectedEnd {
            index: history.log.len(),
        });
    }
    Ok(battle)
}

/// Replays `history.log[..end]`.
fn replay_until(engine: &BattleEngine, history: &BattleHistory, end: usize) -> Result<Battle, ReplayError> {
    let actions = history.log.actions();
    let start = actions
        .first()
        .filter(|action| action.action_type == ActionType::Start)
        .ok_or(ReplayError::MissingStartMarker)?;

    let mut battle = engine.start_battle(
        history.fighter_a.clone(),
        history.fighter_b.clone(),
        history.autopilot,
    );
    if battle.history.log.first() != Some(start) {
        return Err(ReplayError::Diverged { index: 0 });
    }
    battle.history.id = history.id.clone();
    battle.history.created_at = history.created_at;
    battle.history.display_name = history.display_name.clone();
    battle.history.parent = history.parent.clone();

    let end = end.min(actions.len());
    let mut index = 1;
    while index < end {
        let recorded = &actions[index];
        if recorded.is_marker() {
            return Err(ReplayError::UnexpectedEnd { index });
        }
        let produced = replay_action(engine, &mut battle, recorded)?;
        if produced != *recorded {
            return Err(ReplayError::Diverged { index });
        }
        index += 1;

        if battle.is_finished() {
            if actions.get(index) != battle.history.log.last() {
                return Err(ReplayError::UnexpectedEnd { index });
            }
            if index + 1 < actions.len() {
                return Err(ReplayError::Diverged { index: index + 1 });
            }
            break;
        }
    }
    Ok(battle)
}

fn replay_action(engine: &BattleEngine, battle: &mut Battle, recorded: &BattleAction) -> Result<BattleAction, ReplayError> {
    let produced = match recorded.origin {
        ActionOrigin::Edited => engine.apply_forced(battle, recorded)?,
        ActionOrigin::Engine => {
            let mut draws = rng::recorded(&recorded.rng);
            engine.resolve_next_action(battle, Some(recorded.action_type), &mut draws)?
        }
    };
    Ok(produced)
}

/// Replaces the action at `index` and derives a new variant history.
///
/// The prefix before `index` is replayed bit-exactly, `new_action` is applied
/// as a forced outcome, and if both sides are still standing the rest of the
/// battle is regenerated by the autopilots with fresh draws from `rng`. The
/// source history is never modified.
pub fn apply_edit(
    engine: &BattleEngine,
    history: &BattleHistory,
    index: usize,
    new_action: &BattleAction,
    rng: &mut dyn FnMut() -> f64,
) -> Result<BattleHistory, EditError> {
    let result = edit_variant(engine, history, index, new_action, rng);
    match &result {
        Ok(variant) => info!(
            source = %history.id,
            variant = %variant.id,
            index,
            actions = variant.log.len(),
            "applied edit"
        ),
        Err(err) => warn!(source = %history.id, index, error = %err, "edit rejected"),
    }
    result
}

fn edit_variant(
    engine: &BattleEngine,
    history: &BattleHistory,
    index: usize,
    new_action: &BattleAction,
    rng: &mut dyn FnMut() -> f64,
) -> Result<BattleHistory, EditError> {
    let original = history.log.get(index).ok_or(EditError::IndexOutOfBounds {
        index,
        len: history.log.len(),
    })?;
    if !original.modifiable || original.is_marker() {
        return Err(EditError::NotModifiable {
            index,
            action_type: original.action_type,
        });
    }
    if new_action.action_type.is_marker() {
        return Err(EditError::MarkerNotAllowed(new_action.action_type));
    }
    if new_action.damage < 0 {
        return Err(EditError::NegativeDamage(new_action.damage));
    }
    if new_action.actor != original.actor || new_action.target != original.target {
        return Err(EditError::ParticipantsChanged);
    }

    let mut battle = replay_until(engine, history, index)?;

    if new_action.action_type.is_skill() {
        let turns = battle.fighter(original.actor).buffs.cooldown(new_action.action_type);
        if turns > 0 {
            return Err(EditError::SkillOnCooldown {
                index,
                skill: new_action.action_type,
                turns,
            });
        }
    }

    let mut forced = new_action.clone();
    forced.round = original.round;
    forced.origin = ActionOrigin::Edited;
    engine
        .apply_forced(&mut battle, &forced)
        .map_err(ReplayError::from)?;

    if !battle.is_finished() {
        run_auto_battle(engine, &mut battle, rng).map_err(ReplayError::from)?;
    }

    let mut variant = battle.history;
    variant.id = BattleId::generate();
    variant.display_name = format!("{} (Variant)", history.display_name);
    variant.parent = Some(history.id.clone());
    variant.created_at = Utc::now();
    Ok(variant)
}

/// Read-only stepping over a recorded log, for animated review.
#[derive(Clone, Debug)]
pub struct ReplayCursor<'a> {
    actions: &'a [BattleAction],
    position: usize,
}

impl<'a> ReplayCursor<'a> {
    pub fn new(history: &'a BattleHistory) -> Self {
        Self::over(history.log.actions())
    }

    pub fn over(actions: &'a [BattleAction]) -> Self {
        Self { actions, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.position + 1 >= self.actions.len()
    }

    pub fn current(&self) -> Option<&'a BattleAction> {
        self.actions.get(self.position)
    }

    /// HP of both sides right after the current action.
    pub fn hp(&self) -> Option<HpSnapshot> {
        self.current().map(|action| action.hp_after)
    }

    pub fn step_forward(&mut self) -> Option<&'a BattleAction> {
        if self.is_at_end() {
            return None;
        }
        self.position += 1;
        self.current()
    }

    pub fn step_back(&mut self) -> Option<&'a BattleAction> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        self.current()
    }

    pub fn seek(&mut self, index: usize) -> Option<&'a BattleAction> {
        let action = self.actions.get(index)?;
        self.position = index;
        Some(action)
    }
}
