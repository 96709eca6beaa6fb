pub mod ai;
pub mod core;
pub mod data;

pub use ai::{choose_action, evaluate_battle, run_auto_battle};
pub use crate::core::{
    abilities::{Ability, AbilityPriority, AbilityStack},
    battle::BattleEngine,
    errors::{BattleError, EditError, LogError, ReplayError, SettingsError, ValidationError, Violation},
    factory::build_combatant,
    history::{Anomaly, BattleHistory, BattleId, HistoryStore},
    log::{ActionLog, ActionOrigin, ActionOutcome, ActionType, BattleAction, HpSnapshot},
    replay::{apply_edit, replay_history, ReplayCursor},
    state::{Autopilot, Battle, BattleStatus, BuffState, Combatant, FighterState, Side, StatRecord},
};
pub use data::{GameSettings, SkillBook, SkillData};
