//! Error types surfaced at the engine boundary.
//!
//! Every fallible call is all-or-nothing: when one of these errors is returned
//! the caller's battle, log or history is exactly as it was before the call.

use crate::core::log::ActionType;
use crate::core::state::Side;
use thiserror::Error;

/// One broken build rule. Validation collects all of them before failing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name too long ({len} characters, max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("{stat} cannot be negative (got {value})")]
    NegativeStat { stat: &'static str, value: i32 },

    #[error("Total stats {total} exceeds maximum {max}")]
    StatSumExceeded { total: i64, max: i32 },

    #[error("Too many abilities ({count}, max {max})")]
    TooManyAbilities { count: usize, max: usize },

    #[error("Unknown ability '{0}'")]
    UnknownAbility(String),
}

/// A combatant could not be built.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{}", render_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

fn render_violations(violations: &[Violation]) -> String {
    match violations {
        [] => "Invalid character".to_string(),
        [only] => only.to_string(),
        many => {
            let mut message = format!("Multiple validation errors ({}):", many.len());
            for (i, violation) in many.iter().enumerate() {
                message.push_str(&format!("\n  {}. {}", i + 1, violation));
            }
            message
        }
    }
}

/// Rejected engine calls.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("battle has not started")]
    NotStarted,

    #[error("battle has already started")]
    AlreadyStarted,

    #[error("battle is already finished")]
    Finished,

    #[error("{0:?} is a log marker and cannot be played")]
    MarkerNotPlayable(ActionType),

    #[error("it is {expected:?}'s turn, not {actual:?}'s")]
    OutOfTurn { expected: Side, actual: Side },

    #[error("{skill:?} is recharging ({turns} turns left)")]
    OnCooldown { skill: ActionType, turns: u32 },

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Contract violations on the append-only action log.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("action index {index} out of bounds (log has {len} actions)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("round {round} would follow round {previous}")]
    RoundRegression { previous: u32, round: u32 },
}

/// A stored history does not re-derive from its own log.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("history does not begin with a start marker")]
    MissingStartMarker,

    #[error("replay diverged from the recorded log at action {index}")]
    Diverged { index: usize },

    #[error("end marker at action {index} does not match the replayed outcome")]
    UnexpectedEnd { index: usize },

    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// An edit was refused before anything was touched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("action index {index} out of bounds (log has {len} actions)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("action {index} ({action_type:?}) cannot be modified")]
    NotModifiable { index: usize, action_type: ActionType },

    #[error("cannot replace an action with a {0:?} marker")]
    MarkerNotAllowed(ActionType),

    #[error("damage cannot be negative (got {0})")]
    NegativeDamage(i32),

    #[error("edit must keep the original actor and target")]
    ParticipantsChanged,

    #[error("{skill:?} is recharging at action {index} ({turns} turns left)")]
    SkillOnCooldown {
        index: usize,
        skill: ActionType,
        turns: u32,
    },

    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// Configuration tables could not be loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}
