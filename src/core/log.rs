use crate::core::errors::LogError;
use crate::core::state::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Attack,
    Surcharge,
    Stealth,
    Heal,
    Fireball,
    FireballBuff,
    Start,
    End,
}

impl ActionType {
    pub const SKILLS: [ActionType; 5] = [
        ActionType::Surcharge,
        ActionType::Stealth,
        ActionType::Heal,
        ActionType::Fireball,
        ActionType::FireballBuff,
    ];

    pub fn is_skill(self) -> bool {
        Self::SKILLS.contains(&self)
    }

    /// Start and End bracket a log. They are never played as moves.
    pub fn is_marker(self) -> bool {
        matches!(self, ActionType::Start | ActionType::End)
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionType::Attack => "Attack",
            ActionType::Surcharge => "Surcharge",
            ActionType::Stealth => "Stealth",
            ActionType::Heal => "Heal",
            ActionType::Fireball => "Fireball",
            ActionType::FireballBuff => "FireballBuff",
            ActionType::Start => "Start",
            ActionType::End => "End",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Hit,
    Dodged,
    /// A non-damaging skill took effect.
    Applied,
    /// A skill was refused because it is recharging.
    Rejected,
    Marker,
}

impl ActionOutcome {
    /// Outcome of a caller-authored action. An attack edited down to 0 damage reads as a dodge.
    pub fn for_edit(action_type: ActionType, damage: i32) -> Self {
        match (action_type, damage) {
            (ActionType::Attack, 0) => ActionOutcome::Dodged,
            (ActionType::Attack, _) => ActionOutcome::Hit,
            (_, d) if d > 0 => ActionOutcome::Hit,
            _ => ActionOutcome::Applied,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    Engine,
    Edited,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpSnapshot {
    pub a: i32,
    pub b: i32,
}

impl HpSnapshot {
    pub fn get(&self, side: Side) -> i32 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }
}

/// One immutable log record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleAction {
    pub round: u32,
    pub actor: Side,
    pub target: Side,
    pub action_type: ActionType,
    pub description: String,
    pub damage: i32,
    #[serde(default)]
    pub healed: i32,
    pub modifiable: bool,
    pub outcome: ActionOutcome,
    pub hp_after: HpSnapshot,
    /// Draws consumed while resolving this action, in order.
    #[serde(default)]
    pub rng: Vec<f64>,
    pub origin: ActionOrigin,
}

impl BattleAction {
    pub fn marker(action_type: ActionType, round: u32, actor: Side, description: String, hp_after: HpSnapshot) -> Self {
        Self {
            round,
            actor,
            target: actor.other(),
            action_type,
            description,
            damage: 0,
            healed: 0,
            modifiable: false,
            outcome: ActionOutcome::Marker,
            hp_after,
            rng: Vec::new(),
            origin: ActionOrigin::Engine,
        }
    }

    /// Builds a caller-authored replacement for an existing combat action.
    pub fn edited(action_type: ActionType, actor: Side, damage: i32, description: impl Into<String>) -> Self {
        Self {
            round: 1,
            actor,
            target: actor.other(),
            action_type,
            description: description.into(),
            damage,
            healed: 0,
            modifiable: true,
            outcome: ActionOutcome::for_edit(action_type, damage),
            hp_after: HpSnapshot::default(),
            rng: Vec::new(),
            origin: ActionOrigin::Edited,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.action_type.is_marker()
    }

    pub fn formatted(&self, actor_name: &str, target_name: &str) -> String {
        format!(
            "Round {}: {} {} {} (dmg: {})",
            self.round,
            actor_name,
            self.action_type.label(),
            target_name,
            self.damage
        )
    }
}

/// Append-only sequence of actions with non-decreasing rounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    actions: Vec<BattleAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_with(action: BattleAction) -> Self {
        Self {
            actions: vec![action],
        }
    }

    pub fn append(&mut self, action: BattleAction) -> Result<(), LogError> {
        if let Some(last) = self.actions.last() {
            if action.round < last.round {
                return Err(LogError::RoundRegression {
                    previous: last.round,
                    round: action.round,
                });
            }
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn replace_at(&mut self, index: usize, action: BattleAction) -> Result<(), LogError> {
        let len = self.actions.len();
        let slot = self
            .actions
            .get_mut(index)
            .ok_or(LogError::IndexOutOfBounds { index, len })?;
        *slot = action;
        Ok(())
    }

    /// Drops `index..`. An index past the end leaves the log as is.
    pub fn truncate_from(&mut self, index: usize) {
        self.actions.truncate(index);
    }

    pub fn actions(&self) -> &[BattleAction] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<&BattleAction> {
        self.actions.get(index)
    }

    pub fn first(&self) -> Option<&BattleAction> {
        self.actions.first()
    }

    pub fn last(&self) -> Option<&BattleAction> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of non-marker actions.
    pub fn combat_count(&self) -> usize {
        self.actions.iter().filter(|a| !a.is_marker()).count()
    }
}
