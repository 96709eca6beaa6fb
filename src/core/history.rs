use crate::core::log::ActionLog;
use crate::core::state::{Autopilot, Combatant, Side};
use crate::data::settings::GameSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static BATTLE_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(String);

impl BattleId {
    /// `BATTLE_<millis>_<counter>`. The counter keeps ids unique within one millisecond.
    pub fn generate() -> Self {
        let counter = BATTLE_COUNTER.fetch_add(1, Ordering::Relaxed);
        BattleId(format!("BATTLE_{}_{}", Utc::now().timestamp_millis(), counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anomaly {
    /// The battle hit the round cap and was decided on remaining HP.
    RoundCapReached,
}

/// A complete record of one battle. Fighters are kept as they were at battle start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleHistory {
    pub id: BattleId,
    pub fighter_a: Combatant,
    pub fighter_b: Combatant,
    pub created_at: DateTime<Utc>,
    pub log: ActionLog,
    pub winner: Option<Side>,
    pub display_name: String,
    #[serde(default)]
    pub parent: Option<BattleId>,
    #[serde(default)]
    pub autopilot: [Autopilot; 2],
    #[serde(default)]
    pub anomaly: Option<Anomaly>,
}

impl BattleHistory {
    pub fn new(fighter_a: Combatant, fighter_b: Combatant, autopilot: [Autopilot; 2]) -> Self {
        let display_name = format!("{} vs {}", fighter_a.name(), fighter_b.name());
        Self {
            id: BattleId::generate(),
            fighter_a,
            fighter_b,
            created_at: Utc::now(),
            log: ActionLog::new(),
            winner: None,
            display_name,
            parent: None,
            autopilot,
            anomaly: None,
        }
    }

    pub fn fighter(&self, side: Side) -> &Combatant {
        match side {
            Side::A => &self.fighter_a,
            Side::B => &self.fighter_b,
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.map(|side| self.fighter(side).name())
    }

    pub fn summary(&self) -> String {
        format!(
            "[{}] {} - Winner: {} ({} actions)",
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.display_name,
            self.winner_name().unwrap_or("None"),
            self.log.len()
        )
    }

    /// One `Round r: Actor <type> Target (dmg: d)` line per action.
    pub fn formatted_actions(&self) -> Vec<String> {
        self.log
            .actions()
            .iter()
            .map(|action| {
                action.formatted(
                    self.fighter(action.actor).name(),
                    self.fighter(action.target).name(),
                )
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Bounded, newest-first collection of histories.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    entries: VecDeque<BattleHistory>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn from_settings(settings: &GameSettings) -> Self {
        Self::new(settings.max_battles)
    }

    /// Inserts at the head, evicting the oldest entries past capacity.
    pub fn record(&mut self, history: BattleHistory) {
        debug!(id = %history.id, name = %history.display_name, "recording battle");
        self.entries.push_front(history);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!(id = %evicted.id, "evicted oldest battle");
            }
        }
    }

    pub fn get(&self, id: &BattleId) -> Option<&BattleHistory> {
        self.entries.iter().find(|history| &history.id == id)
    }

    pub fn all(&self) -> impl Iterator<Item = &BattleHistory> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::from_settings(&GameSettings::default())
    }
}
