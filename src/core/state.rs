use crate::core::abilities::{Ability, AbilityStack};
use crate::core::history::BattleHistory;
use crate::core::log::{ActionType, HpSnapshot};
use crate::core::utils::initial_hp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Base stats of a combatant. Validated once by `build_combatant`, never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    name: String,
    strength: i32,
    agility: i32,
    intelligence: i32,
}

impl StatRecord {
    pub fn new(name: impl Into<String>, strength: i32, agility: i32, intelligence: i32) -> Self {
        Self {
            name: name.into(),
            strength,
            agility,
            intelligence,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strength(&self) -> i32 {
        self.strength
    }

    pub fn agility(&self) -> i32 {
        self.agility
    }

    pub fn intelligence(&self) -> i32 {
        self.intelligence
    }

    /// Sum of the three stats, widened so no input can overflow it.
    pub fn total(&self) -> i64 {
        i64::from(self.strength) + i64::from(self.agility) + i64::from(self.intelligence)
    }

    pub fn power_level(&self) -> i32 {
        self.strength
            .saturating_mul(2)
            .saturating_add(self.agility.saturating_mul(2))
            .saturating_add(self.intelligence.saturating_mul(3))
    }

    pub fn description(&self) -> String {
        format!(
            "{} (STR={}, AGI={}, INT={})",
            self.name, self.strength, self.agility, self.intelligence
        )
    }
}

/// A stat record wrapped in its ability stack. Only `build_combatant` makes one.
///
/// ```compile_fail
/// use duel_engine::core::abilities::AbilityStack;
/// use duel_engine::core::state::{Combatant, StatRecord};
///
/// let stack = AbilityStack::new(StatRecord::new("", -5, 0, 0));
/// let _ = Combatant::new(stack);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub(crate) stack: AbilityStack,
}

impl Combatant {
    pub(crate) fn new(stack: AbilityStack) -> Self {
        Self { stack }
    }

    pub fn name(&self) -> &str {
        self.stack.base().name()
    }

    pub fn stack(&self) -> &AbilityStack {
        &self.stack
    }

    pub fn stats(&self) -> &StatRecord {
        self.stack.base()
    }

    pub fn power_level(&self) -> i32 {
        self.stack.power_level()
    }

    pub fn description(&self) -> String {
        self.stack.description()
    }

    /// Abilities in hook dispatch order.
    pub fn abilities(&self) -> Vec<&Ability> {
        self.stack.abilities()
    }
}

/// Per-battle buffs and cooldowns of one side. Derivable by replaying the log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffState {
    pub pending_bonus_damage: i32,
    pub pending_bonus_turns: u32,
    pub dodge_charges_remaining: u32,
    pub next_hit_empowered: bool,
    pub cooldowns: BTreeMap<ActionType, u32>,
}

impl BuffState {
    pub fn cooldown(&self, skill: ActionType) -> u32 {
        self.cooldowns.get(&skill).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, skill: ActionType) -> bool {
        self.cooldown(skill) == 0
    }

    pub fn start_cooldown(&mut self, skill: ActionType, turns: u32) {
        if turns > 0 {
            self.cooldowns.insert(skill, turns);
        }
    }

    pub fn tick_cooldowns(&mut self) {
        for turns in self.cooldowns.values_mut() {
            *turns = turns.saturating_sub(1);
        }
        self.cooldowns.retain(|_, turns| *turns > 0);
    }

    /// Consumes one turn of pending bonus, returning the flat damage to add.
    pub fn take_bonus(&mut self) -> i32 {
        if self.pending_bonus_turns == 0 {
            return 0;
        }
        let bonus = self.pending_bonus_damage;
        self.pending_bonus_turns -= 1;
        if self.pending_bonus_turns == 0 {
            self.pending_bonus_damage = 0;
        }
        bonus
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterState {
    pub side: Side,
    pub combatant: Combatant,
    pub hp: i32,
    pub max_hp: i32,
    pub buffs: BuffState,
}

impl FighterState {
    pub fn new(side: Side, combatant: Combatant) -> Self {
        let max_hp = initial_hp(combatant.stats());
        Self {
            side,
            combatant,
            hp: max_hp,
            max_hp,
            buffs: BuffState::default(),
        }
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// Restores up to `amount` HP without exceeding the maximum. Returns what was restored.
    pub fn restore(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp).max(before);
        self.hp - before
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// How a side picks its move when the caller does not choose one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Autopilot {
    #[default]
    Attacker,
    Tactician,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub fighters: [FighterState; 2],
    pub status: BattleStatus,
    /// Combat actions resolved so far, markers excluded.
    pub combat_actions: u32,
    pub history: BattleHistory,
}

impl Battle {
    pub fn fighter(&self, side: Side) -> &FighterState {
        &self.fighters[side.index()]
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut FighterState {
        &mut self.fighters[side.index()]
    }

    /// Side due to act next. A opens, then sides alternate.
    pub fn acting_side(&self) -> Side {
        if self.combat_actions % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }

    pub fn hp(&self) -> HpSnapshot {
        HpSnapshot {
            a: self.fighters[0].hp,
            b: self.fighters[1].hp,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == BattleStatus::Finished
    }

    pub fn winner(&self) -> Option<Side> {
        self.history.winner
    }
}
