use crate::core::state::StatRecord;
use crate::core::utils::scale_damage;
use serde::{Deserialize, Serialize};

const FIREBALL_OPENING_BONUS: i32 = 15;
const FIREBALL_EMBER_BONUS: i32 = 5;
const FIREBALL_EMBER_TURNS: u32 = 2;
const STEALTH_EVADE_TURNS: u32 = 3;
const STEALTH_EVADE_CHANCE: f64 = 0.5;
const HEAL_AMOUNT: i32 = 30;
const SURCHARGE_MULTIPLIER: f64 = 1.5;

/// Hook dispatch class. Declaration order is dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityPriority {
    Defensive,
    Supportive,
    Offensive,
}

impl AbilityPriority {
    pub fn value(self) -> u32 {
        match self {
            AbilityPriority::Defensive => 100,
            AbilityPriority::Supportive => 50,
            AbilityPriority::Offensive => 10,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AbilityPriority::Defensive => "Defensive",
            AbilityPriority::Supportive => "Supportive",
            AbilityPriority::Offensive => "Offensive",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargePhase {
    Charging,
    Ready,
    Spent,
}

/// One link of an ability stack. Each variant carries its own countdown state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ability {
    Stealth { activating: bool, evade_turns: u32 },
    FireResistance,
    Invisibility,
    Heal { available: bool, healing: bool },
    Telepathy,
    Surcharge { phase: SurchargePhase },
    Fireball { first_cast: bool, bonus_turns: u32 },
}

impl Ability {
    pub fn stealth() -> Self {
        Ability::Stealth {
            activating: true,
            evade_turns: STEALTH_EVADE_TURNS,
        }
    }

    pub fn heal() -> Self {
        Ability::Heal {
            available: true,
            healing: false,
        }
    }

    pub fn surcharge() -> Self {
        Ability::Surcharge {
            phase: SurchargePhase::Charging,
        }
    }

    pub fn fireball() -> Self {
        Ability::Fireball {
            first_cast: true,
            bonus_turns: FIREBALL_EMBER_TURNS,
        }
    }

    /// Looks up an ability by display or id name, in its fresh state.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match key.as_str() {
            "stealth" | "furtivite" | "furtivité" => Some(Self::stealth()),
            "fire_resistance" | "fireresistance" => Some(Ability::FireResistance),
            "invisibility" => Some(Ability::Invisibility),
            "heal" | "soin" => Some(Self::heal()),
            "telepathy" => Some(Ability::Telepathy),
            "surcharge" => Some(Self::surcharge()),
            "fireball" | "boule_de_feu" => Some(Self::fireball()),
            _ => None,
        }
    }

    pub fn catalogue() -> Vec<Ability> {
        vec![
            Self::stealth(),
            Ability::FireResistance,
            Ability::Invisibility,
            Self::heal(),
            Ability::Telepathy,
            Self::surcharge(),
            Self::fireball(),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Stealth { .. } => "Stealth",
            Ability::FireResistance => "FireResistance",
            Ability::Invisibility => "Invisibility",
            Ability::Heal { .. } => "Heal",
            Ability::Telepathy => "Telepathy",
            Ability::Surcharge { .. } => "Surcharge",
            Ability::Fireball { .. } => "Fireball",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Ability::Stealth { .. } => "50% chance to evade attacks for 3 turns after a turn of activation",
            Ability::FireResistance => "Hardened against flames",
            Ability::Invisibility => "Hard to pin down",
            Ability::Heal { .. } => "Restores 30 HP once, skipping that turn's attack",
            Ability::Telepathy => "Reads the opponent's intent",
            Ability::Surcharge { .. } => "Boosts one attack by 50% after a turn of preparation",
            Ability::Fireball { .. } => "+15 damage on the first hit, then +5 for 2 hits",
        }
    }

    pub fn priority(&self) -> AbilityPriority {
        match self {
            Ability::Stealth { .. } | Ability::FireResistance | Ability::Invisibility => {
                AbilityPriority::Defensive
            }
            Ability::Heal { .. } | Ability::Telepathy => AbilityPriority::Supportive,
            Ability::Surcharge { .. } | Ability::Fireball { .. } => AbilityPriority::Offensive,
        }
    }

    pub fn power_bonus(&self) -> i32 {
        match self {
            Ability::FireResistance => 3,
            Ability::Invisibility => 5,
            Ability::Telepathy => 4,
            _ => 0,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Ability::Stealth {
                activating,
                evade_turns,
            } => *activating || *evade_turns > 0,
            Ability::Heal { available, .. } => *available,
            Ability::Surcharge { phase } => *phase != SurchargePhase::Spent,
            Ability::Fireball {
                first_cast,
                bonus_turns,
            } => *first_cast || *bonus_turns > 0,
            Ability::FireResistance | Ability::Invisibility | Ability::Telepathy => true,
        }
    }

    pub fn on_begin_turn(&mut self) {}

    pub fn on_end_turn(&mut self) {
        match self {
            Ability::Stealth {
                activating,
                evade_turns,
            } => {
                if *activating {
                    *activating = false;
                } else if *evade_turns > 0 {
                    *evade_turns -= 1;
                }
            }
            Ability::Heal { healing, .. } => *healing = false,
            Ability::Surcharge { phase } => {
                if *phase == SurchargePhase::Charging {
                    *phase = SurchargePhase::Ready;
                }
            }
            _ => {}
        }
    }

    pub fn modify_outgoing_damage(&mut self, base: i32) -> i32 {
        match self {
            Ability::Stealth { activating, .. } if *activating => 0,
            Ability::Heal { healing, .. } if *healing => 0,
            Ability::Surcharge { phase } => match *phase {
                SurchargePhase::Charging => 0,
                SurchargePhase::Ready => {
                    *phase = SurchargePhase::Spent;
                    scale_damage(base, SURCHARGE_MULTIPLIER)
                }
                SurchargePhase::Spent => base,
            },
            Ability::Fireball {
                first_cast,
                bonus_turns,
            } => {
                if *first_cast {
                    *first_cast = false;
                    base.saturating_add(FIREBALL_OPENING_BONUS)
                } else if *bonus_turns > 0 {
                    *bonus_turns -= 1;
                    base.saturating_add(FIREBALL_EMBER_BONUS)
                } else {
                    base
                }
            }
            _ => base,
        }
    }

    /// Returns true when the hit is evaded outright.
    pub fn on_before_receive_damage(&mut self, _incoming: i32, rng: &mut dyn FnMut() -> f64) -> bool {
        match self {
            Ability::Stealth { evade_turns, .. } if *evade_turns > 0 => rng() < STEALTH_EVADE_CHANCE,
            _ => false,
        }
    }

    pub fn modify_incoming_damage(&mut self, incoming: i32) -> i32 {
        incoming
    }

    pub fn heal_amount(&mut self) -> i32 {
        match self {
            Ability::Heal { available, healing } if *available => {
                *available = false;
                *healing = true;
                HEAL_AMOUNT
            }
            _ => 0,
        }
    }
}

/// Singly-linked chain of abilities over a bare stat record.
///
/// Each layer owns the stack it wraps. Hooks are never dispatched in wrap
/// order: [`AbilityStack::abilities`] sorts links by priority class, keeping
/// wrap order (outermost first) between links of the same class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityStack {
    Bare(StatRecord),
    Layer {
        ability: Ability,
        inner: Box<AbilityStack>,
    },
}

impl AbilityStack {
    pub fn new(base: StatRecord) -> Self {
        AbilityStack::Bare(base)
    }

    pub fn wrap(self, ability: Ability) -> Self {
        AbilityStack::Layer {
            ability,
            inner: Box::new(self),
        }
    }

    pub fn base(&self) -> &StatRecord {
        let mut current = self;
        loop {
            match current {
                AbilityStack::Bare(stats) => return stats,
                AbilityStack::Layer { inner, .. } => current = inner.as_ref(),
            }
        }
    }

    /// Number of ability layers above the stat record.
    pub fn depth(&self) -> usize {
        self.links().len()
    }

    /// Links from the outermost inwards.
    pub fn links(&self) -> Vec<&Ability> {
        let mut links = Vec::new();
        let mut current = self;
        while let AbilityStack::Layer { ability, inner } = current {
            links.push(ability);
            current = inner.as_ref();
        }
        links
    }

    /// Links in hook dispatch order.
    pub fn abilities(&self) -> Vec<&Ability> {
        let mut links = self.links();
        links.sort_by_key(|ability| ability.priority());
        links
    }

    fn dispatch_mut(&mut self) -> Vec<&mut Ability> {
        let mut links = Vec::new();
        collect_links_mut(self, &mut links);
        links.sort_by_key(|ability| ability.priority());
        links
    }

    pub fn power_level(&self) -> i32 {
        self.base()
            .power_level()
            .saturating_add(self.links().iter().map(|a| a.power_bonus()).sum::<i32>())
    }

    pub fn description(&self) -> String {
        let base = self.base().description();
        let abilities = self.abilities();
        if abilities.is_empty() {
            return base;
        }
        let names: Vec<&str> = abilities.iter().map(|a| a.name()).collect();
        format!("{} [{}]", base, names.join(", "))
    }

    pub fn begin_turn(&mut self) {
        for ability in self.dispatch_mut() {
            ability.on_begin_turn();
        }
    }

    pub fn end_turn(&mut self) {
        for ability in self.dispatch_mut() {
            ability.on_end_turn();
        }
    }

    pub fn modify_outgoing_damage(&mut self, base: i32) -> i32 {
        self.dispatch_mut()
            .into_iter()
            .fold(base, |damage, ability| ability.modify_outgoing_damage(damage))
    }

    /// Name of the first link that evades the hit, if any. Later links are not consulted.
    pub fn try_evade(&mut self, incoming: i32, rng: &mut dyn FnMut() -> f64) -> Option<&'static str> {
        for ability in self.dispatch_mut() {
            if ability.on_before_receive_damage(incoming, rng) {
                return Some(ability.name());
            }
        }
        None
    }

    pub fn modify_incoming_damage(&mut self, incoming: i32) -> i32 {
        self.dispatch_mut()
            .into_iter()
            .fold(incoming, |damage, ability| ability.modify_incoming_damage(damage))
    }

    pub fn heal_amount(&mut self) -> i32 {
        self.dispatch_mut()
            .into_iter()
            .map(|ability| ability.heal_amount())
            .sum()
    }
}

fn collect_links_mut<'a>(stack: &'a mut AbilityStack, out: &mut Vec<&'a mut Ability>) {
    if let AbilityStack::Layer { ability, inner } = stack {
        out.push(ability);
        collect_links_mut(inner, out);
    }
}
