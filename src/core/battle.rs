use crate::ai::simple::choose_action;
use crate::core::errors::BattleError;
use crate::core::history::{Anomaly, BattleHistory};
use crate::core::log::{ActionLog, ActionOrigin, ActionOutcome, ActionType, BattleAction};
use crate::core::state::{Autopilot, Battle, BattleStatus, Combatant, FighterState, Side};
use crate::core::utils::{roll_inclusive, round_for, scale_damage};
use crate::data::settings::GameSettings;
use crate::data::skills::{SkillBook, SkillData};
use tracing::{debug, info, warn};

const DEFAULT_EMPOWER_MULTIPLIER: f64 = 1.5;

#[derive(Clone, Debug, Default)]
pub struct BattleEngine {
    pub settings: GameSettings,
    pub skills: SkillBook,
}

/// What the chosen move did, before turn bookkeeping.
struct Effect {
    damage: i32,
    healed: i32,
    outcome: ActionOutcome,
    description: String,
}

enum Delivery {
    Hit(i32),
    Dodged(&'static str),
}

impl BattleEngine {
    pub fn new(settings: GameSettings, skills: SkillBook) -> Self {
        Self { settings, skills }
    }

    /// A battle that has not begun. Any action on it is rejected until [`BattleEngine::start`].
    pub fn prepare_battle(&self, a: Combatant, b: Combatant, autopilot: [Autopilot; 2]) -> Battle {
        let history = BattleHistory::new(a.clone(), b.clone(), autopilot);
        Battle {
            fighters: [FighterState::new(Side::A, a), FighterState::new(Side::B, b)],
            status: BattleStatus::NotStarted,
            combat_actions: 0,
            history,
        }
    }

    pub fn start(&self, battle: &mut Battle) -> Result<(), BattleError> {
        match battle.status {
            BattleStatus::NotStarted => {
                self.open(battle);
                Ok(())
            }
            BattleStatus::InProgress => Err(BattleError::AlreadyStarted),
            BattleStatus::Finished => Err(BattleError::Finished),
        }
    }

    pub fn start_battle(&self, a: Combatant, b: Combatant, autopilot: [Autopilot; 2]) -> Battle {
        let mut battle = self.prepare_battle(a, b, autopilot);
        self.open(&mut battle);
        battle
    }

    fn open(&self, battle: &mut Battle) {
        let marker = BattleAction::marker(
            ActionType::Start,
            round_for(0),
            Side::A,
            format!("{} begins", battle.history.display_name),
            battle.hp(),
        );
        battle.history.log = ActionLog::starting_with(marker);
        battle.status = BattleStatus::InProgress;
        info!(
            id = %battle.history.id,
            a = %battle.fighter(Side::A).combatant.description(),
            b = %battle.fighter(Side::B).combatant.description(),
            "battle started"
        );
    }

    /// Resolves the acting side's next move and appends it to the log.
    ///
    /// `chosen` overrides the side's autopilot. Draws taken from `rng` are
    /// recorded on the returned action. On error `battle` is left untouched.
    pub fn resolve_next_action(
        &self,
        battle: &mut Battle,
        chosen: Option<ActionType>,
        rng: &mut dyn FnMut() -> f64,
    ) -> Result<BattleAction, BattleError> {
        ensure_in_progress(battle)?;
        let actor = battle.acting_side();
        let action_type = match chosen {
            Some(action_type) => action_type,
            None => choose_action(battle, actor, &self.skills),
        };
        if action_type.is_marker() {
            return Err(BattleError::MarkerNotPlayable(action_type));
        }

        let mut next = battle.clone();
        let mut rng_log = Vec::new();
        let mut action = {
            let mut rng_recorder = || {
                let v = rng();
                rng_log.push(v);
                v
            };
            self.resolve_turn(&mut next, actor, action_type, &mut rng_recorder)
        };
        action.rng = rng_log;

        self.commit(&mut next, action.clone())?;
        *battle = next;
        Ok(action)
    }

    /// Applies a caller-authored action as a forced outcome: its own damage
    /// plus the skill's buff and cooldown side effects, with no random draws.
    pub fn apply_forced(&self, battle: &mut Battle, forced: &BattleAction) -> Result<BattleAction, BattleError> {
        ensure_in_progress(battle)?;
        if forced.action_type.is_marker() {
            return Err(BattleError::MarkerNotPlayable(forced.action_type));
        }
        let actor = battle.acting_side();
        if forced.actor != actor {
            return Err(BattleError::OutOfTurn {
                expected: actor,
                actual: forced.actor,
            });
        }
        if forced.action_type.is_skill() {
            let turns = battle.fighter(actor).buffs.cooldown(forced.action_type);
            if turns > 0 {
                return Err(BattleError::OnCooldown {
                    skill: forced.action_type,
                    turns,
                });
            }
        }

        let mut next = battle.clone();
        let target = actor.other();
        let round = round_for(next.combat_actions);
        let mut healed = self.begin_turn(&mut next, actor);
        let damage = forced.damage.max(0);

        match forced.action_type {
            ActionType::Attack => {
                let buffs = &mut next.fighter_mut(actor).buffs;
                buffs.take_bonus();
                buffs.next_hit_empowered = false;
            }
            skill => {
                if let Some(data) = self.skills.get(skill) {
                    let fighter = next.fighter_mut(actor);
                    fighter.buffs.start_cooldown(skill, data.cooldown);
                    healed += apply_skill(fighter, skill, data);
                }
            }
        }
        if damage > 0 {
            let defender = next.fighter_mut(target);
            defender.hp = (defender.hp - damage).max(0);
        }
        self.end_turn(&mut next, actor);

        let description = if forced.description.trim().is_empty() {
            format!(
                "{} uses {} on {} (edited, {} damage)",
                next.fighter(actor).combatant.name(),
                forced.action_type.label(),
                next.fighter(target).combatant.name(),
                damage
            )
        } else {
            forced.description.clone()
        };
        let outcome = ActionOutcome::for_edit(forced.action_type, damage);
        let action = BattleAction {
            round,
            actor,
            target,
            action_type: forced.action_type,
            description,
            damage,
            healed,
            modifiable: true,
            outcome,
            hp_after: next.hp(),
            rng: Vec::new(),
            origin: ActionOrigin::Edited,
        };

        self.commit(&mut next, action.clone())?;
        *battle = next;
        Ok(action)
    }

    fn resolve_turn(
        &self,
        next: &mut Battle,
        actor: Side,
        action_type: ActionType,
        rng: &mut dyn FnMut() -> f64,
    ) -> BattleAction {
        let target = actor.other();
        let round = round_for(next.combat_actions);
        let stack_healed = self.begin_turn(next, actor);

        let mut effect = match action_type {
            ActionType::Attack => self.attack(next, actor, rng),
            skill => self.cast(next, actor, skill, rng),
        };
        if stack_healed > 0 {
            effect.description = format!(
                "{}; {} recovers {} HP",
                effect.description,
                next.fighter(actor).combatant.name(),
                stack_healed
            );
        }
        self.end_turn(next, actor);

        BattleAction {
            round,
            actor,
            target,
            action_type,
            description: effect.description,
            damage: effect.damage,
            healed: stack_healed + effect.healed,
            modifiable: true,
            outcome: effect.outcome,
            hp_after: next.hp(),
            rng: Vec::new(),
            origin: ActionOrigin::Engine,
        }
    }

    /// Begin hooks, then the stack's own healing. Returns HP restored.
    fn begin_turn(&self, next: &mut Battle, actor: Side) -> i32 {
        let fighter = next.fighter_mut(actor);
        fighter.combatant.stack.begin_turn();
        let amount = fighter.combatant.stack.heal_amount();
        fighter.restore(amount)
    }

    fn end_turn(&self, next: &mut Battle, actor: Side) {
        let fighter = next.fighter_mut(actor);
        fighter.combatant.stack.end_turn();
        fighter.buffs.tick_cooldowns();
        next.combat_actions += 1;
    }

    fn attack(&self, next: &mut Battle, actor: Side, rng: &mut dyn FnMut() -> f64) -> Effect {
        let multiplier = self
            .skills
            .get(ActionType::Surcharge)
            .map(|data| data.multiplier)
            .unwrap_or(DEFAULT_EMPOWER_MULTIPLIER);
        let attacker = next.fighter_mut(actor);
        let strength = attacker.combatant.stats().strength().max(0);
        let damage = strength.saturating_add(roll_inclusive(rng(), strength / 2));
        let mut damage = damage.saturating_add(attacker.buffs.take_bonus());
        if attacker.buffs.next_hit_empowered {
            damage = scale_damage(damage, multiplier);
            attacker.buffs.next_hit_empowered = false;
        }
        let damage = attacker.combatant.stack.modify_outgoing_damage(damage).max(0);

        let attacker_name = next.fighter(actor).combatant.name().to_string();
        let defender_name = next.fighter(actor.other()).combatant.name().to_string();
        if damage == 0 {
            return Effect {
                damage: 0,
                healed: 0,
                outcome: ActionOutcome::Hit,
                description: format!("{}'s attack deals no damage", attacker_name),
            };
        }
        match self.deliver(next, actor.other(), damage, rng) {
            Delivery::Hit(dealt) => Effect {
                damage: dealt,
                healed: 0,
                outcome: ActionOutcome::Hit,
                description: format!("{} attacks {} for {} damage", attacker_name, defender_name, dealt),
            },
            Delivery::Dodged(source) => Effect {
                damage: 0,
                healed: 0,
                outcome: ActionOutcome::Dodged,
                description: format!("{} dodges {}'s attack ({})", defender_name, attacker_name, source),
            },
        }
    }

    /// Defender's evade hooks, then a stealth charge roll, then incoming hooks.
    fn deliver(&self, next: &mut Battle, target: Side, damage: i32, rng: &mut dyn FnMut() -> f64) -> Delivery {
        let dodge_percent = self
            .settings
            .dodge_percent(next.fighter(target).combatant.stats().agility());
        let defender = next.fighter_mut(target);

        if let Some(source) = defender.combatant.stack.try_evade(damage, rng) {
            return Delivery::Dodged(source);
        }
        if defender.buffs.dodge_charges_remaining > 0 {
            defender.buffs.dodge_charges_remaining -= 1;
            if rng() * 100.0 < dodge_percent as f64 {
                return Delivery::Dodged("Stealth");
            }
        }
        let dealt = defender.combatant.stack.modify_incoming_damage(damage).max(0);
        defender.hp = (defender.hp - dealt).max(0);
        Delivery::Hit(dealt)
    }

    fn cast(&self, next: &mut Battle, actor: Side, skill: ActionType, rng: &mut dyn FnMut() -> f64) -> Effect {
        let actor_name = next.fighter(actor).combatant.name().to_string();
        let target_name = next.fighter(actor.other()).combatant.name().to_string();

        let turns = next.fighter(actor).buffs.cooldown(skill);
        if turns > 0 {
            return Effect {
                damage: 0,
                healed: 0,
                outcome: ActionOutcome::Rejected,
                description: format!(
                    "{} tries {} but it is recharging ({} turns left)",
                    actor_name,
                    skill.label(),
                    turns
                ),
            };
        }
        let Some(data) = self.skills.get(skill) else {
            return Effect {
                damage: 0,
                healed: 0,
                outcome: ActionOutcome::Rejected,
                description: format!("{} does not know {}", actor_name, skill.label()),
            };
        };

        let fighter = next.fighter_mut(actor);
        fighter.buffs.start_cooldown(skill, data.cooldown);
        let healed = apply_skill(fighter, skill, data);

        match skill {
            ActionType::Fireball => match self.deliver(next, actor.other(), data.amount.max(0), rng) {
                Delivery::Hit(dealt) => Effect {
                    damage: dealt,
                    healed,
                    outcome: ActionOutcome::Hit,
                    description: format!("{} hurls a fireball at {} for {} damage", actor_name, target_name, dealt),
                },
                Delivery::Dodged(source) => Effect {
                    damage: 0,
                    healed,
                    outcome: ActionOutcome::Dodged,
                    description: format!("{} dodges {}'s fireball ({})", target_name, actor_name, source),
                },
            },
            ActionType::Surcharge => Effect {
                damage: 0,
                healed,
                outcome: ActionOutcome::Applied,
                description: format!("{} charges up: next hit deals x{}", actor_name, data.multiplier),
            },
            ActionType::Stealth => Effect {
                damage: 0,
                healed,
                outcome: ActionOutcome::Applied,
                description: format!("{} slips into the shadows ({} dodge charges)", actor_name, data.charges),
            },
            ActionType::Heal => Effect {
                damage: 0,
                healed,
                outcome: ActionOutcome::Applied,
                description: format!("{} heals {} HP", actor_name, healed),
            },
            _ => Effect {
                damage: 0,
                healed,
                outcome: ActionOutcome::Applied,
                description: format!(
                    "{} imbues flames (+{} damage for {} attacks)",
                    actor_name, data.bonus_damage, data.bonus_turns
                ),
            },
        }
    }

    fn commit(&self, next: &mut Battle, action: BattleAction) -> Result<(), BattleError> {
        debug!(
            round = action.round,
            actor = %action.actor,
            action = ?action.action_type,
            outcome = ?action.outcome,
            damage = action.damage,
            "resolved action"
        );
        next.history.log.append(action)?;
        self.check_terminal(next)
    }

    /// Closes the battle when a side is down or the round cap is hit.
    fn check_terminal(&self, next: &mut Battle) -> Result<(), BattleError> {
        let downed = [Side::A, Side::B]
            .into_iter()
            .find(|side| next.fighter(*side).is_down());
        let winner = match downed {
            Some(side) => side.other(),
            None if next.combat_actions >= self.settings.round_cap => {
                let hp = next.hp();
                let winner = if hp.a > hp.b { Side::A } else { Side::B };
                warn!(
                    id = %next.history.id,
                    round_cap = self.settings.round_cap,
                    hp_a = hp.a,
                    hp_b = hp.b,
                    "round cap reached, deciding on remaining HP"
                );
                next.history.anomaly = Some(Anomaly::RoundCapReached);
                winner
            }
            None => return Ok(()),
        };

        let round = next.history.log.last().map(|a| a.round).unwrap_or(1);
        let marker = BattleAction::marker(
            ActionType::End,
            round,
            winner,
            format!("{} wins", next.fighter(winner).combatant.name()),
            next.hp(),
        );
        next.history.log.append(marker)?;
        next.history.winner = Some(winner);
        next.status = BattleStatus::Finished;
        info!(
            id = %next.history.id,
            winner = %next.fighter(winner).combatant.name(),
            actions = next.history.log.len(),
            "battle finished"
        );
        Ok(())
    }
}

fn ensure_in_progress(battle: &Battle) -> Result<(), BattleError> {
    match battle.status {
        BattleStatus::NotStarted => Err(BattleError::NotStarted),
        BattleStatus::Finished => Err(BattleError::Finished),
        BattleStatus::InProgress => Ok(()),
    }
}

/// Buff side effects of a successful cast. Returns HP restored.
fn apply_skill(fighter: &mut FighterState, skill: ActionType, data: &SkillData) -> i32 {
    match skill {
        ActionType::Surcharge => {
            fighter.buffs.next_hit_empowered = true;
            0
        }
        ActionType::Stealth => {
            fighter.buffs.dodge_charges_remaining += data.charges;
            0
        }
        ActionType::Heal => fighter.restore(data.amount),
        ActionType::Fireball | ActionType::FireballBuff => {
            fighter.buffs.pending_bonus_damage = data.bonus_damage;
            fighter.buffs.pending_bonus_turns = data.bonus_turns;
            0
        }
        ActionType::Attack | ActionType::Start | ActionType::End => 0,
    }
}
