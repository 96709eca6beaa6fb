use crate::core::abilities::{Ability, AbilityStack};
use crate::core::errors::{ValidationError, Violation};
use crate::core::state::{Combatant, StatRecord};
use crate::data::settings::GameSettings;
use tracing::debug;

/// Validates `input` and wraps it in the named abilities.
///
/// Every broken rule is collected before failing; nothing is built unless all
/// of them pass. Abilities wrap in list order, so the last name ends up
/// outermost.
pub fn build_combatant<S: AsRef<str>>(
    input: StatRecord,
    ability_names: &[S],
    settings: &GameSettings,
) -> Result<Combatant, ValidationError> {
    let mut violations = validate_stats(&input, settings);

    if ability_names.len() > settings.max_abilities {
        violations.push(Violation::TooManyAbilities {
            count: ability_names.len(),
            max: settings.max_abilities,
        });
    }

    let mut abilities = Vec::with_capacity(ability_names.len());
    for name in ability_names {
        match Ability::from_name(name.as_ref()) {
            Some(ability) => abilities.push(ability),
            None => violations.push(Violation::UnknownAbility(name.as_ref().to_string())),
        }
    }

    if !violations.is_empty() {
        return Err(ValidationError::new(violations));
    }

    let stack = abilities
        .into_iter()
        .fold(AbilityStack::new(input), |stack, ability| stack.wrap(ability));
    let combatant = Combatant::new(stack);
    debug!(combatant = %combatant.description(), "built combatant");
    Ok(combatant)
}

pub fn validate_stats(input: &StatRecord, settings: &GameSettings) -> Vec<Violation> {
    let mut violations = Vec::new();

    let name_len = input.name().trim().chars().count();
    if name_len == 0 {
        violations.push(Violation::EmptyName);
    } else if name_len > settings.max_name_length {
        violations.push(Violation::NameTooLong {
            len: name_len,
            max: settings.max_name_length,
        });
    }

    for (stat, value) in [
        ("Strength", input.strength()),
        ("Agility", input.agility()),
        ("Intelligence", input.intelligence()),
    ] {
        if value < 0 {
            violations.push(Violation::NegativeStat { stat, value });
        }
    }

    let total = input.total();
    if total > i64::from(settings.max_stat_points) {
        violations.push(Violation::StatSumExceeded {
            total,
            max: settings.max_stat_points,
        });
    }

    violations
}
