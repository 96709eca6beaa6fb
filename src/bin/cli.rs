use duel_engine::core::abilities::Ability;
use duel_engine::core::battle::BattleEngine;
use duel_engine::core::factory::build_combatant;
use duel_engine::core::history::{BattleHistory, HistoryStore};
use duel_engine::core::log::{ActionType, BattleAction};
use duel_engine::core::replay::{apply_edit, ReplayCursor};
use duel_engine::core::rng;
use duel_engine::core::state::{Autopilot, Battle, Combatant, Side, StatRecord};
use duel_engine::data::settings::GameSettings;
use duel_engine::data::skills::SkillBook;
use inquire::list_option::ListOption;
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, CustomUserError, MultiSelect, Select, Text};
use std::env;
use std::error::Error;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pilot {
    Manual,
    Auto(Autopilot),
}

impl fmt::Display for Pilot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pilot::Manual => write!(f, "Manual (choose every move)"),
            Pilot::Auto(Autopilot::Attacker) => write!(f, "Attacker (always attacks)"),
            Pilot::Auto(Autopilot::Tactician) => write!(f, "Tactician (uses skills)"),
        }
    }
}

impl Pilot {
    fn autopilot(self) -> Autopilot {
        match self {
            Pilot::Manual => Autopilot::Attacker,
            Pilot::Auto(autopilot) => autopilot,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=========================================");
    println!("             DUEL ENGINE CLI");
    println!("=========================================");
    println!();

    let settings = load_settings()?;
    let skills = load_skills()?;
    let engine = BattleEngine::new(settings.clone(), skills);
    let mut store = HistoryStore::from_settings(&settings);

    println!("Abilities:");
    for ability in Ability::catalogue() {
        println!(
            "  {:<15} [{}] {}",
            ability.name(),
            ability.priority().display_name(),
            ability.description()
        );
    }
    println!();

    let (fighter_a, pilot_a) = prompt_fighter("Fighter A", &settings)?;
    let (fighter_b, pilot_b) = prompt_fighter("Fighter B", &settings)?;

    let seed = match env::var("DUEL_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => seed,
        None => rand::random::<u64>(),
    };
    info!(seed, "seeding battle");
    let mut draws = rng::seeded(seed);

    let mut battle = engine.start_battle(fighter_a, fighter_b, [pilot_a.autopilot(), pilot_b.autopilot()]);
    print_fighters(&battle);

    while !battle.is_finished() {
        let side = battle.acting_side();
        let pilot = if side == Side::A { pilot_a } else { pilot_b };
        let chosen = match pilot {
            Pilot::Manual => Some(prompt_move(&battle, side)?),
            Pilot::Auto(_) => None,
        };
        let action = engine.resolve_next_action(&mut battle, chosen, &mut draws)?;
        print_action(&battle.history, &action);
    }
    if let Some(end) = battle.history.log.last() {
        println!("{}", end.description);
    }
    println!();

    let history = battle.history;
    store.record(history.clone());

    if Confirm::new("Edit one action and regenerate the rest?")
        .with_default(false)
        .prompt()?
    {
        match prompt_edit(&engine, &history, &mut draws)? {
            Some(variant) => {
                println!();
                println!("=== {} ===", variant.display_name);
                review(&variant);
                store.record(variant);
            }
            None => println!("Edit cancelled."),
        }
    }

    println!();
    println!("Battle history ({} / {}):", store.len(), store.capacity());
    for entry in store.all() {
        println!("  {}", entry.summary());
    }

    if Confirm::new("Print the latest history as JSON?")
        .with_default(false)
        .prompt()?
    {
        if let Some(latest) = store.all().next() {
            println!("{}", latest.to_json()?);
        }
    }
    Ok(())
}

fn load_settings() -> Result<GameSettings, Box<dyn Error>> {
    match env::var("DUEL_SETTINGS") {
        Ok(path) => Ok(GameSettings::load_from_yaml_file(Path::new(&path))?),
        Err(_) => Ok(GameSettings::load_default().unwrap_or_default()),
    }
}

fn load_skills() -> Result<SkillBook, Box<dyn Error>> {
    match env::var("DUEL_SKILLS") {
        Ok(path) => Ok(SkillBook::load_from_yaml_file(Path::new(&path))?),
        Err(_) => Ok(SkillBook::load_default().unwrap_or_else(|_| SkillBook::minimal())),
    }
}

fn prompt_fighter(label: &str, settings: &GameSettings) -> Result<(Combatant, Pilot), Box<dyn Error>> {
    println!("--- {} ({} stat points, up to {} abilities) ---", label, settings.max_stat_points, settings.max_abilities);
    loop {
        let name = Text::new("Name:").prompt()?;
        let strength = CustomType::<i32>::new("Strength:").with_default(10).prompt()?;
        let agility = CustomType::<i32>::new("Agility:").with_default(10).prompt()?;
        let intelligence = CustomType::<i32>::new("Intelligence:").with_default(10).prompt()?;

        let max = settings.max_abilities;
        let validator = move |selected: &[ListOption<&String>]| -> Result<Validation, CustomUserError> {
            if selected.len() > max {
                Ok(Validation::Invalid(format!("Pick at most {} abilities", max).into()))
            } else {
                Ok(Validation::Valid)
            }
        };
        let options: Vec<String> = Ability::catalogue()
            .iter()
            .map(|ability| ability.name().to_string())
            .collect();
        let abilities = MultiSelect::new("Abilities (space to toggle, enter to confirm):", options)
            .with_validator(validator)
            .prompt()?;

        let record = StatRecord::new(name, strength, agility, intelligence);
        match build_combatant(record, &abilities, settings) {
            Ok(combatant) => {
                let pilot = Select::new(
                    "Who controls this fighter?",
                    vec![
                        Pilot::Manual,
                        Pilot::Auto(Autopilot::Attacker),
                        Pilot::Auto(Autopilot::Tactician),
                    ],
                )
                .prompt()?;
                println!("  {} (power {})", combatant.description(), combatant.power_level());
                println!();
                return Ok((combatant, pilot));
            }
            Err(err) => {
                warn!(%err, "rejected combatant");
                println!("{}", err);
                println!("Try again.");
            }
        }
    }
}

fn prompt_move(battle: &Battle, side: Side) -> Result<ActionType, Box<dyn Error>> {
    let fighter = battle.fighter(side);
    let options: Vec<ActionType> = std::iter::once(ActionType::Attack)
        .chain(ActionType::SKILLS)
        .collect();
    let message = format!(
        "{} ({}/{} HP) - choose a move:",
        fighter.combatant.name(),
        fighter.hp,
        fighter.max_hp
    );
    Ok(Select::new(&message, options).prompt()?)
}

fn prompt_edit(
    engine: &BattleEngine,
    history: &BattleHistory,
    draws: &mut dyn FnMut() -> f64,
) -> Result<Option<BattleHistory>, Box<dyn Error>> {
    let candidates: Vec<(usize, String)> = history
        .log
        .actions()
        .iter()
        .enumerate()
        .filter(|(_, action)| action.modifiable)
        .map(|(index, action)| {
            (
                index,
                format!(
                    "#{} {}",
                    index,
                    action.formatted(
                        history.fighter(action.actor).name(),
                        history.fighter(action.target).name()
                    )
                ),
            )
        })
        .collect();
    if candidates.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = candidates.iter().map(|(_, label)| label.clone()).collect();
    let picked = Select::new("Action to edit:", labels).raw_prompt()?;
    let index = candidates[picked.index].0;
    let original = &history.log.actions()[index];

    let options: Vec<ActionType> = std::iter::once(ActionType::Attack)
        .chain(ActionType::SKILLS)
        .collect();
    let action_type = Select::new("New action type:", options).prompt()?;
    let damage = CustomType::<i32>::new("Damage dealt:")
        .with_default(original.damage)
        .prompt()?;
    let description = format!(
        "{} uses {} (edited, {} damage)",
        history.fighter(original.actor).name(),
        action_type,
        damage
    );
    let edit = BattleAction::edited(action_type, original.actor, damage, description);

    match apply_edit(engine, history, index, &edit, draws) {
        Ok(variant) => Ok(Some(variant)),
        Err(err) => {
            println!("Edit rejected: {}", err);
            Ok(None)
        }
    }
}

fn print_fighters(battle: &Battle) {
    for side in [Side::A, Side::B] {
        let fighter = battle.fighter(side);
        println!("{}: {} - {} HP", side, fighter.combatant.description(), fighter.max_hp);
    }
    println!();
}

fn print_action(history: &BattleHistory, action: &BattleAction) {
    println!(
        "{:<45} | {}  [A {} / B {}]",
        action.formatted(
            history.fighter(action.actor).name(),
            history.fighter(action.target).name()
        ),
        action.description,
        action.hp_after.a,
        action.hp_after.b
    );
}

fn review(history: &BattleHistory) {
    let mut cursor = ReplayCursor::new(history);
    if let Some(action) = cursor.current() {
        print_action(history, action);
    }
    while let Some(action) = cursor.step_forward() {
        print_action(history, action);
    }
    println!("{}", history.summary());
}
