use crate::core::errors::SettingsError;
use crate::core::log::ActionType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Tuning for one castable skill. Fields a skill does not use stay at zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Own turns the skill stays locked, counting the casting turn.
    #[serde(default)]
    pub cooldown: u32,
    /// Immediate damage (Fireball) or HP restored (Heal).
    #[serde(default)]
    pub amount: i32,
    #[serde(default)]
    pub charges: u32,
    #[serde(default)]
    pub bonus_damage: i32,
    #[serde(default)]
    pub bonus_turns: u32,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkillBook {
    skills: BTreeMap<ActionType, SkillData>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self {
            skills: BTreeMap::new(),
        }
    }

    pub fn minimal() -> Self {
        let mut book = Self::new();
        book.insert(
            ActionType::Surcharge,
            SkillData {
                name: "Surcharge".to_string(),
                description: "Next attack deals 150% damage".to_string(),
                cooldown: 3,
                amount: 0,
                charges: 0,
                bonus_damage: 0,
                bonus_turns: 0,
                multiplier: 1.5,
            },
        );
        book.insert(
            ActionType::Stealth,
            SkillData {
                name: "Stealth".to_string(),
                description: "Grants dodge charges against incoming hits".to_string(),
                cooldown: 4,
                amount: 0,
                charges: 3,
                bonus_damage: 0,
                bonus_turns: 0,
                multiplier: 1.0,
            },
        );
        book.insert(
            ActionType::Heal,
            SkillData {
                name: "Heal".to_string(),
                description: "Restores a fixed amount of HP".to_string(),
                cooldown: 3,
                amount: 25,
                charges: 0,
                bonus_damage: 0,
                bonus_turns: 0,
                multiplier: 1.0,
            },
        );
        book.insert(
            ActionType::Fireball,
            SkillData {
                name: "Fireball".to_string(),
                description: "Immediate fire damage, then a burning bonus on later attacks".to_string(),
                cooldown: 4,
                amount: 12,
                charges: 0,
                bonus_damage: 5,
                bonus_turns: 2,
                multiplier: 1.0,
            },
        );
        book.insert(
            ActionType::FireballBuff,
            SkillData {
                name: "Flame Imbue".to_string(),
                description: "Flat bonus damage on the next attacks".to_string(),
                cooldown: 3,
                amount: 0,
                charges: 0,
                bonus_damage: 4,
                bonus_turns: 3,
                multiplier: 1.0,
            },
        );
        book
    }

    pub fn load_default() -> Result<Self, SettingsError> {
        const DEFAULT_SKILLS_YAML: &str = include_str!("../../data/skills.yaml");
        Self::load_from_yaml_str(DEFAULT_SKILLS_YAML)
    }

    pub fn insert(&mut self, skill: ActionType, data: SkillData) {
        self.skills.insert(skill, data);
    }

    pub fn get(&self, skill: ActionType) -> Option<&SkillData> {
        self.skills.get(&skill)
    }

    pub fn as_map(&self) -> &BTreeMap<ActionType, SkillData> {
        &self.skills
    }

    pub fn load_from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        let map: BTreeMap<ActionType, SkillData> = serde_yaml::from_str(yaml)?;
        let mut book = Self::new();
        for (skill, data) in map {
            if !skill.is_skill() {
                return Err(SettingsError::Invalid(format!(
                    "{:?} is not a castable skill",
                    skill
                )));
            }
            book.insert(skill, data);
        }
        Ok(book)
    }

    pub fn load_from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_yaml_str(&content)
    }
}

impl Default for SkillBook {
    fn default() -> Self {
        Self::load_default().unwrap_or_else(|_| Self::minimal())
    }
}
