use crate::core::errors::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Dodge roll tuning, in whole percent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeSettings {
    pub base_percent: u32,
    pub per_agility: u32,
    pub cap_percent: u32,
}

impl Default for DodgeSettings {
    fn default() -> Self {
        Self {
            base_percent: 30,
            per_agility: 2,
            cap_percent: 90,
        }
    }
}

/// Rules threaded into combatant building, the engine and the history store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub max_stat_points: i32,
    pub max_abilities: usize,
    pub max_name_length: usize,
    pub max_battles: usize,
    /// Combat actions after which a battle is forced to end.
    pub round_cap: u32,
    pub dodge: DodgeSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_stat_points: 30,
            max_abilities: 2,
            max_name_length: 50,
            max_battles: 50,
            round_cap: 1000,
            dodge: DodgeSettings::default(),
        }
    }
}

impl GameSettings {
    pub fn load_default() -> Result<Self, SettingsError> {
        const DEFAULT_SETTINGS_YAML: &str = include_str!("../../data/settings.yaml");
        Self::load_from_yaml_str(DEFAULT_SETTINGS_YAML)
    }

    pub fn load_from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        let settings: GameSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_yaml_str(&content)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.max_stat_points < 0 {
            return Err(SettingsError::Invalid(format!(
                "max_stat_points must not be negative (got {})",
                self.max_stat_points
            )));
        }
        if self.max_battles == 0 {
            return Err(SettingsError::Invalid("max_battles must be at least 1".to_string()));
        }
        if self.round_cap == 0 {
            return Err(SettingsError::Invalid("round_cap must be at least 1".to_string()));
        }
        if self.dodge.cap_percent > 100 {
            return Err(SettingsError::Invalid(format!(
                "dodge.cap_percent must be at most 100 (got {})",
                self.dodge.cap_percent
            )));
        }
        Ok(())
    }

    /// Percent chance for a combatant with `agility` to dodge while holding a charge.
    pub fn dodge_percent(&self, agility: i32) -> u32 {
        let bonus = self.dodge.per_agility.saturating_mul(agility.max(0) as u32);
        self.dodge
            .base_percent
            .saturating_add(bonus)
            .min(self.dodge.cap_percent)
    }
}
