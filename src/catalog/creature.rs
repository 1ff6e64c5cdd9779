//! Creature reference data.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::instrument;

/// Locale of a creature name.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    /// French display name (the default guessing locale).
    #[default]
    French,
    /// English display name.
    English,
    /// Japanese display name.
    Japanese,
    /// Chinese display name.
    Chinese,
}

/// Names of a creature in every supported locale.
///
/// French and English are required; the other locales are empty when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct LocalizedNames {
    french: String,
    english: String,
    #[serde(default)]
    japanese: String,
    #[serde(default)]
    chinese: String,
}

impl LocalizedNames {
    /// Returns the name for the given locale.
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::French => &self.french,
            Locale::English => &self.english,
            Locale::Japanese => &self.japanese,
            Locale::Chinese => &self.chinese,
        }
    }
}

/// The six base attributes of a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct BaseStats {
    #[serde(rename = "HP")]
    hp: i32,
    #[serde(rename = "Attack")]
    attack: i32,
    #[serde(rename = "Defense")]
    defense: i32,
    #[serde(rename = "SpecialAttack", alias = "Sp. Attack")]
    special_attack: i32,
    #[serde(rename = "SpecialDefense", alias = "Sp. Defense")]
    special_defense: i32,
    #[serde(rename = "Speed")]
    speed: i32,
}

impl BaseStats {
    /// Returns all six attributes in declaration order.
    pub fn as_array(&self) -> [i32; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
    }
}

/// A catalog entry: the thing players try to name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Creature {
    id: i32,
    name: LocalizedNames,
    #[serde(rename = "type")]
    types: Vec<String>,
    base: BaseStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl Creature {
    /// Checks the structural rules a catalog entry must satisfy.
    ///
    /// Returns a human-readable reason for the first violated rule.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn validate(&self) -> Result<(), String> {
        if self.id <= 0 {
            return Err(format!("id must be positive, got {}", self.id));
        }
        if self.name.french.trim().is_empty() || self.name.english.trim().is_empty() {
            return Err("name.french and name.english are required".to_string());
        }
        if self.types.is_empty() || self.types.iter().any(|t| t.trim().is_empty()) {
            return Err("at least one non-empty type is required".to_string());
        }
        if self.base.as_array().iter().any(|v| *v < 0) {
            return Err("base attributes must be non-negative".to_string());
        }
        Ok(())
    }

    /// Returns a copy of this creature under a different catalog id.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }
}
