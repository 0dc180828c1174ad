//! Difficulty profiles and the registry that owns them
//!
//! Seven tiers are built in. Hosts may add or replace tiers from TOML
//! before handing the registry to a controller:
//!
//! ```toml
//! [profiles.casual]
//! name = "Casual"
//! target_performance = 0.35
//! adaptation_speed = 0.06
//!
//! [profiles.casual.parameters.enemy_damage]
//! current = 0.6
//! min = 0.4
//! max = 0.9
//! ```
//!
//! Every profile must list every factor.

use crate::core::error::{DdaError, Result};
use crate::difficulty::factor::DifficultyFactor;
use crate::difficulty::parameter::BoundedParameter;
use ahash::AHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Smoothing rate shared by every built-in parameter
pub const DEFAULT_ADJUSTMENT_RATE: f64 = 0.1;

/// One parameter per factor
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    pub enemy_damage: BoundedParameter,
    pub enemy_hp: BoundedParameter,
    pub enemy_speed: BoundedParameter,
    pub resource_abundance: BoundedParameter,
    pub item_rarity: BoundedParameter,
}

impl FactorTable {
    pub fn get(&self, factor: DifficultyFactor) -> &BoundedParameter {
        match factor {
            DifficultyFactor::EnemyDamage => &self.enemy_damage,
            DifficultyFactor::EnemyHp => &self.enemy_hp,
            DifficultyFactor::EnemySpeed => &self.enemy_speed,
            DifficultyFactor::ResourceAbundance => &self.resource_abundance,
            DifficultyFactor::ItemRarity => &self.item_rarity,
        }
    }

    pub fn get_mut(&mut self, factor: DifficultyFactor) -> &mut BoundedParameter {
        match factor {
            DifficultyFactor::EnemyDamage => &mut self.enemy_damage,
            DifficultyFactor::EnemyHp => &mut self.enemy_hp,
            DifficultyFactor::EnemySpeed => &mut self.enemy_speed,
            DifficultyFactor::ResourceAbundance => &mut self.resource_abundance,
            DifficultyFactor::ItemRarity => &mut self.item_rarity,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundedParameter> {
        DifficultyFactor::ALL.into_iter().map(move |f| self.get(f))
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut BoundedParameter)) {
        for factor in DifficultyFactor::ALL {
            f(self.get_mut(factor));
        }
    }
}

/// A named difficulty tier
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    /// Registry key, e.g. "very_hard"
    pub key: String,
    /// Human-readable name for UI
    pub name: String,
    pub description: String,
    pub parameters: FactorTable,
    /// Score the controller steers the player towards (0.0 to 1.0)
    pub target_performance: f64,
    /// Fractional step applied to targets per decision (0.0 to 1.0]
    pub adaptation_speed: f64,
}

impl DifficultyProfile {
    pub fn parameter(&self, factor: DifficultyFactor) -> &BoundedParameter {
        self.parameters.get(factor)
    }
}

/// (current, min, max) for each factor in `DifficultyFactor::ALL` order
type Ranges = [(f64, f64, f64); 5];

struct BuiltinTier {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    target_performance: f64,
    adaptation_speed: f64,
    ranges: Ranges,
}

const BUILTIN_TIERS: [BuiltinTier; 7] = [
    BuiltinTier {
        key: "very_easy",
        name: "Very Easy",
        description: "Ideal for newcomers",
        target_performance: 0.3,
        adaptation_speed: 0.05,
        ranges: [(0.5, 0.3, 0.8), (0.6, 0.4, 0.9), (0.7, 0.5, 0.9), (1.5, 1.2, 2.0), (1.3, 1.1, 1.6)],
    },
    BuiltinTier {
        key: "easy",
        name: "Easy",
        description: "Suited to beginning players",
        target_performance: 0.4,
        adaptation_speed: 0.08,
        ranges: [(0.7, 0.5, 1.0), (0.8, 0.6, 1.1), (0.8, 0.6, 1.0), (1.2, 1.0, 1.5), (1.1, 1.0, 1.3)],
    },
    BuiltinTier {
        key: "normal",
        name: "Normal",
        description: "Balanced challenge",
        target_performance: 0.5,
        adaptation_speed: 0.1,
        ranges: [(1.0, 0.8, 1.2), (1.0, 0.8, 1.2), (1.0, 0.8, 1.2), (1.0, 0.8, 1.2), (1.0, 0.8, 1.2)],
    },
    BuiltinTier {
        key: "hard",
        name: "Hard",
        description: "For experienced players",
        target_performance: 0.6,
        adaptation_speed: 0.12,
        ranges: [(1.3, 1.1, 1.6), (1.2, 1.0, 1.5), (1.2, 1.0, 1.5), (0.8, 0.6, 1.0), (0.9, 0.7, 1.1)],
    },
    BuiltinTier {
        key: "very_hard",
        name: "Very Hard",
        description: "For masters of the game",
        target_performance: 0.7,
        adaptation_speed: 0.15,
        ranges: [(1.6, 1.3, 2.0), (1.5, 1.2, 1.8), (1.4, 1.1, 1.7), (0.6, 0.4, 0.8), (0.7, 0.5, 0.9)],
    },
    BuiltinTier {
        key: "extreme",
        name: "Extreme",
        description: "Challenge at the limit",
        target_performance: 0.8,
        adaptation_speed: 0.18,
        ranges: [(2.0, 1.6, 2.5), (1.8, 1.5, 2.2), (1.7, 1.4, 2.0), (0.4, 0.2, 0.6), (0.5, 0.3, 0.7)],
    },
    BuiltinTier {
        key: "nightmare",
        name: "Nightmare",
        description: "Practically impossible",
        target_performance: 0.9,
        adaptation_speed: 0.2,
        ranges: [(2.5, 2.0, 3.0), (2.2, 1.8, 2.6), (2.0, 1.7, 2.3), (0.2, 0.1, 0.4), (0.3, 0.1, 0.5)],
    },
];

impl BuiltinTier {
    fn build(&self) -> DifficultyProfile {
        let param = |i: usize| {
            let (current, min, max) = self.ranges[i];
            BoundedParameter::builtin(
                DifficultyFactor::ALL[i],
                1.0,
                current,
                min,
                max,
                DEFAULT_ADJUSTMENT_RATE,
            )
        };

        DifficultyProfile {
            key: self.key.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: FactorTable {
                enemy_damage: param(0),
                enemy_hp: param(1),
                enemy_speed: param(2),
                resource_abundance: param(3),
                item_rarity: param(4),
            },
            target_performance: self.target_performance,
            adaptation_speed: self.adaptation_speed,
        }
    }
}

// === TOML DEFINITIONS ===

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: BTreeMap<String, ProfileDef>,
}

#[derive(Debug, Deserialize)]
struct ProfileDef {
    name: Option<String>,
    #[serde(default)]
    description: String,
    target_performance: f64,
    adaptation_speed: f64,
    #[serde(default)]
    parameters: BTreeMap<String, ParameterDef>,
}

#[derive(Debug, Deserialize)]
struct ParameterDef {
    #[serde(default = "default_base")]
    base: f64,
    current: f64,
    min: f64,
    max: f64,
    #[serde(default = "default_rate")]
    adjustment_rate: f64,
}

fn default_base() -> f64 {
    1.0
}

fn default_rate() -> f64 {
    DEFAULT_ADJUSTMENT_RATE
}

impl ProfileDef {
    fn into_profile(self, key: &str) -> Result<DifficultyProfile> {
        if !(0.0..=1.0).contains(&self.target_performance) {
            return Err(DdaError::InvalidParameter {
                name: format!("{}.target_performance", key),
                reason: format!("{} is outside [0, 1]", self.target_performance),
            });
        }
        if !(self.adaptation_speed > 0.0 && self.adaptation_speed <= 1.0) {
            return Err(DdaError::InvalidParameter {
                name: format!("{}.adaptation_speed", key),
                reason: format!("{} is outside (0, 1]", self.adaptation_speed),
            });
        }

        let mut defs: BTreeMap<DifficultyFactor, ParameterDef> = BTreeMap::new();
        for (name, def) in self.parameters {
            defs.insert(name.parse()?, def);
        }

        let mut take = |factor: DifficultyFactor| -> Result<BoundedParameter> {
            let def = defs.remove(&factor).ok_or_else(|| DdaError::MissingFactor {
                profile: key.to_string(),
                factor: factor.as_str().to_string(),
            })?;
            BoundedParameter::new(factor, def.base, def.current, def.min, def.max, def.adjustment_rate)
        };

        let parameters = FactorTable {
            enemy_damage: take(DifficultyFactor::EnemyDamage)?,
            enemy_hp: take(DifficultyFactor::EnemyHp)?,
            enemy_speed: take(DifficultyFactor::EnemySpeed)?,
            resource_abundance: take(DifficultyFactor::ResourceAbundance)?,
            item_rarity: take(DifficultyFactor::ItemRarity)?,
        };

        Ok(DifficultyProfile {
            key: key.to_string(),
            name: self.name.unwrap_or_else(|| key.to_string()),
            description: self.description,
            parameters,
            target_performance: self.target_performance,
            adaptation_speed: self.adaptation_speed,
        })
    }
}

/// All known profiles, keyed by registry key
///
/// Profiles are never removed, so an index handed out by `index_of`
/// stays valid for the registry's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<DifficultyProfile>,
    index: AHashMap<String, usize>,
}

impl ProfileRegistry {
    /// Registry with no profiles
    pub fn empty() -> Self {
        Self::default()
    }

    /// The seven built-in tiers, very_easy through nightmare
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for tier in &BUILTIN_TIERS {
            registry.insert(tier.build());
        }
        registry
    }

    /// Add or replace a profile; returns the one it replaced
    pub fn insert(&mut self, profile: DifficultyProfile) -> Option<DifficultyProfile> {
        match self.index.get(&profile.key) {
            Some(&i) => Some(std::mem::replace(&mut self.profiles[i], profile)),
            None => {
                self.index.insert(profile.key.clone(), self.profiles.len());
                self.profiles.push(profile);
                None
            }
        }
    }

    /// Add or replace profiles from a TOML document
    ///
    /// The whole document is validated before any profile is inserted.
    /// Returns the keys that were added, sorted.
    pub fn extend_from_toml(&mut self, content: &str) -> Result<Vec<String>> {
        let file: ProfileFile = toml::from_str(content)?;

        let mut parsed = Vec::with_capacity(file.profiles.len());
        for (key, def) in file.profiles {
            parsed.push(def.into_profile(&key)?);
        }

        let keys = parsed.iter().map(|p| p.key.clone()).collect();
        for profile in parsed {
            tracing::debug!("Registered difficulty profile '{}'", profile.key);
            self.insert(profile);
        }
        Ok(keys)
    }

    pub fn get(&self, key: &str) -> Option<&DifficultyProfile> {
        self.index_of(key).map(|i| &self.profiles[i])
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub(crate) fn by_index(&self, i: usize) -> &DifficultyProfile {
        &self.profiles[i]
    }

    pub(crate) fn by_index_mut(&mut self, i: usize) -> &mut DifficultyProfile {
        &mut self.profiles[i]
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile keys from easiest to hardest (by target performance)
    pub fn keys_by_tier(&self) -> Vec<&str> {
        let mut profiles: Vec<&DifficultyProfile> = self.profiles.iter().collect();
        profiles.sort_by(|a, b| {
            a.target_performance
                .total_cmp(&b.target_performance)
                .then_with(|| a.key.cmp(&b.key))
        });
        profiles.into_iter().map(|p| p.key.as_str()).collect()
    }
}
