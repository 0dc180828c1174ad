//! Difficulty factors and the direction each one pushes challenge
//!
//! The factor set is closed: every profile defines every factor, and the
//! decision step reads the `Direction` tag instead of guessing from names.

use crate::core::error::DdaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One tunable gameplay dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyFactor {
    EnemyDamage,
    EnemyHp,
    EnemySpeed,
    ResourceAbundance,
    ItemRarity,
}

/// Which way raising a factor moves the challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Higher value = harder game (enemy stats)
    RaisesChallenge,
    /// Higher value = easier game (loot, resources)
    LowersChallenge,
}

impl DifficultyFactor {
    /// All factors, in table order
    pub const ALL: [DifficultyFactor; 5] = [
        DifficultyFactor::EnemyDamage,
        DifficultyFactor::EnemyHp,
        DifficultyFactor::EnemySpeed,
        DifficultyFactor::ResourceAbundance,
        DifficultyFactor::ItemRarity,
    ];

    /// Key used in save files, config and the string read API
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyFactor::EnemyDamage => "enemy_damage",
            DifficultyFactor::EnemyHp => "enemy_hp",
            DifficultyFactor::EnemySpeed => "enemy_speed",
            DifficultyFactor::ResourceAbundance => "resource_abundance",
            DifficultyFactor::ItemRarity => "item_rarity",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            DifficultyFactor::EnemyDamage
            | DifficultyFactor::EnemyHp
            | DifficultyFactor::EnemySpeed => Direction::RaisesChallenge,
            DifficultyFactor::ResourceAbundance | DifficultyFactor::ItemRarity => {
                Direction::LowersChallenge
            }
        }
    }
}

impl fmt::Display for DifficultyFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyFactor {
    type Err = DdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyFactor::ALL
            .into_iter()
            .find(|factor| factor.as_str() == s)
            .ok_or_else(|| DdaError::UnknownFactor(s.to_string()))
    }
}
