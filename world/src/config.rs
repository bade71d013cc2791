//! Terrain generation parameters.

use isoworld_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Parameters recognised by terrain generation.
///
/// Missing keys fall back to their defaults when deserialising, and both
/// `snake_case` and `camelCase` key spellings are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of fractal noise passes.
    pub octaves: u32,
    /// Per-octave amplitude decay.
    pub persistence: f64,
    /// Per-octave frequency growth.
    pub lacunarity: f64,
    /// Base frequency of the first octave.
    pub scale: f64,
    /// Noise values below this become water.
    #[serde(alias = "waterLevel")]
    pub water_level: f64,
    /// Noise values below this (and not water) become sand.
    #[serde(alias = "sandLevel")]
    pub sand_level: f64,
    /// Noise values below this (and not sand) become grass.
    #[serde(alias = "grassLevel")]
    pub grass_level: f64,
    /// Noise values below this (and not grass) become rock; above is the
    /// mountain band, which is also rock.
    #[serde(alias = "rockLevel")]
    pub rock_level: f64,
    /// Probability that a grass tile grows a tree.
    #[serde(alias = "treeChance")]
    pub tree_chance: f64,
    /// Probability that a sand or treeless grass tile holds a boulder.
    #[serde(alias = "scatteredRockChance")]
    pub scattered_rock_chance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.05,
            water_level: 0.30,
            sand_level: 0.38,
            grass_level: 0.75,
            rock_level: 0.85,
            tree_chance: 0.01,
            scattered_rock_chance: 0.05,
        }
    }
}

impl GenerationConfig {
    /// Rejects configurations that cannot describe a terrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 {
            return Err(ConfigError::NoOctaves);
        }

        let numbers = [
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
            ("scale", self.scale),
            ("water_level", self.water_level),
            ("sand_level", self.sand_level),
            ("grass_level", self.grass_level),
            ("rock_level", self.rock_level),
            ("tree_chance", self.tree_chance),
            ("scattered_rock_chance", self.scattered_rock_chance),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NotFinite(*name));
        }

        if self.scale <= 0.0 {
            return Err(ConfigError::NonPositiveScale);
        }

        let unit = [
            ("water_level", self.water_level),
            ("sand_level", self.sand_level),
            ("grass_level", self.grass_level),
            ("rock_level", self.rock_level),
            ("tree_chance", self.tree_chance),
            ("scattered_rock_chance", self.scattered_rock_chance),
        ];
        if let Some((name, _)) = unit
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(ConfigError::OutOfUnitRange(*name));
        }

        let ascending = self.water_level <= self.sand_level
            && self.sand_level <= self.grass_level
            && self.grass_level <= self.rock_level;
        if !ascending {
            return Err(ConfigError::UnorderedThresholds);
        }

        Ok(())
    }
}
