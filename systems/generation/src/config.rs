use serde::Deserialize;

/// Tuning knobs of the level generator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Side length of a generation chunk in cells. Rounded up to a power of two.
    pub generate_area_size: u32,
    /// Distance in pixels from the player within which chunks are generated.
    pub generate_area_range: f32,
    /// Accumulated noise weight a room grows to.
    pub room_size_value: f32,
    /// Search budget for corridors connecting a new room to existing floor.
    pub room_connection_value: f32,
    /// Probability in `[0, 1]` that a cell seeds an enemy spawn.
    pub enemy_generation_chance: f32,
}

impl GenerationConfig {
    /// Noise level at or below which a cell seeds an enemy spawn.
    #[must_use]
    pub fn enemy_threshold(&self) -> f32 {
        self.enemy_generation_chance.clamp(0.0, 1.0) * 2.0 - 1.0
    }

    /// Chunk side length actually used, always a positive power of two.
    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        self.generate_area_size.max(1).next_power_of_two()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generate_area_size: 16,
            generate_area_range: 600.0,
            room_size_value: 40.0,
            room_connection_value: 60.0,
            enemy_generation_chance: 0.03,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let config: GenerationConfig =
            toml::from_str("room_size_value = 12.5\ngenerate_area_size = 12").expect("valid toml");
        assert_eq!(config.room_size_value, 12.5);
        assert_eq!(config.room_connection_value, 60.0);
        assert_eq!(config.chunk_size(), 16);
    }

    #[test]
    fn chance_maps_onto_noise_range() {
        let mut config = GenerationConfig::default();
        config.enemy_generation_chance = 0.0;
        assert_eq!(config.enemy_threshold(), -1.0);
        config.enemy_generation_chance = 1.0;
        assert_eq!(config.enemy_threshold(), 1.0);
    }
}
