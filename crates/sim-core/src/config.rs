//! New-game configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vineyard the player owns at the start of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartingVineyard {
    pub name: String,
    pub varietal: String,
    pub region: String,
    pub size_acres: u32,
    pub age_of_vines: u32,
    pub soil_type: String,
    pub health: u8,
}

impl Default for StartingVineyard {
    fn default() -> Self {
        Self {
            name: "Home Block".to_string(),
            varietal: "Pinot Noir".to_string(),
            region: "Willamette Valley".to_string(),
            size_acres: 5,
            age_of_vines: 5,
            soil_type: "mixed".to_string(),
            health: 80,
        }
    }
}

/// Simulation configuration parameters. Every field has a default, so a
/// scenario file only needs to list what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the deterministic RNG.
    pub rng_seed: u64,
    /// Year of the first month (January).
    pub start_year: i32,
    pub starting_money: Decimal,
    pub starting_reputation: u32,
    pub player_name: String,
    pub winery_name: String,
    pub starting_vineyard: Option<StartingVineyard>,
    /// Vessel type names, bought for free at the start.
    pub starting_vessels: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_year: 2025,
            starting_money: Decimal::new(100_000, 0),
            starting_reputation: 50,
            player_name: "Winemaker".to_string(),
            winery_name: "Main Winery".to_string(),
            starting_vineyard: Some(StartingVineyard::default()),
            starting_vessels: vec![
                "Stainless Steel Tank".to_string(),
                "Open Top Fermenter".to_string(),
                "Neutral Oak Barrel (225L)".to_string(),
                "Neutral Oak Barrel (225L)".to_string(),
                "Neutral Oak Barrel (225L)".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: SimConfig = serde_yaml::from_str("rng_seed: 7\nstart_year: 1999\n").unwrap();
        assert_eq!(cfg.rng_seed, 7);
        assert_eq!(cfg.start_year, 1999);
        assert_eq!(cfg.starting_money, Decimal::new(100_000, 0));
        assert_eq!(cfg.starting_vessels.len(), 5);
    }
}
