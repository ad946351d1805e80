//! Mutable nouns of the simulation, all owned by one [`Estate`].

use crate::calendar::Calendar;
use crate::catalog::{Catalog, CatalogError, GrapeColor};
use crate::config::SimConfig;
use crate::ids::{BottledWineId, GrapeLotId, MustLotId, VesselId, WineLotId};
use crate::rng::RngCheckpoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for vineyard health and lot quality.
pub const MAX_SCORE: u8 = 100;

/// A planted vineyard owned by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vineyard {
    /// Unique per player.
    pub name: String,
    /// Grape planted; a key of the catalog's grapes.
    pub varietal: String,
    /// Region the vineyard was bought in.
    pub region: String,
    /// Planted area in acres; scales the harvest.
    pub size_acres: u32,
    /// Vine age in years.
    pub age_of_vines: u32,
    pub soil_type: String,
    /// In [0, 100].
    pub health: u8,
    /// Set in the varietal's ripening month, cleared at year end.
    pub grapes_ready: bool,
    pub harvested_this_year: bool,
}

impl Vineyard {
    pub const DEFAULT_HEALTH: u8 = 80;

    pub fn is_harvestable(&self) -> bool {
        self.grapes_ready && !self.harvested_this_year
    }
}

/// Freshly harvested grapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrapeLot {
    pub id: GrapeLotId,
    pub varietal: String,
    /// Year of harvest.
    pub vintage: i32,
    /// Picked weight in kilograms.
    pub quantity_kg: f64,
    /// In [1, 100].
    pub quality: u8,
}

/// Whether the grapes were hand sorted before crushing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMethod {
    Sorted,
    Unsorted,
}

/// How clusters are handled before fermentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestemCrush {
    #[serde(alias = "Whole Cluster")]
    WholeCluster,
    #[serde(alias = "Partial Destem")]
    PartialDestem,
    #[serde(alias = "Destemmed/Crushed")]
    DestemmedCrushed,
}

impl fmt::Display for DestemCrush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DestemCrush::WholeCluster => "Whole Cluster",
            DestemCrush::PartialDestem => "Partial Destem",
            DestemCrush::DestemmedCrushed => "Destemmed/Crushed",
        })
    }
}

/// Processed grapes waiting for a fermentation vessel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MustLot {
    pub id: MustLotId,
    pub varietal: String,
    /// Year the grapes were harvested.
    pub vintage: i32,
    /// Kilograms; yields 0.75 L of juice per kg.
    pub quantity_kg: f64,
    /// At least 1. Crushing bonuses may push it slightly past 100.
    pub quality: u8,
    pub processing_method: ProcessingMethod,
    pub destem_crush: DestemCrush,
}

/// A physical container in the winery. Vessels are never destroyed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub id: VesselId,
    /// Catalog vessel type name.
    pub vessel_type: String,
    /// Liters.
    pub capacity: u32,
    /// True iff exactly one wine lot occupies this vessel.
    pub in_use: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fermenting,
    Aging,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fermenting => f.write_str("fermenting"),
            Stage::Aging => f.write_str("aging"),
        }
    }
}

/// Wine occupying a vessel, either fermenting or aging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WineInProduction {
    pub id: WineLotId,
    pub varietal: String,
    /// Year the grapes were harvested.
    pub vintage: i32,
    /// Volume in liters; never above the vessel's capacity.
    pub quantity_liters: f64,
    /// In [1, 100].
    pub quality: u8,
    /// Type of the occupied vessel, kept for display.
    pub vessel_type: String,
    /// The vessel this lot occupies.
    pub vessel: VesselId,
    pub stage: Stage,
    /// Percent, 0..=100.
    pub fermentation_progress: u8,
    /// Months aged so far, up to `aging_duration`.
    pub aging_progress: u32,
    /// Months; set when aging starts.
    pub aging_duration: u32,
    /// Maceration actions performed while fermenting.
    pub maceration_actions_taken: u32,
}

impl WineInProduction {
    pub fn fermentation_complete(&self) -> bool {
        self.fermentation_progress >= MAX_SCORE
    }

    pub fn aging_complete(&self) -> bool {
        self.stage == Stage::Aging && self.aging_progress >= self.aging_duration
    }
}

/// Style of a finished wine, taken from the varietal's color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WineStyle {
    Red,
    White,
}

impl From<GrapeColor> for WineStyle {
    fn from(color: GrapeColor) -> Self {
        match color {
            GrapeColor::Red => WineStyle::Red,
            GrapeColor::White => WineStyle::White,
        }
    }
}

/// Finished, bottled wine in the cellar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BottledWine {
    pub id: BottledWineId,
    /// Label chosen at bottling.
    pub name: String,
    pub vintage: i32,
    pub varietal: String,
    pub style: WineStyle,
    /// In [1, 100]; sets the price per bottle.
    pub quality: u8,
    /// 0.75 L bottles left in stock.
    pub bottles: u32,
}

/// Vessels and everything moving through them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Winery {
    pub name: String,
    pub vessels: Vec<Vessel>,
    pub musts: Vec<MustLot>,
    /// Fermenting and aging lots, in the order they entered production.
    pub wines: Vec<WineInProduction>,
}

impl Winery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vessels: Vec::new(),
            musts: Vec::new(),
            wines: Vec::new(),
        }
    }

    pub fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.id == id)
    }

    pub fn wine(&self, id: WineLotId) -> Option<&WineInProduction> {
        self.wines.iter().find(|w| w.id == id)
    }

    pub fn fermenting(&self) -> impl Iterator<Item = &WineInProduction> + '_ {
        self.wines.iter().filter(|w| w.stage == Stage::Fermenting)
    }

    pub fn aging(&self) -> impl Iterator<Item = &WineInProduction> + '_ {
        self.wines.iter().filter(|w| w.stage == Stage::Aging)
    }

    pub fn vessels_in_use(&self) -> usize {
        self.vessels.iter().filter(|v| v.in_use).count()
    }

    pub fn free_vessels(&self) -> impl Iterator<Item = &Vessel> + '_ {
        self.vessels.iter().filter(|v| !v.in_use)
    }
}

/// The player: balance, reputation and every owned asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Never negative; every spend is checked first.
    pub money: Decimal,
    /// Reputation points; only ever grows.
    pub reputation: u32,
    pub vineyards: Vec<Vineyard>,
    pub winery: Winery,
    pub grapes: Vec<GrapeLot>,
    pub cellar: Vec<BottledWine>,
}

impl Player {
    pub fn vineyard(&self, name: &str) -> Option<&Vineyard> {
        self.vineyards.iter().find(|v| v.name == name)
    }

    pub fn bottled(&self, id: BottledWineId) -> Option<&BottledWine> {
        self.cellar.iter().find(|w| w.id == id)
    }
}

/// The single aggregate mutated by every operation: calendar plus player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estate {
    pub calendar: Calendar,
    pub player: Player,
    /// Next value handed out by [`Estate::allocate_id`].
    pub next_id: u64,
}

impl Estate {
    /// Set up a new game from `config`.
    pub fn new(config: &SimConfig, catalog: &Catalog) -> Result<Self, CatalogError> {
        let mut estate = Estate {
            calendar: Calendar::new(config.start_year),
            player: Player {
                name: config.player_name.clone(),
                money: config.starting_money,
                reputation: config.starting_reputation,
                vineyards: Vec::new(),
                winery: Winery::new(config.winery_name.clone()),
                grapes: Vec::new(),
                cellar: Vec::new(),
            },
            next_id: 1,
        };

        if let Some(start) = &config.starting_vineyard {
            catalog.grape(&start.varietal)?;
            catalog.region(&start.region)?;
            estate.player.vineyards.push(Vineyard {
                name: start.name.clone(),
                varietal: start.varietal.clone(),
                region: start.region.clone(),
                size_acres: start.size_acres,
                age_of_vines: start.age_of_vines,
                soil_type: start.soil_type.clone(),
                health: start.health.min(MAX_SCORE),
                grapes_ready: false,
                harvested_this_year: false,
            });
        }

        for type_name in &config.starting_vessels {
            let capacity = catalog.vessel_type(type_name)?.capacity;
            let id = VesselId(estate.allocate_id());
            estate.player.winery.vessels.push(Vessel {
                id,
                vessel_type: type_name.clone(),
                capacity,
                in_use: false,
            });
        }
        Ok(estate)
    }

    /// Hand out a fresh id, unique across every entity kind.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Everything needed to resume a game: the aggregate and the RNG position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub estate: Estate,
    pub rng: RngCheckpoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_matches_defaults() {
        let estate = Estate::new(&SimConfig::default(), &Catalog::standard()).unwrap();
        assert_eq!(estate.calendar, Calendar::new(2025));
        assert_eq!(estate.player.money, Decimal::new(100_000, 0));
        assert_eq!(estate.player.reputation, 50);
        let home = estate.player.vineyard("Home Block").unwrap();
        assert_eq!(home.varietal, "Pinot Noir");
        assert_eq!(home.health, 80);
        assert!(!home.is_harvestable());

        let vessels = &estate.player.winery.vessels;
        assert_eq!(vessels.len(), 5);
        assert_eq!(vessels[0].id, VesselId(1));
        assert_eq!(vessels[0].capacity, 5000);
        assert_eq!(vessels[4].vessel_type, "Neutral Oak Barrel (225L)");
        assert_eq!(estate.next_id, 6);
        assert_eq!(estate.player.winery.vessels_in_use(), 0);
    }

    #[test]
    fn unknown_starting_vessel_is_rejected() {
        let cfg = SimConfig {
            starting_vessels: vec!["Bathtub".to_string()],
            ..SimConfig::default()
        };
        assert_eq!(
            Estate::new(&cfg, &Catalog::standard()),
            Err(CatalogError::UnknownVesselType("Bathtub".to_string()))
        );
    }

    #[test]
    fn estate_snapshot_roundtrip() {
        let estate = Estate::new(&SimConfig::default(), &Catalog::standard()).unwrap();
        let s = serde_json::to_string_pretty(&estate).unwrap();
        let back: Estate = serde_json::from_str(&s).unwrap();
        assert_eq!(back, estate);
    }

    #[test]
    fn destem_crush_accepts_display_labels() {
        let m: DestemCrush = serde_json::from_str("\"Whole Cluster\"").unwrap();
        assert_eq!(m, DestemCrush::WholeCluster);
        let m: DestemCrush = serde_json::from_str("\"partial_destem\"").unwrap();
        assert_eq!(m, DestemCrush::PartialDestem);
        assert_eq!(DestemCrush::DestemmedCrushed.to_string(), "Destemmed/Crushed");
    }
}
