//! Static reference data: grape varietals, wine regions and vessel types.
//!
//! The catalog never changes during a game. Lookups by name return
//! [`CatalogError`] for unknown keys; callers are expected to check names
//! coming from the outside before they reach the production pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Skin color of a varietal. Only red grapes can be macerated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrapeColor {
    Red,
    White,
}

/// Growing characteristics of a grape varietal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrapeCharacteristics {
    /// Skin color; decides the bottled style.
    pub color: GrapeColor,
    /// Calendar month (1 = January) in which the grapes ripen.
    pub ripening_month: u8,
    /// Quality of fruit from a perfectly healthy vineyard, in [1, 100].
    pub base_quality: u8,
}

/// Broad climate classification of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Climate {
    Cool,
    Continental,
    Warm,
    Mediterranean,
}

/// A wine region where vineyards can be bought.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub climate: Climate,
    /// Soils a newly bought vineyard may get, picked at random.
    pub soil_types: Vec<String>,
    /// Varietals planted in this region, in offer order.
    pub grape_varietals: Vec<String>,
    /// Acquisition cost in USD before the per-offer price jitter.
    pub base_cost: Decimal,
}

/// What a vessel can be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Fermentation,
    Aging,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Fermentation => f.write_str("fermentation"),
            Capability::Aging => f.write_str("aging"),
        }
    }
}

/// A purchasable kind of fermentation/aging vessel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VesselType {
    /// Capacity in liters.
    pub capacity: u32,
    /// Purchase price in USD.
    pub cost: Decimal,
    /// Stages the vessel can host.
    pub capabilities: BTreeSet<Capability>,
}

impl VesselType {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Catalog lookup failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown varietal: {0}")]
    UnknownVarietal(String),
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    #[error("unknown vessel type: {0}")]
    UnknownVesselType(String),
    #[error("malformed catalog: {0}")]
    Malformed(String),
}

/// Read-only lookup tables keyed by display name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub grapes: BTreeMap<String, GrapeCharacteristics>,
    pub regions: BTreeMap<String, Region>,
    pub vessel_types: BTreeMap<String, VesselType>,
}

impl Catalog {
    /// The built-in catalog shipped with the game.
    pub fn standard() -> Self {
        let grapes = [
            ("Pinot Noir", GrapeColor::Red, 9, 70),
            ("Chardonnay", GrapeColor::White, 9, 65),
            ("Pinot Gris", GrapeColor::White, 9, 60),
            ("Savagnin", GrapeColor::White, 10, 75),
            ("Poulsard", GrapeColor::Red, 9, 68),
            ("Trousseau", GrapeColor::Red, 9, 68),
            ("Syrah", GrapeColor::Red, 9, 72),
            ("Viognier", GrapeColor::White, 9, 70),
        ]
        .into_iter()
        .map(|(name, color, ripening_month, base_quality)| {
            (
                name.to_string(),
                GrapeCharacteristics {
                    color,
                    ripening_month,
                    base_quality,
                },
            )
        })
        .collect();

        let regions = [
            (
                "Willamette Valley",
                Climate::Cool,
                &["volcanic", "sedimentary"][..],
                &["Pinot Noir", "Chardonnay", "Pinot Gris"][..],
                50_000,
            ),
            (
                "Jura",
                Climate::Cool,
                &["marl", "limestone"][..],
                &["Savagnin", "Poulsard", "Trousseau", "Chardonnay", "Pinot Noir"][..],
                40_000,
            ),
            (
                "Northern Rhône",
                Climate::Continental,
                &["granite", "schist"][..],
                &["Syrah", "Viognier"][..],
                60_000,
            ),
        ]
        .into_iter()
        .map(|(name, climate, soils, varietals, cost)| {
            (
                name.to_string(),
                Region {
                    climate,
                    soil_types: soils.iter().map(|s| s.to_string()).collect(),
                    grape_varietals: varietals.iter().map(|s| s.to_string()).collect(),
                    base_cost: Decimal::new(cost, 0),
                },
            )
        })
        .collect();

        use Capability::{Aging, Fermentation};
        let vessel_types = [
            ("Stainless Steel Tank", 5000, 10_000, &[Fermentation, Aging][..]),
            ("Open Top Fermenter", 1000, 2000, &[Fermentation][..]),
            ("Neutral Oak Barrel (225L)", 225, 500, &[Aging][..]),
            ("Concrete Egg", 1500, 7000, &[Fermentation, Aging][..]),
            ("Amphora (500L)", 500, 3000, &[Fermentation, Aging][..]),
        ]
        .into_iter()
        .map(|(name, capacity, cost, caps)| {
            (
                name.to_string(),
                VesselType {
                    capacity,
                    cost: Decimal::new(cost, 0),
                    capabilities: caps.iter().copied().collect(),
                },
            )
        })
        .collect();

        Catalog {
            grapes,
            regions,
            vessel_types,
        }
    }

    /// Parse a catalog from YAML with `grapes`, `regions` and `vessel_types` maps.
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(text).map_err(|e| CatalogError::Malformed(e.to_string()))
    }

    pub fn grape(&self, varietal: &str) -> Result<&GrapeCharacteristics, CatalogError> {
        self.grapes
            .get(varietal)
            .ok_or_else(|| CatalogError::UnknownVarietal(varietal.to_string()))
    }

    pub fn region(&self, name: &str) -> Result<&Region, CatalogError> {
        self.regions
            .get(name)
            .ok_or_else(|| CatalogError::UnknownRegion(name.to_string()))
    }

    pub fn vessel_type(&self, name: &str) -> Result<&VesselType, CatalogError> {
        self.vessel_types
            .get(name)
            .ok_or_else(|| CatalogError::UnknownVesselType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_lookups() {
        let catalog = Catalog::standard();
        let pinot = catalog.grape("Pinot Noir").unwrap();
        assert_eq!(pinot.color, GrapeColor::Red);
        assert_eq!(pinot.ripening_month, 9);
        assert_eq!(pinot.base_quality, 70);
        assert_eq!(catalog.grape("Savagnin").unwrap().ripening_month, 10);

        let barrel = catalog.vessel_type("Neutral Oak Barrel (225L)").unwrap();
        assert!(barrel.supports(Capability::Aging));
        assert!(!barrel.supports(Capability::Fermentation));

        let jura = catalog.region("Jura").unwrap();
        assert_eq!(jura.base_cost, Decimal::new(40_000, 0));
        assert_eq!(jura.grape_varietals.len(), 5);
    }

    #[test]
    fn unknown_keys_are_errors() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.grape("Merlot"),
            Err(CatalogError::UnknownVarietal("Merlot".to_string()))
        );
        assert!(catalog.region("Napa").is_err());
        assert!(catalog.vessel_type("Bucket").is_err());
    }

    #[test]
    fn shipped_yaml_matches_builtin() {
        let text = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/catalog.yaml"));
        let parsed = Catalog::from_yaml_str(text).unwrap();
        assert_eq!(parsed, Catalog::standard());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let err = Catalog::from_yaml_str("grapes: [1, 2").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }
}
