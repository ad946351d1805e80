#![deny(warnings)]

//! Core domain models and invariants for the winery simulation.
//!
//! This crate defines the static catalog (varietals, regions, vessel types),
//! the serializable entities owned by a single [`Estate`], the monthly
//! [`Calendar`], the injected [`Randomness`] source, and validation helpers
//! that guard the invariants every operation must preserve.

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod ids;
pub mod model;
pub mod rng;
pub mod validation;

pub use calendar::{Calendar, MONTHS_PER_YEAR};
pub use catalog::{
    Capability, Catalog, CatalogError, Climate, GrapeCharacteristics, GrapeColor, Region,
    VesselType,
};
pub use config::{SimConfig, StartingVineyard};
pub use ids::{BottledWineId, GrapeLotId, MustLotId, VesselId, WineLotId};
pub use model::{
    BottledWine, DestemCrush, Estate, GrapeLot, MustLot, Player, ProcessingMethod, SaveGame,
    Stage, Vessel, Vineyard, WineInProduction, WineStyle, Winery, MAX_SCORE,
};
#[cfg(any(test, feature = "test-utils"))]
pub use rng::FixedRandom;
pub use rng::{Randomness, RngCheckpoint, SimRng};
pub use validation::{validate_catalog, validate_estate, validate_vineyard, ValidationError};
