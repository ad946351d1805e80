//! Invariant checks for catalogs and estates.

use crate::calendar::MONTHS_PER_YEAR;
use crate::catalog::{Catalog, CatalogError};
use crate::ids::{VesselId, WineLotId};
use crate::model::{Estate, Vineyard, MAX_SCORE};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("ripening month {month} of {varietal} is outside [1, 12]")]
    RipeningMonth { varietal: String, month: u8 },
    #[error("base quality {quality} of {varietal} is outside [1, 100]")]
    BaseQuality { varietal: String, quality: u8 },
    #[error("region {0} has no soil types")]
    NoSoilTypes(String),
    #[error("region {region} plants unknown varietal {varietal}")]
    RegionVarietal { region: String, varietal: String },
    #[error("vessel type {0} must have capacity > 0")]
    NonPositiveCapacity(String),
    #[error("vessel type {0} supports neither fermentation nor aging")]
    NoCapabilities(String),
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    #[error("month index {0} is out of range")]
    MonthIndex(u8),
    #[error("vineyard {name} has health {health} > 100")]
    Health { name: String, health: u8 },
    #[error("duplicate vineyard name: {0}")]
    DuplicateVineyard(String),
    #[error("id {0} is used more than once")]
    DuplicateId(u64),
    #[error("id {id} was not handed out by the allocator (next is {next})")]
    UnallocatedId { id: u64, next: u64 },
    #[error("quantity must be finite and >= 0")]
    InvalidQuantity,
    #[error("lot quality must be >= 1")]
    ZeroQuality,
    #[error("{lot} sits in missing {vessel}")]
    MissingVessel { lot: WineLotId, vessel: VesselId },
    #[error("{vessel} holds more than one lot")]
    SharedVessel { vessel: VesselId },
    #[error("{vessel} holds {liters} L, over its {capacity} L capacity")]
    OverCapacity {
        vessel: VesselId,
        liters: f64,
        capacity: u32,
    },
    #[error("{in_use} vessels marked in use for {lots} lots in production")]
    Occupancy { in_use: usize, lots: usize },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Validate the reference data.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    for (name, grape) in &catalog.grapes {
        if !(1..=MONTHS_PER_YEAR).contains(&grape.ripening_month) {
            return Err(ValidationError::RipeningMonth {
                varietal: name.clone(),
                month: grape.ripening_month,
            });
        }
        if !(1..=MAX_SCORE).contains(&grape.base_quality) {
            return Err(ValidationError::BaseQuality {
                varietal: name.clone(),
                quality: grape.base_quality,
            });
        }
    }
    for (name, region) in &catalog.regions {
        if region.soil_types.is_empty() {
            return Err(ValidationError::NoSoilTypes(name.clone()));
        }
        if region.base_cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney);
        }
        for varietal in &region.grape_varietals {
            if !catalog.grapes.contains_key(varietal) {
                return Err(ValidationError::RegionVarietal {
                    region: name.clone(),
                    varietal: varietal.clone(),
                });
            }
        }
    }
    for (name, kind) in &catalog.vessel_types {
        if kind.capacity == 0 {
            return Err(ValidationError::NonPositiveCapacity(name.clone()));
        }
        if kind.capabilities.is_empty() {
            return Err(ValidationError::NoCapabilities(name.clone()));
        }
        if kind.cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney);
        }
    }
    Ok(())
}

/// Validate a single vineyard against the catalog.
pub fn validate_vineyard(vineyard: &Vineyard, catalog: &Catalog) -> Result<(), ValidationError> {
    if vineyard.health > MAX_SCORE {
        return Err(ValidationError::Health {
            name: vineyard.name.clone(),
            health: vineyard.health,
        });
    }
    catalog.grape(&vineyard.varietal)?;
    Ok(())
}

fn check_quantity(q: f64) -> Result<(), ValidationError> {
    if !q.is_finite() || q < 0.0 {
        return Err(ValidationError::InvalidQuantity);
    }
    Ok(())
}

fn check_quality(q: u8) -> Result<(), ValidationError> {
    if q == 0 {
        return Err(ValidationError::ZeroQuality);
    }
    Ok(())
}

/// Validate the whole aggregate, including vessel occupancy.
pub fn validate_estate(estate: &Estate, catalog: &Catalog) -> Result<(), ValidationError> {
    if estate.calendar.month_index >= MONTHS_PER_YEAR {
        return Err(ValidationError::MonthIndex(estate.calendar.month_index));
    }
    let player = &estate.player;
    if player.money < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }

    let mut names = BTreeSet::new();
    for vineyard in &player.vineyards {
        validate_vineyard(vineyard, catalog)?;
        if !names.insert(vineyard.name.as_str()) {
            return Err(ValidationError::DuplicateVineyard(vineyard.name.clone()));
        }
    }

    let winery = &player.winery;
    let mut ids = Vec::new();
    for lot in &player.grapes {
        catalog.grape(&lot.varietal)?;
        check_quantity(lot.quantity_kg)?;
        check_quality(lot.quality)?;
        ids.push(lot.id.0);
    }
    for must in &winery.musts {
        catalog.grape(&must.varietal)?;
        check_quantity(must.quantity_kg)?;
        check_quality(must.quality)?;
        ids.push(must.id.0);
    }
    for vessel in &winery.vessels {
        catalog.vessel_type(&vessel.vessel_type)?;
        ids.push(vessel.id.0);
    }
    for wine in &winery.wines {
        catalog.grape(&wine.varietal)?;
        check_quantity(wine.quantity_liters)?;
        check_quality(wine.quality)?;
        ids.push(wine.id.0);
    }
    for bottled in &player.cellar {
        catalog.grape(&bottled.varietal)?;
        ids.push(bottled.id.0);
    }
    let mut seen = BTreeSet::new();
    for id in ids {
        if id >= estate.next_id {
            return Err(ValidationError::UnallocatedId {
                id,
                next: estate.next_id,
            });
        }
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id));
        }
    }

    // Each lot in production sits in its own in-use vessel, and no other
    // vessel is marked in use.
    let mut hosts: BTreeMap<VesselId, WineLotId> = BTreeMap::new();
    for wine in &winery.wines {
        let vessel = winery
            .vessel(wine.vessel)
            .filter(|v| v.in_use)
            .ok_or(ValidationError::MissingVessel {
                lot: wine.id,
                vessel: wine.vessel,
            })?;
        if hosts.insert(vessel.id, wine.id).is_some() {
            return Err(ValidationError::SharedVessel { vessel: vessel.id });
        }
        if wine.quantity_liters > f64::from(vessel.capacity) {
            return Err(ValidationError::OverCapacity {
                vessel: vessel.id,
                liters: wine.quantity_liters,
                capacity: vessel.capacity,
            });
        }
    }
    let in_use = winery.vessels_in_use();
    if in_use != winery.wines.len() {
        return Err(ValidationError::Occupancy {
            in_use,
            lots: winery.wines.len(),
        });
    }
    Ok(())
}
