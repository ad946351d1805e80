//! Estate operations outside the production pipeline: buying land and
//! equipment, tending vineyards and selling from the cellar.

use crate::error::{Missing, PipelineError};
use crate::pipeline::{clamp_score, vineyard_index};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{
    BottledWineId, Capability, Catalog, Estate, Randomness, Vessel, VesselId, Vineyard,
};
use sim_econ::{
    award, credit, debit, ensure_affordable, sale_revenue, tend_cost, vineyard_offer_price,
    ReputationEvent,
};
use std::collections::BTreeSet;

/// A vineyard for sale: one varietal in one region at a jittered price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VineyardOffer {
    pub region: String,
    pub varietal: String,
    pub cost: Decimal,
}

/// A vessel type as listed in the equipment shop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VesselOffer {
    pub name: String,
    pub capacity: u32,
    pub cost: Decimal,
    pub capabilities: BTreeSet<Capability>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub wine: BottledWineId,
    pub bottles_sold: u32,
    pub revenue: Decimal,
    pub bottles_remaining: u32,
}

/// One offer for every varietal planted in every region.
pub fn vineyard_offers<R: Randomness + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
) -> Vec<VineyardOffer> {
    let mut offers = Vec::new();
    for (name, region) in &catalog.regions {
        for varietal in &region.grape_varietals {
            offers.push(VineyardOffer {
                region: name.clone(),
                varietal: varietal.clone(),
                cost: vineyard_offer_price(region.base_cost, rng),
            });
        }
    }
    offers
}

/// Buy the vineyard described by `offer` and name it `name`.
///
/// Size, vine age and soil are only drawn once the purchase is known to go
/// through.
pub fn buy_vineyard<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
    offer: &VineyardOffer,
    name: &str,
) -> Result<Vineyard, PipelineError> {
    let name = name.trim();
    if name.is_empty() || estate.player.vineyard(name).is_some() {
        return Err(PipelineError::InvalidName(name.to_string()));
    }
    let region = catalog
        .regions
        .get(&offer.region)
        .ok_or_else(|| Missing::Region(offer.region.clone()))?;
    if !region.grape_varietals.contains(&offer.varietal) {
        return Err(Missing::RegionVarietal {
            region: offer.region.clone(),
            varietal: offer.varietal.clone(),
        }
        .into());
    }
    catalog.grape(&offer.varietal)?;
    ensure_affordable(&estate.player, offer.cost)?;

    let size_acres = rng.int_between(3, 10).unsigned_abs();
    let age_of_vines = rng.int_between(3, 20).unsigned_abs();
    let soil_type = region
        .soil_types
        .get(rng.pick(region.soil_types.len()))
        .cloned()
        .unwrap_or_default();

    debit(&mut estate.player, offer.cost)?;
    let vineyard = Vineyard {
        name: name.to_string(),
        varietal: offer.varietal.clone(),
        region: offer.region.clone(),
        size_acres,
        age_of_vines,
        soil_type,
        health: Vineyard::DEFAULT_HEALTH,
        grapes_ready: false,
        harvested_this_year: false,
    };
    award(&mut estate.player, ReputationEvent::VineyardPurchased);
    estate.player.vineyards.push(vineyard.clone());
    Ok(vineyard)
}

/// Pay for a round of vineyard work. Returns the new health.
pub fn tend_vineyard<R: Randomness + ?Sized>(
    estate: &mut Estate,
    rng: &mut R,
    name: &str,
) -> Result<u8, PipelineError> {
    let idx = vineyard_index(estate, name)?;
    debit(&mut estate.player, tend_cost())?;
    let gain = rng.int_between(5, 15);
    let vineyard = &mut estate.player.vineyards[idx];
    vineyard.health = clamp_score(i32::from(vineyard.health) + gain);
    Ok(vineyard.health)
}

pub fn vessel_offers(catalog: &Catalog) -> Vec<VesselOffer> {
    catalog
        .vessel_types
        .iter()
        .map(|(name, kind)| VesselOffer {
            name: name.clone(),
            capacity: kind.capacity,
            cost: kind.cost,
            capabilities: kind.capabilities.clone(),
        })
        .collect()
}

/// Buy a new, empty vessel of `type_name`.
pub fn buy_vessel(
    estate: &mut Estate,
    catalog: &Catalog,
    type_name: &str,
) -> Result<Vessel, PipelineError> {
    let kind = catalog
        .vessel_types
        .get(type_name)
        .ok_or_else(|| Missing::VesselType(type_name.to_string()))?;
    debit(&mut estate.player, kind.cost)?;
    let vessel = Vessel {
        id: VesselId(estate.allocate_id()),
        vessel_type: type_name.to_string(),
        capacity: kind.capacity,
        in_use: false,
    };
    estate.player.winery.vessels.push(vessel.clone());
    Ok(vessel)
}

/// Sell `bottles` from a cellar entry at the fixed quality price. The entry
/// disappears with its last bottle.
pub fn sell_wine(
    estate: &mut Estate,
    wine: BottledWineId,
    bottles: u32,
) -> Result<SaleReceipt, PipelineError> {
    let idx = estate
        .player
        .cellar
        .iter()
        .position(|w| w.id == wine)
        .ok_or(Missing::BottledWine(wine))?;
    let entry = &estate.player.cellar[idx];
    if bottles == 0 || bottles > entry.bottles {
        return Err(PipelineError::InsufficientStock {
            wine,
            requested: bottles,
            available: entry.bottles,
        });
    }
    let revenue = sale_revenue(entry.quality, bottles);

    credit(&mut estate.player, revenue)?;
    let entry = &mut estate.player.cellar[idx];
    entry.bottles -= bottles;
    let bottles_remaining = entry.bottles;
    if bottles_remaining == 0 {
        estate.player.cellar.remove(idx);
    }
    Ok(SaleReceipt {
        wine,
        bottles_sold: bottles,
        revenue,
        bottles_remaining,
    })
}
