//! Production pipeline: one function per transition from vineyard to bottle.
//!
//! Every function checks all of its preconditions before it touches the
//! estate, so a returned error always means nothing changed. Fresh ids are
//! only drawn from the allocator once an operation is known to succeed.

use crate::error::{Missing, NotReady, PipelineError, VesselUnavailable};
use sim_core::{
    BottledWine, BottledWineId, Capability, Catalog, DestemCrush, Estate, GrapeColor, GrapeLot,
    GrapeLotId, MustLot, MustLotId, ProcessingMethod, Randomness, Stage, Vessel, VesselId,
    WineInProduction, WineLotId, WineStyle, MAX_SCORE,
};
use sim_econ::{award, can_afford, debit, sorting_cost, ReputationEvent};

/// Kilograms per acre from a perfectly healthy vineyard in an average year.
pub const BASE_YIELD_KG_PER_ACRE: f64 = 1000.0;
/// Liters of juice pressed from one kilogram of must.
pub const JUICE_LITERS_PER_KG: f64 = 0.75;
pub const BOTTLE_LITERS: f64 = 0.75;
/// Fermentation progress at which a lot may be moved to aging.
pub const FERMENTATION_DONE: u8 = 100;

/// Clamp a raw score into `[1, 100]`.
pub(crate) fn clamp_score(raw: i32) -> u8 {
    raw.clamp(1, i32::from(MAX_SCORE)) as u8
}

/// Keep a must quality at or above 1 without capping it at 100.
fn floor_score(raw: i32) -> u8 {
    raw.clamp(1, i32::from(u8::MAX)) as u8
}

pub(crate) fn vineyard_index(estate: &Estate, name: &str) -> Result<usize, PipelineError> {
    estate
        .player
        .vineyards
        .iter()
        .position(|v| v.name == name)
        .ok_or_else(|| Missing::Vineyard(name.to_string()).into())
}

fn grape_index(estate: &Estate, id: GrapeLotId) -> Result<usize, PipelineError> {
    estate
        .player
        .grapes
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| Missing::GrapeLot(id).into())
}

fn must_index(estate: &Estate, id: MustLotId) -> Result<usize, PipelineError> {
    estate
        .player
        .winery
        .musts
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| Missing::MustLot(id).into())
}

fn wine_index(estate: &Estate, id: WineLotId) -> Result<usize, PipelineError> {
    estate
        .player
        .winery
        .wines
        .iter()
        .position(|w| w.id == id)
        .ok_or_else(|| Missing::WineLot(id).into())
}

fn vessel_index(estate: &Estate, id: VesselId) -> Result<usize, PipelineError> {
    estate
        .player
        .winery
        .vessels
        .iter()
        .position(|v| v.id == id)
        .ok_or_else(|| Missing::Vessel(id).into())
}

/// Can `vessel` take `liters` of wine for `capability`? Checked in the order
/// occupancy, capability, capacity.
pub fn check_vessel(
    vessel: &Vessel,
    catalog: &Catalog,
    capability: Capability,
    liters: f64,
) -> Result<(), PipelineError> {
    if vessel.in_use {
        return Err(VesselUnavailable::Occupied(vessel.id).into());
    }
    if !catalog.vessel_type(&vessel.vessel_type)?.supports(capability) {
        return Err(VesselUnavailable::MissingCapability {
            vessel: vessel.id,
            capability,
        }
        .into());
    }
    if f64::from(vessel.capacity) < liters {
        return Err(VesselUnavailable::InsufficientCapacity {
            vessel: vessel.id,
            capacity: vessel.capacity,
            required: liters,
        }
        .into());
    }
    Ok(())
}

/// Pick the ripe grapes of `vineyard`.
pub fn harvest<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
    vineyard: &str,
) -> Result<GrapeLot, PipelineError> {
    let idx = vineyard_index(estate, vineyard)?;
    let v = &estate.player.vineyards[idx];
    if v.harvested_this_year {
        return Err(NotReady::AlreadyHarvested(v.name.clone()).into());
    }
    if !v.grapes_ready {
        return Err(NotReady::GrapesNotRipe(v.name.clone()).into());
    }
    let base_quality = catalog.grape(&v.varietal)?.base_quality;

    let health = f64::from(v.health) / 100.0;
    let multiplier = rng.uniform(0.8, 1.2);
    let quantity_kg =
        (BASE_YIELD_KG_PER_ACRE * f64::from(v.size_acres) * health * multiplier).floor();
    let delta = rng.int_between(-5, 5);
    let quality = clamp_score((f64::from(base_quality) * health + f64::from(delta)) as i32);

    let vintage = estate.calendar.year;
    let id = GrapeLotId(estate.allocate_id());
    let v = &mut estate.player.vineyards[idx];
    v.harvested_this_year = true;
    v.grapes_ready = false;
    let lot = GrapeLot {
        id,
        varietal: v.varietal.clone(),
        vintage,
        quantity_kg,
        quality,
    };
    award(&mut estate.player, ReputationEvent::Harvest);
    estate.player.grapes.push(lot.clone());
    Ok(lot)
}

/// Turn a grape lot into must, optionally paying for hand sorting first.
///
/// Sorting that the player cannot afford is skipped and the lot is processed
/// unsorted at no cost.
pub fn process_grapes<R: Randomness + ?Sized>(
    estate: &mut Estate,
    rng: &mut R,
    lot: GrapeLotId,
    sort: bool,
    method: DestemCrush,
) -> Result<MustLot, PipelineError> {
    let idx = grape_index(estate, lot)?;
    let grapes = &estate.player.grapes[idx];
    let sort_cost = if sort {
        Some(sorting_cost(grapes.quantity_kg)?).filter(|cost| can_afford(&estate.player, *cost))
    } else {
        None
    };

    let mut quality = grapes.quality;
    let processing_method = match sort_cost {
        Some(cost) => {
            debit(&mut estate.player, cost)?;
            let bonus = rng.int_between(2, 5);
            quality = clamp_score(i32::from(quality) + bonus);
            ProcessingMethod::Sorted
        }
        None => ProcessingMethod::Unsorted,
    };
    let (low, high) = match method {
        DestemCrush::WholeCluster => (-2, 4),
        DestemCrush::PartialDestem => (0, 2),
        DestemCrush::DestemmedCrushed => (-1, 1),
    };
    let quality = floor_score(i32::from(quality) + rng.int_between(low, high));

    let grapes = estate.player.grapes.remove(idx);
    let must = MustLot {
        id: MustLotId(estate.allocate_id()),
        varietal: grapes.varietal,
        vintage: grapes.vintage,
        quantity_kg: grapes.quantity_kg,
        quality,
        processing_method,
        destem_crush: method,
    };
    estate.player.winery.musts.push(must.clone());
    Ok(must)
}

/// Move a must lot into a free fermentation vessel.
pub fn start_fermentation(
    estate: &mut Estate,
    catalog: &Catalog,
    must: MustLotId,
    vessel: VesselId,
) -> Result<WineInProduction, PipelineError> {
    let must_idx = must_index(estate, must)?;
    let vessel_idx = vessel_index(estate, vessel)?;
    let liters = estate.player.winery.musts[must_idx].quantity_kg * JUICE_LITERS_PER_KG;
    check_vessel(
        &estate.player.winery.vessels[vessel_idx],
        catalog,
        Capability::Fermentation,
        liters,
    )?;

    let id = WineLotId(estate.allocate_id());
    let winery = &mut estate.player.winery;
    let must = winery.musts.remove(must_idx);
    let host = &mut winery.vessels[vessel_idx];
    host.in_use = true;
    let wine = WineInProduction {
        id,
        varietal: must.varietal,
        vintage: must.vintage,
        quantity_liters: liters,
        quality: must.quality,
        vessel_type: host.vessel_type.clone(),
        vessel,
        stage: Stage::Fermenting,
        fermentation_progress: 0,
        aging_progress: 0,
        aging_duration: 0,
        maceration_actions_taken: 0,
    };
    winery.wines.push(wine.clone());
    award(&mut estate.player, ReputationEvent::FermentationStarted);
    Ok(wine)
}

/// Punch down or pump over a fermenting red. Returns the lot's new quality.
pub fn macerate<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
    lot: WineLotId,
) -> Result<u8, PipelineError> {
    let idx = wine_index(estate, lot)?;
    let wine = &estate.player.winery.wines[idx];
    if wine.stage != Stage::Fermenting {
        return Err(NotReady::WrongStage {
            lot,
            expected: Stage::Fermenting,
            actual: wine.stage,
        }
        .into());
    }
    if catalog.grape(&wine.varietal)?.color != GrapeColor::Red {
        return Err(PipelineError::NotMacerable {
            varietal: wine.varietal.clone(),
        });
    }

    let gain = rng.int_between(1, 3);
    let wine = &mut estate.player.winery.wines[idx];
    wine.quality = clamp_score(i32::from(wine.quality) + gain);
    wine.maceration_actions_taken += 1;
    Ok(wine.quality)
}

/// Rack a fully fermented lot into an aging vessel for `months`.
pub fn start_aging(
    estate: &mut Estate,
    catalog: &Catalog,
    lot: WineLotId,
    vessel: VesselId,
    months: u32,
) -> Result<WineInProduction, PipelineError> {
    let wine_idx = wine_index(estate, lot)?;
    let vessel_idx = vessel_index(estate, vessel)?;
    let wine = &estate.player.winery.wines[wine_idx];
    if wine.stage != Stage::Fermenting {
        return Err(NotReady::WrongStage {
            lot,
            expected: Stage::Fermenting,
            actual: wine.stage,
        }
        .into());
    }
    if !wine.fermentation_complete() {
        return Err(NotReady::FermentationIncomplete {
            lot,
            progress: wine.fermentation_progress,
        }
        .into());
    }
    check_vessel(
        &estate.player.winery.vessels[vessel_idx],
        catalog,
        Capability::Aging,
        wine.quantity_liters,
    )?;

    let winery = &mut estate.player.winery;
    let previous = winery.wines[wine_idx].vessel;
    if let Some(old) = winery.vessels.iter_mut().find(|v| v.id == previous) {
        old.in_use = false;
    }
    let host = &mut winery.vessels[vessel_idx];
    host.in_use = true;
    let vessel_type = host.vessel_type.clone();

    let wine = &mut winery.wines[wine_idx];
    wine.vessel = vessel;
    wine.vessel_type = vessel_type;
    wine.stage = Stage::Aging;
    wine.aging_duration = months;
    wine.aging_progress = 0;
    Ok(wine.clone())
}

/// Bottle an aged lot under `name`, freeing its vessel.
pub fn bottle(
    estate: &mut Estate,
    catalog: &Catalog,
    lot: WineLotId,
    name: &str,
) -> Result<BottledWine, PipelineError> {
    let idx = wine_index(estate, lot)?;
    let wine = &estate.player.winery.wines[idx];
    if wine.stage != Stage::Aging {
        return Err(NotReady::WrongStage {
            lot,
            expected: Stage::Aging,
            actual: wine.stage,
        }
        .into());
    }
    if !wine.aging_complete() {
        return Err(NotReady::AgingIncomplete {
            lot,
            progress: wine.aging_progress,
            duration: wine.aging_duration,
        }
        .into());
    }
    let style = WineStyle::from(catalog.grape(&wine.varietal)?.color);

    let id = BottledWineId(estate.allocate_id());
    let winery = &mut estate.player.winery;
    let wine = winery.wines.remove(idx);
    if let Some(host) = winery.vessels.iter_mut().find(|v| v.id == wine.vessel) {
        host.in_use = false;
    }
    let bottled = BottledWine {
        id,
        name: name.to_string(),
        vintage: wine.vintage,
        varietal: wine.varietal,
        style,
        quality: wine.quality,
        bottles: (wine.quantity_liters / BOTTLE_LITERS).floor() as u32,
    };
    award(&mut estate.player, ReputationEvent::Bottling);
    estate.player.cellar.push(bottled.clone());
    Ok(bottled)
}
