//! Command surface consumed by adapters.
//!
//! A [`Command`] names one operation and its arguments. [`execute`] applies
//! it to a scratch copy of the estate and commits only on success, so a
//! multi-month `Wait` that fails halfway changes nothing.

use crate::error::{Missing, PipelineError};
use crate::holdings::{self, SaleReceipt, VineyardOffer};
use crate::pipeline;
use crate::tick::{self, MonthReport};
use serde::{Deserialize, Serialize};
use sim_core::{
    BottledWine, BottledWineId, Catalog, DestemCrush, Estate, GrapeLot, GrapeLotId, MustLot,
    MustLotId, Randomness, Vessel, VesselId, Vineyard, WineInProduction, WineLotId,
};
use rust_decimal::Decimal;
use sim_econ::check_offer_price;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    AdvanceMonth,
    Wait {
        months: u32,
    },
    /// Buy a vineyard at a price taken from a [`VineyardOffer`] quote.
    /// Prices no quote for the region could show are refused.
    BuyVineyard {
        region: String,
        varietal: String,
        name: String,
        cost: Decimal,
    },
    TendVineyard {
        vineyard: String,
    },
    Harvest {
        vineyard: String,
    },
    BuyVessel {
        vessel_type: String,
    },
    ProcessGrapes {
        lot: GrapeLotId,
        #[serde(default)]
        sort: bool,
        method: DestemCrush,
    },
    StartFermentation {
        must: MustLotId,
        vessel: VesselId,
    },
    Macerate {
        lot: WineLotId,
    },
    StartAging {
        lot: WineLotId,
        vessel: VesselId,
        months: u32,
    },
    Bottle {
        lot: WineLotId,
        name: String,
    },
    SellWine {
        wine: BottledWineId,
        bottles: u32,
    },
}

/// The entity created or updated by a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Month(MonthReport),
    Months { reports: Vec<MonthReport> },
    Vineyard(Vineyard),
    Tended { vineyard: String, health: u8 },
    Grapes(GrapeLot),
    Vessel(Vessel),
    Must(MustLot),
    Wine(WineInProduction),
    Macerated { lot: WineLotId, quality: u8 },
    Bottled(BottledWine),
    Sale(SaleReceipt),
}

/// Run `f` against a copy of `estate`, keeping the copy only if `f` succeeds.
pub fn transact<T, F>(estate: &mut Estate, f: F) -> Result<T, PipelineError>
where
    F: FnOnce(&mut Estate) -> Result<T, PipelineError>,
{
    let mut scratch = estate.clone();
    let out = f(&mut scratch)?;
    *estate = scratch;
    Ok(out)
}

/// Apply one command as a single unit of work.
pub fn execute<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
    command: &Command,
) -> Result<Outcome, PipelineError> {
    transact(estate, |scratch| apply(scratch, catalog, rng, command))
}

fn apply<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
    command: &Command,
) -> Result<Outcome, PipelineError> {
    let outcome = match command {
        Command::AdvanceMonth => Outcome::Month(tick::advance_month(estate, catalog, rng)?),
        Command::Wait { months } => Outcome::Months {
            reports: tick::run_months(estate, catalog, rng, *months)?,
        },
        Command::BuyVineyard {
            region,
            varietal,
            name,
            cost,
        } => {
            let base = catalog
                .regions
                .get(region)
                .ok_or_else(|| Missing::Region(region.clone()))?
                .base_cost;
            check_offer_price(base, *cost)?;
            let offer = VineyardOffer {
                region: region.clone(),
                varietal: varietal.clone(),
                cost: *cost,
            };
            Outcome::Vineyard(holdings::buy_vineyard(estate, catalog, rng, &offer, name)?)
        }
        Command::TendVineyard { vineyard } => Outcome::Tended {
            vineyard: vineyard.clone(),
            health: holdings::tend_vineyard(estate, rng, vineyard)?,
        },
        Command::Harvest { vineyard } => {
            Outcome::Grapes(pipeline::harvest(estate, catalog, rng, vineyard)?)
        }
        Command::BuyVessel { vessel_type } => {
            Outcome::Vessel(holdings::buy_vessel(estate, catalog, vessel_type)?)
        }
        Command::ProcessGrapes { lot, sort, method } => {
            Outcome::Must(pipeline::process_grapes(estate, rng, *lot, *sort, *method)?)
        }
        Command::StartFermentation { must, vessel } => {
            Outcome::Wine(pipeline::start_fermentation(estate, catalog, *must, *vessel)?)
        }
        Command::Macerate { lot } => Outcome::Macerated {
            lot: *lot,
            quality: pipeline::macerate(estate, catalog, rng, *lot)?,
        },
        Command::StartAging {
            lot,
            vessel,
            months,
        } => Outcome::Wine(pipeline::start_aging(
            estate, catalog, *lot, *vessel, *months,
        )?),
        Command::Bottle { lot, name } => {
            Outcome::Bottled(pipeline::bottle(estate, catalog, *lot, name)?)
        }
        Command::SellWine { wine, bottles } => {
            Outcome::Sale(holdings::sell_wine(estate, *wine, *bottles)?)
        }
    };
    Ok(outcome)
}
