#![deny(warnings)]

//! Simulation runtime: the production pipeline, estate operations, the
//! monthly tick engine and the command/session layer adapters drive.
//!
//! Every operation takes the [`Estate`](sim_core::Estate) explicitly along
//! with the catalog and an injected [`Randomness`](sim_core::Randomness)
//! source. Failed operations leave the estate exactly as they found it.

pub mod command;
pub mod error;
pub mod game;
pub mod holdings;
pub mod pipeline;
pub mod tick;

pub use command::{execute, transact, Command, Outcome};
pub use error::{Missing, NotReady, PipelineError, VesselUnavailable};
pub use game::{Game, SharedGame};
pub use holdings::{
    buy_vessel, buy_vineyard, sell_wine, tend_vineyard, vessel_offers, vineyard_offers,
    SaleReceipt, VesselOffer, VineyardOffer,
};
pub use pipeline::{
    bottle, check_vessel, harvest, macerate, process_grapes, start_aging, start_fermentation,
    BOTTLE_LITERS, JUICE_LITERS_PER_KG,
};
pub use tick::{advance_month, run_months, MonthReport};

#[cfg(test)]
pub(crate) mod fixtures {
    use sim_core::{
        BottledWine, BottledWineId, Catalog, DestemCrush, Estate, GrapeLot, GrapeLotId, MustLot,
        MustLotId, ProcessingMethod, SimConfig, Stage, VesselId, WineInProduction, WineLotId,
        WineStyle,
    };

    /// A fresh default game: Home Block plus five empty vessels (ids 1-5).
    pub fn estate() -> (Estate, Catalog) {
        let catalog = Catalog::standard();
        let estate = Estate::new(&SimConfig::default(), &catalog).unwrap();
        (estate, catalog)
    }

    /// Make Home Block ready to pick at the given health.
    pub fn ripen(estate: &mut Estate, health: u8) {
        let home = &mut estate.player.vineyards[0];
        home.health = health;
        home.grapes_ready = true;
    }

    pub fn grapes(estate: &mut Estate, quantity_kg: f64, quality: u8) -> GrapeLotId {
        let id = GrapeLotId(estate.allocate_id());
        estate.player.grapes.push(GrapeLot {
            id,
            varietal: "Pinot Noir".to_string(),
            vintage: estate.calendar.year,
            quantity_kg,
            quality,
        });
        id
    }

    pub fn must(estate: &mut Estate, quantity_kg: f64, quality: u8) -> MustLotId {
        let id = MustLotId(estate.allocate_id());
        estate.player.winery.musts.push(MustLot {
            id,
            varietal: "Pinot Noir".to_string(),
            vintage: estate.calendar.year,
            quantity_kg,
            quality,
            processing_method: ProcessingMethod::Unsorted,
            destem_crush: DestemCrush::PartialDestem,
        });
        id
    }

    /// A Pinot Noir lot of quality 70 occupying `vessel`. Aging lots start
    /// with a zero-month duration.
    pub fn wine(estate: &mut Estate, vessel: VesselId, liters: f64, stage: Stage) -> WineLotId {
        let id = WineLotId(estate.allocate_id());
        let winery = &mut estate.player.winery;
        let host = winery
            .vessels
            .iter_mut()
            .find(|v| v.id == vessel)
            .unwrap();
        host.in_use = true;
        let vessel_type = host.vessel_type.clone();
        let fermentation_progress = match stage {
            Stage::Fermenting => 0,
            Stage::Aging => 100,
        };
        winery.wines.push(WineInProduction {
            id,
            varietal: "Pinot Noir".to_string(),
            vintage: estate.calendar.year,
            quantity_liters: liters,
            quality: 70,
            vessel_type,
            vessel,
            stage,
            fermentation_progress,
            aging_progress: 0,
            aging_duration: 0,
            maceration_actions_taken: 0,
        });
        id
    }

    pub fn bottled(estate: &mut Estate, quality: u8, bottles: u32) -> BottledWineId {
        let id = BottledWineId(estate.allocate_id());
        estate.player.cellar.push(BottledWine {
            id,
            name: "Reserve".to_string(),
            vintage: estate.calendar.year,
            varietal: "Pinot Noir".to_string(),
            style: WineStyle::Red,
            quality,
            bottles,
        });
        id
    }
}
