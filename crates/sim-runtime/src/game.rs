//! Game session: one estate, its catalog and its random stream.
//!
//! This is the unit-of-work boundary adapters talk to. Pure pipeline and tick
//! functions stay silent; the session logs what was applied or rejected.

use crate::command::{self, transact, Command, Outcome};
use crate::error::PipelineError;
use crate::holdings::{self, VesselOffer, VineyardOffer};
use crate::tick::{self, MonthReport};
use sim_core::{
    validate_catalog, validate_estate, Catalog, Estate, SaveGame, SimConfig, SimRng,
    ValidationError,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct Game {
    estate: Estate,
    catalog: Catalog,
    rng: SimRng,
}

impl Game {
    /// Start a new game. The catalog is checked before anything is built.
    pub fn new(config: &SimConfig, catalog: Catalog) -> Result<Self, ValidationError> {
        validate_catalog(&catalog)?;
        let estate = Estate::new(config, &catalog)?;
        validate_estate(&estate, &catalog)?;
        let rng = SimRng::new(config.rng_seed);
        info!(
            seed = rng.seed(),
            start = %estate.calendar,
            vineyards = estate.player.vineyards.len(),
            vessels = estate.player.winery.vessels.len(),
            "new game"
        );
        Ok(Self {
            estate,
            catalog,
            rng,
        })
    }

    /// Resume a saved game, re-checking every invariant on the way in.
    pub fn from_save(save: SaveGame, catalog: Catalog) -> Result<Self, ValidationError> {
        validate_catalog(&catalog)?;
        validate_estate(&save.estate, &catalog)?;
        info!(date = %save.estate.calendar, seed = save.rng.seed, "game resumed");
        Ok(Self {
            estate: save.estate,
            catalog,
            rng: SimRng::from_checkpoint(save.rng),
        })
    }

    pub fn to_save(&self) -> SaveGame {
        SaveGame {
            estate: self.estate.clone(),
            rng: self.rng.checkpoint(),
        }
    }

    pub fn estate(&self) -> &Estate {
        &self.estate
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run `f` against the session, rewinding the random stream when it
    /// fails. `f` is responsible for leaving the estate untouched on error.
    fn rewinding<T, F>(&mut self, f: F) -> Result<T, PipelineError>
    where
        F: FnOnce(&mut Estate, &Catalog, &mut SimRng) -> Result<T, PipelineError>,
    {
        let checkpoint = self.rng.clone();
        let out = f(&mut self.estate, &self.catalog, &mut self.rng);
        if out.is_err() {
            self.rng = checkpoint;
        }
        out
    }

    pub fn execute(&mut self, command: &Command) -> Result<Outcome, PipelineError> {
        let result =
            self.rewinding(|estate, catalog, rng| command::execute(estate, catalog, rng, command));
        match result {
            Ok(outcome) => {
                debug!(?command, "command applied");
                match &outcome {
                    Outcome::Month(report) => log_month(report),
                    Outcome::Months { reports } => reports.iter().for_each(log_month),
                    _ => {}
                }
                Ok(outcome)
            }
            Err(error) => {
                warn!(?command, %error, "command rejected");
                Err(error)
            }
        }
    }

    pub fn advance_month(&mut self) -> Result<MonthReport, PipelineError> {
        let report = self.rewinding(|estate, catalog, rng| {
            transact(estate, |scratch| tick::advance_month(scratch, catalog, rng))
        })?;
        log_month(&report);
        Ok(report)
    }

    pub fn run_months(&mut self, months: u32) -> Result<Vec<MonthReport>, PipelineError> {
        let reports = self.rewinding(|estate, catalog, rng| {
            transact(estate, |scratch| tick::run_months(scratch, catalog, rng, months))
        })?;
        reports.iter().for_each(log_month);
        Ok(reports)
    }

    /// Quote today's vineyard prices. Draws from the game's random stream.
    pub fn vineyard_offers(&mut self) -> Vec<VineyardOffer> {
        holdings::vineyard_offers(&self.catalog, &mut self.rng)
    }

    pub fn vessel_offers(&self) -> Vec<VesselOffer> {
        holdings::vessel_offers(&self.catalog)
    }
}

fn log_month(report: &MonthReport) {
    info!(
        date = %report.calendar,
        new_year = report.new_year,
        ripened = ?report.ripened,
        fermented = report.fermentation_finished.len(),
        aged = report.aging_finished.len(),
        "month advanced"
    );
}

/// A [`Game`] shared between callers. Every call holds the lock for the
/// whole operation, so no caller ever sees a half-applied command.
#[derive(Clone, Debug)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    // Operations never leave the estate half-mutated, so a poisoned lock
    // still guards a consistent game.
    fn lock(&self) -> MutexGuard<'_, Game> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn execute(&self, command: &Command) -> Result<Outcome, PipelineError> {
        self.lock().execute(command)
    }

    pub fn advance_month(&self) -> Result<MonthReport, PipelineError> {
        self.lock().advance_month()
    }

    /// Read the game under the lock.
    pub fn with<T>(&self, f: impl FnOnce(&Game) -> T) -> T {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> SaveGame {
        self.lock().to_save()
    }
}
