//! Failure kinds returned by pipeline, estate and calendar operations.
//!
//! Every variant except [`PipelineError::Catalog`] is an expected business
//! outcome that leaves the estate untouched. `Catalog` means a name that is
//! not in the reference data reached the core, which callers should have
//! ruled out beforehand.

use rust_decimal::Decimal;
use sim_core::{
    BottledWineId, Capability, CatalogError, GrapeLotId, MustLotId, Stage, VesselId, WineLotId,
};
use sim_econ::EconError;
use thiserror::Error;

/// What could not be found.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Missing {
    #[error("vineyard '{0}'")]
    Vineyard(String),
    #[error("{0}")]
    GrapeLot(GrapeLotId),
    #[error("{0}")]
    MustLot(MustLotId),
    #[error("{0}")]
    WineLot(WineLotId),
    #[error("{0}")]
    Vessel(VesselId),
    #[error("{0}")]
    BottledWine(BottledWineId),
    #[error("region '{0}'")]
    Region(String),
    #[error("vessel type '{0}'")]
    VesselType(String),
    #[error("varietal '{varietal}' in region '{region}'")]
    RegionVarietal { region: String, varietal: String },
}

/// Which stage precondition is unmet.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NotReady {
    #[error("grapes at '{0}' are not ripe")]
    GrapesNotRipe(String),
    #[error("'{0}' was already harvested this year")]
    AlreadyHarvested(String),
    #[error("{lot} is only {progress}% fermented")]
    FermentationIncomplete { lot: WineLotId, progress: u8 },
    #[error("{lot} has aged {progress} of {duration} months")]
    AgingIncomplete {
        lot: WineLotId,
        progress: u32,
        duration: u32,
    },
    #[error("{lot} is {actual}, expected {expected}")]
    WrongStage {
        lot: WineLotId,
        expected: Stage,
        actual: Stage,
    },
}

/// Why a vessel cannot take a lot.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VesselUnavailable {
    #[error("{0} is in use")]
    Occupied(VesselId),
    #[error("{vessel} does not support {capability}")]
    MissingCapability {
        vessel: VesselId,
        capability: Capability,
    },
    #[error("{vessel} holds {capacity} L but {required} L are needed")]
    InsufficientCapacity {
        vessel: VesselId,
        capacity: u32,
        required: f64,
    },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("not found: {0}")]
    NotFound(#[from] Missing),
    #[error("not ready: {0}")]
    NotReady(#[from] NotReady),
    #[error("vessel unavailable: {0}")]
    VesselUnavailable(#[from] VesselUnavailable),
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    #[error("{wine} has {available} bottles, {requested} requested")]
    InsufficientStock {
        wine: BottledWineId,
        requested: u32,
        available: u32,
    },
    #[error("{varietal} is not a red varietal and cannot be macerated")]
    NotMacerable { varietal: String },
    #[error("invalid vineyard name: {0}")]
    InvalidName(String),
    #[error("ledger error: {0}")]
    Ledger(EconError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<EconError> for PipelineError {
    fn from(e: EconError) -> Self {
        match e {
            EconError::InsufficientFunds {
                required,
                available,
            } => PipelineError::InsufficientFunds {
                required,
                available,
            },
            other => PipelineError::Ledger(other),
        }
    }
}
