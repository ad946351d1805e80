#![deny(warnings)]

//! Economy ledger for the winery.
//!
//! Balance and reputation mutations triggered by pipeline transitions, plus
//! the fixed cost and price formulas:
//! - Sorting: `(quantity_kg / 100) * 100` dollars
//! - Tending a vineyard: $500
//! - Selling: `quality * 10` dollars per bottle
//! - Vineyard offers: region base cost jittered by up to ±$5,000

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Player, Randomness};
use thiserror::Error;

pub const TEND_COST_USD: i64 = 500;
pub const SORTING_COST_PER_100_KG_USD: i64 = 100;
pub const PRICE_PER_QUALITY_POINT_USD: i64 = 10;
pub const OFFER_JITTER_USD: i32 = 5000;

/// Errors produced by ledger operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EconError {
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    /// Amounts moved through the ledger must be non-negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),
    #[error("non-finite numeric conversion")]
    NonFinite,
    /// A vineyard price no offer for the region could have quoted.
    #[error("price {price} outside the quoted range {low}..={high}")]
    OffMarket {
        price: Decimal,
        low: Decimal,
        high: Decimal,
    },
}

pub fn tend_cost() -> Decimal {
    Decimal::new(TEND_COST_USD, 0)
}

/// Cost of hand sorting a grape lot, rounded to cents.
pub fn sorting_cost(quantity_kg: f64) -> Result<Decimal, EconError> {
    if !quantity_kg.is_finite() || quantity_kg < 0.0 {
        return Err(EconError::NonFinite);
    }
    let cost = (quantity_kg / 100.0) * SORTING_COST_PER_100_KG_USD as f64;
    Decimal::from_f64(cost)
        .map(|d| d.round_dp(2))
        .ok_or(EconError::NonFinite)
}

/// Fixed selling price of one bottle.
pub fn bottle_price(quality: u8) -> Decimal {
    Decimal::from(quality) * Decimal::new(PRICE_PER_QUALITY_POINT_USD, 0)
}

pub fn sale_revenue(quality: u8, bottles: u32) -> Decimal {
    bottle_price(quality) * Decimal::from(bottles)
}

/// Asking price of a vineyard in a region, never below zero.
pub fn vineyard_offer_price<R: Randomness + ?Sized>(base_cost: Decimal, rng: &mut R) -> Decimal {
    let jitter = rng.int_between(-OFFER_JITTER_USD, OFFER_JITTER_USD);
    (base_cost + Decimal::from(jitter)).max(Decimal::ZERO)
}

/// Reject a vineyard price that [`vineyard_offer_price`] could not have
/// produced for `base_cost`.
pub fn check_offer_price(base_cost: Decimal, price: Decimal) -> Result<(), EconError> {
    let jitter = Decimal::from(OFFER_JITTER_USD);
    let low = (base_cost - jitter).max(Decimal::ZERO);
    let high = (base_cost + jitter).max(Decimal::ZERO);
    if price < low || price > high {
        return Err(EconError::OffMarket { price, low, high });
    }
    Ok(())
}

pub fn can_afford(player: &Player, cost: Decimal) -> bool {
    cost >= Decimal::ZERO && player.money >= cost
}

pub fn ensure_affordable(player: &Player, cost: Decimal) -> Result<(), EconError> {
    if cost < Decimal::ZERO {
        return Err(EconError::InvalidAmount(cost));
    }
    if player.money < cost {
        return Err(EconError::InsufficientFunds {
            required: cost,
            available: player.money,
        });
    }
    Ok(())
}

/// Withdraw `amount`, failing without change if the balance would go negative.
/// Returns the new balance.
pub fn debit(player: &mut Player, amount: Decimal) -> Result<Decimal, EconError> {
    ensure_affordable(player, amount)?;
    player.money -= amount;
    Ok(player.money)
}

/// Deposit `amount`. Returns the new balance.
pub fn credit(player: &mut Player, amount: Decimal) -> Result<Decimal, EconError> {
    if amount < Decimal::ZERO {
        return Err(EconError::InvalidAmount(amount));
    }
    player.money += amount;
    Ok(player.money)
}

/// Milestones that raise the player's reputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationEvent {
    VineyardPurchased,
    Harvest,
    FermentationStarted,
    Bottling,
}

impl ReputationEvent {
    pub fn points(self) -> u32 {
        match self {
            ReputationEvent::VineyardPurchased => 2,
            ReputationEvent::Harvest => 5,
            ReputationEvent::FermentationStarted => 3,
            ReputationEvent::Bottling => 10,
        }
    }
}

/// Reputation only ever grows. Returns the new reputation.
pub fn award(player: &mut Player, event: ReputationEvent) -> u32 {
    player.reputation = player.reputation.saturating_add(event.points());
    player.reputation
}
