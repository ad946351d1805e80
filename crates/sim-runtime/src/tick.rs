//! Monthly calendar engine.
//!
//! A tick only moves counters forward: health decays, grapes ripen and
//! fermentation and aging progress. Stage changes are always left to the
//! player.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use sim_core::{Calendar, Catalog, Estate, Randomness, Stage, WineLotId, MAX_SCORE};

/// Monthly probability that a vineyard loses some health.
pub const HEALTH_DECAY_CHANCE: f64 = 0.2;

/// What changed during one month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthReport {
    /// The month that was entered.
    pub calendar: Calendar,
    pub new_year: bool,
    /// Vineyards whose grapes became ready this month.
    pub ripened: Vec<String>,
    pub fermentation_finished: Vec<WineLotId>,
    pub aging_finished: Vec<WineLotId>,
}

/// Advance the estate by one month.
pub fn advance_month<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<MonthReport, PipelineError> {
    // Resolve every lookup first so a bad varietal cannot leave a half-ticked month.
    let ripening: Vec<u8> = estate
        .player
        .vineyards
        .iter()
        .map(|v| catalog.grape(&v.varietal).map(|g| g.ripening_month))
        .collect::<Result<_, _>>()?;

    let new_year = estate.calendar.advance();
    let month = estate.calendar.month_number();
    let mut ripened = Vec::new();
    for (vineyard, ripening_month) in estate.player.vineyards.iter_mut().zip(ripening) {
        if new_year {
            vineyard.harvested_this_year = false;
            vineyard.grapes_ready = false;
        }
        if rng.chance(HEALTH_DECAY_CHANCE) {
            let loss = rng.int_between(1, 3).unsigned_abs();
            vineyard.health = vineyard
                .health
                .saturating_sub(u8::try_from(loss).unwrap_or(u8::MAX));
        }
        if month == ripening_month && !vineyard.harvested_this_year && !vineyard.grapes_ready {
            vineyard.grapes_ready = true;
            ripened.push(vineyard.name.clone());
        }
    }

    let mut fermentation_finished = Vec::new();
    let mut aging_finished = Vec::new();
    for wine in &mut estate.player.winery.wines {
        match wine.stage {
            Stage::Fermenting if wine.fermentation_progress < MAX_SCORE => {
                let gain = rng.int_between(10, 25) + i32::from(wine.quality / 10);
                let progress = (i32::from(wine.fermentation_progress) + gain)
                    .clamp(0, i32::from(MAX_SCORE));
                wine.fermentation_progress = progress as u8;
                if wine.fermentation_complete() {
                    fermentation_finished.push(wine.id);
                }
            }
            Stage::Aging if wine.aging_progress < wine.aging_duration => {
                wine.aging_progress += 1;
                if wine.aging_complete() {
                    aging_finished.push(wine.id);
                }
            }
            _ => {}
        }
    }

    Ok(MonthReport {
        calendar: estate.calendar,
        new_year,
        ripened,
        fermentation_finished,
        aging_finished,
    })
}

/// Advance `months` months, returning one report per month.
pub fn run_months<R: Randomness + ?Sized>(
    estate: &mut Estate,
    catalog: &Catalog,
    rng: &mut R,
    months: u32,
) -> Result<Vec<MonthReport>, PipelineError> {
    (0..months)
        .map(|_| advance_month(estate, catalog, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use proptest::prelude::*;
    use sim_core::{validate_estate, FixedRandom, SimRng, VesselId};

    #[test]
    fn twelve_months_roll_the_year_and_reset_vineyards() {
        let (mut estate, catalog) = fixtures::estate();
        estate.player.vineyards[0].harvested_this_year = true;
        let mut rng = FixedRandom::highest();
        let reports = run_months(&mut estate, &catalog, &mut rng, 12).unwrap();

        assert_eq!(estate.calendar.month_index, 0);
        assert_eq!(estate.calendar.year, 2026);
        assert_eq!(reports.iter().filter(|r| r.new_year).count(), 1);
        assert!(reports[11].new_year);
        let home = &estate.player.vineyards[0];
        assert!(!home.harvested_this_year);
        assert!(!home.grapes_ready);
        // The harvest flag blocked ripening in September.
        assert!(reports.iter().all(|r| r.ripened.is_empty()));
    }

    #[test]
    fn grapes_ripen_in_their_month() {
        let (mut estate, catalog) = fixtures::estate();
        let mut rng = FixedRandom::highest();
        let reports = run_months(&mut estate, &catalog, &mut rng, 8).unwrap();
        // February through September; Pinot Noir ripens in month 9.
        assert_eq!(estate.calendar.month_number(), 9);
        assert_eq!(reports[7].ripened, vec!["Home Block".to_string()]);
        assert!(reports[..7].iter().all(|r| r.ripened.is_empty()));
        assert!(estate.player.vineyards[0].is_harvestable());

        // Ready grapes left on the vine are not re-reported.
        let october = advance_month(&mut estate, &catalog, &mut rng).unwrap();
        assert!(october.ripened.is_empty());
        assert!(estate.player.vineyards[0].grapes_ready);
    }

    #[test]
    fn health_decays_when_the_chance_fires() {
        let (mut estate, catalog) = fixtures::estate();
        advance_month(&mut estate, &catalog, &mut FixedRandom::lowest()).unwrap();
        assert_eq!(estate.player.vineyards[0].health, 79);
        advance_month(&mut estate, &catalog, &mut FixedRandom::highest()).unwrap();
        assert_eq!(estate.player.vineyards[0].health, 79);

        estate.player.vineyards[0].health = 0;
        advance_month(&mut estate, &catalog, &mut FixedRandom::lowest()).unwrap();
        assert_eq!(estate.player.vineyards[0].health, 0);
    }

    #[test]
    fn fermentation_progresses_with_quality_and_caps() {
        let (mut estate, catalog) = fixtures::estate();
        let lot = fixtures::wine(&mut estate, VesselId(1), 100.0, Stage::Fermenting);
        let mut rng = FixedRandom::lowest();
        // 10 + 70 / 10 per month
        let report = advance_month(&mut estate, &catalog, &mut rng).unwrap();
        assert_eq!(estate.player.winery.wines[0].fermentation_progress, 17);
        assert!(report.fermentation_finished.is_empty());

        let reports = run_months(&mut estate, &catalog, &mut rng, 5).unwrap();
        assert_eq!(estate.player.winery.wines[0].fermentation_progress, 100);
        assert_eq!(reports[4].fermentation_finished, vec![lot]);
        assert_eq!(estate.player.winery.wines[0].stage, Stage::Fermenting);

        let idle = advance_month(&mut estate, &catalog, &mut rng).unwrap();
        assert!(idle.fermentation_finished.is_empty());
    }

    #[test]
    fn aging_counts_months_up_to_duration() {
        let (mut estate, catalog) = fixtures::estate();
        let lot = fixtures::wine(&mut estate, VesselId(1), 100.0, Stage::Aging);
        estate.player.winery.wines[0].aging_duration = 2;
        let mut rng = FixedRandom::midpoint();
        let reports = run_months(&mut estate, &catalog, &mut rng, 4).unwrap();
        assert_eq!(estate.player.winery.wines[0].aging_progress, 2);
        assert_eq!(reports[1].aging_finished, vec![lot]);
        assert!(reports[2].aging_finished.is_empty());
        assert_eq!(estate.player.winery.wines[0].stage, Stage::Aging);
    }

    #[test]
    fn unknown_varietal_aborts_before_any_change() {
        let (mut estate, catalog) = fixtures::estate();
        estate.player.vineyards[0].varietal = "Merlot".to_string();
        let before = estate.clone();
        assert!(matches!(
            advance_month(&mut estate, &catalog, &mut FixedRandom::lowest()),
            Err(PipelineError::Catalog(_))
        ));
        assert_eq!(estate, before);
    }

    proptest! {
        #[test]
        fn health_stays_in_bounds(seed in any::<u64>(), months in 1u32..60, start in 0u8..=100) {
            let (mut estate, catalog) = fixtures::estate();
            estate.player.vineyards[0].health = start;
            let mut rng = SimRng::new(seed);
            for report in run_months(&mut estate, &catalog, &mut rng, months).unwrap() {
                prop_assert!(report.calendar.month_index < 12);
            }
            prop_assert!(estate.player.vineyards[0].health <= start);
            validate_estate(&estate, &catalog).unwrap();
        }
    }
}
