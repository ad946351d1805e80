use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_core::{Catalog, Estate, SimConfig, SimRng, Stage, Vessel, VesselId, Vineyard};
use sim_core::{WineInProduction, WineLotId};

/// An estate with 200 vineyards and 500 lots in production.
fn large_estate(catalog: &Catalog) -> Estate {
    let mut estate = Estate::new(&SimConfig::default(), catalog).unwrap();
    let template = estate.player.vineyards[0].clone();
    for i in 0..200 {
        estate.player.vineyards.push(Vineyard {
            name: format!("Block {i}"),
            ..template.clone()
        });
    }
    for i in 0..500 {
        let vessel = VesselId(estate.allocate_id());
        estate.player.winery.vessels.push(Vessel {
            id: vessel,
            vessel_type: "Stainless Steel Tank".to_string(),
            capacity: 5000,
            in_use: true,
        });
        let stage = if i % 2 == 0 { Stage::Fermenting } else { Stage::Aging };
        let id = WineLotId(estate.allocate_id());
        estate.player.winery.wines.push(WineInProduction {
            id,
            varietal: "Pinot Noir".to_string(),
            vintage: 2025,
            quantity_liters: 1000.0,
            quality: 70,
            vessel_type: "Stainless Steel Tank".to_string(),
            vessel,
            stage,
            fermentation_progress: 0,
            aging_progress: 0,
            aging_duration: 240,
            maceration_actions_taken: 0,
        });
    }
    estate
}

fn bench_ticks(c: &mut Criterion) {
    let catalog = Catalog::standard();
    let estate = large_estate(&catalog);
    c.bench_function("advance_month_large_estate", |b| {
        b.iter(|| {
            let mut estate = estate.clone();
            let mut rng = SimRng::new(42);
            black_box(sim_runtime::advance_month(&mut estate, &catalog, &mut rng).unwrap());
        })
    });
    c.bench_function("run_year_large_estate", |b| {
        b.iter(|| {
            let mut estate = estate.clone();
            let mut rng = SimRng::new(42);
            black_box(sim_runtime::run_months(&mut estate, &catalog, &mut rng, 12).unwrap());
        })
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
