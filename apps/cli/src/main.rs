#![deny(warnings)]

//! Headless CLI: runs a scenario script against a new or saved game and
//! prints a read-only summary of the estate.
//!
//! `cli [--scenario FILE] [--months N] [--seed N] [--db URL] [--save NAME] [--json]`

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sim_core::{Catalog, SimConfig};
use sim_runtime::{Command, Game, Outcome};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: Option<PathBuf>,
    months: u32,
    seed: Option<u64>,
    db: Option<String>,
    save: Option<String>,
    json: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--scenario" => out.scenario = Some(value("--scenario")?.into()),
            "--months" => out.months = value("--months")?.parse().context("--months")?,
            "--seed" => out.seed = Some(value("--seed")?.parse().context("--seed")?),
            "--db" => out.db = Some(value("--db")?),
            "--save" => out.save = Some(value("--save")?),
            "--json" => out.json = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    if out.db.is_some() && out.save.is_none() {
        bail!("--db needs --save NAME");
    }
    Ok(out)
}

/// A scripted playthrough: starting setup, catalog and commands to apply.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Scenario {
    config: SimConfig,
    /// Catalog YAML, relative to the scenario file. The built-in catalog
    /// is used when absent.
    catalog: Option<PathBuf>,
    commands: Vec<Command>,
}

impl Scenario {
    fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    fn load_catalog(&self, scenario_path: Option<&Path>) -> Result<Catalog> {
        let Some(file) = &self.catalog else {
            return Ok(Catalog::standard());
        };
        let path = match scenario_path.and_then(Path::parent) {
            Some(dir) => dir.join(file),
            None => file.clone(),
        };
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(Catalog::from_yaml_str(&text)?)
    }
}

/// Apply every command, counting rejections instead of stopping on them.
fn run_commands(game: &mut Game, commands: &[Command], verbose: bool) -> (usize, usize) {
    let mut applied = 0;
    let mut rejected = 0;
    for command in commands {
        match game.execute(command) {
            Ok(outcome) => {
                applied += 1;
                if verbose {
                    println!("{}", describe(&outcome));
                }
            }
            Err(_) => rejected += 1,
        }
    }
    (applied, rejected)
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Month(report) => format!("month | {}", report.calendar),
        Outcome::Months { reports } => match reports.last() {
            Some(last) => format!("waited {} months | {}", reports.len(), last.calendar),
            None => "waited 0 months".to_string(),
        },
        Outcome::Vineyard(v) => format!(
            "vineyard | {} | {} in {} | {} acres | {} soil",
            v.name, v.varietal, v.region, v.size_acres, v.soil_type
        ),
        Outcome::Tended { vineyard, health } => format!("tended | {vineyard} | health {health}"),
        Outcome::Grapes(lot) => format!(
            "harvest | {} | {} {} | {} kg | quality {}",
            lot.id, lot.varietal, lot.vintage, lot.quantity_kg, lot.quality
        ),
        Outcome::Vessel(v) => format!("vessel | {} | {} | {} L", v.id, v.vessel_type, v.capacity),
        Outcome::Must(m) => format!(
            "must | {} | {} | {:?} | quality {}",
            m.id, m.destem_crush, m.processing_method, m.quality
        ),
        Outcome::Wine(w) => format!(
            "wine | {} | {} in {} | {} L | quality {}",
            w.id, w.stage, w.vessel, w.quantity_liters, w.quality
        ),
        Outcome::Macerated { lot, quality } => format!("macerated | {lot} | quality {quality}"),
        Outcome::Bottled(b) => format!(
            "bottled | {} | {} | {} bottles | quality {}",
            b.id, b.name, b.bottles, b.quality
        ),
        Outcome::Sale(s) => format!(
            "sale | {} | {} bottles | ${} | {} left",
            s.wine, s.bottles_sold, s.revenue, s.bottles_remaining
        ),
    }
}

fn print_summary(game: &Game, applied: usize, rejected: usize) {
    let estate = game.estate();
    let player = &estate.player;
    let winery = &player.winery;
    println!(
        "Estate OK | {} | {} | vineyards: {} | vessels: {} ({} in use, {} free)",
        winery.name,
        estate.calendar,
        player.vineyards.len(),
        winery.vessels.len(),
        winery.vessels_in_use(),
        winery.free_vessels().count()
    );
    println!(
        "KPI | money: ${} | reputation: {} | grapes: {} kg | musts: {} | fermenting: {} | aging: {} | bottles: {} | commands: {} ok, {} rejected",
        player.money,
        player.reputation,
        player.grapes.iter().map(|g| g.quantity_kg).sum::<f64>(),
        winery.musts.len(),
        winery.fermenting().count(),
        winery.aging().count(),
        player.cellar.iter().map(|w| u64::from(w.bottles)).sum::<u64>(),
        applied,
        rejected
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(scenario = ?args.scenario, months = args.months, save = ?args.save, "starting CLI");

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    let catalog = scenario.load_catalog(args.scenario.as_deref())?;
    let mut config = scenario.config.clone();
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    let store = match &args.save {
        Some(name) => {
            let url = args.db.as_deref().unwrap_or(persistence::default_sqlite_url());
            let pool = persistence::init_db(url).await?;
            let id = persistence::find_or_create_save(&pool, name).await?;
            Some((pool, id))
        }
        None => None,
    };
    let saved = match &store {
        Some((pool, id)) => persistence::load_snapshot(pool, *id).await?,
        None => None,
    };
    let mut game = match saved {
        Some(save) => Game::from_save(save, catalog)?,
        None => Game::new(&config, catalog)?,
    };

    let (applied, rejected) = run_commands(&mut game, &scenario.commands, !args.json);
    if args.months > 0 {
        game.run_months(args.months)?;
    }

    if let Some((pool, id)) = &store {
        persistence::store_snapshot(pool, *id, &game.to_save()).await?;
        pool.close().await;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&game.to_save())?);
    } else {
        print_summary(&game, applied, rejected);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{validate_estate, BottledWineId};

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    fn first_vintage_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/scenarios/first_vintage.yaml")
    }

    #[test]
    fn parses_flags() {
        let parsed = args(&[
            "--scenario", "s.yaml", "--months", "12", "--seed", "7", "--db", "sqlite::memory:",
            "--save", "main", "--json",
        ])
        .unwrap();
        assert_eq!(
            parsed,
            Args {
                scenario: Some(PathBuf::from("s.yaml")),
                months: 12,
                seed: Some(7),
                db: Some("sqlite::memory:".to_string()),
                save: Some("main".to_string()),
                json: true,
            }
        );
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(args(&["--years", "3"]).is_err());
        assert!(args(&["--months"]).is_err());
        assert!(args(&["--months", "many"]).is_err());
        assert!(args(&["--db", "sqlite::memory:"]).is_err());
    }

    #[test]
    fn first_vintage_scenario_runs_clean() {
        let path = first_vintage_path();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.config.rng_seed, 42);
        assert_eq!(scenario.commands.len(), 14);
        let catalog = scenario.load_catalog(Some(&path)).unwrap();
        assert_eq!(catalog, Catalog::standard());

        let mut game = Game::new(&scenario.config, catalog).unwrap();
        let (applied, rejected) = run_commands(&mut game, &scenario.commands, false);
        assert_eq!((applied, rejected), (14, 0));

        let estate = game.estate();
        validate_estate(estate, game.catalog()).unwrap();
        assert_eq!(estate.calendar.year, 2026);
        assert_eq!(estate.calendar.month_name(), "December");
        assert!(estate.player.winery.wines.is_empty());
        assert_eq!(estate.player.winery.vessels_in_use(), 0);
        assert_eq!(estate.player.winery.free_vessels().count(), 6);
        let wine = estate.player.bottled(BottledWineId(10)).unwrap();
        assert_eq!(wine.name, "Home Block Pinot Noir 2025");
        assert_eq!(wine.vintage, 2025);
    }

    #[test]
    fn missing_catalog_falls_back_to_builtin() {
        let scenario: Scenario = serde_yaml::from_str("commands: []").unwrap();
        assert_eq!(scenario.load_catalog(None).unwrap(), Catalog::standard());
        assert_eq!(scenario.config, SimConfig::default());
    }

    #[test]
    fn outcomes_print_on_one_line() {
        let mut game = Game::new(&SimConfig::default(), Catalog::standard()).unwrap();
        let outcome = game
            .execute(&Command::BuyVessel {
                vessel_type: "Concrete Egg".to_string(),
            })
            .unwrap();
        assert_eq!(describe(&outcome), "vessel | vessel#6 | Concrete Egg | 1500 L");
        let outcome = game.execute(&Command::Wait { months: 2 }).unwrap();
        assert_eq!(describe(&outcome), "waited 2 months | March 2025");
    }

    #[tokio::test]
    async fn progress_survives_a_save_and_reload() {
        let pool = persistence::init_db("sqlite::memory:").await.unwrap();
        let id = persistence::find_or_create_save(&pool, "main").await.unwrap();
        let mut game = Game::new(&SimConfig::default(), Catalog::standard()).unwrap();
        game.run_months(5).unwrap();
        persistence::store_snapshot(&pool, id, &game.to_save()).await.unwrap();

        let save = persistence::load_snapshot(&pool, id).await.unwrap().unwrap();
        let mut resumed = Game::from_save(save, Catalog::standard()).unwrap();
        assert_eq!(resumed.estate(), game.estate());
        assert_eq!(resumed.run_months(7).unwrap(), game.run_months(7).unwrap());
    }
}
