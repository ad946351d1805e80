#![deny(warnings)]

//! Persistence layer: SQLite save slots holding one JSON snapshot each.
//!
//! A snapshot is a whole [`SaveGame`] (estate plus RNG position), written
//! after a successful unit of work and read back on load. Only the latest
//! snapshot of a save is kept.

use anyhow::{Context, Result};
use sim_core::SaveGame;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/winery.db"
}

/// A save slot as listed for the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveSummary {
    pub id: i64,
    pub name: String,
    pub note: Option<String>,
    /// Game date of the stored snapshot, if one was written yet.
    pub year: Option<i32>,
    pub month_index: Option<u8>,
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Create the directory that will hold a file-backed database.
fn ensure_parent_dir(url: &str) -> Result<()> {
    if is_in_memory(url) {
        return Ok(());
    }
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Open (creating if needed) the database at `url` and apply migrations.
pub async fn init_db(url: &str) -> Result<SqlitePool> {
    ensure_parent_dir(url)?;
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    // A single long-lived connection keeps in-memory databases alive and
    // serializes writers.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("opening {url}"))?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Register a new save slot. Names are unique.
pub async fn create_save(pool: &SqlitePool, name: &str, note: Option<&str>) -> Result<i64> {
    let res = sqlx::query("INSERT INTO saves (name, note) VALUES (?, ?)")
        .bind(name)
        .bind(note)
        .execute(pool)
        .await
        .with_context(|| format!("creating save '{name}'"))?;
    Ok(res.last_insert_rowid())
}

pub async fn find_save(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
    let row = sqlx::query("SELECT id FROM saves WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(match row {
        Some(row) => Some(row.try_get("id")?),
        None => None,
    })
}

pub async fn find_or_create_save(pool: &SqlitePool, name: &str) -> Result<i64> {
    match find_save(pool, name).await? {
        Some(id) => Ok(id),
        None => create_save(pool, name, None).await,
    }
}

pub async fn list_saves(pool: &SqlitePool) -> Result<Vec<SaveSummary>> {
    let rows = sqlx::query(
        "SELECT s.id, s.name, s.note, p.year, p.month_index \
         FROM saves s LEFT JOIN snapshots p ON p.save_id = s.id \
         ORDER BY s.id",
    )
    .fetch_all(pool)
    .await?;
    rows.iter()
        .map(|row| -> Result<SaveSummary> {
            let month_index: Option<i64> = row.try_get("month_index")?;
            let year: Option<i64> = row.try_get("year")?;
            Ok(SaveSummary {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                note: row.try_get("note")?,
                year: year.map(i32::try_from).transpose()?,
                month_index: month_index.map(u8::try_from).transpose()?,
            })
        })
        .collect()
}

/// Write `save` as the current snapshot of `save_id`, replacing any older one.
pub async fn store_snapshot(pool: &SqlitePool, save_id: i64, save: &SaveGame) -> Result<()> {
    let payload = serde_json::to_string(save)?;
    let calendar = save.estate.calendar;
    sqlx::query(
        "INSERT INTO snapshots (save_id, year, month_index, payload) VALUES (?, ?, ?, ?) \
         ON CONFLICT(save_id) DO UPDATE SET \
           year = excluded.year, \
           month_index = excluded.month_index, \
           payload = excluded.payload, \
           updated_at = CURRENT_TIMESTAMP",
    )
    .bind(save_id)
    .bind(i64::from(calendar.year))
    .bind(i64::from(calendar.month_index))
    .bind(payload.as_str())
    .execute(pool)
    .await
    .with_context(|| format!("storing snapshot for save {save_id}"))?;
    info!(save_id, date = %calendar, bytes = payload.len(), "snapshot stored");
    Ok(())
}

pub async fn load_snapshot(pool: &SqlitePool, save_id: i64) -> Result<Option<SaveGame>> {
    let row = sqlx::query("SELECT payload FROM snapshots WHERE save_id = ?")
        .bind(save_id)
        .fetch_optional(pool)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let payload: String = row.try_get("payload")?;
    let save: SaveGame = serde_json::from_str(&payload)
        .with_context(|| format!("decoding snapshot for save {save_id}"))?;
    info!(save_id, date = %save.estate.calendar, "snapshot loaded");
    Ok(Some(save))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Catalog, Estate, SimConfig, SimRng};

    fn sample_save() -> SaveGame {
        let estate = Estate::new(&SimConfig::default(), &Catalog::standard()).unwrap();
        SaveGame {
            estate,
            rng: SimRng::new(42).checkpoint(),
        }
    }

    #[test]
    fn url_is_sqlite() {
        assert!(default_sqlite_url().starts_with("sqlite://"));
        assert!(is_in_memory("sqlite::memory:"));
        assert!(!is_in_memory(default_sqlite_url()));
    }

    #[tokio::test]
    async fn snapshot_roundtrip_and_upsert() {
        let pool = init_db("sqlite::memory:").await.unwrap();
        let id = create_save(&pool, "main", Some("first vintage")).await.unwrap();
        assert!(load_snapshot(&pool, id).await.unwrap().is_none());

        let mut save = sample_save();
        store_snapshot(&pool, id, &save).await.unwrap();
        assert_eq!(load_snapshot(&pool, id).await.unwrap(), Some(save.clone()));

        save.estate.calendar.advance();
        save.estate.player.reputation = 61;
        store_snapshot(&pool, id, &save).await.unwrap();
        assert_eq!(load_snapshot(&pool, id).await.unwrap(), Some(save));

        let saves = list_saves(&pool).await.unwrap();
        assert_eq!(
            saves,
            vec![SaveSummary {
                id,
                name: "main".to_string(),
                note: Some("first vintage".to_string()),
                year: Some(2025),
                month_index: Some(1),
            }]
        );
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM snapshots")
            .fetch_one(&pool)
            .await
            .unwrap()
            .try_get("n")
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn save_names_are_unique() {
        let pool = init_db("sqlite::memory:").await.unwrap();
        let id = find_or_create_save(&pool, "main").await.unwrap();
        assert_eq!(find_or_create_save(&pool, "main").await.unwrap(), id);
        assert_eq!(find_save(&pool, "main").await.unwrap(), Some(id));
        assert_eq!(find_save(&pool, "other").await.unwrap(), None);
        assert!(create_save(&pool, "main", None).await.is_err());
    }

    #[tokio::test]
    async fn file_database_is_created_with_its_directory() {
        let dir = std::env::temp_dir().join(format!("winery-saves-{}", std::process::id()));
        let file = dir.join("nested").join("test.db");
        let url = format!("sqlite://{}", file.display());
        let pool = init_db(&url).await.unwrap();
        let id = create_save(&pool, "disk", None).await.unwrap();
        store_snapshot(&pool, id, &sample_save()).await.unwrap();
        pool.close().await;
        assert!(file.exists());

        let pool = init_db(&url).await.unwrap();
        assert_eq!(find_save(&pool, "disk").await.unwrap(), Some(id));
        assert_eq!(load_snapshot(&pool, id).await.unwrap(), Some(sample_save()));
        pool.close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
