#![deny(warnings)]

//! Create or upgrade the save database: `migrate [SQLITE_URL]`.

use persistence::{default_sqlite_url, find_or_create_save, init_db, list_saves};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| default_sqlite_url().to_string());
    let pool = init_db(&url).await?;
    find_or_create_save(&pool, "default").await?;
    println!("DB migrated at {}", url);
    for save in list_saves(&pool).await? {
        match (save.year, save.month_index) {
            (Some(year), Some(month)) => {
                println!("  #{} {} | {}-{:02}", save.id, save.name, year, month + 1)
            }
            _ => println!("  #{} {} | empty", save.id, save.name),
        }
    }
    pool.close().await;
    Ok(())
}
