// Database module - SQLite connection and the append-only sample log

pub mod models;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use models::PriceSample;

/// Get the default database path (~/.bondwatch/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".bondwatch").join("data.db"))
}

/// Open database connection
pub fn open_db(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Failed to open database at {:?}", path))?;
    Ok(conn)
}

/// Initialize the database with schema
///
/// Creates the parent directory when missing and runs the schema SQL.
/// Safe to call on every startup.
pub fn init_database(path: &Path) -> Result<()> {
    info!("Initializing database at: {:?}", path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }

    let conn = open_db(path)?;
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")?;

    Ok(())
}

/// Append a sample. Never deduplicates.
pub fn insert_sample(conn: &Connection, sample: &PriceSample) -> Result<i64> {
    conn.execute(
        "INSERT INTO price_samples (isin, captured_at, price) VALUES (?1, ?2, ?3)",
        params![sample.isin, sample.captured_at, sample.price],
    )
    .with_context(|| format!("Failed to insert sample for {}", sample.isin))?;

    let id = conn.last_insert_rowid();
    debug!("Stored sample {} for {}", id, sample.isin);
    Ok(id)
}

/// Append one cycle's samples atomically; either all rows land or none do
pub fn insert_samples(conn: &mut Connection, samples: &[PriceSample]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to begin transaction")?;
    for sample in samples {
        insert_sample(&tx, sample)?;
    }
    tx.commit().context("Failed to commit samples")?;
    Ok(samples.len())
}

/// All samples, oldest first
pub fn list_samples(conn: &Connection) -> Result<Vec<PriceSample>> {
    let mut stmt = conn.prepare(
        "SELECT id, isin, captured_at, price
         FROM price_samples
         ORDER BY captured_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([], sample_from_row)?;

    let mut samples = Vec::new();
    for row in rows {
        samples.push(row?);
    }
    Ok(samples)
}

/// Samples of a single instrument, oldest first
pub fn list_samples_for_isin(conn: &Connection, isin: &str) -> Result<Vec<PriceSample>> {
    let mut stmt = conn.prepare(
        "SELECT id, isin, captured_at, price
         FROM price_samples
         WHERE isin = ?1
         ORDER BY captured_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([isin], sample_from_row)?;

    let mut samples = Vec::new();
    for row in rows {
        samples.push(row?);
    }
    Ok(samples)
}

pub fn count_samples(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM price_samples", [], |row| row.get(0))?;
    Ok(count)
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<PriceSample> {
    Ok(PriceSample {
        id: Some(row.get(0)?),
        isin: row.get(1)?,
        captured_at: row.get(2)?,
        price: row.get(3)?,
    })
}
