//! One fetch → extract → store cycle
//!
//! The pipeline owns everything a cycle needs, built from an explicit
//! [`Config`]. A fresh SQLite connection is opened per cycle; nothing is
//! shared between overlapping runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::Config;
use crate::db::{self, PriceSample};
use crate::scraping::{Extractor, Fetcher};

/// Outcome of a single cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Watched rows with a readable price
    pub matched: usize,
    /// Samples appended to the store
    pub stored: usize,
}

pub struct ScrapePipeline {
    fetcher: Fetcher,
    extractor: Extractor,
    db_path: PathBuf,
}

impl ScrapePipeline {
    /// Build the pipeline and make sure the store schema exists
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::new(config.source_url.clone(), config.request_timeout())?;
        let extractor = Extractor::new(config.watch_list.iter().cloned(), config.columns.clone());
        let db_path = config.database_path()?;
        db::init_database(&db_path)?;

        Ok(Self {
            fetcher,
            extractor,
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn source_url(&self) -> &str {
        self.fetcher.url()
    }

    /// Extract watched prices from `markup` and append them with `captured_at`.
    ///
    /// Re-ingesting the same markup stores the samples again.
    pub fn ingest(&self, markup: &str, captured_at: DateTime<Utc>) -> Result<CycleReport> {
        let samples = self.samples_from(markup, captured_at)?;
        store_samples(&self.db_path, samples)
    }

    /// Fetch the listing and ingest it, timestamped now.
    ///
    /// The SQLite writes run on the blocking pool.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let markup = self
            .fetcher
            .fetch()
            .await
            .context("Failed to fetch bond listing")?;
        let samples = self.samples_from(&markup, Utc::now())?;

        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || store_samples(&db_path, samples))
            .await
            .context("Store task panicked")?
    }

    fn samples_from(&self, markup: &str, captured_at: DateTime<Utc>) -> Result<Vec<PriceSample>> {
        Ok(self
            .extractor
            .extract(markup)?
            .into_iter()
            .map(|item| PriceSample::new(item.isin, captured_at, item.price))
            .collect())
    }

    /// Run one cycle, logging and swallowing any failure.
    ///
    /// The scheduler calls this; the next firing is the only retry.
    pub async fn run_logged(&self) {
        match self.run_cycle().await {
            Ok(report) => info!(
                "Scrape cycle finished: {} matched, {} stored",
                report.matched, report.stored
            ),
            Err(e) => error!("[!] Scrape cycle failed: {:#}", e),
        }
    }
}

/// Append one cycle's samples in a single transaction
fn store_samples(db_path: &Path, samples: Vec<PriceSample>) -> Result<CycleReport> {
    if samples.is_empty() {
        return Ok(CycleReport::default());
    }

    let mut conn = db::open_db(db_path)?;
    let stored = db::insert_samples(&mut conn, &samples)?;
    for sample in &samples {
        info!("[✓] {} => {}", sample.isin, sample.price);
    }

    Ok(CycleReport {
        matched: samples.len(),
        stored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn pipeline_in(dir: &TempDir) -> ScrapePipeline {
        let config = Config {
            database_path: Some(dir.path().join("bonds.db")),
            ..Config::default()
        };
        ScrapePipeline::new(&config).unwrap()
    }

    #[test]
    fn new_initializes_the_store() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_in(&dir);
        let conn = db::open_db(pipeline.db_path()).unwrap();
        assert_eq!(db::count_samples(&conn).unwrap(), 0);
    }

    #[test]
    fn ingest_without_matches_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_in(&dir);
        let ts = Utc.with_ymd_and_hms(2025, 4, 1, 16, 0, 0).unwrap();

        let report = pipeline
            .ingest("<table><tbody></tbody></table>", ts)
            .unwrap();

        assert_eq!(report, CycleReport::default());
    }
}
