// Reports module - chart payload and page built from the full sample history

pub mod chart;
pub mod page;

use anyhow::Result;
use std::path::Path;

pub use chart::{build_chart, build_chart_with_rng, ChartPayload, ChartPoint, Series};
pub use page::render_page;

/// Re-read every stored sample and build the chart payload. No caching.
pub fn load_chart(db_path: &Path) -> Result<ChartPayload> {
    let conn = crate::db::open_db(db_path)?;
    let samples = crate::db::list_samples(&conn)?;
    tracing::debug!("Building chart from {} samples", samples.len());
    Ok(build_chart(&samples))
}
