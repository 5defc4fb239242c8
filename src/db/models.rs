use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One observed price for one instrument at one point in time.
///
/// Samples are immutable once stored: there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub id: Option<i64>,
    pub isin: String,
    pub captured_at: DateTime<Utc>,
    pub price: f64,
}

impl PriceSample {
    pub fn new(isin: impl Into<String>, captured_at: DateTime<Utc>, price: f64) -> Self {
        Self {
            id: None,
            isin: isin.into(),
            captured_at,
            price,
        }
    }

    /// UTC calendar date of the capture, used as the chart label
    pub fn capture_date(&self) -> NaiveDate {
        self.captured_at.date_naive()
    }

    /// Capture date formatted as `YYYY-MM-DD`
    pub fn date_label(&self) -> String {
        self.capture_date().format("%Y-%m-%d").to_string()
    }
}
