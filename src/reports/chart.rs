use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::PriceSample;

/// Chart.js-ready view of the whole sample history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    /// Sorted union of capture dates (`YYYY-MM-DD`) across all series
    pub labels: Vec<String>,
    pub datasets: Vec<Series>,
}

/// One chart line: the samples of a single ISIN in store order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    pub data: Vec<ChartPoint>,
    pub border_color: String,
    pub hidden: bool,
    pub tension: f64,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

impl ChartPayload {
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn series(&self, isin: &str) -> Option<&Series> {
        self.datasets.iter().find(|s| s.label == isin)
    }
}

impl Series {
    fn new(isin: &str, border_color: String) -> Self {
        Self {
            label: isin.to_string(),
            data: Vec::new(),
            border_color,
            hidden: false,
            tension: 0.1,
            fill: false,
        }
    }

    pub fn first(&self) -> Option<&ChartPoint> {
        self.data.first()
    }

    pub fn latest(&self) -> Option<&ChartPoint> {
        self.data.last()
    }
}

/// Group samples into per-ISIN series with random line colours
pub fn build_chart(samples: &[PriceSample]) -> ChartPayload {
    build_chart_with_rng(samples, &mut rand::thread_rng())
}

/// Same as [`build_chart`] with a caller-supplied colour source.
///
/// Series appear in order of each ISIN's first sample; points keep the
/// order of `samples`.
pub fn build_chart_with_rng<R: Rng + ?Sized>(samples: &[PriceSample], rng: &mut R) -> ChartPayload {
    let mut datasets: Vec<Series> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples {
        let slot = *index.entry(sample.isin.as_str()).or_insert_with(|| {
            datasets.push(Series::new(&sample.isin, random_color(rng)));
            datasets.len() - 1
        });
        datasets[slot].data.push(ChartPoint {
            x: sample.date_label(),
            y: sample.price,
        });
    }

    let labels = samples
        .iter()
        .map(PriceSample::date_label)
        .sorted()
        .dedup()
        .collect();

    ChartPayload { labels, datasets }
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn sample(isin: &str, day: u32, hour: u32, price: f64) -> PriceSample {
        PriceSample::new(isin, at(day, hour), price)
    }

    #[test]
    fn empty_history_gives_empty_payload() {
        let payload = build_chart(&[]);
        assert!(payload.is_empty());
        assert!(payload.labels.is_empty());
    }

    #[test]
    fn samples_of_one_isin_share_a_series_whatever_the_interleaving() {
        let samples = vec![
            sample("UA4000234223", 1, 16, 1000.0),
            sample("UA4000207518", 1, 16, 950.0),
            sample("UA4000234223", 2, 16, 1001.0),
            sample("UA4000207518", 3, 16, 951.0),
            sample("UA4000234223", 3, 16, 1002.0),
        ];
        let payload = build_chart(&samples);

        assert_eq!(payload.datasets.len(), 2);
        assert_eq!(payload.datasets[0].label, "UA4000234223");
        assert_eq!(payload.datasets[1].label, "UA4000207518");

        let prices: Vec<f64> = payload
            .series("UA4000234223")
            .unwrap()
            .data
            .iter()
            .map(|p| p.y)
            .collect();
        assert_eq!(prices, vec![1000.0, 1001.0, 1002.0]);
        assert_eq!(payload.series("UA4000207518").unwrap().data.len(), 2);
    }

    #[test]
    fn labels_are_sorted_distinct_dates() {
        let samples = vec![
            sample("UA4000207518", 5, 9, 950.0),
            sample("UA4000234223", 2, 9, 1000.0),
            sample("UA4000234223", 2, 17, 1000.5),
            sample("UA4000207518", 4, 9, 949.0),
        ];
        let payload = build_chart(&samples);
        assert_eq!(payload.labels, vec!["2025-06-02", "2025-06-04", "2025-06-05"]);
    }

    #[test]
    fn points_use_date_labels_and_series_defaults() {
        let payload = build_chart(&[sample("UA4000234223", 7, 16, 1234.56)]);
        let series = &payload.datasets[0];
        assert_eq!(
            series.data,
            vec![ChartPoint {
                x: "2025-06-07".to_string(),
                y: 1234.56
            }]
        );
        assert!(!series.hidden);
        assert!(!series.fill);
        assert_eq!(series.tension, 0.1);
    }

    #[test]
    fn colors_are_six_digit_hex() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<_> = (1..=20)
            .map(|i| sample(&format!("UA40000000{:02}", i), 1, 16, 1.0))
            .collect();
        let payload = build_chart_with_rng(&samples, &mut rng);
        for series in &payload.datasets {
            let color = &series.border_color;
            assert_eq!(color.len(), 7, "bad colour {}", color);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn serializes_with_chartjs_field_names() {
        let mut rng = StdRng::seed_from_u64(1);
        let payload = build_chart_with_rng(&[sample("UA4000234223", 1, 16, 1.5)], &mut rng);
        let json = serde_json::to_value(&payload).unwrap();
        let series = &json["datasets"][0];
        assert!(series.get("borderColor").is_some());
        assert_eq!(series["data"][0]["x"], "2025-06-01");
        assert_eq!(series["data"][0]["y"], 1.5);
    }
}
