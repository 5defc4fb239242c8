//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data loading from presentation.

use bondwatch::db::PriceSample;
use bondwatch::pipeline::CycleReport;
use bondwatch::reports::ChartPayload;
use bondwatch::utils::format_price_plain;
use colored::Colorize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Format the chart payload for JSON output
pub fn format_chart_json(payload: &ChartPayload) -> String {
    serde_json::to_string_pretty(payload)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// One row per series: span of dates, latest price and change since first sample
pub fn format_chart_summary(payload: &ChartPayload) -> String {
    #[derive(Tabled)]
    struct SeriesRow {
        #[tabled(rename = "ISIN")]
        isin: String,
        #[tabled(rename = "Points")]
        points: usize,
        #[tabled(rename = "First")]
        first: String,
        #[tabled(rename = "Last")]
        last: String,
        #[tabled(rename = "Latest Price")]
        latest: String,
        #[tabled(rename = "Change")]
        change: String,
    }

    let rows: Vec<SeriesRow> = payload
        .datasets
        .iter()
        .map(|series| {
            let first = series.first();
            let latest = series.latest();
            let change = match (first, latest) {
                (Some(f), Some(l)) => {
                    let delta = l.y - f.y;
                    let text = format_price_plain(delta);
                    if delta >= 0.0 {
                        text.green().to_string()
                    } else {
                        text.red().to_string()
                    }
                }
                _ => "N/A".to_string(),
            };

            SeriesRow {
                isin: series.label.clone(),
                points: series.data.len(),
                first: first.map(|p| p.x.clone()).unwrap_or_default(),
                last: latest.map(|p| p.x.clone()).unwrap_or_default(),
                latest: latest
                    .map(|p| format_price_plain(p.y))
                    .unwrap_or_else(|| "N/A".to_string()),
                change,
            }
        })
        .collect();

    let mut output = format!(
        "\n{} {} series over {} date(s)\n\n",
        "📈".cyan().bold(),
        payload.datasets.len(),
        payload.labels.len()
    );

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Format stored samples as a table, oldest first
pub fn format_samples_table(samples: &[PriceSample]) -> String {
    #[derive(Tabled)]
    struct SampleRow {
        #[tabled(rename = "Captured (UTC)")]
        captured_at: String,
        #[tabled(rename = "ISIN")]
        isin: String,
        #[tabled(rename = "Price")]
        price: String,
    }

    let rows: Vec<SampleRow> = samples
        .iter()
        .map(|s| SampleRow {
            captured_at: s.captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            isin: s.isin.clone(),
            price: format_price_plain(s.price),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());

    format!("{}\n{} sample(s)\n", table, samples.len())
}

/// Format empty history message
pub fn format_empty_history() -> String {
    format!(
        "{} No samples stored yet\nCollect prices first using: {} scrape\n",
        "ℹ".blue().bold(),
        "bondwatch".bold()
    )
}

pub fn format_cycle_report(report: &CycleReport, source: &str) -> String {
    format!(
        "{} Stored {} sample(s) ({} watched row(s) matched) from {}\n",
        "✓".green().bold(),
        report.stored,
        report.matched,
        source
    )
}
