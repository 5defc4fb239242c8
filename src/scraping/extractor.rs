use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Where a value lives inside a table row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    /// Zero-based cell position
    Index(usize),
    /// Text of the matching `thead` cell
    Header(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Columns {
    pub isin: ColumnRef,
    pub price: ColumnRef,
}

impl Default for Columns {
    /// Layout of the uainvest listing: ISIN in the second cell, price in the sixth
    fn default() -> Self {
        Self {
            isin: ColumnRef::Index(1),
            price: ColumnRef::Index(5),
        }
    }
}

/// A watched row whose price parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub isin: String,
    pub price: f64,
}

/// Turns listing markup into price candidates for the watch-list
#[derive(Debug, Clone)]
pub struct Extractor {
    watch_list: HashSet<String>,
    columns: Columns,
}

impl Extractor {
    pub fn new<I, S>(watch_list: I, columns: Columns) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            watch_list: watch_list.into_iter().map(Into::into).collect(),
            columns,
        }
    }

    pub fn watches(&self, isin: &str) -> bool {
        self.watch_list.contains(isin)
    }

    /// Extract watched rows from every `table tbody tr` in the document.
    ///
    /// Rows that are too short, unwatched, or carry an unparseable price are
    /// skipped. A page whose layout moved yields nothing rather than an error.
    pub fn extract(&self, html: &str) -> Result<Vec<Extracted>> {
        let document = Html::parse_document(html);
        let table_sel = parse_selector("table")?;
        let header_row_sel = parse_selector("thead tr")?;
        let header_cell_sel = parse_selector("th, td")?;
        let row_sel = parse_selector("tbody tr")?;
        let cell_sel = parse_selector("td")?;

        let mut extracted = Vec::new();
        let mut rows_seen = 0usize;

        for table in document.select(&table_sel) {
            let headers: Vec<String> = table
                .select(&header_row_sel)
                .find(|row| belongs_to(*row, table))
                .map(|row| row.select(&header_cell_sel).map(cell_text).collect())
                .unwrap_or_default();

            let (Some(isin_idx), Some(price_idx)) = (
                resolve_column(&self.columns.isin, &headers),
                resolve_column(&self.columns.price, &headers),
            ) else {
                warn!(
                    "Skipping table: columns {:?} not found in headers {:?}",
                    self.columns, headers
                );
                continue;
            };

            // Rows of nested tables are handled when their own table comes up
            for row in table.select(&row_sel).filter(|row| belongs_to(*row, table)) {
                rows_seen += 1;
                let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
                let (Some(isin), Some(price_text)) = (cells.get(isin_idx), cells.get(price_idx))
                else {
                    continue;
                };

                if !self.watches(isin) {
                    continue;
                }

                match parse_price(price_text) {
                    Some(price) => {
                        debug!("Matched {} at {}", isin, price);
                        extracted.push(Extracted {
                            isin: isin.clone(),
                            price,
                        });
                    }
                    None => {
                        warn!("Skipping {}: unparseable price {:?}", isin, price_text);
                    }
                }
            }
        }

        if rows_seen == 0 {
            warn!("No table rows found in markup");
        } else {
            info!(
                "Extracted {} watched price(s) from {} row(s)",
                extracted.len(),
                rows_seen
            );
        }

        Ok(extracted)
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {:?}", css, e))
}

/// Whether `table` is the nearest `<table>` enclosing `el`
fn belongs_to(el: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
        .is_some_and(|owner| owner.id() == table.id())
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn resolve_column(column: &ColumnRef, headers: &[String]) -> Option<usize> {
    match column {
        ColumnRef::Index(idx) => Some(*idx),
        ColumnRef::Header(name) => {
            let wanted = normalize_label(name);
            headers.iter().position(|h| normalize_label(h) == wanted)
        }
    }
}

fn normalize_label(input: &str) -> String {
    let upper = input.to_uppercase();
    let mut out = String::with_capacity(upper.len());
    for ch in upper.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() || ch == ' ' {
            out.push(ch);
        } else if ch == '-' || ch == '_' {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a localized price such as `1 234,56`, `1,234.5` or `98,7 %`.
///
/// Whitespace (including no-break spaces) is stripped. When a `.` is present
/// commas are thousands separators; otherwise a single comma is the decimal
/// mark unless it is followed by exactly three digits in an ungrouped number
/// (`1,234`). The longest leading unsigned decimal is then parsed, so trailing
/// units are ignored. Returns `None` when no finite number can be read.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let numeric_run = trimmed
        .split(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.' || c.is_whitespace()))
        .next()
        .unwrap_or_default()
        .trim_end();
    let space_grouped = numeric_run.chars().any(char::is_whitespace);
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    let commas = compact.matches(',').count();
    let normalized = if compact.contains('.') || commas > 1 {
        compact.replace(',', "")
    } else if commas == 1 {
        let frac_digits = compact
            .split_once(',')
            .map(|(_, frac)| frac.chars().take_while(char::is_ascii_digit).count())
            .unwrap_or(0);
        if frac_digits == 3 && !space_grouped {
            compact.replace(',', "")
        } else {
            compact.replacen(',', ".", 1)
        }
    } else {
        compact
    };

    let value: f64 = leading_decimal(&normalized)?.parse().ok()?;
    value.is_finite().then_some(value)
}

fn leading_decimal(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end;
    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = frac_end - end - 1;
        if frac_digits > 0 {
            end = frac_end;
        }
    }
    (int_digits + frac_digits > 0).then(|| &s[..end])
}
