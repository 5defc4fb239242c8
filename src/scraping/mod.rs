// Scraping module: download the bond listing and pull watched prices out of it

pub mod extractor;
pub mod fetcher;

pub use extractor::{parse_price, ColumnRef, Columns, Extracted, Extractor};
pub use fetcher::Fetcher;
