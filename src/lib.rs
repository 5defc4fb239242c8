//! Bondwatch - Ukrainian bond price sampler
//!
//! This library scrapes bond prices for a watch-list of ISINs from a broker
//! listing page, appends every observation to SQLite, and turns the stored
//! history into a per-instrument chart served over HTTP.

pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod reports;
pub mod scheduler;
pub mod scraping;
pub mod utils;
pub mod web;
