//! ghg-rs
//!
//! A lightweight Rust library for loading, reshaping, and summarizing
//! greenhouse-gas emissions data. Pairs with the `ghg` CLI.
//!
//! ### Features
//! - Load wide year-column CSV tables with content-hash memoization
//! - Melt wide tables into tidy long-form records
//! - Harmonize country names across independently-sourced tables
//! - Derived views: yearly totals, decadal percent change, dense rank over
//!   time, dominant sector, top-N-plus-highlight sets
//!
//! ### Example
//! ```no_run
//! use ghg_rs::models::{COUNTRY_TOTALS, LULUCF, SECTOR_TOTALS};
//! use ghg_rs::{Dashboard, TableStore, reshape};
//!
//! let mut store = TableStore::new();
//! let country = reshape::reshape(&*store.load("GHG_totals_by_country.csv".as_ref())?, &COUNTRY_TOTALS)?;
//! let sector = reshape::reshape(&*store.load("GHG_by_sector_and_country.csv".as_ref())?, &SECTOR_TOTALS)?;
//! let lulucf = reshape::reshape(&*store.load("LULUCF_countries.csv".as_ref())?, &LULUCF)?;
//!
//! let dash = Dashboard::new(country, sector, lulucf);
//! let key = dash.resolve("United States");
//! let top = dash.top_emitters(2024, 10, &key);
//! println!("{:#?}", top);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod join;
pub mod models;
pub mod normalize;
pub mod reshape;
pub mod store;

pub use join::Dashboard;
pub use models::{EmissionRecord, NormalizedKey, Observation};
pub use store::TableStore;
