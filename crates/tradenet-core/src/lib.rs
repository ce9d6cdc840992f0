//! TradeNet Core - trade records and partner ranking
//!
//! This crate holds the data side of TradeNet: loading a trade-flow CSV,
//! validating its schema, and reducing the rows of one reporting country
//! into a ranked list of trading partners. It also carries the static
//! country coordinate table used by the map view.
//!
//! # Example
//!
//! ```no_run
//! use tradenet_core::{rank, TradeDataset, DEFAULT_TOP_K};
//!
//! let dataset = TradeDataset::from_path("trade.csv").unwrap();
//! let ranking = rank(&dataset, "Germany", DEFAULT_TOP_K);
//!
//! for entry in ranking.iter() {
//!     println!("{} {}", entry.partner, entry.total_value);
//! }
//! ```

pub mod coords;
pub mod dataset;
pub mod error;
pub mod ranking;
pub mod record;
pub mod summary;

pub use coords::{CoordinateRegistry, CountryCoordinate};
pub use dataset::{TradeDataset, PARTNER_COLUMN, REPORTER_COLUMN, VALUE_COLUMN};
pub use error::{Result, TradeError};
pub use ranking::{filtered_subset, rank, PartnerRanking, PartnerTotal, DEFAULT_TOP_K, UNSPECIFIED_PARTNER};
pub use record::TradeRecord;
pub use summary::ValueSummary;
