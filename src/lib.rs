pub mod categories;
pub mod categorizer;
pub mod cli;
pub mod combiner;
pub mod error;
pub mod export;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod normalizer;
pub mod reports;
pub mod schema;
pub mod settings;
pub mod table;
pub mod tracker;

pub use categories::{Category, CategorySet, CategoryStore};
pub use error::{FinanceError, Result};
pub use models::{Platform, Transaction, TransactionKind, YearMonth};
pub use schema::Column;
pub use table::Table;
pub use tracker::{MonthBasis, Tracker, TrackerConfig};
