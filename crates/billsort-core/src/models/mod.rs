//! Data models: account configurations and application settings.

pub mod account;
pub mod config;

pub use account::{AccountConfig, AccountSpec, DateRule};
pub use config::{BillsortConfig, ExtractionConfig, ExtractorKind, PathsConfig};
