//! Core business logic: rate tables, conversion and the calculator

pub mod calculator;
pub mod config;
pub mod conversion;
pub mod converter;
pub mod currency;
pub mod format;
pub mod log;
pub mod rates;
pub mod repository;

// Re-export main types for cleaner imports
pub use calculator::{CalculatorState, Key, Operation};
pub use conversion::{ConversionState, derive_rate};
pub use converter::Converter;
pub use currency::Currency;
pub use rates::{BackupRates, FetchError, RateBook, RateFetch, RateSource, RateTable};
pub use repository::{RateRepository, WidgetSnapshot};
