//! Rate tables and the abstraction over rate sources

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use super::currency::{RUB, USD};

/// USD-denominated fallback rates, used until a source answers.
const BACKUP_USD_RATES: [(&str, f64); 13] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("RUB", 85.49),
    ("GBP", 0.78),
    ("JPY", 149.8),
    ("CNY", 7.18),
    ("TRY", 32.5),
    ("KZT", 450.2),
    ("AED", 3.67),
    ("UZS", 12450.0),
    ("BYN", 3.25),
    ("THB", 35.8),
    ("UAH", 39.5),
];

/// A code → rate map relative to a single base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            rates: HashMap::new(),
        }
    }

    pub fn from_rates<I, S>(base: &str, rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Self::new(base);
        for (code, rate) in rates {
            table.insert(code, rate);
        }
        table
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Stores a rate, ignoring values that cannot be divided by.
    pub fn insert(&mut self, code: impl Into<String>, rate: f64) -> bool {
        if rate.is_finite() && rate > 0.0 {
            self.rates.insert(code.into(), rate);
            true
        } else {
            false
        }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Looks up `code`, falling back to `backup` and finally to 1.0.
    pub fn rate_or(&self, code: &str, backup: &RateTable) -> f64 {
        self.get(code).or_else(|| backup.get(code)).unwrap_or(1.0)
    }

    /// Adds every entry of `backup` this table lacks.
    pub fn fill_missing_from(&mut self, backup: &RateTable) {
        for (code, rate) in &backup.rates {
            self.rates.entry(code.clone()).or_insert(*rate);
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Static fallback tables, one per denomination.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRates {
    pub central_bank: RateTable,
    pub market: RateTable,
}

impl BackupRates {
    pub fn new() -> Self {
        let market = RateTable::from_rates(USD, BACKUP_USD_RATES);
        let rub_per_usd = market.get(RUB).unwrap_or(1.0);
        // Same data expressed as "RUB per 1 unit of X".
        let central_bank = RateTable::from_rates(
            RUB,
            BACKUP_USD_RATES
                .iter()
                .map(|(code, per_usd)| (*code, rub_per_usd / per_usd)),
        );
        Self {
            central_bank,
            market,
        }
    }
}

impl Default for BackupRates {
    fn default() -> Self {
        Self::new()
    }
}

/// Which of the two sources answered during the most recent refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStatus {
    pub central_bank: bool,
    pub market: bool,
}

impl SourceStatus {
    pub fn any(&self) -> bool {
        self.central_bank || self.market
    }
}

/// A consistent view of both tables and the time they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct RateBook {
    pub central_bank: RateTable,
    pub market: RateTable,
    pub last_updated: Option<DateTime<Utc>>,
    /// Outcome of the latest refresh.
    pub status: SourceStatus,
    /// True once any source has ever answered.
    pub live: bool,
    /// True once the central bank has ever answered. RUB prices come from
    /// its table, so until then they are backup values.
    pub central_bank_live: bool,
}

impl RateBook {
    pub fn from_backup(backup: &BackupRates) -> Self {
        Self {
            central_bank: backup.central_bank.clone(),
            market: backup.market.clone(),
            last_updated: None,
            status: SourceStatus::default(),
            live: false,
            central_bank_live: false,
        }
    }
}

/// What a single source returns on success.
#[derive(Debug, Clone, PartialEq)]
pub struct RateFetch {
    pub table: RateTable,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {source_name} failed: {message}")]
    Network {
        source_name: &'static str,
        message: String,
    },

    #[error("HTTP error: {status} from {source_name}")]
    Status {
        source_name: &'static str,
        status: u16,
    },

    #[error("Failed to parse {source_name} response: {message}")]
    Decode {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} rejected the request: {message}")]
    Rejected {
        source_name: &'static str,
        message: String,
    },
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn fetch_rates(&self) -> Result<RateFetch, FetchError>;
}
