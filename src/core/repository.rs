//! Owns both rate tables and refreshes them from their sources.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::conversion::derive_rate_from_book;
use super::currency::{self, RUB};
use super::format;
use super::rates::{BackupRates, FetchError, RateBook, RateFetch, RateSource, SourceStatus};

pub struct RateRepository {
    central_bank: Box<dyn RateSource>,
    market: Box<dyn RateSource>,
    backup: BackupRates,
    book: RwLock<RateBook>,
}

impl RateRepository {
    pub fn new(central_bank: Box<dyn RateSource>, market: Box<dyn RateSource>) -> Self {
        let backup = BackupRates::new();
        let book = RwLock::new(RateBook::from_backup(&backup));
        Self {
            central_bank,
            market,
            backup,
            book,
        }
    }

    pub fn backup(&self) -> &BackupRates {
        &self.backup
    }

    pub async fn snapshot(&self) -> RateBook {
        self.book.read().await.clone()
    }

    /// Fetches both sources concurrently and applies whatever succeeded.
    ///
    /// Never fails: a source that errors keeps its previous table.
    pub async fn refresh_all(&self) -> RateBook {
        debug!("Refreshing rates from both sources");
        let (central_bank, market) =
            futures::join!(self.central_bank.fetch_rates(), self.market.fetch_rates());

        let central_bank = self.absorb(self.central_bank.name(), central_bank);
        let market = self.absorb(self.market.name(), market);

        let mut book = self.book.write().await;
        book.status = SourceStatus {
            central_bank: central_bank.is_some(),
            market: market.is_some(),
        };

        let mut stamped = false;
        if let Some(fetch) = central_bank {
            let mut table = fetch.table;
            table.insert(RUB, 1.0);
            table.fill_missing_from(&self.backup.central_bank);
            book.central_bank = table;
            book.last_updated = Some(fetch.published_at.unwrap_or_else(Utc::now));
            stamped = true;
        }
        if let Some(fetch) = market {
            let mut table = fetch.table;
            table.fill_missing_from(&self.backup.market);
            book.market = table;
            if !stamped {
                book.last_updated = Some(fetch.published_at.unwrap_or_else(Utc::now));
            }
        }
        let answered = book.status.any();
        book.live |= answered;
        book.central_bank_live |= stamped;

        info!(
            central_bank = book.status.central_bank,
            market = book.status.market,
            "Rates refreshed"
        );
        book.clone()
    }

    fn absorb(&self, source: &str, result: Result<RateFetch, FetchError>) -> Option<RateFetch> {
        match result {
            Ok(fetch) => {
                debug!(source, entries = fetch.table.len(), "Source answered");
                Some(fetch)
            }
            Err(e) => {
                warn!(source, error = %e, "Keeping previous rates");
                None
            }
        }
    }

    pub async fn widget_snapshot(&self, codes: &[String]) -> WidgetSnapshot {
        let book = self.snapshot().await;
        WidgetSnapshot::from_book(&book, &self.backup, codes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetRate {
    pub code: String,
    pub name: String,
    pub flag: String,
    /// RUB per one unit of `code`.
    pub rate: f64,
}

/// Read-only data a home-screen widget renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetSnapshot {
    pub rates: Vec<WidgetRate>,
    pub last_updated: String,
}

impl WidgetSnapshot {
    pub fn from_book(book: &RateBook, backup: &BackupRates, codes: &[String]) -> Self {
        let rates = codes
            .iter()
            .filter(|code| !code.eq_ignore_ascii_case(RUB))
            .map(|code| {
                let known = currency::find(code);
                let code = known.map_or_else(|| code.to_uppercase(), |c| c.code.to_string());
                WidgetRate {
                    rate: derive_rate_from_book(&code, RUB, book, backup),
                    name: known.map_or_else(|| code.clone(), |c| c.name.to_string()),
                    flag: currency::flag_for(&code).to_string(),
                    code,
                }
            })
            .collect();

        let stamp = book.last_updated.unwrap_or_else(Utc::now);
        let mut last_updated = format::last_updated(&stamp);
        if !book.central_bank_live {
            last_updated.push_str(" (backup)");
        }
        Self {
            rates,
            last_updated,
        }
    }
}

/// Refreshes `repository` every `interval` and publishes each result.
///
/// The first refresh happens immediately. The task ends once every
/// receiver has been dropped.
pub fn spawn_periodic_refresh(
    repository: Arc<RateRepository>,
    interval: Duration,
) -> (watch::Receiver<RateBook>, JoinHandle<()>) {
    let initial = RateBook::from_backup(repository.backup());
    let (tx, rx) = watch::channel(initial);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let book = repository.refresh_all().await;
            if tx.send(book).is_err() {
                debug!("No listeners left, stopping periodic refresh");
                break;
            }
        }
    });

    (rx, handle)
}
