//! Conversion rate derivation and amount conversion

use thiserror::Error;
use tracing::debug;

use super::currency::{Currency, RUB};
use super::format;
use super::rates::{BackupRates, RateBook, RateTable};

/// Shown in place of a number that cannot be displayed.
pub const NO_VALUE: &str = "N/A";

#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("Unparseable amount: {0:?}")]
    Parse(String),

    #[error("Amount {0:?} is out of range after conversion")]
    Overflow(String),
}

/// Derives the multiplier that turns an amount in `from` into `to`.
///
/// Pairs touching RUB are priced from the central-bank table (RUB per unit),
/// everything else from the market table (units per USD). Lookups that miss
/// fall back to the backup table of the same denomination, then to 1.0.
pub fn derive_rate(
    from: &str,
    to: &str,
    central_bank: &RateTable,
    market: &RateTable,
    backup: &BackupRates,
) -> f64 {
    if from == RUB || to == RUB {
        let from_rate = central_bank.rate_or(from, &backup.central_bank);
        let to_rate = central_bank.rate_or(to, &backup.central_bank);
        if from == RUB {
            1.0 / to_rate
        } else if to == RUB {
            from_rate
        } else {
            to_rate / from_rate
        }
    } else {
        let from_rate = market.rate_or(from, &backup.market);
        let to_rate = market.rate_or(to, &backup.market);
        to_rate / from_rate
    }
}

/// Convenience over [`derive_rate`] for a whole [`RateBook`].
pub fn derive_rate_from_book(from: &str, to: &str, book: &RateBook, backup: &BackupRates) -> f64 {
    derive_rate(from, to, &book.central_bank, &book.market, backup)
}

/// Parses a typed amount, accepting `,` or `.` as the decimal point and
/// ignoring spaces.
pub fn parse_amount(amount: &str) -> Result<f64, ConversionError> {
    let cleaned: String = amount
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConversionError::Parse(amount.to_string()))
}

pub fn try_convert(amount: &str, rate: f64) -> Result<f64, ConversionError> {
    let converted = parse_amount(amount)? * rate;
    if converted.is_finite() {
        Ok(converted)
    } else {
        Err(ConversionError::Overflow(amount.to_string()))
    }
}

/// Converts a typed amount for display, yielding [`NO_VALUE`] on bad input
/// or when the result overflows.
pub fn convert(amount: &str, rate: f64) -> String {
    match try_convert(amount, rate) {
        Ok(result) => format::fixed(result, format::AMOUNT_DIGITS),
        Err(e) => {
            debug!(error = %e, "Amount could not be converted");
            NO_VALUE.to_string()
        }
    }
}

/// The currency pair on screen and everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionState {
    pub from: Currency,
    pub to: Currency,
    pub conversion_rate: f64,
    pub display_value: String,
    pub converted_value: String,
}

impl ConversionState {
    pub fn new(from: Currency, to: Currency, book: &RateBook, backup: &BackupRates) -> Self {
        let mut state = Self {
            from,
            to,
            conversion_rate: 1.0,
            display_value: "0".to_string(),
            converted_value: "0.00".to_string(),
        };
        state.update_rate(book, backup);
        state
    }

    /// Re-derives the rate for the current pair and refreshes the output.
    pub fn update_rate(&mut self, book: &RateBook, backup: &BackupRates) {
        self.conversion_rate = derive_rate_from_book(self.from.code, self.to.code, book, backup);
        debug!(
            from = self.from.code,
            to = self.to.code,
            rate = self.conversion_rate,
            "Conversion rate updated"
        );
        self.recompute();
    }

    pub fn set_amount(&mut self, display_value: &str) {
        self.display_value = display_value.to_string();
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.converted_value = convert(&self.display_value, self.conversion_rate);
    }

    pub fn swap(&mut self, book: &RateBook, backup: &BackupRates) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.update_rate(book, backup);
    }

    /// The "1 USD = 90.0000 RUB" line shown above the keypad.
    pub fn rate_line(&self) -> String {
        format!(
            "1 {} = {} {}",
            self.from.code,
            format::fixed(self.conversion_rate, format::RATE_DIGITS),
            self.to.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{self, CATALOG, USD};

    fn book_with(central_bank: RateTable, market: RateTable) -> RateBook {
        let mut book = RateBook::from_backup(&BackupRates::new());
        book.central_bank = central_bank;
        book.market = market;
        book
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_usd_to_rub_uses_central_bank_value() {
        let backup = BackupRates::new();
        let central = RateTable::from_rates(RUB, [(RUB, 1.0), (USD, 90.0)]);
        let rate = derive_rate(USD, RUB, &central, &backup.market, &backup);
        assert_close(rate, 90.0);
        assert_eq!(convert("10", rate), "900.00");
    }

    #[test]
    fn test_rub_pairs_are_reciprocal() {
        let backup = BackupRates::new();
        let central = RateTable::from_rates(
            RUB,
            [(RUB, 1.0), (USD, 90.0), ("EUR", 98.5), ("KZT", 0.18)],
        );
        for currency in CATALOG {
            let to_rub = derive_rate(currency.code, RUB, &central, &backup.market, &backup);
            let from_rub = derive_rate(RUB, currency.code, &central, &backup.market, &backup);
            assert_close(to_rub, 1.0 / from_rub);
        }
    }

    #[test]
    fn test_cross_rate_through_central_bank_when_rub_absent_from_pair() {
        // Neither side is RUB, so the market table decides.
        let backup = BackupRates::new();
        let central = RateTable::from_rates(RUB, [(RUB, 1.0), (USD, 90.0), ("EUR", 99.0)]);
        let market = RateTable::from_rates(USD, [(USD, 1.0), ("EUR", 0.5)]);
        let rate = derive_rate(USD, "EUR", &central, &market, &backup);
        assert_close(rate, 0.5);
        let rate = derive_rate("EUR", USD, &central, &market, &backup);
        assert_close(rate, 2.0);
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let backup = BackupRates::new();
        let empty_central = RateTable::new(RUB);
        let empty_market = RateTable::new(USD);

        let rate = derive_rate(USD, RUB, &empty_central, &empty_market, &backup);
        assert_close(rate, 85.49);

        let rate = derive_rate(USD, "GBP", &empty_central, &empty_market, &backup);
        assert_close(rate, 0.78);

        let rate = derive_rate("XYZ", "ABC", &empty_central, &empty_market, &backup);
        assert_close(rate, 1.0);
        let rate = derive_rate(RUB, "XYZ", &empty_central, &empty_market, &backup);
        assert_close(rate, 1.0);
    }

    #[test]
    fn test_same_currency_rate_is_one() {
        let backup = BackupRates::new();
        for currency in CATALOG {
            let rate = derive_rate(
                currency.code,
                currency.code,
                &backup.central_bank,
                &backup.market,
                &backup,
            );
            assert_close(rate, 1.0);
        }
    }

    #[test]
    fn test_parse_tolerates_separators_and_spaces() {
        assert_eq!(parse_amount("1,5"), Ok(1.5));
        assert_eq!(parse_amount("1.5"), Ok(1.5));
        assert_eq!(parse_amount(" 1 000,25 "), Ok(1000.25));
        assert_eq!(parse_amount("0."), Ok(0.0));
        assert_eq!(convert("1,5", 2.0), convert("1.5", 2.0));
    }

    #[test]
    fn test_unparseable_amount_yields_sentinel() {
        assert_eq!(convert("abc", 2.0), NO_VALUE);
        assert_eq!(convert("", 2.0), NO_VALUE);
        assert_eq!(convert("1.2.3", 2.0), NO_VALUE);
        assert_eq!(
            parse_amount("x"),
            Err(ConversionError::Parse("x".to_string()))
        );
    }

    #[test]
    fn test_overflowing_conversion_yields_sentinel() {
        let huge = format!("1{}", "0".repeat(300));
        assert_eq!(
            try_convert(&huge, 1e10),
            Err(ConversionError::Overflow(huge.clone()))
        );
        assert_eq!(convert(&huge, 1e10), NO_VALUE);
        assert_ne!(convert(&huge, 1e-10), NO_VALUE);
    }

    #[test]
    fn test_swap_twice_restores_state() {
        let backup = BackupRates::new();
        let book = book_with(
            RateTable::from_rates(RUB, [(RUB, 1.0), (USD, 90.0)]),
            backup.market.clone(),
        );
        let usd = currency::find(USD).unwrap();
        let rub = currency::find(RUB).unwrap();

        let mut state = ConversionState::new(usd, rub, &book, &backup);
        state.set_amount("10");
        let original = state.clone();

        state.swap(&book, &backup);
        assert_eq!(state.from, rub);
        assert_eq!(state.to, usd);
        assert_close(state.conversion_rate, 1.0 / original.conversion_rate);
        assert_eq!(state.converted_value, "0.11");

        state.swap(&book, &backup);
        assert_eq!(state.from, original.from);
        assert_eq!(state.to, original.to);
        assert_close(state.conversion_rate, original.conversion_rate);
        assert_eq!(state.converted_value, "900.00");
    }

    #[test]
    fn test_rate_line() {
        let backup = BackupRates::new();
        let book = book_with(
            RateTable::from_rates(RUB, [(RUB, 1.0), (USD, 90.0)]),
            backup.market.clone(),
        );
        let state = ConversionState::new(
            currency::find(USD).unwrap(),
            currency::find(RUB).unwrap(),
            &book,
            &backup,
        );
        assert_eq!(state.rate_line(), "1 USD = 90.0000 RUB");
    }
}
