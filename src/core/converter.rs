//! The converter screen state: calculator plus the conversion it drives.

use super::calculator::{CalculatorState, Key};
use super::conversion::{ConversionState, derive_rate_from_book};
use super::currency::{Currency, USD};
use super::format;
use super::rates::{BackupRates, RateBook};
use super::repository::RateRepository;

pub struct Converter {
    calculator: CalculatorState,
    conversion: ConversionState,
    book: RateBook,
    backup: BackupRates,
}

impl Converter {
    pub fn new(from: Currency, to: Currency, book: RateBook) -> Self {
        let backup = BackupRates::new();
        let conversion = ConversionState::new(from, to, &book, &backup);
        Self {
            calculator: CalculatorState::new(),
            conversion,
            book,
            backup,
        }
    }

    pub fn calculator(&self) -> &CalculatorState {
        &self.calculator
    }

    pub fn conversion(&self) -> &ConversionState {
        &self.conversion
    }

    pub fn rates(&self) -> &RateBook {
        &self.book
    }

    pub fn press(&mut self, key: Key) {
        self.calculator.press(key);
        self.conversion.set_amount(&self.calculator.display_value);
    }

    /// Replaces the display value outright, as pasting an amount would.
    pub fn set_amount(&mut self, amount: &str) {
        self.calculator.clear();
        self.calculator.display_value = amount.trim().to_string();
        self.conversion.set_amount(&self.calculator.display_value);
    }

    pub fn set_from(&mut self, currency: Currency) {
        self.conversion.from = currency;
        self.conversion.update_rate(&self.book, &self.backup);
    }

    pub fn set_to(&mut self, currency: Currency) {
        self.conversion.to = currency;
        self.conversion.update_rate(&self.book, &self.backup);
    }

    pub fn swap(&mut self) {
        self.conversion.swap(&self.book, &self.backup);
    }

    /// Installs freshly refreshed rates and re-derives the pair's rate.
    pub fn apply_rates(&mut self, book: RateBook) {
        self.book = book;
        self.conversion.update_rate(&self.book, &self.backup);
    }

    pub async fn refresh(&mut self, repository: &RateRepository) {
        let book = repository.refresh_all().await;
        self.apply_rates(book);
    }

    /// Rate between any two codes under the current tables.
    pub fn rate_between(&self, from: &str, to: &str) -> f64 {
        derive_rate_from_book(from, to, &self.book, &self.backup)
    }

    /// "1 USD = x CODE" for the currency picker.
    pub fn usd_quote(&self, currency: &Currency) -> String {
        let rate = self.rate_between(USD, currency.code);
        format!(
            "1 USD = {} {}",
            format::trimmed(rate, format::RATE_DIGITS),
            currency.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calculator::Operation;
    use crate::core::currency::{RUB, find};
    use crate::core::rates::RateTable;

    fn converter() -> Converter {
        let mut book = RateBook::from_backup(&BackupRates::new());
        book.central_bank = RateTable::from_rates(RUB, [(RUB, 1.0), (USD, 90.0), ("EUR", 100.0)]);
        Converter::new(find(USD).unwrap(), find(RUB).unwrap(), book)
    }

    #[test]
    fn test_every_key_press_recomputes_conversion() {
        let mut converter = converter();
        assert_eq!(converter.conversion().converted_value, "0.00");

        converter.press(Key::Digit(1));
        assert_eq!(converter.conversion().converted_value, "90.00");

        converter.press(Key::Digit(0));
        assert_eq!(converter.conversion().display_value, "10");
        assert_eq!(converter.conversion().converted_value, "900.00");

        converter.press(Key::Operator(Operation::Add));
        converter.press(Key::Digit(5));
        assert_eq!(converter.conversion().converted_value, "450.00");

        converter.press(Key::Equals);
        assert_eq!(converter.calculator().display_value, "15");
        assert_eq!(converter.conversion().converted_value, "1350.00");

        converter.press(Key::Clear);
        assert_eq!(converter.conversion().converted_value, "0.00");
    }

    #[test]
    fn test_currency_change_rederives_rate() {
        let mut converter = converter();
        converter.set_amount("2");
        converter.set_from(find("EUR").unwrap());
        assert_eq!(converter.conversion().converted_value, "200.00");
        assert_eq!(converter.conversion().rate_line(), "1 EUR = 100.0000 RUB");

        converter.set_to(find(USD).unwrap());
        // Market table (backup) now decides: 1.0 / 0.92
        assert_eq!(converter.conversion().converted_value, "2.17");
    }

    #[test]
    fn test_swap_and_apply_rates() {
        let mut converter = converter();
        converter.set_amount("9 000");
        converter.swap();
        assert_eq!(converter.conversion().converted_value, "100.00");

        let mut book = converter.rates().clone();
        book.central_bank.insert(USD, 100.0);
        converter.apply_rates(book);
        assert_eq!(converter.conversion().converted_value, "90.00");
    }

    #[test]
    fn test_bad_amount_shows_sentinel() {
        let mut converter = converter();
        converter.set_amount("ten");
        assert_eq!(
            converter.conversion().converted_value,
            crate::core::conversion::NO_VALUE
        );
    }

    #[test]
    fn test_usd_quote() {
        let converter = converter();
        assert_eq!(converter.usd_quote(&find("EUR").unwrap()), "1 USD = 0.92 EUR");
        assert_eq!(converter.usd_quote(&find(RUB).unwrap()), "1 USD = 90 RUB");
    }
}
