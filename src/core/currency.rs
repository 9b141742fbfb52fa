//! Currency catalog

pub const RUB: &str = "RUB";
pub const USD: &str = "USD";

const UNKNOWN_FLAG: &str = "🏳️";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
}

impl Currency {
    const fn new(code: &'static str, name: &'static str) -> Self {
        Self { code, name }
    }

    pub fn flag(&self) -> &'static str {
        flag_for(self.code)
    }
}

/// Every currency the converter can offer, in picker order.
pub const CATALOG: [Currency; 13] = [
    Currency::new("RUB", "Russian ruble"),
    Currency::new("USD", "US dollar"),
    Currency::new("EUR", "Euro"),
    Currency::new("TRY", "Turkish lira"),
    Currency::new("KZT", "Kazakhstani tenge"),
    Currency::new("CNY", "Chinese yuan"),
    Currency::new("AED", "UAE dirham"),
    Currency::new("UZS", "Uzbekistani sum"),
    Currency::new("BYN", "Belarusian ruble"),
    Currency::new("THB", "Thai baht"),
    Currency::new("UAH", "Ukrainian hryvnia"),
    Currency::new("GBP", "British pound"),
    Currency::new("JPY", "Japanese yen"),
];

/// Looks up a catalog currency by code, ignoring case.
pub fn find(code: &str) -> Option<Currency> {
    CATALOG
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
        .copied()
}

pub fn flag_for(code: &str) -> &'static str {
    match code {
        "RUB" => "🇷🇺",
        "USD" => "🇺🇸",
        "EUR" => "🇪🇺",
        "TRY" => "🇹🇷",
        "KZT" => "🇰🇿",
        "CNY" => "🇨🇳",
        "AED" => "🇦🇪",
        "UZS" => "🇺🇿",
        "BYN" => "🇧🇾",
        "THB" => "🇹🇭",
        "UAH" => "🇺🇦",
        "GBP" => "🇬🇧",
        "JPY" => "🇯🇵",
        _ => UNKNOWN_FLAG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_codes_are_unique() {
        let codes: HashSet<_> = CATALOG.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), CATALOG.len());
    }

    #[test]
    fn test_every_catalog_currency_has_a_flag() {
        for currency in CATALOG {
            assert_ne!(currency.flag(), UNKNOWN_FLAG, "{}", currency.code);
        }
    }

    #[test]
    fn test_unknown_code_gets_default_flag() {
        assert_eq!(flag_for("XYZ"), UNKNOWN_FLAG);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("usd").map(|c| c.code), Some("USD"));
        assert_eq!(find(" eur ").map(|c| c.code), Some("EUR"));
        assert!(find("XYZ").is_none());
    }
}
