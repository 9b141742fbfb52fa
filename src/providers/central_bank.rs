//! Daily RUB rates published by the Central Bank of Russia.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use super::util::get_text;
use crate::core::currency::RUB;
use crate::core::rates::{FetchError, RateFetch, RateSource, RateTable};

const SOURCE_NAME: &str = "central-bank";

#[derive(Debug, Deserialize)]
struct CentralBankResponse {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Valute")]
    valute: HashMap<String, Valute>,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "Nominal")]
    nominal: i64,
    #[serde(rename = "Value")]
    value: f64,
}

pub struct CentralBankProvider {
    base_url: String,
}

impl CentralBankProvider {
    pub fn new(base_url: &str) -> Self {
        CentralBankProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(date_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| debug!(error = %e, date = date_str, "Unparseable publication date"))
            .ok()
    }

    fn to_fetch(response: CentralBankResponse) -> RateFetch {
        let mut table = RateTable::new(RUB);
        table.insert(RUB, 1.0);
        for (code, valute) in response.valute {
            if valute.nominal <= 0 {
                warn!(code = %code, nominal = valute.nominal, "Skipping rate with bad nominal");
                continue;
            }
            if !table.insert(code.as_str(), valute.value / valute.nominal as f64) {
                warn!(code = %code, value = valute.value, "Skipping non-positive rate");
            }
        }

        RateFetch {
            table,
            published_at: response.date.as_deref().and_then(Self::parse_date),
        }
    }
}

#[async_trait]
impl RateSource for CentralBankProvider {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(name = "CentralBankFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<RateFetch, FetchError> {
        let url = format!("{}/daily_json.js", self.base_url);
        debug!("Requesting central bank rates from {}", url);

        let text = get_text(SOURCE_NAME, &url).await?;
        let response: CentralBankResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode {
                source_name: SOURCE_NAME,
                message: e.to_string(),
            })?;

        Ok(Self::to_fetch(response))
    }
}
