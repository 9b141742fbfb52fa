//! USD-based multi-currency rates from the open exchange-rate API.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::util::get_text;
use crate::core::currency::USD;
use crate::core::rates::{FetchError, RateFetch, RateSource, RateTable};

const SOURCE_NAME: &str = "market";

#[derive(Debug, Deserialize)]
struct MarketResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

pub struct MarketProvider {
    base_url: String,
}

impl MarketProvider {
    pub fn new(base_url: &str) -> Self {
        MarketProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn to_fetch(response: MarketResponse) -> Result<RateFetch, FetchError> {
        if response.result != "success" {
            return Err(FetchError::Rejected {
                source_name: SOURCE_NAME,
                message: response.error_type.unwrap_or(response.result),
            });
        }
        if let Some(base) = response.base_code.as_deref() {
            if base != USD {
                return Err(FetchError::Decode {
                    source_name: SOURCE_NAME,
                    message: format!("unexpected base currency {base}"),
                });
            }
        }

        let table = RateTable::from_rates(USD, response.rates);
        if table.is_empty() {
            return Err(FetchError::Decode {
                source_name: SOURCE_NAME,
                message: "no usable rates".to_string(),
            });
        }

        Ok(RateFetch {
            table,
            published_at: response
                .time_last_update_unix
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
    }
}

#[async_trait]
impl RateSource for MarketProvider {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(name = "MarketFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<RateFetch, FetchError> {
        let url = format!("{}/v6/latest/{}", self.base_url, USD);
        debug!("Requesting market rates from {}", url);

        let text = get_text(SOURCE_NAME, &url).await?;
        let response: MarketResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode {
                source_name: SOURCE_NAME,
                message: e.to_string(),
            })?;

        Self::to_fetch(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    const MOCK_JSON: &str = r#"{
        "result": "success",
        "provider": "https://www.exchangerate-api.com",
        "time_last_update_unix": 1741910551,
        "time_last_update_utc": "Fri, 14 Mar 2025 00:02:31 +0000",
        "base_code": "USD",
        "rates": {
            "USD": 1,
            "EUR": 0.919,
            "RUB": 86.52,
            "TRY": 36.6,
            "BAD": 0
        }
    }"#;

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = create_mock_server(200, MOCK_JSON).await;
        let provider = MarketProvider::new(&mock_server.uri());

        let fetch = provider.fetch_rates().await.unwrap();

        assert_eq!(fetch.table.base(), USD);
        assert_eq!(fetch.table.get("USD"), Some(1.0));
        assert_eq!(fetch.table.get("EUR"), Some(0.919));
        assert_eq!(fetch.table.get("RUB"), Some(86.52));
        assert!(fetch.table.get("BAD").is_none());
        assert_eq!(
            fetch.published_at,
            Some(Utc.timestamp_opt(1741910551, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_error_result_is_rejected() {
        let body = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = MarketProvider::new(&mock_server.uri());

        let err = provider.fetch_rates().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "market rejected the request: unsupported-code"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(200, r#"{"rates": {"EUR": "x"}}"#).await;
        let provider = MarketProvider::new(&mock_server.uri());

        let err = provider.fetch_rates().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_wrong_base_is_rejected() {
        let body = r#"{"result": "success", "base_code": "RUB", "rates": {"USD": 0.011}}"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = MarketProvider::new(&mock_server.uri());

        let err = provider.fetch_rates().await.unwrap_err();
        assert!(err.to_string().contains("unexpected base currency RUB"));
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server(404, "").await;
        let provider = MarketProvider::new(&mock_server.uri());

        let err = provider.fetch_rates().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
