use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::core::rates::FetchError;

pub const RETRIES: usize = 2;
pub const RETRY_DELAY_MS: u64 = 500;

/// Retries a request that failed in transport.
///
/// Total runs = 1 initial + `retries`. HTTP error statuses are not
/// transport failures and come back as a successful response.
pub async fn with_retry<F, Fut, T>(
    source_name: &'static str,
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(FetchError::Network {
                        source_name,
                        message: err.to_string(),
                    });
                }
                debug!(
                    "{} attempt {}/{} failed: {}. Retrying...",
                    source_name, attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Sends a GET with retries and returns the body of a 2xx response.
pub async fn get_text(source_name: &'static str, url: &str) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent("fxcalc/0.1")
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| FetchError::Network {
            source_name,
            message: e.to_string(),
        })?;

    let response = with_retry(
        source_name,
        || async { client.get(url).send().await },
        RETRIES,
        RETRY_DELAY_MS,
    )
    .await?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            source_name,
            status: response.status().as_u16(),
        });
    }

    response.text().await.map_err(|e| FetchError::Network {
        source_name,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_text_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let body = get_text("test", &format!("{}/feed", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = get_text("test", &format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Bind and release a port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/feed", listener.local_addr().unwrap());
        drop(listener);

        let client = reqwest::Client::new();
        let err = with_retry("test", || async { client.get(&url).send().await }, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
