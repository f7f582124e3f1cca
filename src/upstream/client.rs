//! HTTP client for the price-index API

use super::types::UpstreamError;
use super::PriceSource;
use crate::config::UpstreamConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Index price response shape
///
/// The index price is nested under `result.index_price`, e.g.
/// `{"result": {"index_price": 63123.456}}`.
#[derive(Debug, Deserialize)]
struct IndexPriceResponse {
    result: Option<IndexPriceResult>,
}

#[derive(Debug, Deserialize)]
struct IndexPriceResult {
    index_price: Option<serde_json::Value>,
}

/// Client for the upstream price-index service
///
/// Holds the connection pool; constructed once at startup and injected
/// into the orchestrator.
pub struct IndexClient {
    http: Client,
    base_url: String,
}

impl IndexClient {
    /// Build a client with the configured base URL and request timeout
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, ticker: &str) -> String {
        format!(
            "{}/public/get_index_price?index_name={}",
            self.base_url, ticker
        )
    }

    async fn fetch(&self, ticker: &str) -> Result<Decimal, UpstreamError> {
        let url = self.build_url(ticker);
        tracing::debug!(url = %url, ticker, "requesting index price");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body: IndexPriceResponse = response.json().await.map_err(classify_body_error)?;

        let price = body
            .result
            .and_then(|r| r.index_price)
            .ok_or_else(|| UpstreamError::Permanent("response missing index_price".into()))?;

        parse_price(&price)
    }
}

#[async_trait]
impl PriceSource for IndexClient {
    async fn get_index_price(&self, ticker: &str) -> Result<Decimal, UpstreamError> {
        self.fetch(ticker).await
    }
}

/// Request-level failures: connect, TLS, and timeout errors all retry
fn classify_transport_error(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Transient(e.to_string())
}

/// Body read failures retry; a body that is not valid JSON does not
fn classify_body_error(e: reqwest::Error) -> UpstreamError {
    if e.is_decode() {
        UpstreamError::Permanent(format!("invalid JSON response: {}", e))
    } else {
        UpstreamError::Transient(e.to_string())
    }
}

fn classify_status(status: StatusCode) -> UpstreamError {
    match status.as_u16() {
        429 | 500 | 502 | 503 | 504 => UpstreamError::Transient(format!("HTTP {}", status)),
        _ => UpstreamError::Permanent(format!("HTTP {}", status)),
    }
}

/// Convert the raw JSON price into a decimal through its string form,
/// never through the binary float
fn parse_price(value: &serde_json::Value) -> Result<Decimal, UpstreamError> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => {
            return Err(UpstreamError::Permanent(format!(
                "non-numeric index_price: {}",
                other
            )))
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| UpstreamError::Permanent(format!("non-numeric index_price: {:?}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String, timeout_secs: u64) -> UpstreamConfig {
        UpstreamConfig {
            base_url,
            tickers: vec!["btc_usd".to_string()],
            timeout_secs,
        }
    }

    fn mock_client(server: &MockServer) -> IndexClient {
        IndexClient::new(&test_config(server.uri(), 1)).unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = IndexClient::new(&test_config("https://example.com/api/v2/".into(), 5)).unwrap();
        assert_eq!(
            client.build_url("btc_usd"),
            "https://example.com/api/v2/public/get_index_price?index_name=btc_usd"
        );
    }

    #[test]
    fn test_parse_price_number() {
        let value = serde_json::json!(63123.45600001);
        assert_eq!(parse_price(&value).unwrap(), dec!(63123.45600001));
    }

    #[test]
    fn test_parse_price_string() {
        let value = serde_json::json!("63123.456");
        assert_eq!(parse_price(&value).unwrap(), dec!(63123.456));
    }

    #[test]
    fn test_parse_price_rejects_non_numeric() {
        let value = serde_json::json!({"nested": true});
        assert!(matches!(
            parse_price(&value),
            Err(UpstreamError::Permanent(_))
        ));

        let value = serde_json::json!("not a number");
        assert!(matches!(
            parse_price(&value),
            Err(UpstreamError::Permanent(_))
        ));
    }

    #[test]
    fn test_classify_status_transient_set() {
        for code in [429u16, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(
                matches!(classify_status(status), UpstreamError::Transient(_)),
                "HTTP {} should be transient",
                code
            );
        }
    }

    #[test]
    fn test_classify_status_permanent_set() {
        for code in [400u16, 401, 403, 404, 410, 501] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(
                matches!(classify_status(status), UpstreamError::Permanent(_)),
                "HTTP {} should be permanent",
                code
            );
        }
    }

    #[tokio::test]
    async fn test_get_index_price_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/get_index_price"))
            .and(query_param("index_name", "btc_usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"index_price": 63123.45600001}
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let price = client.get_index_price("btc_usd").await.unwrap();
        assert_eq!(price, dec!(63123.45600001));
        assert_eq!(price.to_string(), "63123.45600001");
    }

    #[tokio::test]
    async fn test_get_index_price_transient_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(code))
                .mount(&server)
                .await;

            let client = mock_client(&server);
            let err = client.get_index_price("btc_usd").await.unwrap_err();
            assert!(err.is_transient(), "HTTP {} should be transient", code);
        }
    }

    #[tokio::test]
    async fn test_get_index_price_permanent_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client.get_index_price("btc_usd").await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_get_index_price_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client.get_index_price("btc_usd").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_get_index_price_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": {}})),
            )
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client.get_index_price("btc_usd").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_get_index_price_timeout_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"result": {"index_price": 1.0}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client.get_index_price("btc_usd").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_get_index_price_connection_refused_is_transient() {
        let client =
            IndexClient::new(&test_config("http://127.0.0.1:1".into(), 1)).unwrap();
        let err = client.get_index_price("btc_usd").await.unwrap_err();
        assert!(err.is_transient());
    }
}
