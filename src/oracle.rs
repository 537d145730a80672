//! Exchange-rate lookup for fiat-denominated requests
//!
//! [`PriceOracle`] is the seam the URI builder depends on. The production
//! implementation talks to the Coinbase exchange-rate endpoint; a fixed-rate
//! oracle covers offline use and tests.

use crate::config::OracleOptions;
use crate::error::{Error, Result};
use crate::payment::check_bounds;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::Sign;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Source of `base`/`quote` exchange rates (price of one `base` in `quote`).
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Fetch the current rate. Every failure is reported as [`Error::PriceLookup`].
    async fn get_rate(&self, base: &str, quote: &str) -> Result<BigDecimal>;
}

#[derive(Debug, Deserialize)]
struct ExchangeRatesResponse {
    data: ExchangeRatesData,
}

#[derive(Debug, Deserialize)]
struct ExchangeRatesData {
    rates: HashMap<String, String>,
}

/// HTTPS client for `GET <endpoint>?currency=<base>`
#[derive(Debug, Clone)]
pub struct CoinbaseOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl CoinbaseOracle {
    /// Build a client with the configured request timeout.
    pub fn new(options: &OracleOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs.max(1)))
            .user_agent(concat!("payqr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: options.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PriceOracle for CoinbaseOracle {
    async fn get_rate(&self, base: &str, quote: &str) -> Result<BigDecimal> {
        debug!(endpoint = %self.endpoint, base, quote, "Fetching exchange rate");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("currency", base)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PriceLookup(format!(
                "{} returned HTTP {status}",
                self.endpoint
            )));
        }

        let body = response.text().await?;
        let rate = parse_rate(&body, quote)?;
        info!(base, quote, %rate, "Fetched exchange rate");
        Ok(rate)
    }
}

/// Extract `data.rates.<quote>` from an exchange-rate response body.
pub fn parse_rate(body: &str, quote: &str) -> Result<BigDecimal> {
    let parsed: ExchangeRatesResponse = serde_json::from_str(body)
        .map_err(|e| Error::PriceLookup(format!("malformed response: {e}")))?;

    let raw = parsed
        .data
        .rates
        .get(quote)
        .ok_or_else(|| Error::PriceLookup(format!("no {quote} rate in response")))?;

    let rate = BigDecimal::from_str(raw.trim())
        .map_err(|_| Error::PriceLookup(format!("{quote} rate '{raw}' is not numeric")))?;

    if rate.sign() != Sign::Plus {
        return Err(Error::PriceLookup(format!("{quote} rate '{raw}' is not positive")));
    }
    check_bounds(&rate).map_err(|e| Error::PriceLookup(format!("{quote} rate {e}")))?;

    Ok(rate)
}

/// Oracle that always answers with the same rate.
#[derive(Debug, Clone)]
pub struct FixedRateOracle {
    rate: BigDecimal,
}

impl FixedRateOracle {
    /// Create an oracle quoting `rate` for every pair
    pub fn new(rate: BigDecimal) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl PriceOracle for FixedRateOracle {
    async fn get_rate(&self, base: &str, quote: &str) -> Result<BigDecimal> {
        debug!(base, quote, rate = %self.rate, "Using fixed exchange rate");
        Ok(self.rate.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"data":{"currency":"ETH","rates":{"USD":"2000.0","EUR":"1850.12"}}}"#;

    #[test]
    fn parses_quote_rate() {
        assert_eq!(
            parse_rate(BODY, "USD").unwrap(),
            BigDecimal::from_str("2000").unwrap()
        );
        assert_eq!(
            parse_rate(BODY, "EUR").unwrap(),
            BigDecimal::from_str("1850.12").unwrap()
        );
    }

    #[test]
    fn lookup_failures_are_price_errors() {
        let cases = [
            ("not json", "USD"),
            (r#"{"rates":{"USD":"1"}}"#, "USD"),
            (BODY, "GBP"),
            (r#"{"data":{"rates":{"USD":"n/a"}}}"#, "USD"),
            (r#"{"data":{"rates":{"USD":"0"}}}"#, "USD"),
            (r#"{"data":{"rates":{"USD":"-3"}}}"#, "USD"),
            (r#"{"data":{"rates":{"USD":"1e-900000000"}}}"#, "USD"),
        ];
        for (body, quote) in cases {
            let err = parse_rate(body, quote).unwrap_err();
            assert!(matches!(err, Error::PriceLookup(_)), "{body} / {quote}");
        }
    }

    #[tokio::test]
    async fn fixed_oracle_returns_its_rate() {
        let oracle = FixedRateOracle::new(BigDecimal::from(2000));
        let rate = oracle.get_rate("ETH", "USD").await.unwrap();
        assert_eq!(rate, BigDecimal::from(2000));
    }
}
