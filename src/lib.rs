//! payqr - Ethereum payment URIs as QR codes
//!
//! Builds `ethereum:` payment URIs for native transfers, token transfers and
//! fiat-denominated requests, and renders them as PNG QR codes.
//!
//! # Features
//!
//! - **Exact amounts**: decimal input is scaled to base units with integer
//!   arithmetic, never floating point
//! - **Token transfers**: recipient and value encoded against a configured
//!   token contract (USDC by default)
//! - **Fiat pricing**: converts through a [`PriceOracle`], falling back to a
//!   1:1 stablecoin transfer if no rate is available
//! - **QR output**: configurable width, margin and error correction, with
//!   optional read-back verification
//!
//! # Example
//!
//! ```no_run
//! use payqr::{PaymentArgs, PaymentQrGenerator, PayqrConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let generator = PaymentQrGenerator::from_config(&PayqrConfig::default())?;
//!     let args = PaymentArgs::parse(
//!         "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0",
//!         Some("25"),
//!         Some("usd"),
//!         None,
//!     )?;
//!
//!     let generated = generator.generate(&args).await?;
//!     println!("{} -> {:?}", generated.request.uri, generated.path);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod output;
pub mod payment;
pub mod qr;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{
    LogRotation, LoggingOptions, OracleOptions, PaymentConfig, PayqrConfig, RenderOptions,
};
pub use oracle::{CoinbaseOracle, FixedRateOracle, PriceOracle};
pub use payment::{
    Address, Amount, Denomination, NetworkId, PaymentArgs, PaymentRequest, PaymentUri,
    PaymentUriBuilder, check_bounds,
};
pub use qr::{QrDecoder, QrRenderer};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// High-level pipeline combining URI building, price lookup and QR rendering
pub struct PaymentQrGenerator {
    builder: PaymentUriBuilder,
    renderer: QrRenderer,
    verify: bool,
}

/// A built payment request and the image it was written to
#[derive(Debug, Clone)]
pub struct GeneratedQr {
    /// The encoded request
    pub request: PaymentRequest,
    /// Path of the written PNG
    pub path: PathBuf,
}

impl PaymentQrGenerator {
    /// Combine an existing builder and renderer
    pub fn new(builder: PaymentUriBuilder, renderer: QrRenderer) -> Self {
        Self {
            builder,
            renderer,
            verify: false,
        }
    }

    /// Wire up the Coinbase oracle, builder and renderer from configuration.
    pub fn from_config(config: &PayqrConfig) -> Result<Self> {
        let oracle = Arc::new(CoinbaseOracle::new(&config.oracle)?);
        Self::with_oracle(config, oracle)
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied oracle.
    pub fn with_oracle(config: &PayqrConfig, oracle: Arc<dyn PriceOracle>) -> Result<Self> {
        let builder = PaymentUriBuilder::new(config.payment.clone(), oracle)?
            .with_fiat_currency(&config.oracle.quote_currency);
        Ok(Self::new(builder, QrRenderer::new(config.render.clone())))
    }

    /// Re-read every written image and fail unless it decodes to the URI.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Build the payment request without rendering anything.
    pub async fn build(&self, args: &PaymentArgs) -> PaymentRequest {
        self.builder.build(args).await
    }

    /// Build the request and write its QR code into the configured output directory.
    pub async fn generate(&self, args: &PaymentArgs) -> Result<GeneratedQr> {
        let request = self.build(args).await;
        let file_name = output_file_name(&request, chrono::Utc::now().timestamp_millis());
        let path = self.renderer.options().out_dir.join(file_name);

        self.write(&request, &path)?;
        Ok(GeneratedQr { request, path })
    }

    /// Render `request` to an explicit path.
    pub fn write(&self, request: &PaymentRequest, path: &Path) -> Result<()> {
        let uri = request.uri.to_string();
        self.renderer.render_to_file(&uri, path)?;

        if self.verify {
            QrDecoder::new().verify_file(path, &uri)?;
            tracing::info!(path = %path.display(), "QR image verified");
        }

        tracing::info!(path = %path.display(), %uri, "QR code written");
        Ok(())
    }
}

/// `qr-<address prefix>[-<denomination>-<amount>]-<timestamp>.png`
pub fn output_file_name(request: &PaymentRequest, timestamp_ms: i64) -> String {
    let label = request
        .requested
        .as_ref()
        .map(|spec| format!("-{}-{}", spec.denomination, spec.amount))
        .unwrap_or_default();

    format!(
        "qr-{}{label}-{timestamp_ms}.png",
        request.recipient.short_prefix()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    fn generator() -> PaymentQrGenerator {
        let oracle = Arc::new(FixedRateOracle::new(BigDecimal::from(2000)));
        PaymentQrGenerator::with_oracle(&PayqrConfig::default(), oracle).unwrap()
    }

    #[tokio::test]
    async fn file_name_carries_denomination_and_amount() {
        let args = PaymentArgs::parse(ADDR, Some("5"), Some("usdc"), None).unwrap();
        let request = generator().build(&args).await;

        assert_eq!(
            output_file_name(&request, 1_700_000_000_000),
            "qr-0x742d35-fungible-token-5-1700000000000.png"
        );
    }

    #[tokio::test]
    async fn file_name_without_amount() {
        let args = PaymentArgs::parse(ADDR, None, None, None).unwrap();
        let request = generator().build(&args).await;

        assert_eq!(output_file_name(&request, 42), "qr-0x742d35-42.png");
    }
}
