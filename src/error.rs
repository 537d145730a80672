//! Error types for payqr operations

use thiserror::Error;

/// Result type alias using payqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for payqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// Recipient address is not `0x` followed by 40 hex digits
    #[error("Invalid Ethereum address '{0}': expected 0x followed by 40 hex digits")]
    InvalidAddress(String),

    /// Amount is negative, non-numeric or non-finite
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Denomination is not one of the accepted aliases
    #[error("Unknown denomination '{0}', expected native|eth, fungible-token|usdc or fiat|usd")]
    InvalidDenomination(String),

    /// Network id is zero or not an integer
    #[error("Invalid network id: {0}")]
    InvalidNetwork(String),

    /// Exchange-rate lookup failed (recovered by the fiat fallback)
    #[error("Price lookup failed: {0}")]
    PriceLookup(String),

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed during verification
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in rendered image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Writing or verifying the output image failed
    #[error("Failed to write QR image: {0}")]
    Render(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors caused by bad user input, reported before any network or file activity.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_)
                | Error::InvalidAmount(_)
                | Error::InvalidDenomination(_)
                | Error::InvalidNetwork(_)
        )
    }
}

// Implement From conversions for common error types

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::PriceLookup(format!("request timed out: {}", e))
        } else {
            Error::PriceLookup(e.to_string())
        }
    }
}
