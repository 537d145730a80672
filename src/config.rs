//! payqr runtime configuration handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Mainnet USDC contract used for token transfers and the fiat fallback.
pub const USDC_CONTRACT: &str = "0xA0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

/// Top-level configuration structure loaded from disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayqrConfig {
    /// Asset constants injected into the URI builder
    pub payment: PaymentConfig,
    /// Exchange-rate endpoint settings
    pub oracle: OracleOptions,
    /// QR image rendering settings
    pub render: RenderOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl PayqrConfig {
    /// Load configuration from an explicit path (or defaults) and apply `PAYQR_*` overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.payment.apply_env_overrides();
        self.oracle.apply_env_overrides();
        self.render.apply_env_overrides();
        self.logging.apply_env_overrides();
    }
}

/// Immutable asset constants handed to the payment URI builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaymentConfig {
    /// URI scheme, without the trailing colon
    pub scheme: String,
    /// Token contract that receives `to`/`value` call parameters
    pub token_contract: String,
    /// Display symbol of the token
    pub token_symbol: String,
    /// Decimal places of the token's base unit
    pub token_decimals: u32,
    /// Fiat currency the token tracks 1:1, if any; drives the `≈` hint in descriptions
    pub token_peg: Option<String>,
    /// Display symbol of the native asset
    pub native_symbol: String,
    /// Decimal places of the native asset's base unit (wei)
    pub native_decimals: u32,
    /// Gas limit advertised for native transfers; `None` omits the parameter
    pub native_gas_limit: Option<u64>,
    /// Network id that is left implicit in generated URIs
    pub default_network_id: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            scheme: "ethereum".to_string(),
            token_contract: USDC_CONTRACT.to_string(),
            token_symbol: "USDC".to_string(),
            token_decimals: 6,
            token_peg: Some("USD".to_string()),
            native_symbol: "ETH".to_string(),
            native_decimals: 18,
            native_gas_limit: Some(21_000),
            default_network_id: 1,
        }
    }
}

impl PaymentConfig {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(contract) = env::var("PAYQR_TOKEN_CONTRACT") {
            self.token_contract = contract;
        }
        if let Ok(symbol) = env::var("PAYQR_TOKEN_SYMBOL") {
            self.token_symbol = symbol;
        }
        if let Ok(decimals) = env::var("PAYQR_TOKEN_DECIMALS") {
            if let Ok(parsed) = decimals.parse::<u32>() {
                self.token_decimals = parsed;
            }
        }
    }
}

/// Exchange-rate lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OracleOptions {
    /// Endpoint returning `{"data": {"rates": {...}}}` for `?currency=<base>`
    pub endpoint: String,
    /// Fiat currency the user amount is expressed in
    pub quote_currency: String,
    /// Request timeout; expiry counts as a lookup failure
    pub timeout_secs: u64,
}

impl Default for OracleOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://api.coinbase.com/v2/exchange-rates".to_string(),
            quote_currency: "USD".to_string(),
            timeout_secs: 8,
        }
    }
}

impl OracleOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var("PAYQR_ORACLE_URL") {
            self.endpoint = endpoint;
        }
        if let Ok(currency) = env::var("PAYQR_FIAT_CURRENCY") {
            self.quote_currency = currency.to_ascii_uppercase();
        }
        if let Ok(timeout) = env::var("PAYQR_ORACLE_TIMEOUT") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.timeout_secs = value.max(1);
            }
        }
    }
}

/// QR error correction level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EcLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl FromStr for EcLevel {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            _ => Err(format!(
                "Unsupported error correction level '{value}', expected L, M, Q or H"
            )),
        }
    }
}

/// QR image rendering options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderOptions {
    /// Output image width (and height) in pixels
    pub width: u32,
    /// Quiet zone around the code, in modules
    pub margin: u32,
    /// Error correction level
    pub ec_level: EcLevel,
    /// Directory the PNG is written to
    pub out_dir: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 500,
            margin: 2,
            ec_level: EcLevel::M,
            out_dir: PathBuf::from("."),
        }
    }
}

impl RenderOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("PAYQR_OUT_DIR") {
            if !dir.trim().is_empty() {
                self.out_dir = PathBuf::from(dir);
            }
        }
        if let Ok(width) = env::var("PAYQR_QR_WIDTH") {
            if let Ok(parsed) = width.parse::<u32>() {
                self.width = parsed;
            }
        }
        if let Ok(margin) = env::var("PAYQR_QR_MARGIN") {
            if let Ok(parsed) = margin.parse::<u32>() {
                self.margin = parsed;
            }
        }
        if let Ok(level) = env::var("PAYQR_QR_EC_LEVEL") {
            if let Ok(parsed) = level.parse::<EcLevel>() {
                self.ec_level = parsed;
            }
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `PAYQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("PAYQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("PAYQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("PAYQR_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("PAYQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
