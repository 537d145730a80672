//! Payment request model and URI construction
//!
//! Turns a recipient, an optional amount, a denomination and a network id
//! into an `ethereum:` payment URI:
//!
//! - native transfers: `ethereum:<recipient>?value=<wei>&gas=21000[&chainId=N]`
//! - token transfers: `ethereum:<token>?to=<recipient>&value=<units>[&chainId=N]`
//! - fiat amounts are converted to native through a [`PriceOracle`], falling
//!   back to a 1:1 token transfer when no rate is available
//!
//! [`PriceOracle`]: crate::oracle::PriceOracle

mod address;
mod amount;
mod builder;
mod uri;

pub use address::{ADDRESS_LEN, Address};
pub use amount::{Amount, check_bounds, from_base_units, to_base_units};
pub use builder::{ConversionResult, PaymentRequest, PaymentUriBuilder, Transfer};
pub use uri::PaymentUri;

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Unit system a user amount is expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Denomination {
    /// Native asset (ETH), 18 decimals
    #[default]
    Native,
    /// The configured token (USDC), 6 decimals
    FungibleToken,
    /// Fiat value converted to native at the current rate
    Fiat,
}

impl Denomination {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Denomination::Native => "native",
            Denomination::FungibleToken => "fungible-token",
            Denomination::Fiat => "fiat",
        }
    }
}

impl FromStr for Denomination {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" | "eth" | "ether" => Ok(Denomination::Native),
            "fungible-token" | "token" | "erc20" | "usdc" => Ok(Denomination::FungibleToken),
            "fiat" | "usd" => Ok(Denomination::Fiat),
            _ => Err(Error::InvalidDenomination(value.to_string())),
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target chain id (1 = Ethereum mainnet, 137 = Polygon, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(u64);

impl NetworkId {
    /// Ethereum mainnet
    pub const MAINNET: NetworkId = NetworkId(1);

    /// Wrap a positive chain id
    pub fn new(id: u64) -> Result<Self> {
        if id == 0 {
            return Err(Error::InvalidNetwork("network id must be positive".to_string()));
        }
        Ok(Self(id))
    }

    /// Numeric chain id
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::MAINNET
    }
}

impl FromStr for NetworkId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let id = value
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidNetwork(format!("'{value}' is not a positive integer")))?;
        Self::new(id)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A quantity together with the unit system it is expressed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountSpec {
    /// Decimal quantity
    pub amount: Amount,
    /// How `amount` is interpreted
    pub denomination: Denomination,
}

impl AmountSpec {
    /// The substitute used when a fiat amount cannot be priced: the same
    /// number of stable-value tokens.
    pub fn fiat_fallback(&self) -> AmountSpec {
        AmountSpec {
            amount: self.amount.clone(),
            denomination: Denomination::FungibleToken,
        }
    }
}

/// Validated command-line input for one payment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentArgs {
    /// Recipient
    pub address: Address,
    /// Requested amount; `None` produces a request without a value
    pub amount: Option<Amount>,
    /// Unit system of `amount`
    pub denomination: Denomination,
    /// Target chain
    pub network: NetworkId,
}

impl PaymentArgs {
    /// Validate raw arguments. The address is checked first so a bad address
    /// is always the reported error.
    pub fn parse(
        address: &str,
        amount: Option<&str>,
        denomination: Option<&str>,
        network: Option<&str>,
    ) -> Result<Self> {
        let address = Address::parse(address)?;
        let amount = amount.map(Amount::parse).transpose()?;
        let denomination = denomination
            .map(Denomination::from_str)
            .transpose()?
            .unwrap_or_default();
        let network = network
            .map(NetworkId::from_str)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            address,
            amount,
            denomination,
            network,
        })
    }

    /// The amount to encode, if any. Zero counts as no amount.
    pub fn amount_spec(&self) -> Option<AmountSpec> {
        self.amount
            .as_ref()
            .filter(|amount| !amount.is_zero())
            .map(|amount| AmountSpec {
                amount: amount.clone(),
                denomination: self.denomination,
            })
    }
}
