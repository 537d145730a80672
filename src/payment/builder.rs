//! Payment URI builder

use crate::config::PaymentConfig;
use crate::error::{Error, Result};
use crate::oracle::PriceOracle;
use crate::payment::{
    Address, Amount, AmountSpec, Denomination, NetworkId, PaymentArgs, PaymentUri,
    check_bounds, to_base_units,
};
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the URI actually transfers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// Native asset sent straight to the recipient
    Native,
    /// Token `transfer(to, value)` call against `contract`
    Token {
        /// Token contract, the URI's path target
        contract: Address,
        /// Display symbol
        symbol: String,
    },
}

/// Outcome of pricing a fiat amount in the native asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Fiat currency of the requested amount
    pub currency: String,
    /// Price of one native unit in `currency`
    pub rate: BigDecimal,
    /// `fiat / rate`
    pub native_amount: BigDecimal,
    /// `floor(native_amount * 10^native_decimals)`
    pub base_units: BigInt,
}

/// A fully encoded payment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Encoded URI
    pub uri: PaymentUri,
    /// Recipient as supplied
    pub recipient: Address,
    /// Target chain
    pub network: NetworkId,
    /// Amount as the user asked for it, if any
    pub requested: Option<AmountSpec>,
    /// Asset the URI moves
    pub transfer: Transfer,
    /// Integer written to the `value` parameter
    pub base_units: Option<BigInt>,
    /// Human-readable summary of the encoded value
    pub description: Option<String>,
    /// Rate details for a priced fiat request
    pub conversion: Option<ConversionResult>,
    /// True when a fiat request was encoded as a token transfer because no rate was available
    pub fell_back: bool,
}

/// Builds payment URIs from validated arguments and injected asset constants.
pub struct PaymentUriBuilder {
    config: PaymentConfig,
    token_contract: Address,
    fiat_currency: String,
    oracle: Arc<dyn PriceOracle>,
}

impl PaymentUriBuilder {
    /// Create a builder; fails if the configured token contract is not a valid address.
    pub fn new(config: PaymentConfig, oracle: Arc<dyn PriceOracle>) -> Result<Self> {
        let token_contract = Address::parse(&config.token_contract).map_err(|_| {
            Error::Config(format!(
                "Invalid token contract address '{}'",
                config.token_contract
            ))
        })?;

        Ok(Self {
            config,
            token_contract,
            fiat_currency: "USD".to_string(),
            oracle,
        })
    }

    /// Fiat currency fiat amounts are quoted in (default `USD`)
    pub fn with_fiat_currency(mut self, currency: &str) -> Self {
        self.fiat_currency = currency.to_ascii_uppercase();
        self
    }

    /// Injected asset constants
    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// Encode `args`. Only the fiat path performs I/O, and its failure is
    /// absorbed by the token fallback, so building never fails.
    pub async fn build(&self, args: &PaymentArgs) -> PaymentRequest {
        let Some(spec) = args.amount_spec() else {
            return self.open(&args.address, args.network);
        };

        debug!(
            recipient = %args.address,
            amount = %spec.amount,
            denomination = %spec.denomination,
            network = %args.network,
            "Building payment URI"
        );

        match spec.denomination {
            Denomination::Native => self.native(&args.address, &spec.amount, args.network),
            Denomination::FungibleToken => self.token(&args.address, &spec.amount, args.network),
            Denomination::Fiat => self.fiat(&args.address, &spec, args.network).await,
        }
    }

    /// Native request without a value: the payer chooses the amount.
    pub fn open(&self, recipient: &Address, network: NetworkId) -> PaymentRequest {
        let uri = self.native_params(PaymentUri::new(&self.config.scheme, recipient), network);

        PaymentRequest {
            uri,
            recipient: recipient.clone(),
            network,
            requested: None,
            transfer: Transfer::Native,
            base_units: None,
            description: None,
            conversion: None,
            fell_back: false,
        }
    }

    /// Native transfer of `amount` whole native units.
    pub fn native(
        &self,
        recipient: &Address,
        amount: &Amount,
        network: NetworkId,
    ) -> PaymentRequest {
        let units = amount.to_base_units(self.config.native_decimals);

        PaymentRequest {
            uri: self.native_uri(recipient, &units, network),
            recipient: recipient.clone(),
            network,
            requested: Some(AmountSpec {
                amount: amount.clone(),
                denomination: Denomination::Native,
            }),
            transfer: Transfer::Native,
            base_units: Some(units),
            description: Some(format!("{amount} {}", self.config.native_symbol)),
            conversion: None,
            fell_back: false,
        }
    }

    /// Token transfer of `amount` whole tokens. The URI targets the token
    /// contract; the recipient only appears as the `to` parameter.
    pub fn token(
        &self,
        recipient: &Address,
        amount: &Amount,
        network: NetworkId,
    ) -> PaymentRequest {
        let units = amount.to_base_units(self.config.token_decimals);
        let uri = PaymentUri::new(&self.config.scheme, &self.token_contract)
            .with_param("to", recipient)
            .with_param("value", &units);
        let symbol = &self.config.token_symbol;

        PaymentRequest {
            uri: self.chain_param(uri, network),
            recipient: recipient.clone(),
            network,
            requested: Some(AmountSpec {
                amount: amount.clone(),
                denomination: Denomination::FungibleToken,
            }),
            transfer: Transfer::Token {
                contract: self.token_contract.clone(),
                symbol: symbol.clone(),
            },
            base_units: Some(units),
            description: Some(self.token_description(amount)),
            conversion: None,
            fell_back: false,
        }
    }

    /// Price a fiat amount in the native asset. Fails with [`Error::PriceLookup`].
    pub async fn convert(&self, fiat: &Amount) -> Result<ConversionResult> {
        let rate = self
            .oracle
            .get_rate(&self.config.native_symbol, &self.fiat_currency)
            .await?;

        if rate.sign() != Sign::Plus {
            return Err(Error::PriceLookup(format!("rate {rate} is not positive")));
        }
        check_bounds(&rate).map_err(|e| Error::PriceLookup(format!("rate {e}")))?;

        let native_amount = fiat.value().clone() / rate.clone();
        let base_units = to_base_units(&native_amount, self.config.native_decimals);

        Ok(ConversionResult {
            currency: self.fiat_currency.clone(),
            rate,
            native_amount,
            base_units,
        })
    }

    async fn fiat(
        &self,
        recipient: &Address,
        spec: &AmountSpec,
        network: NetworkId,
    ) -> PaymentRequest {
        match self.convert(&spec.amount).await {
            Ok(conversion) => {
                let rate = conversion.rate.with_scale_round(2, RoundingMode::HalfUp);
                let description = format!(
                    "{} worth (≈ {} {native} @ {}/{native})",
                    self.fiat_label(&spec.amount.to_string()),
                    conversion.native_amount.with_scale_round(6, RoundingMode::HalfUp),
                    self.fiat_label(&rate.to_string()),
                    native = self.config.native_symbol,
                );

                PaymentRequest {
                    uri: self.native_uri(recipient, &conversion.base_units, network),
                    recipient: recipient.clone(),
                    network,
                    requested: Some(spec.clone()),
                    transfer: Transfer::Native,
                    base_units: Some(conversion.base_units.clone()),
                    description: Some(description),
                    conversion: Some(conversion),
                    fell_back: false,
                }
            }
            Err(err) => {
                let fallback = spec.fiat_fallback();
                let symbol = &self.config.token_symbol;
                warn!(
                    error = %err,
                    "Exchange rate unavailable, encoding {symbol} transfer instead"
                );

                let mut request = self.token(recipient, &fallback.amount, network);
                request.requested = Some(spec.clone());
                request.description = Some(format!(
                    "{} {symbol} (stablecoin, {} = 1 {symbol})",
                    fallback.amount,
                    self.fiat_label("1"),
                ));
                request.fell_back = true;
                request
            }
        }
    }

    fn native_uri(&self, recipient: &Address, units: &BigInt, network: NetworkId) -> PaymentUri {
        let uri = PaymentUri::new(&self.config.scheme, recipient).with_param("value", units);
        self.native_params(uri, network)
    }

    fn native_params(&self, uri: PaymentUri, network: NetworkId) -> PaymentUri {
        let uri = match self.config.native_gas_limit {
            Some(gas) => uri.with_param("gas", gas),
            None => uri,
        };
        self.chain_param(uri, network)
    }

    fn chain_param(&self, uri: PaymentUri, network: NetworkId) -> PaymentUri {
        if network.get() == self.config.default_network_id {
            uri
        } else {
            uri.with_param("chainId", network)
        }
    }

    fn token_description(&self, amount: &Amount) -> String {
        let symbol = &self.config.token_symbol;
        let pegged = self
            .config
            .token_peg
            .as_deref()
            .is_some_and(|peg| peg.eq_ignore_ascii_case(&self.fiat_currency));

        if pegged {
            format!("{amount} {symbol} (≈ {})", self.fiat_label(&amount.to_string()))
        } else {
            format!("{amount} {symbol}")
        }
    }

    fn fiat_label(&self, value: &str) -> String {
        if self.fiat_currency == "USD" {
            format!("${value}")
        } else {
            format!("{value} {}", self.fiat_currency)
        }
    }
}
