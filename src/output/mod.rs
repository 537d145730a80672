//! Helpers for rendering generated payment requests for the terminal

use crate::payment::{PaymentRequest, Transfer};
use serde_json::{Map, Value, json};
use std::path::Path;

/// Combined structured and human-readable representation of a payment request
#[derive(Debug, Clone)]
pub struct RenderedPayment {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a payment request (and the file it was written to, if any) into both forms.
pub fn render_payment(request: &PaymentRequest, path: Option<&Path>) -> RenderedPayment {
    let json = payment_value(request, path);
    let mut human = Vec::new();

    match path {
        Some(path) => {
            human.push("QR code generated successfully".to_string());
            human.push(format!("  Saved to: {}", path.display()));
        }
        None => human.push("Payment request".to_string()),
    }
    human.push(format!("  Address: {}", request.recipient));
    human.push(format!("  URI: {}", request.uri));

    if let Some(description) = &request.description {
        human.push(format!("  Amount: {description}"));
    }

    if let Transfer::Token { contract, symbol } = &request.transfer {
        human.push(format!("  Token: {symbol} (ERC-20)"));
        human.push(format!("  Contract: {contract}"));
    }

    if request.fell_back {
        human.push(
            "  Note: exchange rate unavailable, encoded as a stablecoin transfer".to_string(),
        );
    }

    human.push(format!("  Chain ID: {}", request.network));

    RenderedPayment { json, human }
}

/// Produce a structured JSON representation of the payment request.
pub fn payment_value(request: &PaymentRequest, path: Option<&Path>) -> Value {
    let mut root = Map::new();
    root.insert("uri".to_string(), Value::String(request.uri.to_string()));
    root.insert(
        "address".to_string(),
        Value::String(request.recipient.to_string()),
    );
    root.insert("chain_id".to_string(), Value::from(request.network.get()));
    root.insert(
        "transfer".to_string(),
        Value::String(transfer_label(&request.transfer).to_string()),
    );

    if let Some(spec) = &request.requested {
        root.insert(
            "denomination".to_string(),
            Value::String(spec.denomination.to_string()),
        );
        root.insert("amount".to_string(), Value::String(spec.amount.to_string()));
    }

    root.insert(
        "base_units".to_string(),
        request
            .base_units
            .as_ref()
            .map_or(Value::Null, |units| Value::String(units.to_string())),
    );
    root.insert(
        "description".to_string(),
        request
            .description
            .clone()
            .map_or(Value::Null, Value::String),
    );

    if let Transfer::Token { contract, symbol } = &request.transfer {
        root.insert(
            "token".to_string(),
            json!({
                "symbol": symbol,
                "contract": contract.to_string(),
            }),
        );
    }

    if let Some(conversion) = &request.conversion {
        root.insert(
            "conversion".to_string(),
            json!({
                "currency": conversion.currency,
                "rate": conversion.rate.to_string(),
                "native_amount": conversion.native_amount.normalized().to_string(),
                "base_units": conversion.base_units.to_string(),
            }),
        );
    }

    root.insert("fallback".to_string(), Value::Bool(request.fell_back));
    root.insert(
        "output_file".to_string(),
        path.map_or(Value::Null, |p| Value::String(p.display().to_string())),
    );

    Value::Object(root)
}

fn transfer_label(transfer: &Transfer) -> &'static str {
    match transfer {
        Transfer::Native => "native",
        Transfer::Token { .. } => "token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PaymentConfig, USDC_CONTRACT};
    use crate::oracle::FixedRateOracle;
    use crate::payment::{PaymentArgs, PaymentUriBuilder};
    use bigdecimal::BigDecimal;
    use std::sync::Arc;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    async fn request(amount: &str, denomination: &str) -> PaymentRequest {
        let builder = PaymentUriBuilder::new(
            PaymentConfig::default(),
            Arc::new(FixedRateOracle::new(BigDecimal::from(2000))),
        )
        .unwrap();
        let args = PaymentArgs::parse(ADDR, Some(amount), Some(denomination), Some("137")).unwrap();
        builder.build(&args).await
    }

    #[tokio::test]
    async fn renders_token_request_consistently() {
        let request = request("5", "usdc").await;
        let rendered = render_payment(&request, Some(Path::new("qr-test.png")));

        assert_eq!(rendered.json["transfer"], "token");
        assert_eq!(rendered.json["base_units"], "5000000");
        assert_eq!(rendered.json["token"]["contract"], USDC_CONTRACT);
        assert_eq!(rendered.json["chain_id"], 137);
        assert_eq!(rendered.json["output_file"], "qr-test.png");
        assert!(rendered.human.iter().any(|line| line.contains("Token: USDC (ERC-20)")));
        assert!(rendered.human.iter().any(|line| line.contains("Chain ID: 137")));
    }

    #[tokio::test]
    async fn renders_fiat_conversion() {
        let request = request("100", "usd").await;
        let rendered = render_payment(&request, None);

        assert_eq!(rendered.json["conversion"]["native_amount"], "0.05");
        assert_eq!(rendered.json["conversion"]["base_units"], "50000000000000000");
        assert_eq!(rendered.json["fallback"], false);
        assert!(rendered.json["output_file"].is_null());
        assert!(
            rendered
                .human
                .iter()
                .any(|line| line.contains("Amount: $100 worth"))
        );
    }
}
