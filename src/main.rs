//! payqr command-line entrypoint

use anyhow::Context;
use bigdecimal::BigDecimal;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use payqr::config::EcLevel;
use payqr::output::render_payment;
use payqr::{
    CoinbaseOracle, Denomination, Error, FixedRateOracle, PaymentArgs, PaymentQrGenerator,
    PayqrConfig, PriceOracle, check_bounds, logging,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

const EXAMPLES: &str = "\
Examples:
  payqr 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0
  payqr 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0 5 usdc
  payqr 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0 5 usd
  payqr 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0 0.1 eth 137";

#[derive(Parser, Debug)]
#[command(
    name = "payqr",
    version,
    about = "Generate Ethereum payment QR codes",
    after_help = EXAMPLES
)]
struct Cli {
    /// Recipient address (0x followed by 40 hex digits)
    address: String,

    /// Amount to request, in the chosen denomination
    #[arg(allow_negative_numbers = true)]
    amount: Option<String>,

    /// native|eth, fungible-token|usdc or fiat|usd (default: native)
    denomination: Option<String>,

    /// Chain id (default: 1, Ethereum mainnet)
    network_id: Option<String>,

    /// Optional configuration file (toml/yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the PNG is written to
    #[arg(long, short = 'o', value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, value_name = "PX")]
    width: Option<u32>,

    /// Quiet zone in modules
    #[arg(long, value_name = "MODULES")]
    margin: Option<u32>,

    /// Error correction level (L, M, Q or H)
    #[arg(long, value_name = "LEVEL")]
    ec_level: Option<String>,

    /// Use this native-asset price instead of fetching one
    #[arg(long, value_name = "DECIMAL")]
    rate: Option<String>,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Decode the written image and fail unless it matches the URI
    #[arg(long)]
    verify: bool,

    /// Print the payment URI without writing a QR image
    #[arg(long)]
    no_file: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.downcast_ref::<Error>().is_some_and(Error::is_invalid_input) {
                eprintln!();
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let args = PaymentArgs::parse(
        &cli.address,
        cli.amount.as_deref(),
        cli.denomination.as_deref(),
        cli.network_id.as_deref(),
    )?;

    let mut config = PayqrConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(ref dir) = cli.out_dir {
        config.render.out_dir = dir.clone();
    }
    if let Some(width) = cli.width {
        config.render.width = width;
    }
    if let Some(margin) = cli.margin {
        config.render.margin = margin;
    }
    if let Some(ref level) = cli.ec_level {
        config.render.ec_level = level.parse::<EcLevel>().map_err(Error::Config)?;
    }

    logging::init(&config.logging).context("failed to initialise logging")?;

    let oracle: Arc<dyn PriceOracle> = match cli.rate {
        Some(ref rate) => {
            let parsed = BigDecimal::from_str(rate)
                .map_err(|_| Error::Config(format!("Invalid --rate '{rate}'")))?;
            check_bounds(&parsed)
                .map_err(|e| Error::Config(format!("Invalid --rate '{rate}': {e}")))?;
            Arc::new(FixedRateOracle::new(parsed))
        }
        None => Arc::new(CoinbaseOracle::new(&config.oracle)?),
    };

    let needs_lookup = args.denomination == Denomination::Fiat && args.amount_spec().is_some();
    if needs_lookup && cli.rate.is_none() {
        info!(
            endpoint = %config.oracle.endpoint,
            "Fetching current {} price", config.payment.native_symbol
        );
    }

    let generator = PaymentQrGenerator::with_oracle(&config, oracle)?.with_verification(cli.verify);

    let (request, path) = if cli.no_file {
        (generator.build(&args).await, None)
    } else {
        let generated = generator.generate(&args).await?;
        (generated.request, Some(generated.path))
    };

    let rendered = render_payment(&request, path.as_deref());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }

    Ok(())
}
