use std::process::Command;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde_json::Value;

use payqr::config::RenderOptions;
use payqr::{
    Error, FixedRateOracle, PaymentArgs, PaymentQrGenerator, PaymentUri, PayqrConfig, QrDecoder,
};

const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

fn config_in(dir: &std::path::Path) -> PayqrConfig {
    PayqrConfig {
        render: RenderOptions {
            out_dir: dir.to_path_buf(),
            ..RenderOptions::default()
        },
        ..PayqrConfig::default()
    }
}

#[tokio::test]
async fn writes_decodable_png_into_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    let oracle = Arc::new(FixedRateOracle::new(BigDecimal::from(2000)));
    let generator = PaymentQrGenerator::with_oracle(&config_in(dir.path()), oracle)
        .unwrap()
        .with_verification(true);

    let args = PaymentArgs::parse(ADDR, Some("100"), Some("usd"), Some("137")).unwrap();
    let generated = generator.generate(&args).await.unwrap();

    assert_eq!(generated.path.parent(), Some(dir.path()));
    let file_name = generated.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("qr-0x742d35-fiat-100-"), "{file_name}");
    assert!(file_name.ends_with(".png"));

    let image = image::open(&generated.path).unwrap();
    assert_eq!(image.width(), 500);
    let decoded = QrDecoder::new().decode(&image).unwrap();
    let uri = PaymentUri::parse(decoded.as_str().unwrap()).unwrap();
    assert_eq!(uri.target(), ADDR);
    assert_eq!(uri.param("value"), Some("50000000000000000"));
    assert_eq!(uri.param("chainId"), Some("137"));
}

#[tokio::test]
async fn missing_out_dir_is_a_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let oracle = Arc::new(FixedRateOracle::new(BigDecimal::from(2000)));
    let generator =
        PaymentQrGenerator::with_oracle(&config_in(&dir.path().join("absent")), oracle).unwrap();

    let args = PaymentArgs::parse(ADDR, Some("1"), None, None).unwrap();
    let err = generator.generate(&args).await.unwrap_err();
    assert!(matches!(err, Error::Render(_)), "got {err:?}");
}

fn payqr() -> Command {
    Command::new(env!("CARGO_BIN_EXE_payqr"))
}

#[test]
fn cli_prints_json_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = payqr()
        .current_dir(dir.path())
        .args([ADDR, "0.1", "eth", "137", "--no-file", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let payload: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        payload["uri"],
        format!("ethereum:{ADDR}?value=100000000000000000&gas=21000&chainId=137")
    );
    assert!(payload["output_file"].is_null());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn cli_writes_png_with_fixed_rate() {
    let dir = tempfile::tempdir().unwrap();
    let output = payqr()
        .args([ADDR, "5", "usd", "--rate", "2500", "--out-dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("URI: ethereum:"), "{stdout}");
    assert!(stdout.contains("value=2000000000000000"), "{stdout}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn cli_rejects_bad_address_with_usage() {
    let output = payqr().args(["0x1234", "5"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid Ethereum address"), "{stderr}");
    assert!(stderr.contains("Usage:"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn cli_requires_an_address() {
    let output = payqr().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}

#[test]
fn cli_rejects_negative_amount() {
    let output = payqr().args([ADDR, "-5", "--no-file"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid amount: '-5' is negative"), "{stderr}");
    assert!(stderr.contains("Usage:"), "{stderr}");
}

#[test]
fn cli_rejects_out_of_range_exponent_promptly() {
    let started = std::time::Instant::now();
    let output = payqr().args([ADDR, "1e9000000000", "--no-file"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid amount"), "{stderr}");
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[test]
fn cli_rejects_out_of_range_rate() {
    let output = payqr()
        .args([ADDR, "100", "usd", "--rate", "1e-900000000", "--no-file"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid --rate"), "{stderr}");
}

#[test]
fn cli_reports_config_failures_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let output = payqr()
        .args([ADDR, "--no-file", "--config"])
        .arg(&missing)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "{stderr}");
    assert!(!stderr.contains("Usage:"), "{stderr}");
}
