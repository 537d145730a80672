//! Recipient / contract addresses

use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address, `0x` + 40 hex digits.
///
/// Checksums are not validated; the text is kept exactly as supplied so a
/// mixed-case (EIP-55) address is written into the URI unchanged.
/// Equality compares the decoded bytes.
#[derive(Debug, Clone)]
pub struct Address {
    bytes: [u8; ADDRESS_LEN],
    text: String,
}

impl Address {
    /// Parse `0x` followed by exactly 40 hex digits (any case).
    pub fn parse(value: &str) -> Result<Self> {
        let hexits = value
            .strip_prefix("0x")
            .filter(|h| h.len() == ADDRESS_LEN * 2 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| Error::InvalidAddress(value.to_string()))?;

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(hexits, &mut bytes)
            .map_err(|_| Error::InvalidAddress(value.to_string()))?;

        Ok(Self {
            bytes,
            text: value.to_string(),
        })
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.bytes
    }

    /// Address text as supplied
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `0x` plus the first six hexits, used to name output files.
    pub fn short_prefix(&self) -> &str {
        &self.text[..8]
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    #[test]
    fn accepts_mixed_case_addresses() {
        for candidate in [
            CHECKSUMMED,
            "0x742d35cc6634c0532925a3b844bc9e7595f0beb0",
            "0x742D35CC6634C0532925A3B844BC9E7595F0BEB0",
            "0x0000000000000000000000000000000000000000",
        ] {
            assert!(Address::parse(candidate).is_ok(), "{candidate} should parse");
        }
    }

    #[test]
    fn rejects_anything_else() {
        for candidate in [
            "",
            "0x",
            "742d35Cc6634C0532925a3b844Bc9e7595f0bEb0",
            "0X742d35Cc6634C0532925a3b844Bc9e7595f0bEb0",
            // 39 and 41 hexits
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb",
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb00",
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEbg",
            " 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0",
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bE\u{e9}",
        ] {
            let err = Address::parse(candidate).unwrap_err();
            assert!(matches!(err, Error::InvalidAddress(_)), "{candidate:?}");
        }
    }

    #[test]
    fn preserves_text_and_compares_bytes() {
        let mixed = Address::parse(CHECKSUMMED).unwrap();
        let lower = Address::parse(&CHECKSUMMED.to_lowercase()).unwrap();

        assert_eq!(mixed.to_string(), CHECKSUMMED);
        assert_eq!(mixed, lower);
        assert_eq!(mixed.as_bytes()[0], 0x74);
        assert_eq!(mixed.short_prefix(), "0x742d35");
    }
}
