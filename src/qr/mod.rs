//! QR code rendering and read-back
//!
//! Payment URIs are rendered to PNG with [`QrRenderer`]; [`QrDecoder`]
//! re-reads a written image to confirm it carries the intended URI.

mod decoder;
mod encoder;

pub use decoder::QrDecoder;
pub use encoder::QrRenderer;

/// A decoded QR code payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    /// The raw decoded data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payload_from_bytes() {
        let payload = QrPayload::from_bytes(b"ethereum:0x00".to_vec());
        assert_eq!(payload.as_str(), Some("ethereum:0x00"));

        let binary = QrPayload::from_bytes(vec![0xFF, 0xFE]);
        assert!(binary.as_str().is_none()); // Invalid UTF-8
        assert_eq!(binary.as_bytes(), &[0xFF, 0xFE]);
    }
}
