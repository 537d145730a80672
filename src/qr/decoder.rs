//! QR code decoder using rqrr, used to read back rendered images

use crate::error::{Error, Result};
use crate::qr::QrPayload;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// QR code decoder
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a QR code from an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        let gray = img.to_luma8();

        self.decode_gray(&gray)
    }

    /// Decode a QR code from a grayscale image
    pub fn decode_gray(&self, img: &GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img.clone());

        let grids = prepared.detect_grids();

        let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );

                Ok(QrPayload::from_bytes(content.into_bytes()))
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }

    /// Load an image file and check it decodes to exactly `expected`.
    pub fn verify_file(&self, path: &Path, expected: &str) -> Result<()> {
        let image = image::open(path)
            .map_err(|e| Error::Render(format!("cannot reopen {}: {e}", path.display())))?;
        let payload = self.decode(&image)?;

        match payload.as_str() {
            Some(text) if text == expected => Ok(()),
            Some(text) => Err(Error::Render(format!(
                "{} decodes to '{text}', expected '{expected}'",
                path.display()
            ))),
            None => Err(Error::Render(format!(
                "{} decodes to {} non-UTF-8 bytes",
                path.display(),
                payload.as_bytes().len()
            ))),
        }
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}
