//! QR code renderer

use crate::config::{EcLevel, RenderOptions};
use crate::error::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::path::Path;

/// Renders text as a square black-on-white QR code
#[derive(Debug, Clone)]
pub struct QrRenderer {
    options: RenderOptions,
}

impl QrRenderer {
    /// Create a renderer with the given width, margin and error correction level
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Rendering options in use
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Encode `text` into a `width` x `width` image with `margin` quiet modules on each side.
    pub fn render(&self, text: &str) -> Result<DynamicImage> {
        let width = self.options.width;
        if width == 0 {
            return Err(Error::QrEncode("image width must be positive".to_string()));
        }

        let level = ec_level(self.options.ec_level);
        let code = QrCode::with_error_correction_level(text.as_bytes(), level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))?;

        let modules = code.width() as u32 + 2 * self.options.margin;
        let module_px = (width / modules).max(1);

        let symbol = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .module_dimensions(module_px, module_px)
            .build();

        let side = modules * module_px;
        let mut canvas = GrayImage::from_pixel(side, side, Luma([255u8]));
        let offset = i64::from(self.options.margin * module_px);
        imageops::replace(&mut canvas, &symbol, offset, offset);

        // Integer module sizes rarely hit the requested width exactly.
        let image = if side == width {
            canvas
        } else {
            imageops::resize(&canvas, width, width, FilterType::Nearest)
        };

        Ok(DynamicImage::ImageLuma8(image))
    }

    /// Render `text` and write it to `path` as PNG.
    pub fn render_to_file(&self, text: &str, path: &Path) -> Result<()> {
        let image = self.render(text)?;
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| Error::Render(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), width = image.width(), "Wrote QR image");
        Ok(())
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

fn ec_level(level: EcLevel) -> qrcode::EcLevel {
    match level {
        EcLevel::L => qrcode::EcLevel::L,
        EcLevel::M => qrcode::EcLevel::M,
        EcLevel::Q => qrcode::EcLevel::Q,
        EcLevel::H => qrcode::EcLevel::H,
    }
}
