use anyhow::{Context, Result};
use image::{DynamicImage, Luma};
use qrcode::QrCode;
use std::io::Cursor;

/// Renders token strings as PNG images for display on the customer screen.
/// The scan side (camera capture, barcode decoding) stays external; this
/// adapter only owns the string-to-image direction.
pub struct QrRenderer {
    /// Maximum edge length of the rendered image in pixels.
    pub size: u32,
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self { size: 800 }
    }
}

impl QrRenderer {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn render_png(&self, content: &str) -> Result<Vec<u8>> {
        let code = QrCode::new(content.as_bytes()).context("failed to build QR code")?;

        let qr_image = code
            .render::<Luma<u8>>()
            .max_dimensions(self.size, self.size)
            .build();

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(qr_image)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .context("failed to encode QR image as PNG")?;

        Ok(buffer.into_inner())
    }
}
