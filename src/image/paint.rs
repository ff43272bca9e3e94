use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use qrcodegen::{QrCode, QrCodeEcc};

/// Light modules kept around the symbol.
pub const QUIET_ZONE_MODULES: u32 = 4;
const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Options controlling code image generation.
#[derive(Debug, Clone, Copy)]
pub struct CodeImageOptions {
    /// Pixel edge of one module.
    pub module_px: u32,
    pub quiet_zone: u32,
}

impl Default for CodeImageOptions {
    fn default() -> Self {
        Self {
            module_px: 10,
            quiet_zone: QUIET_ZONE_MODULES,
        }
    }
}

/// Encode `text` as a QR symbol (medium error correction) and paint it.
pub fn render_code_image(text: &str, options: &CodeImageOptions) -> Result<GrayImage> {
    if options.module_px == 0 {
        return Err(anyhow!("module size must be at least one pixel"));
    }
    let qr = QrCode::encode_text(text, QrCodeEcc::Medium)
        .map_err(|err| anyhow!("cannot encode '{text}' as a QR code: {err:?}"))?;
    let modules = qr.size() as u32;
    let scale = options.module_px;
    let edge = (modules + 2 * options.quiet_zone) * scale;

    let mut img: GrayImage = ImageBuffer::from_pixel(edge, edge, LIGHT);
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if !qr.get_module(x, y) {
                continue;
            }
            let px = (x as u32 + options.quiet_zone) * scale;
            let py = (y as u32 + options.quiet_zone) * scale;
            draw_filled_rect_mut(
                &mut img,
                Rect::at(px as i32, py as i32).of_size(scale, scale),
                DARK,
            );
        }
    }
    Ok(img)
}

/// Write a code image as PNG.
pub fn save_code_image(img: &GrayImage, path: &Path) -> Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}
