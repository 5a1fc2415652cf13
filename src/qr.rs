use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

use crate::error::{AppError, Result};

/// Smallest edge of the rendered PNG, in pixels.
const MIN_DIMENSION: u32 = 256;

/// Renders `text` as a QR code and returns it as a PNG data URL.
pub fn to_data_url(text: &str) -> Result<String> {
    let code = QrCode::new(text.as_bytes())
        .map_err(|e| AppError::QrCode(format!("QR encoding failed: {}", e)))?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::QrCode(format!("PNG encoding failed: {}", e)))?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png)
    ))
}
