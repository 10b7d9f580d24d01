//! QR code generation

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use qrism::QRBuilder;

use crate::model::{NewQrCode, QrDraft};

/// Pixels per module used when no scale is given
pub const DEFAULT_SCALE: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("could not encode QR code: {0}")]
    Encode(String),

    #[error("could not write PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// Encode `payload` as a QR symbol and return it as PNG bytes
pub fn render_png(payload: &str, scale: u32) -> Result<Vec<u8>, CodecError> {
    if payload.is_empty() {
        return Err(CodecError::EmptyContent);
    }

    let qr = QRBuilder::new(payload.as_bytes())
        .build()
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    let image = DynamicImage::ImageRgb8(qr.to_image(scale.max(1)));

    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Generate the image for a draft, ready to be saved
pub fn generate(draft: &QrDraft, scale: u32) -> Result<NewQrCode, CodecError> {
    if draft.is_blank() {
        return Err(CodecError::EmptyContent);
    }

    let image = render_png(&draft.payload(), scale)?;
    Ok(NewQrCode {
        content: draft.content.trim().to_string(),
        kind: draft.kind.trim().to_string(),
        image,
    })
}
