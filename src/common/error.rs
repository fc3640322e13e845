use std::time::Duration;

use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    // Rendering
    #[error("QR encoder rejected payload: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("Invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),
    #[error("Invalid size {0}px")]
    InvalidSize(u32),
    #[error("Invalid margin of {0} modules")]
    InvalidMargin(u32),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // Export
    #[error("Decoding QR raster timed out after {0:?}")]
    DecodeTimeout(Duration),
    #[error("No caption font available")]
    FontUnavailable,
    #[error("Invalid caption font")]
    InvalidFont,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Clipboard
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<ab_glyph::InvalidFont> for Error {
    fn from(_: ab_glyph::InvalidFont) -> Self {
        Self::InvalidFont
    }
}

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Self::Clipboard(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
