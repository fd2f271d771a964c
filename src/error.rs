//! Error types for QR rendering.
//!
//! This module defines all possible errors that can occur while encoding
//! content into a symbol and writing it to the terminal.

use qrcode::types::QrError;
use thiserror::Error;

/// Main error type for rendering operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The encoder rejected the content.
    ///
    /// Most often the content is too long for the capacity of the chosen
    /// error correction level. Nothing has been written when this is returned.
    #[error("Failed to encode content: {0}")]
    Encode(#[from] QrError),

    /// Writing to the output sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid error correction level: {0}")]
    InvalidLevel(String),

    /// Invalid configuration parameter provided.
    ///
    /// This error occurs when the glyphs of the active mode are empty, the
    /// sixel scale is zero, or the quiet zone makes the output size overflow.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),
}
