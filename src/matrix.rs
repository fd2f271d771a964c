use log::debug;
use qrcode::{Color, QrCode};

use crate::{error::Error, level::Level};

/// Side length of the largest symbol (version 40).
pub const MAX_WIDTH: usize = 177;

/// Square grid of QR modules produced by the encoder.
///
/// The grid is read-only once built. Quiet zone padding is never stored:
/// [`Matrix::is_dark_padded`] answers for the expanded grid on the fly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    width: usize,
    modules: Vec<bool>,
}

impl Matrix {
    /// Encode `data` at the given error correction level.
    ///
    /// The bytes are handed to the encoder untouched, so text and binary
    /// callers holding the same bytes get the same symbol.
    pub fn encode(data: &[u8], level: Level) -> Result<Self, Error> {
        let code = QrCode::with_error_correction_level(data, level.ec_level())?;
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        debug!(
            "Encoded {} bytes at level {} into a {}x{} symbol",
            data.len(),
            level,
            width,
            width
        );

        Ok(Matrix { width, modules })
    }

    #[cfg(test)]
    pub(crate) fn from_modules(width: usize, modules: Vec<bool>) -> Self {
        assert_eq!(width * width, modules.len());
        Matrix { width, modules }
    }

    /// Side length in modules.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.width && col < self.width && self.modules[row * self.width + col]
    }

    /// Side length of the grid once `quiet_zone` light modules surround it.
    pub fn padded_width(&self, quiet_zone: usize) -> Result<usize, Error> {
        padded_width(self.width, quiet_zone)
    }

    /// Module state in the grid expanded by `quiet_zone` on every side.
    ///
    /// Anything outside the symbol, including coordinates past the padded
    /// edge, is light.
    pub fn is_dark_padded(&self, row: usize, col: usize, quiet_zone: usize) -> bool {
        match (row.checked_sub(quiet_zone), col.checked_sub(quiet_zone)) {
            (Some(r), Some(c)) => self.is_dark(r, c),
            _ => false,
        }
    }
}

/// `width + 2 * quiet_zone`, rejecting sizes that do not fit a `usize`.
pub(crate) fn padded_width(width: usize, quiet_zone: usize) -> Result<usize, Error> {
    quiet_zone
        .checked_mul(2)
        .and_then(|border| border.checked_add(width))
        .ok_or_else(|| Error::InvalidConfig(format!("quiet zone {} is too large", quiet_zone)))
}
