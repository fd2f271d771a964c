//! Text renderings of a [`Matrix`].
//!
//! Two strategies are supported:
//!
//! * full blocks, one glyph per module,
//! * half blocks, one glyph per pair of vertically stacked modules. A
//!   terminal cell is roughly twice as tall as it is wide, so this keeps the
//!   symbol close to square while halving the number of lines.

use std::io::{self, Write};

use crate::{error::Error, matrix::Matrix};

/// Glyphs for one-glyph-per-module rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullBlocks<'a> {
    pub dark: &'a str,
    pub light: &'a str,
}

impl<'a> FullBlocks<'a> {
    fn glyph(&self, dark: bool) -> &'a str {
        if dark {
            self.dark
        } else {
            self.light
        }
    }
}

/// Glyphs for two-modules-per-glyph rendering, keyed by (top, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBlocks<'a> {
    table: [&'a str; 4],
}

impl<'a> HalfBlocks<'a> {
    pub fn new(
        dark_dark: &'a str,
        dark_light: &'a str,
        light_dark: &'a str,
        light_light: &'a str,
    ) -> Self {
        HalfBlocks {
            table: [light_light, light_dark, dark_light, dark_dark],
        }
    }

    pub fn glyph(&self, top: bool, bottom: bool) -> &'a str {
        self.table[(usize::from(top) << 1) | usize::from(bottom)]
    }

    pub fn glyphs(&self) -> &[&'a str; 4] {
        &self.table
    }
}

/// One line per padded module row.
pub fn full_block_lines(
    matrix: &Matrix,
    quiet_zone: usize,
    glyphs: &FullBlocks,
) -> Result<Vec<String>, Error> {
    let size = matrix.padded_width(quiet_zone)?;

    Ok((0..size)
        .map(|row| {
            (0..size)
                .map(|col| glyphs.glyph(matrix.is_dark_padded(row, col, quiet_zone)))
                .collect()
        })
        .collect())
}

/// One line per pair of padded module rows.
///
/// With an odd padded height the last row is paired with a light row.
pub fn half_block_lines(
    matrix: &Matrix,
    quiet_zone: usize,
    glyphs: &HalfBlocks,
) -> Result<Vec<String>, Error> {
    let size = matrix.padded_width(quiet_zone)?;

    Ok((0..size)
        .step_by(2)
        .map(|top| {
            (0..size)
                .map(|col| {
                    // past the padded edge reads as light
                    glyphs.glyph(
                        matrix.is_dark_padded(top, col, quiet_zone),
                        matrix.is_dark_padded(top + 1, col, quiet_zone),
                    )
                })
                .collect()
        })
        .collect())
}

pub fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
