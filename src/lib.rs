//! QR codes for the terminal
//!
//! This crate renders QR symbols as text or as sixel graphics. Content is
//! encoded with the `qrcode` crate and written in one of three forms:
//!
//! * full blocks, one glyph per module,
//! * half blocks, one glyph per two stacked modules,
//! * a sixel image, for terminals that can display it.
//!
//! # Example
//!
//! ```rust
//! use qrterm::{Config, Level};
//!
//! let mut out: Vec<u8> = Vec::new();
//! qrterm::render("https://example.com", Level::Medium, &mut out).unwrap();
//!
//! let mut custom: Vec<u8> = Vec::new();
//! let config = Config::default()
//!     .full_block_glyphs("##", "  ")
//!     .quiet_zone(1)
//!     .writer(&mut custom);
//! qrterm::render_with_config("https://example.com", config).unwrap();
//! ```

mod config;
mod error;
mod glyph;
mod level;
mod matrix;
mod probe;
mod render;
mod sixel;

pub use crate::{
    config::{Config, Mode},
    error::Error,
    level::Level,
    matrix::Matrix,
    probe::{is_sixel_supported, probe, DeviceQuery, QUERY_TIMEOUT},
    render::{
        render, render_binary, render_binary_half_block, render_binary_with_config,
        render_half_block, render_with_config,
    },
};

/// Full block glyph for a dark module.
///
/// The terminal foreground is taken to be the light color, so dark modules
/// are left blank and light modules are drawn.
pub const DARK: &str = "  ";

/// Full block glyph for a light module.
pub const LIGHT: &str = "\u{2588}\u{2588}";

/// Half block glyph for a dark module above a dark module.
pub const DARK_DARK: &str = " ";

/// Half block glyph for a dark module above a light module.
pub const DARK_LIGHT: &str = "\u{2584}";

/// Half block glyph for a light module above a dark module.
pub const LIGHT_DARK: &str = "\u{2580}";

/// Half block glyph for a light module above a light module.
pub const LIGHT_LIGHT: &str = "\u{2588}";

/// Width of the light border drawn around the symbol, in modules.
pub const QUIET_ZONE: usize = 2;

/// Side of a module in sixel mode, in pixels.
pub const SIXEL_SCALE: usize = 4;
