use log::debug;
use std::{
    fmt,
    io::{self, Stdout, Write},
};

use crate::{
    error::Error,
    glyph::{FullBlocks, HalfBlocks},
    level::Level,
    matrix::{self, MAX_WIDTH},
    probe, sixel, DARK, DARK_DARK, DARK_LIGHT, LIGHT, LIGHT_DARK, LIGHT_LIGHT, QUIET_ZONE, SIXEL_SCALE,
};

/// Output encoding picked for a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    FullBlocks,
    HalfBlocks,
    Sixel,
}

/// Rendering configuration.
///
/// Settings are applied with consuming builder methods:
///
/// ```
/// use qrterm::{Config, Level};
///
/// let mut out: Vec<u8> = Vec::new();
/// let config = Config::default()
///     .level(Level::Medium)
///     .quiet_zone(3)
///     .half_blocks(true)
///     .writer(&mut out);
/// qrterm::render_with_config("hello", config).unwrap();
/// assert!(!out.is_empty());
/// ```
pub struct Config<W = Stdout> {
    pub(crate) level: Level,
    pub(crate) quiet_zone: usize,
    pub(crate) dark: String,
    pub(crate) light: String,
    pub(crate) dark_dark: String,
    pub(crate) dark_light: String,
    pub(crate) light_dark: String,
    pub(crate) light_light: String,
    pub(crate) half_blocks: bool,
    pub(crate) sixel: bool,
    pub(crate) sixel_scale: usize,
    pub(crate) writer: W,
}

impl Default for Config<Stdout> {
    /// Default glyphs and quiet zone, writing to standard output.
    ///
    /// Sixel stays off until [`Config::detect_sixel`] or [`Config::sixel`]
    /// turns it on.
    fn default() -> Self {
        Config::new(io::stdout())
    }
}

impl Config<Stdout> {
    /// Enable sixel output when standard output is a terminal that renders it.
    pub fn detect_sixel(self) -> Self {
        let sixel = probe::is_sixel_supported(&self.writer);
        debug!("Sixel detected on stdout: {}", sixel);
        Config { sixel, ..self }
    }
}

impl<W: Write> Config<W> {
    /// Initialize configuration data with default values, writing to `writer`.
    pub fn new(writer: W) -> Self {
        Config {
            level: Level::Low,
            quiet_zone: QUIET_ZONE,
            dark: DARK.to_string(),
            light: LIGHT.to_string(),
            dark_dark: DARK_DARK.to_string(),
            dark_light: DARK_LIGHT.to_string(),
            light_dark: LIGHT_DARK.to_string(),
            light_light: LIGHT_LIGHT.to_string(),
            half_blocks: false,
            sixel: false,
            sixel_scale: SIXEL_SCALE,
            writer,
        }
    }

    pub fn level(self, level: Level) -> Self {
        Config { level, ..self }
    }

    /// Number of light modules added on every side of the symbol.
    pub fn quiet_zone(self, quiet_zone: usize) -> Self {
        Config { quiet_zone, ..self }
    }

    /// Glyphs for full block mode.
    pub fn full_block_glyphs(self, dark: &str, light: &str) -> Self {
        Config {
            dark: dark.to_string(),
            light: light.to_string(),
            ..self
        }
    }

    /// Glyphs for half block mode, named (top, bottom).
    pub fn half_block_glyphs(
        self,
        dark_dark: &str,
        dark_light: &str,
        light_dark: &str,
        light_light: &str,
    ) -> Self {
        Config {
            dark_dark: dark_dark.to_string(),
            dark_light: dark_light.to_string(),
            light_dark: light_dark.to_string(),
            light_light: light_light.to_string(),
            ..self
        }
    }

    pub fn half_blocks(self, half_blocks: bool) -> Self {
        Config {
            half_blocks,
            ..self
        }
    }

    pub fn sixel(self, sixel: bool) -> Self {
        Config { sixel, ..self }
    }

    /// Pixels per module side in sixel mode.
    pub fn sixel_scale(self, sixel_scale: usize) -> Self {
        Config {
            sixel_scale,
            ..self
        }
    }

    /// Send output to another sink.
    pub fn writer<V: Write>(self, writer: V) -> Config<V> {
        Config {
            level: self.level,
            quiet_zone: self.quiet_zone,
            dark: self.dark,
            light: self.light,
            dark_dark: self.dark_dark,
            dark_light: self.dark_light,
            light_dark: self.light_dark,
            light_light: self.light_light,
            half_blocks: self.half_blocks,
            sixel: self.sixel,
            sixel_scale: self.sixel_scale,
            writer,
        }
    }

    /// Sixel wins over half blocks, which win over full blocks.
    pub fn mode(&self) -> Mode {
        if self.sixel {
            Mode::Sixel
        } else if self.half_blocks {
            Mode::HalfBlocks
        } else {
            Mode::FullBlocks
        }
    }

    pub(crate) fn full_blocks(&self) -> FullBlocks<'_> {
        FullBlocks {
            dark: &self.dark,
            light: &self.light,
        }
    }

    pub(crate) fn half_block_table(&self) -> HalfBlocks<'_> {
        HalfBlocks::new(
            &self.dark_dark,
            &self.dark_light,
            &self.light_dark,
            &self.light_light,
        )
    }

    /// Check the settings used by the active mode.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        match self.mode() {
            Mode::FullBlocks => {
                if self.dark.is_empty() || self.light.is_empty() {
                    return Err(Error::InvalidConfig(
                        "full block glyphs must not be empty".to_string(),
                    ));
                }
            }
            Mode::HalfBlocks => {
                if self.half_block_table().glyphs().iter().any(|g| g.is_empty()) {
                    return Err(Error::InvalidConfig(
                        "half block glyphs must not be empty".to_string(),
                    ));
                }
            }
            Mode::Sixel => {
                if self.sixel_scale == 0 {
                    return Err(Error::InvalidConfig(
                        "sixel scale must be at least one pixel per module".to_string(),
                    ));
                }
                sixel::raster_size(MAX_WIDTH, self.quiet_zone, self.sixel_scale)?;
            }
        }
        matrix::padded_width(MAX_WIDTH, self.quiet_zone)?;
        Ok(())
    }
}

impl<W> fmt::Debug for Config<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("level", &self.level)
            .field("quiet_zone", &self.quiet_zone)
            .field("dark", &self.dark)
            .field("light", &self.light)
            .field("dark_dark", &self.dark_dark)
            .field("dark_light", &self.dark_light)
            .field("light_dark", &self.light_dark)
            .field("light_light", &self.light_light)
            .field("half_blocks", &self.half_blocks)
            .field("sixel", &self.sixel)
            .field("sixel_scale", &self.sixel_scale)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_crate_constants() {
        let config = Config::new(Vec::<u8>::new());
        assert_eq!(config.level, Level::Low);
        assert_eq!(config.quiet_zone, QUIET_ZONE);
        assert_eq!(config.full_blocks(), FullBlocks { dark: DARK, light: LIGHT });
        assert_eq!(
            config.half_block_table(),
            HalfBlocks::new(DARK_DARK, DARK_LIGHT, LIGHT_DARK, LIGHT_LIGHT)
        );
        assert!(!config.sixel);
        assert_eq!(config.mode(), Mode::FullBlocks);
    }

    #[test]
    fn sixel_takes_precedence_over_half_blocks() {
        let config = Config::new(Vec::<u8>::new()).half_blocks(true);
        assert_eq!(config.mode(), Mode::HalfBlocks);
        let config = config.sixel(true);
        assert_eq!(config.mode(), Mode::Sixel);
        let config = config.half_blocks(false);
        assert_eq!(config.mode(), Mode::Sixel);
    }

    #[test]
    fn only_active_glyphs_must_be_non_empty() {
        let config = Config::new(Vec::<u8>::new()).half_block_glyphs("", "", "", "");
        assert!(config.validate().is_ok());

        let config = config.half_blocks(true);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config::new(Vec::<u8>::new()).full_block_glyphs("XX", "");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config::new(Vec::<u8>::new()).sixel(true).sixel_scale(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn quiet_zone_must_fit_the_largest_symbol() {
        let config = Config::new(Vec::<u8>::new()).quiet_zone(usize::MAX);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config::new(Vec::<u8>::new()).quiet_zone(usize::MAX / 2 - MAX_WIDTH / 2);
        assert!(config.validate().is_ok());

        let config = config.sixel(true);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config::new(Vec::<u8>::new()).quiet_zone(40).sixel(true);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn swapping_writer_keeps_settings() {
        let config = Config::new(Vec::<u8>::new())
            .level(Level::High)
            .quiet_zone(5)
            .full_block_glyphs("#", " ")
            .writer(io::sink());
        assert_eq!(config.level, Level::High);
        assert_eq!(config.quiet_zone, 5);
        assert_eq!(config.dark, "#");
        let debug = format!("{:?}", config);
        assert!(debug.contains("quiet_zone: 5"));
    }
}
