use log::debug;
use std::io::Write;

use crate::{
    config::{Config, Mode},
    error::Error,
    glyph,
    level::Level,
    matrix::Matrix,
    sixel,
};

/// Render `content` with default glyphs at the given level.
pub fn render<W: Write>(content: &str, level: Level, writer: W) -> Result<(), Error> {
    render_binary_with_config(content.as_bytes(), Config::new(writer).level(level))
}

/// Render `content` as half blocks at the given level.
pub fn render_half_block<W: Write>(content: &str, level: Level, writer: W) -> Result<(), Error> {
    render_binary_with_config(
        content.as_bytes(),
        Config::new(writer).level(level).half_blocks(true),
    )
}

pub fn render_with_config<W: Write>(content: &str, config: Config<W>) -> Result<(), Error> {
    render_binary_with_config(content.as_bytes(), config)
}

/// Render raw bytes with default glyphs at the given level.
///
/// The bytes reach the encoder unchanged, so content that is not valid text
/// (NUL, stray high bytes) is preserved exactly.
pub fn render_binary<W: Write>(data: &[u8], level: Level, writer: W) -> Result<(), Error> {
    render_binary_with_config(data, Config::new(writer).level(level))
}

/// Render raw bytes as half blocks at the given level.
pub fn render_binary_half_block<W: Write>(
    data: &[u8],
    level: Level,
    writer: W,
) -> Result<(), Error> {
    render_binary_with_config(data, Config::new(writer).level(level).half_blocks(true))
}

/// Encode `data` and write it in the mode selected by `config`.
///
/// Nothing is written when the configuration is invalid or the content does
/// not fit the symbol.
pub fn render_binary_with_config<W: Write>(
    data: &[u8],
    mut config: Config<W>,
) -> Result<(), Error> {
    config.validate()?;
    let matrix = Matrix::encode(data, config.level)?;

    let mode = config.mode();
    debug!("Rendering {:?} with {:?}", mode, config);

    match mode {
        Mode::Sixel => {
            let payload = sixel::encode(&matrix, config.quiet_zone, config.sixel_scale)?;
            config.writer.write_all(&payload)?;
        }
        Mode::HalfBlocks => {
            let lines = glyph::half_block_lines(
                &matrix,
                config.quiet_zone,
                &config.half_block_table(),
            )?;
            glyph::write_lines(&mut config.writer, &lines)?;
        }
        Mode::FullBlocks => {
            let lines = glyph::full_block_lines(&matrix, config.quiet_zone, &config.full_blocks())?;
            glyph::write_lines(&mut config.writer, &lines)?;
        }
    }

    config.writer.flush()?;
    Ok(())
}
