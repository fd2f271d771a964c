//! Sixel encoding of a [`Matrix`].
//!
//! The payload is a single DCS string:
//!
//! ```text
//! ESC P q  "1;1;W;H  #0;2;100;100;100 #1;2;0;0;0  <band> - <band> - ... ESC \
//! ```
//!
//! Every band covers six pixel rows. It is painted twice: light pixels with
//! register 0, a graphics carriage return (`$`), then dark pixels with
//! register 1.

use log::debug;

use crate::{error::Error, matrix::Matrix};

pub const INTRODUCER: &[u8] = b"\x1bPq";
pub const TERMINATOR: &[u8] = b"\x1b\\";

const PALETTE: &[u8] = b"#0;2;100;100;100#1;2;0;0;0";
const BAND_HEIGHT: usize = 6;
const SIXEL_BASE: u8 = 0x3F;

/// Shortest run worth a `!<count>` prefix.
const MIN_REPEAT: usize = 4;

/// Encode `matrix` with `quiet_zone` light modules around it, each module
/// drawn as a `scale` x `scale` pixel square.
pub fn encode(matrix: &Matrix, quiet_zone: usize, scale: usize) -> Result<Vec<u8>, Error> {
    if scale == 0 {
        return Err(Error::InvalidConfig(
            "sixel scale must be at least one pixel per module".to_string(),
        ));
    }

    let size = raster_size(matrix.width(), quiet_zone, scale)?;
    let bands = (size + BAND_HEIGHT - 1) / BAND_HEIGHT;

    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(INTRODUCER);
    buf.extend_from_slice(format!("\"1;1;{};{}", size, size).as_bytes());
    buf.extend_from_slice(PALETTE);

    let mut dark: Vec<u8> = vec![0; size];
    let mut light: Vec<u8> = vec![0; size];

    for band in 0..bands {
        let top = band * BAND_HEIGHT;

        for (x, (d, l)) in dark.iter_mut().zip(light.iter_mut()).enumerate() {
            let mut dark_bits: u8 = 0;
            let mut used_bits: u8 = 0;
            for i in 0..BAND_HEIGHT {
                let y = top + i;
                if y >= size {
                    break;
                }
                used_bits |= 1 << i;
                if matrix.is_dark_padded(y / scale, x / scale, quiet_zone) {
                    dark_bits |= 1 << i;
                }
            }
            *d = dark_bits;
            *l = used_bits & !dark_bits;
        }

        if band > 0 {
            buf.push(b'-');
        }
        buf.extend_from_slice(b"#0");
        push_compressed(&mut buf, &light);
        buf.push(b'$');
        buf.extend_from_slice(b"#1");
        push_compressed(&mut buf, &dark);
    }

    buf.extend_from_slice(TERMINATOR);

    debug!(
        "Sixel payload: {}x{} pixels, {} bands, {} bytes",
        size,
        size,
        bands,
        buf.len()
    );

    Ok(buf)
}

/// Pixel side length of the raster for a symbol of `width` modules.
pub(crate) fn raster_size(width: usize, quiet_zone: usize, scale: usize) -> Result<usize, Error> {
    crate::matrix::padded_width(width, quiet_zone)?
        .checked_mul(scale)
        .ok_or_else(|| {
            Error::InvalidConfig(format!(
                "sixel raster for quiet zone {} at scale {} is too large",
                quiet_zone, scale
            ))
        })
}

/// Append sixel characters for `bits`, folding runs into `!<count><char>`.
fn push_compressed(buf: &mut Vec<u8>, bits: &[u8]) {
    let mut i = 0;

    while i < bits.len() {
        let value = bits[i];
        let mut run_length = 1;

        while i + run_length < bits.len() && bits[i + run_length] == value {
            run_length += 1;
        }

        let ch = SIXEL_BASE + value;
        if run_length >= MIN_REPEAT {
            buf.extend_from_slice(format!("!{}", run_length).as_bytes());
            buf.push(ch);
        } else {
            buf.extend(std::iter::repeat(ch).take(run_length));
        }
        i += run_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a payload back into a pixel grid: `Some(true)` dark,
    /// `Some(false)` light, `None` untouched.
    fn decode(payload: &[u8]) -> (usize, usize, Vec<Vec<Option<bool>>>) {
        assert!(payload.starts_with(INTRODUCER));
        assert!(payload.ends_with(TERMINATOR));
        let body = &payload[INTRODUCER.len()..payload.len() - TERMINATOR.len()];
        let body = std::str::from_utf8(body).unwrap();

        let raster_end = body.find('#').unwrap();
        let raster: Vec<usize> = body[1..raster_end]
            .split(';')
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(&raster[..2], &[1, 1]);
        let (width, height) = (raster[2], raster[3]);
        let body = body[raster_end..].strip_prefix(std::str::from_utf8(PALETTE).unwrap()).unwrap();

        let mut grid = vec![vec![None; width]; height];
        let (mut x, mut band, mut color) = (0usize, 0usize, 0u8);
        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            let mut repeat = 1;
            let c = match c {
                '#' => {
                    color = chars.next().unwrap().to_digit(10).unwrap() as u8;
                    continue;
                }
                '$' => {
                    x = 0;
                    continue;
                }
                '-' => {
                    x = 0;
                    band += 1;
                    continue;
                }
                '!' => {
                    let mut digits = String::new();
                    while chars.peek().map_or(false, |d| d.is_ascii_digit()) {
                        digits.push(chars.next().unwrap());
                    }
                    repeat = digits.parse().unwrap();
                    chars.next().unwrap()
                }
                c => c,
            };
            let bits = c as u8 - SIXEL_BASE;
            assert!(bits < 64, "invalid sixel character {:?}", c);
            for _ in 0..repeat {
                for i in 0..BAND_HEIGHT {
                    if bits & (1 << i) != 0 {
                        let y = band * BAND_HEIGHT + i;
                        assert!(y < height && x < width, "pixel outside raster");
                        grid[y][x] = Some(color == 1);
                    }
                }
                x += 1;
            }
        }
        (width, height, grid)
    }

    fn checker() -> Matrix {
        Matrix::from_modules(3, vec![true, false, true, false, true, false, true, false, true])
    }

    #[test]
    fn header_declares_square_raster_and_palette() {
        let payload = encode(&checker(), 2, 2).unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert!(text.starts_with("\x1bPq\"1;1;14;14#0;2;100;100;100#1;2;0;0;0#0"));
        assert!(text.ends_with("\x1b\\"));
    }

    #[test]
    fn pixels_decode_back_to_the_padded_matrix() {
        let matrix = checker();
        for &(quiet_zone, scale) in &[(0, 1), (1, 1), (2, 3), (1, 4)] {
            let payload = encode(&matrix, quiet_zone, scale).unwrap();
            let (width, height, grid) = decode(&payload);
            let size = matrix.padded_width(quiet_zone).unwrap() * scale;
            assert_eq!((width, height), (size, size));
            for y in 0..size {
                for x in 0..size {
                    let expected = matrix.is_dark_padded(y / scale, x / scale, quiet_zone);
                    assert_eq!(grid[y][x], Some(expected), "pixel ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn bands_are_separated_not_terminated() {
        // 5 modules * 3 px = 15 rows -> 3 bands
        let payload = encode(&checker(), 1, 3).unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert_eq!(text.matches('-').count(), 2);
        assert!(!text.contains("-\x1b\\"));
    }

    #[test]
    fn long_runs_are_compressed() {
        let mut buf = Vec::new();
        push_compressed(&mut buf, &[0; 10]);
        assert_eq!(buf, b"!10?");

        let mut buf = Vec::new();
        push_compressed(&mut buf, &[63, 63, 63, 0, 1, 1, 1, 1]);
        assert_eq!(buf, b"~~~?!4@");
    }

    #[test]
    fn zero_scale_is_rejected() {
        match encode(&checker(), 2, 0) {
            Err(Error::InvalidConfig(_)) => {}
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn oversized_raster_is_rejected() {
        match encode(&checker(), 2, usize::MAX / 2) {
            Err(Error::InvalidConfig(_)) => {}
            other => panic!("expected invalid config, got {:?}", other),
        }
        assert!(matches!(
            encode(&checker(), usize::MAX, 1),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(raster_size(21, 2, 4).unwrap(), 100);
    }

    #[test]
    fn encoding_is_deterministic() {
        let matrix = Matrix::encode(b"https://example.com", crate::Level::Medium).unwrap();
        assert_eq!(encode(&matrix, 2, 4).unwrap(), encode(&matrix, 2, 4).unwrap());
    }
}
