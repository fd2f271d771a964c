use qrcode::EcLevel;
use std::{fmt, str::FromStr};

use crate::error::Error;

/// QR error correction level.
///
/// Higher levels add redundancy, so the same content produces a different
/// (and possibly larger) symbol at each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn ec_level(&self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::High => EcLevel::H,
        }
    }

    /// Single letter used on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::High => "H",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Low
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l" => Ok(Self::Low),
            "m" => Ok(Self::Medium),
            "h" => Ok(Self::High),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
