//! Shared types: [`ByteOrder`] and [`LengthWidth`].

use std::fmt;

/// Byte order for multi-byte fields in a waveform stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big-endian"),
            Self::Little => write!(f, "little-endian"),
        }
    }
}

/// Width of the Fortran record-length fields in a SEISAN file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthWidth {
    Four,
    Eight,
}

impl LengthWidth {
    /// Field width in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

impl fmt::Display for LengthWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-byte record lengths", self.bytes())
    }
}
