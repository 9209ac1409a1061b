//! Error types for waveform decoding and the wave engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeisError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated input: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid BCD byte: {0:#04X}")]
    BadBcd(u8),

    #[error("unsupported sample width: {0} bytes")]
    UnsupportedWidth(u8),

    #[error("unrecognized file magic / endianness marker")]
    BadMagic,

    #[error("record length mismatch: leading {leading}, trailing {trailing}")]
    LengthMismatch { leading: u64, trailing: u64 },

    #[error("bad field at byte {offset}: {reason}")]
    BadField { offset: usize, reason: String },

    #[error("incompatible sampling rates: {left} Hz vs {right} Hz")]
    IncompatibleRates { left: f64, right: f64 },

    #[error("bad time range: [{t1}, {t2})")]
    BadRange { t1: f64, t2: f64 },
}

impl SeisError {
    /// True for malformed-input errors (as opposed to i/o failures or
    /// incompatible-operand errors).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::BadBcd(_)
                | Self::UnsupportedWidth(_)
                | Self::BadMagic
                | Self::LengthMismatch { .. }
                | Self::BadField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SeisError>;
