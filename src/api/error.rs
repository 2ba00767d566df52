//! Misuse errors.
//!
//! Native failures (no buffer, no mapping, no import) are not errors: they
//! leave handles at `None`. Only programming mistakes reach this type.

use std::fmt;

use crate::native::Extent;

/// Errors returned when a hardware texture is used incorrectly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureError {
    /// The texture was already destroyed
    Destroyed,
    /// The requested size differs from the construction size
    SizeMismatch {
        expected: Extent,
        actual: Extent,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Destroyed => write!(f, "Hardware texture used after destroy"),
            TextureError::SizeMismatch { expected, actual } => {
                write!(f, "Size mismatch: texture is {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for TextureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TextureError::SizeMismatch {
            expected: Extent::new(256, 256),
            actual: Extent::new(128, 64),
        };
        assert_eq!(err.to_string(), "Size mismatch: texture is 256x256, got 128x64");
        assert_eq!(TextureError::Destroyed.to_string(), "Hardware texture used after destroy");
    }
}
