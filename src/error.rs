use std::io;

use thiserror::Error;

use crate::validate::ColorModel;

/// Errors raised while validating an image or assembling a cursor file.
///
/// Validation errors are reported before any output is written. The build
/// errors can leave a partially written sink behind.
#[derive(Debug, Error)]
pub enum CurError {
    #[error("Dimensions must be at least 1×1 px, got {width}×{height} px")]
    DimensionOutOfRange { width: u32, height: u32 },

    #[error("Dimensions are too big, max {max}×{max} px, got {width}×{height} px")]
    DimensionTooLarge { width: u32, height: u32, max: u32 },

    #[error("Color model is not RGBA (found {0})")]
    UnsupportedColorModel(ColorModel),

    #[error("Payload ended after {actual} of {expected} bytes")]
    PayloadRead {
        expected: u64,
        actual: u64,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Payload is longer than the {declared} bytes the headers declare")]
    PayloadLengthMismatch { declared: u64 },

    #[error("Failed to write cursor data")]
    Write(#[source] io::Error),
}
