use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("frame of {width}x{height} needs {expected} pixels, got {actual}")]
    FrameSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame dimensions {width}x{height} are too large")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("no frames found in {0:?}")]
    EmptySequence(PathBuf),
    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(f64),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
