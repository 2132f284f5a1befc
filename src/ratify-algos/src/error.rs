use thiserror::Error;

/// Reasons an estimator could not produce a measurement. Callers of the
/// total `estimate` entry points never see these; they resolve to a
/// fallback value.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EstimateError {
    #[error("insufficient data: {available} samples, need at least {required}")]
    InsufficientData { available: usize, required: usize },
    #[error("signal contains non-finite samples")]
    NonFinite,
    #[error("empty lag window {min}..={max}")]
    EmptyLagWindow { min: usize, max: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}
