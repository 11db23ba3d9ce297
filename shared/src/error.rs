use thiserror::Error;

/// A stored or submitted value that falls outside a closed enumeration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("unrecognized impact level `{0}` (expected HIGH, MEDIUM or LOW)")]
    UnknownImpact(String),
    #[error("unrecognized volatility category `{0}` (expected HIGH, MEDIUM or LOW)")]
    UnknownCategory(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatisticsError {
    #[error("cannot compute statistics over an empty set of values")]
    EmptyInput,
    #[error("value {value} at position {index} is not a finite non-negative number")]
    InvalidValue { index: usize, value: f64 },
    #[error("percentile {0} is outside [0, 1]")]
    InvalidPercentile(f64),
    #[error("invalid thresholds: low {low} and high {high} must be finite, non-negative and ordered")]
    InvalidThresholds { low: f64, high: f64 },
}
