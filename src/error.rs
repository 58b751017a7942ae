use crate::MAX_CAPACITY;

/// Errors returned by [SampleBuilder](crate::SampleBuilder).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleBuilderError {
    /// The buffer capacity was zero or too large for unambiguous sequence number comparisons.
    #[error("invalid capacity {0}, expected a value in 1..={max}", max = MAX_CAPACITY)]
    InvalidCapacity(u16),
    #[error("clock rate must be non-zero")]
    InvalidClockRate,
    #[error("unable to parse RTP header")]
    HeaderParsing,
}
