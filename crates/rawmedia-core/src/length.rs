//! Received-length audit against the `fileLength` announced out of band.

use crate::error::MediaError;

/// How a length mismatch is treated by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    /// Mismatch aborts the run.
    #[default]
    Strict,
    /// Mismatch is only reported as a delta.
    Report,
}

/// Returns `LengthMismatch` when `actual != expected`.
pub fn validate_length(actual: u64, expected: u64) -> Result<(), MediaError> {
    if actual != expected {
        return Err(MediaError::LengthMismatch { expected, actual });
    }
    Ok(())
}

/// Signed `actual - expected`.
pub fn length_delta(actual: u64, expected: u64) -> i128 {
    actual as i128 - expected as i128
}
