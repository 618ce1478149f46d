//! Error types for the chunking core.

use thiserror::Error;

/// Errors raised by the chunking core.
///
/// The core performs no I/O, so the only failure is a caller contract
/// violation. Empty input is not an error and yields no chunks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The character budget was zero or negative.
    #[error("invalid chunk budget: max_chars must be positive, got {max_chars}")]
    InvalidBudget { max_chars: i64 },
}

impl ChunkError {
    /// Shorthand for an [`ChunkError::InvalidBudget`] error.
    pub fn invalid_budget(max_chars: i64) -> Self {
        Self::InvalidBudget { max_chars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_budget_message() {
        let err = ChunkError::invalid_budget(-5);
        assert_eq!(
            err.to_string(),
            "invalid chunk budget: max_chars must be positive, got -5"
        );
    }
}
