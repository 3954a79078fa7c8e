//! Error types for OxiGz operations.
//!
//! This module provides the single error type shared by every crate in the
//! workspace. Apart from [`OxigzError::Io`], every variant signals a logic
//! error in the caller (a driver feeding a full stored block, a mismatched
//! last-block flag, an impossible code-length request) and is not
//! recoverable at runtime.

use std::io;
use thiserror::Error;

/// The main error type for OxiGz operations.
#[derive(Debug, Error)]
pub enum OxigzError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dequeue or peek on an empty ring buffer.
    #[error("Cannot dequeue from an empty ring buffer")]
    EmptyDequeue,

    /// Indexed read past the current ring buffer size.
    #[error("Ring buffer index {index} out of range for size {len}")]
    IndexOutOfRange {
        /// The requested logical index.
        index: usize,
        /// Number of elements currently stored.
        len: usize,
    },

    /// A stored block was fed past its 16-bit length capacity.
    #[error("Stored block is full: capacity is {capacity} bytes")]
    BlockFull {
        /// Maximum number of bytes a stored block can hold.
        capacity: usize,
    },

    /// More symbols carry non-zero weight than a length-limited prefix code
    /// of the requested maximum length can distinguish.
    #[error("Cannot build a prefix code for {symbols} symbols with at most {max_length} bits")]
    InfeasibleCodeLength {
        /// Number of symbols with non-zero weight.
        symbols: usize,
        /// Requested maximum code length in bits.
        max_length: u8,
    },

    /// A block was measured with one last-block flag and committed with the
    /// other.
    #[error("Block buffered with is_last={buffered} but committed with is_last={requested}")]
    InconsistentLastFlag {
        /// Flag the block content was buffered with.
        buffered: bool,
        /// Flag passed to the commit call.
        requested: bool,
    },
}

/// Result type alias for OxiGz operations.
pub type Result<T> = std::result::Result<T, OxigzError>;

impl OxigzError {
    /// Create an index-out-of-range error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a block-full error.
    pub fn block_full(capacity: usize) -> Self {
        Self::BlockFull { capacity }
    }

    /// Create an infeasible-code-length error.
    pub fn infeasible_code_length(symbols: usize, max_length: u8) -> Self {
        Self::InfeasibleCodeLength {
            symbols,
            max_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxigzError::block_full(65535);
        assert!(err.to_string().contains("65535"));

        let err = OxigzError::infeasible_code_length(17, 1);
        assert!(err.to_string().contains("17 symbols"));

        let err = OxigzError::index_out_of_range(4, 3);
        assert!(err.to_string().contains("index 4"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: OxigzError = io_err.into();
        assert!(matches!(err, OxigzError::Io(_)));
    }
}
