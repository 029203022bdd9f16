//! Error handling for the codec library
//!
//! This module defines the error types that can occur during analysis,
//! bitstream packing and parsing, and synthesis.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum CodecError {
    /// Source audio could not be used for analysis
    #[error("Invalid audio: {details}")]
    InvalidAudio {
        /// Description of what made the audio unusable
        details: String,
    },

    /// Operation requires a non-empty audio buffer
    #[error("Operation called on an empty audio buffer")]
    Empty,

    /// Segment or table index outside the valid range
    #[error("Index {index} out of range (length {length})")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Length of the indexed collection
        length: usize,
    },

    /// Bitstream contains non-hex characters or ends mid-frame
    #[error("Malformed bitstream: {details}")]
    BitstreamMalformed {
        /// Description of the grammar violation
        details: String,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {reason}")]
    Io {
        /// Underlying failure description
        reason: String,
    },
}

impl CodecError {
    /// Create a new invalid audio error
    pub fn invalid_audio(details: impl Into<String>) -> Self {
        Self::InvalidAudio {
            details: details.into(),
        }
    }

    /// Create a new index out of range error
    pub fn index_out_of_range(index: usize, length: usize) -> Self {
        Self::IndexOutOfRange { index, length }
    }

    /// Create a new malformed bitstream error
    pub fn bitstream_malformed(details: impl Into<String>) -> Self {
        Self::BitstreamMalformed {
            details: details.into(),
        }
    }

    /// Create a new I/O error
    pub fn io(reason: impl Into<String>) -> Self {
        Self::Io {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<hound::Error> for CodecError {
    fn from(err: hound::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}
