//! Error types for scalewire-core

use std::num::ParseIntError;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Weight field is neither a sentinel nor an integer
    #[error("Malformed weight field [{window}]: {source}")]
    Format {
        window: String,
        #[source]
        source: ParseIntError,
    },

    /// Response is shorter than the vendor's trailing window
    #[error("Response too short: expected at least {expected} characters, got {actual}")]
    ResponseTooShort {
        expected: usize,
        actual: usize,
    },

    /// Vendor name outside the supported set
    #[error("Unsupported scale protocol: {0}")]
    UnsupportedProtocol(String),
}

impl Error {
    /// Check if the error came from decoding a scale response
    ///
    /// Decode failures are read failures (weight -9), not lifecycle errors.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::ResponseTooShort { .. })
    }
}
