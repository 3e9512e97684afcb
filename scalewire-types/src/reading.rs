//! Weight readings delivered to subscribers

use std::fmt;

use chrono::{DateTime, Utc};

use scalewire_core::Weight;

/// Where a failed read went wrong
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReadErrorKind {
    /// Link failed while requesting or reading
    Transport,

    /// Response could not be decoded
    Format,
}

/// Failure carried by a [`Reading`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub message: String,
}

impl ReadError {
    pub fn new(kind: ReadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for ReadError {}

/// One completed read attempt, manual or polled
///
/// Holds the raw response text and exactly one of a decoded weight or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    raw: String,
    outcome: Result<Weight, ReadError>,
    taken_at: DateTime<Utc>,
}

impl Reading {
    /// Successful read
    pub fn weight(raw: impl Into<String>, weight: Weight) -> Self {
        Self {
            raw: raw.into(),
            outcome: Ok(weight),
            taken_at: Utc::now(),
        }
    }

    /// Failed read
    pub fn error(raw: impl Into<String>, error: ReadError) -> Self {
        Self {
            raw: raw.into(),
            outcome: Err(error),
            taken_at: Utc::now(),
        }
    }

    /// Raw response text as received
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Decoded weight, `None` for failed reads
    pub fn decoded(&self) -> Option<Weight> {
        self.outcome.as_ref().ok().copied()
    }

    /// Failure, `None` for successful reads
    pub fn failure(&self) -> Option<&ReadError> {
        self.outcome.as_ref().err()
    }

    pub fn outcome(&self) -> &Result<Weight, ReadError> {
        &self.outcome
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(weight) => match weight.sentinel() {
                Some(sentinel) => write!(f, "Reading[{}, raw={:?}]", sentinel, self.raw),
                None => write!(f, "Reading[{} kg, raw={:?}]", weight, self.raw),
            },
            Err(error) => write!(f, "Reading[{}, raw={:?}]", error, self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_reading() {
        let reading = Reading::weight("\x0201500\x03", Weight::from_grams(1500));

        assert_eq!(reading.decoded(), Some(Weight::from_grams(1500)));
        assert!(reading.failure().is_none());
        assert!(!reading.is_error());
        assert_eq!(reading.to_string(), "Reading[1.500 kg, raw=\"\\u{2}01500\\u{3}\"]");
    }

    #[test]
    fn test_error_reading() {
        let reading = Reading::error("ab?12", ReadError::new(ReadErrorKind::Format, "bad field"));

        assert_eq!(reading.decoded(), None);
        assert_eq!(reading.failure().map(|e| e.kind), Some(ReadErrorKind::Format));
        assert_eq!(reading.raw(), "ab?12");
    }

    #[test]
    fn test_sentinel_display() {
        let reading = Reading::weight("IIIII", Weight::UNSTABLE);
        assert_eq!(reading.to_string(), "Reading[unstable(-1), raw=\"IIIII\"]");
    }
}
