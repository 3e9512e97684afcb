//! Weight field extraction and decoding
//!
//! Both supported vendors answer a weight request with a short text frame whose
//! trailing characters carry the weight. Only the position of that field differs:
//!
//! ```text
//! Toledo    ... d d d d d x      6-char trailing window, last char dropped
//! Filizola  ... d d d d d        5-char trailing window
//! ```
//!
//! The field is either five digits (grams) or a sentinel made of one repeated letter.

use tracing::trace;

use crate::{
    constants::fields,
    error::{Error, Result},
    weight::{Sentinel, Weight},
};

/// Width of the weight field
pub const FIELD_WIDTH: usize = 5;

/// Position of the weight field relative to the end of a response
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldWindow {
    /// Number of trailing characters considered
    pub span: usize,

    /// Characters dropped from the end of the span
    pub skip_last: usize,
}

impl FieldWindow {
    /// Trailing 6 characters minus the terminator
    pub const TOLEDO: Self = Self {
        span: FIELD_WIDTH + 1,
        skip_last: 1,
    };

    /// Exactly the trailing 5 characters
    pub const FILIZOLA: Self = Self {
        span: FIELD_WIDTH,
        skip_last: 0,
    };

    /// Cut the weight field out of a response
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseTooShort`] if the response has fewer than `span` characters.
    pub fn extract(self, response: &str) -> Result<String> {
        let chars: Vec<char> = response.chars().collect();

        if chars.len() < self.span {
            return Err(Error::ResponseTooShort {
                expected: self.span,
                actual: chars.len(),
            });
        }

        let start = chars.len() - self.span;
        let end = chars.len() - self.skip_last;

        Ok(chars[start..end].iter().collect())
    }
}

/// Decode a raw scale response using the given field window
///
/// An empty response means the scale sent nothing in time and decodes to zero.
///
/// # Errors
///
/// - [`Error::ResponseTooShort`] if the response cannot hold the window
/// - [`Error::Format`] if the field is neither a sentinel nor an integer
///
/// # Examples
///
/// ```
/// use scalewire_core::codec::{decode, FieldWindow};
/// use scalewire_core::Weight;
///
/// assert_eq!(decode("\x0201500\x03", FieldWindow::TOLEDO).unwrap(), Weight::from_grams(1500));
/// assert_eq!(decode("IIIII", FieldWindow::FILIZOLA).unwrap(), Weight::UNSTABLE);
/// assert_eq!(decode("", FieldWindow::FILIZOLA).unwrap(), Weight::ZERO);
/// ```
pub fn decode(response: &str, window: FieldWindow) -> Result<Weight> {
    if response.is_empty() {
        return Ok(Weight::ZERO);
    }

    let field = window.extract(response)?;

    if let Some(sentinel) = classify(&field) {
        trace!(field = %field, sentinel = %sentinel, "Sentinel field");
        return Ok(sentinel.into());
    }

    let grams: i64 = field.trim().parse().map_err(|source| Error::Format {
        window: field.clone(),
        source,
    })?;

    Ok(Weight::from_grams(grams))
}

/// Map a sentinel field to its condition
fn classify(field: &str) -> Option<Sentinel> {
    let mut chars = field.chars();
    let first = chars.next()?;

    if !chars.all(|c| c == first) {
        return None;
    }

    match first {
        fields::UNSTABLE => Some(Sentinel::Unstable),
        fields::NEGATIVE => Some(Sentinel::NegativeWeight),
        fields::OVERLOAD => Some(Sentinel::Overload),
        _ => None,
    }
}
