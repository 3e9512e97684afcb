//! Fixed-point weight values and the sentinel vocabulary shared by all vendors

use std::fmt;

/// Non-numeric scale states reported in place of a weight
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Scale has not settled yet (`IIIII`)
    Unstable,

    /// Load below zero (`NNNNN`)
    NegativeWeight,

    /// Load above capacity (`SSSSS`)
    Overload,

    /// Transport or decode failure while reading
    ReadFailed,
}

impl Sentinel {
    /// Numeric code carried in place of the weight, in kilograms
    pub const fn code(self) -> i64 {
        match self {
            Self::Unstable => -1,
            Self::NegativeWeight => -2,
            Self::ReadFailed => -9,
            Self::Overload => -10,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Unstable => "unstable",
            Self::NegativeWeight => "negative weight",
            Self::Overload => "overload",
            Self::ReadFailed => "read failed",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

/// Weight in kilograms with three decimal places
///
/// Stored as whole grams so decoded values compare exactly. Negative values are
/// sentinel codes (see [`Sentinel`]), not measurements.
///
/// # Examples
///
/// ```
/// use scalewire_core::{Sentinel, Weight};
///
/// let weight = Weight::from_grams(1234);
/// assert_eq!(weight.to_string(), "1.234");
/// assert_eq!(Weight::UNSTABLE.sentinel(), Some(Sentinel::Unstable));
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight {
    grams: i64,
}

impl Weight {
    const GRAMS_PER_KG: i64 = 1000;

    /// Nothing on the pan, or no frame received
    pub const ZERO: Self = Self { grams: 0 };

    /// Sentinel: scale not stable
    pub const UNSTABLE: Self = Self::sentinel_value(Sentinel::Unstable);

    /// Sentinel: negative weight
    pub const NEGATIVE: Self = Self::sentinel_value(Sentinel::NegativeWeight);

    /// Sentinel: overload
    pub const OVERLOAD: Self = Self::sentinel_value(Sentinel::Overload);

    /// Sentinel: the read or decode failed
    pub const READ_FAILED: Self = Self::sentinel_value(Sentinel::ReadFailed);

    const fn sentinel_value(sentinel: Sentinel) -> Self {
        Self {
            grams: sentinel.code() * Self::GRAMS_PER_KG,
        }
    }

    /// Create a weight from whole grams
    pub const fn from_grams(grams: i64) -> Self {
        Self { grams }
    }

    /// Weight in whole grams
    pub fn grams(self) -> i64 {
        self.grams
    }

    /// Weight in kilograms
    pub fn kilograms(self) -> f64 {
        self.grams as f64 / Self::GRAMS_PER_KG as f64
    }

    /// Sentinel encoded by this value, if any
    pub fn sentinel(self) -> Option<Sentinel> {
        [
            Sentinel::Unstable,
            Sentinel::NegativeWeight,
            Sentinel::Overload,
            Sentinel::ReadFailed,
        ]
        .into_iter()
        .find(|s| Self::sentinel_value(*s) == self)
    }

    /// Check if this is the "unstable" sentinel
    pub fn is_unstable(self) -> bool {
        self == Self::UNSTABLE
    }

    /// Check if this is a live measurement (zero or positive)
    pub fn is_measurement(self) -> bool {
        self.grams >= 0
    }
}

impl From<Sentinel> for Weight {
    fn from(sentinel: Sentinel) -> Self {
        Self::sentinel_value(sentinel)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.grams < 0 { "-" } else { "" };
        let abs = self.grams.unsigned_abs();
        write!(
            f,
            "{}{}.{:03}",
            sign,
            abs / Self::GRAMS_PER_KG as u64,
            abs % Self::GRAMS_PER_KG as u64
        )
    }
}
