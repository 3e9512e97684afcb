//! Supported scale protocols

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, FieldWindow},
    constants::REQUEST_WEIGHT,
    error::{Error, Result},
    weight::Weight,
};

/// Vendor wire protocol
///
/// Both vendors share the single-byte weight request and the sentinel vocabulary;
/// they differ in where the weight field sits in the reply and in how a read is
/// driven (see [`Protocol::waits_for_stable`]).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[repr(u8)]
pub enum Protocol {
    #[default]
    Toledo = 0,
    Filizola = 1,
}

impl Protocol {
    /// All supported protocols
    pub const ALL: [Protocol; 2] = [Self::Toledo, Self::Filizola];

    /// Bytes that ask the scale for its current weight
    pub fn request(self) -> &'static [u8] {
        match self {
            Self::Toledo | Self::Filizola => &[REQUEST_WEIGHT],
        }
    }

    /// Decode a raw response into a weight or sentinel
    pub fn decode(self, response: &str) -> Result<Weight> {
        codec::decode(response, self.window())
    }

    /// Position of the weight field in a reply
    pub fn window(self) -> FieldWindow {
        match self {
            Self::Toledo => FieldWindow::TOLEDO,
            Self::Filizola => FieldWindow::FILIZOLA,
        }
    }

    /// Check if a manual read keeps re-requesting until the scale settles
    ///
    /// Filizola scales may report `IIIII` for a while before settling.
    pub fn waits_for_stable(self) -> bool {
        matches!(self, Self::Filizola)
    }

    /// Get protocol name
    pub fn name(self) -> &'static str {
        match self {
            Self::Toledo => "toledo",
            Self::Filizola => "filizola",
        }
    }
}

impl From<Protocol> for u8 {
    fn from(protocol: Protocol) -> u8 {
        protocol as u8
    }
}

impl TryFrom<u8> for Protocol {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Toledo),
            1 => Ok(Self::Filizola),
            _ => Err(Error::UnsupportedProtocol(value.to_string())),
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedProtocol(s.to_string()))
    }
}

impl TryFrom<String> for Protocol {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
