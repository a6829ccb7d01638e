//! Resource record classes.

use crate::error::{Error, Result};
use crate::registry::{iana_registry, parse_generic};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

iana_registry! {
    /// A registered DNS class (RFC 1035 section 3.2.4, RFC 6895).
    pub enum RecordClass: u16 {
        IN = 1, "IN", "Internet.";
        CS = 2, "CS", "CSNET (obsolete).";
        CH = 3, "CH", "Chaos; also used for server identification queries.";
        HS = 4, "HS", "Hesiod.";
        NONE = 254, "NONE", "Update prerequisite class.";
        ANY = 255, "ANY", "Any class; questions only.";
    }
}

impl RecordClass {
    /// Returns the wire value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the registered class for a wire value, if any.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl Default for RecordClass {
    fn default() -> Self {
        Self::IN
    }
}

/// A class as found on the wire.
///
/// OPT records reuse this field for the UDP payload size, so arbitrary
/// values must survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    /// A value present in [`RecordClass`].
    Known(RecordClass),
    /// Any other value, printed as `CLASSnnn`.
    Unknown(u16),
}

impl Class {
    /// Classifies a wire value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordClass::from_u16(value).map_or(Self::Unknown(value), Self::Known)
    }

    /// Returns the wire value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(class) => class.to_u16(),
            Self::Unknown(value) => value,
        }
    }

    /// Returns the registered class, if this is one.
    #[inline]
    pub const fn as_known(self) -> Option<RecordClass> {
        match self {
            Self::Known(class) => Some(class),
            Self::Unknown(_) => None,
        }
    }
}

impl FromStr for Class {
    type Err = Error;

    /// Accepts a mnemonic (`in`) or the generic form (`CLASS1`).
    fn from_str(s: &str) -> Result<Self> {
        RecordClass::from_name(s)
            .map(Self::Known)
            .or_else(|| parse_generic(s, "CLASS").map(Self::from_u16))
            .ok_or_else(|| Error::invalid_argument(format!("unknown class {s}")))
    }
}

impl From<RecordClass> for Class {
    fn from(class: RecordClass) -> Self {
        Self::Known(class)
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(class) => fmt::Display::fmt(class, f),
            Self::Unknown(value) => write!(f, "CLASS{value}"),
        }
    }
}

impl Default for Class {
    fn default() -> Self {
        Self::Known(RecordClass::IN)
    }
}
