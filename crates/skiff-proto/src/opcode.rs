//! Header operation codes.

use crate::error::{Error, Result};
use crate::registry::iana_registry;
use std::str::FromStr;

iana_registry! {
    /// The four-bit OPCODE header field (RFC 1035 section 4.1.1).
    pub enum OpCode: u8 {
        Query = 0, "QUERY", "Standard query.";
        IQuery = 1, "IQUERY", "Inverse query (obsolete).";
        Status = 2, "STATUS", "Server status request.";
        Notify = 4, "NOTIFY", "Zone change notification.";
        Update = 5, "UPDATE", "Dynamic update.";
        Dso = 6, "DSO", "Stateful operations.";
    }
}

impl OpCode {
    /// Returns the header field value.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns the opcode for a header value; unassigned values give `None`.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl Default for OpCode {
    fn default() -> Self {
        Self::Query
    }
}

impl FromStr for OpCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::invalid_argument(format!("unknown opcode {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_values() {
        assert_eq!(OpCode::from_u8(4), Some(OpCode::Notify));
        assert_eq!(OpCode::from_u8(3), None);
        assert_eq!(OpCode::from_u8(15), None);
        assert_eq!(OpCode::Dso.to_u8(), 6);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(OpCode::Update.to_string(), "UPDATE");
        assert_eq!("notify".parse::<OpCode>().unwrap(), OpCode::Notify);
        assert!("BOGUS".parse::<OpCode>().is_err());
    }
}
