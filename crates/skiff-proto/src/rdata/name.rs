//! Name-based record types (NS, CNAME, PTR, DNAME, MX).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::Result;
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines a record type whose rdata is a single domain name.
macro_rules! single_name_rdata {
    ($(#[$meta:meta])* $ty:ident, $field:ident, $compress:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty {
            $field: Name,
        }

        impl $ty {
            /// Creates a new record.
            #[inline]
            pub fn new($field: Name) -> Self {
                Self { $field }
            }

            /// Returns the embedded name.
            #[inline]
            pub fn $field(&self) -> &Name {
                &self.$field
            }
        }

        impl RDataCodec for $ty {
            fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
                Ok(Self::new(Name::decode(reader)?))
            }

            fn encode(
                &self,
                writer: &mut WireWriter,
                compression: Option<&mut CompressionTable>,
                canonical: bool,
            ) -> Result<()> {
                let compression = if $compress { compression } else { None };
                self.$field.encode(writer, compression, canonical)
            }

            fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
                Ok(Self::new(tokens.get_name(origin)?))
            }

            fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
                write!(out, "{}", self.$field)
            }

            #[inline]
            fn wire_len(&self) -> usize {
                self.$field.wire_len()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.$field)
            }
        }
    };
}

single_name_rdata!(
    /// NS record - authoritative name server (RFC 1035).
    NS,
    nsdname,
    true
);

single_name_rdata!(
    /// CNAME record - canonical name for an alias (RFC 1035).
    CNAME,
    target,
    true
);

single_name_rdata!(
    /// PTR record - domain name pointer (RFC 1035).
    PTR,
    ptrdname,
    true
);

single_name_rdata!(
    /// DNAME record - redirection of a subtree (RFC 6672).
    ///
    /// The target is never compressed.
    DNAME,
    target,
    false
);

/// MX record - mail exchange (RFC 1035).
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                  PREFERENCE                   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                   EXCHANGE                    /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MX {
    preference: u16,
    exchange: Name,
}

impl MX {
    /// Creates a new MX record.
    pub fn new(preference: u16, exchange: Name) -> Self {
        Self {
            preference,
            exchange,
        }
    }

    /// Returns the preference (lower is preferred).
    #[inline]
    pub const fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the mail exchange host.
    #[inline]
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }
}

impl RDataCodec for MX {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let preference = reader.read_u16()?;
        let exchange = Name::decode(reader)?;
        Ok(Self::new(preference, exchange))
    }

    fn encode(
        &self,
        writer: &mut WireWriter,
        compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        writer.write_u16(self.preference)?;
        self.exchange.encode(writer, compression, canonical)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        let preference = tokens.get_u16()?;
        let exchange = tokens.get_name(origin)?;
        Ok(Self::new(preference, exchange))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{} {}", self.preference, self.exchange)
    }

    fn wire_len(&self) -> usize {
        2 + self.exchange.wire_len()
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}
