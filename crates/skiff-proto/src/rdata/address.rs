//! Address record types (A, AAAA).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

#[inline]
fn check_len(rtype: &str, expected: usize, rdlength: u16) -> Result<()> {
    if usize::from(rdlength) != expected {
        return Err(Error::RDataLengthMismatch {
            rtype: rtype.to_string(),
            expected,
            actual: usize::from(rdlength),
        });
    }
    Ok(())
}

/// A record - IPv4 address (RFC 1035).
///
/// # Wire Format
///
/// The RDATA is exactly 4 bytes containing the IPv4 address in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct A {
    address: Ipv4Addr,
}

impl A {
    /// Creates a new A record.
    #[inline]
    pub const fn new(address: Ipv4Addr) -> Self {
        Self { address }
    }

    /// Returns the IPv4 address.
    #[inline]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }
}

impl RDataCodec for A {
    fn decode(reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        check_len("A", 4, rdlength)?;
        let mut octets = [0u8; 4];
        octets.copy_from_slice(reader.read_bytes(4)?);
        Ok(Self::new(Ipv4Addr::from(octets)))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_bytes(&self.address.octets())
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let word = tokens.get_word()?;
        word.parse()
            .map(Self::new)
            .map_err(|_| tokens.error(format!("invalid IPv4 address \"{word}\"")))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{}", self.address)
    }

    #[inline]
    fn wire_len(&self) -> usize {
        4
    }
}

impl From<Ipv4Addr> for A {
    fn from(address: Ipv4Addr) -> Self {
        Self::new(address)
    }
}

impl From<A> for Ipv4Addr {
    fn from(a: A) -> Self {
        a.address
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// AAAA record - IPv6 address (RFC 3596).
///
/// # Wire Format
///
/// The RDATA is exactly 16 bytes containing the IPv6 address in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AAAA {
    address: Ipv6Addr,
}

impl AAAA {
    /// Creates a new AAAA record.
    #[inline]
    pub const fn new(address: Ipv6Addr) -> Self {
        Self { address }
    }

    /// Returns the IPv6 address.
    #[inline]
    pub const fn address(&self) -> Ipv6Addr {
        self.address
    }
}

impl RDataCodec for AAAA {
    fn decode(reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        check_len("AAAA", 16, rdlength)?;
        let mut octets = [0u8; 16];
        octets.copy_from_slice(reader.read_bytes(16)?);
        Ok(Self::new(Ipv6Addr::from(octets)))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_bytes(&self.address.octets())
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let word = tokens.get_word()?;
        word.parse()
            .map(Self::new)
            .map_err(|_| tokens.error(format!("invalid IPv6 address \"{word}\"")))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{}", self.address)
    }

    #[inline]
    fn wire_len(&self) -> usize {
        16
    }
}

impl From<Ipv6Addr> for AAAA {
    fn from(address: Ipv6Addr) -> Self {
        Self::new(address)
    }
}

impl From<AAAA> for Ipv6Addr {
    fn from(aaaa: AAAA) -> Self {
        aaaa.address
    }
}

impl fmt::Display for AAAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
