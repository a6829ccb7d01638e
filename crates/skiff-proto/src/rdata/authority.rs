//! Authority record types (SOA).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::Result;
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOA record - Start of Authority (RFC 1035).
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     MNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    SERIAL                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    REFRESH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     RETRY                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    EXPIRE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    MINIMUM                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SOA {
    /// Primary name server for the zone.
    mname: Name,
    /// Mailbox of the responsible person.
    rname: Name,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    /// Negative caching TTL (RFC 2308).
    minimum: u32,
}

impl SOA {
    /// Creates a new SOA record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Returns the primary name server.
    #[inline]
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// Returns the responsible person's mailbox.
    #[inline]
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// Returns the zone serial number.
    #[inline]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the refresh interval in seconds.
    #[inline]
    pub const fn refresh(&self) -> u32 {
        self.refresh
    }

    /// Returns the retry interval in seconds.
    #[inline]
    pub const fn retry(&self) -> u32 {
        self.retry
    }

    /// Returns the expire time in seconds.
    #[inline]
    pub const fn expire(&self) -> u32 {
        self.expire
    }

    /// Returns the MINIMUM field.
    #[inline]
    pub const fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Returns the negative caching TTL per RFC 2308.
    #[inline]
    pub const fn negative_ttl(&self) -> u32 {
        self.minimum
    }

    /// Checks if serial1 is "greater than" serial2 using RFC 1982 serial arithmetic.
    pub fn serial_gt(serial1: u32, serial2: u32) -> bool {
        let diff = serial1.wrapping_sub(serial2);
        diff > 0 && diff < 0x8000_0000
    }
}

impl RDataCodec for SOA {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let mname = Name::decode(reader)?;
        let rname = Name::decode(reader)?;
        Ok(Self {
            mname,
            rname,
            serial: reader.read_u32()?,
            refresh: reader.read_u32()?,
            retry: reader.read_u32()?,
            expire: reader.read_u32()?,
            minimum: reader.read_u32()?,
        })
    }

    fn encode(
        &self,
        writer: &mut WireWriter,
        mut compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        self.mname
            .encode(writer, compression.as_deref_mut(), canonical)?;
        self.rname.encode(writer, compression, canonical)?;
        for value in [
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum,
        ] {
            writer.write_u32(value)?;
        }
        Ok(())
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        let mname = tokens.get_name(origin)?;
        let rname = tokens.get_name(origin)?;
        Ok(Self {
            mname,
            rname,
            serial: tokens.get_u32()?,
            refresh: tokens.get_ttl()?,
            retry: tokens.get_ttl()?,
            expire: tokens.get_ttl()?,
            minimum: tokens.get_ttl()?,
        })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        if !options.multiline {
            return write!(out, "{self}");
        }
        writeln!(out, "{} {} (", self.mname, self.rname)?;
        writeln!(out, "\t\t\t\t{}\t; serial", self.serial)?;
        writeln!(out, "\t\t\t\t{}\t; refresh", self.refresh)?;
        writeln!(out, "\t\t\t\t{}\t; retry", self.retry)?;
        writeln!(out, "\t\t\t\t{}\t; expire", self.expire)?;
        writeln!(out, "\t\t\t\t{}\t; minimum", self.minimum)?;
        write!(out, "\t\t\t\t)")
    }

    fn wire_len(&self) -> usize {
        self.mname.wire_len() + self.rname.wire_len() + 20
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}
