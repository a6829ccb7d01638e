//! DNS resource records.
//!
//! A resource record (RR) is the fundamental unit of DNS data,
//! containing a name, type, class, TTL, and record-specific data.

use crate::class::{Class, RecordClass};
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::rdata::RData;
use crate::rtype::{RecordType, Type};
use crate::text::{parse_ttl, Tokenizer};
use crate::wire::{WireReader, WireWriter};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A DNS resource record.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                      NAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RDATA                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecord {
    name: Name,
    rtype: Type,
    rclass: Class,
    ttl: u32,
    rdata: RData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: Type, rclass: Class, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates an IN-class record whose type is taken from the rdata.
    ///
    /// Fails for raw rdata, which carries no type.
    pub fn from_rdata(name: Name, ttl: u32, rdata: RData) -> Result<Self> {
        let rtype = rdata
            .record_type()
            .ok_or_else(|| Error::invalid_argument("raw rdata needs an explicit type"))?;
        Ok(Self::new(
            name,
            Type::Known(rtype),
            Class::Known(RecordClass::IN),
            ttl,
            rdata,
        ))
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: std::net::Ipv4Addr) -> Self {
        Self::new(
            name,
            Type::Known(RecordType::A),
            Class::Known(RecordClass::IN),
            ttl,
            RData::A(crate::rdata::A::new(addr)),
        )
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: std::net::Ipv6Addr) -> Self {
        Self::new(
            name,
            Type::Known(RecordType::AAAA),
            Class::Known(RecordClass::IN),
            ttl,
            RData::AAAA(crate::rdata::AAAA::new(addr)),
        )
    }

    /// Creates a CNAME record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(
            name,
            Type::Known(RecordType::CNAME),
            Class::Known(RecordClass::IN),
            ttl,
            RData::CNAME(crate::rdata::CNAME::new(target)),
        )
    }

    /// Returns the record name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the record type if known.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        self.rtype.as_known()
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> Class {
        self.rclass
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the TTL as a Duration.
    #[inline]
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl))
    }

    /// Returns the record data.
    #[inline]
    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    /// Consumes the record, returning its data.
    pub fn into_rdata(self) -> RData {
        self.rdata
    }

    /// Returns a copy with a different owner name.
    #[must_use]
    pub fn with_name(&self, name: Name) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    /// Returns a copy with a different class.
    #[must_use]
    pub fn with_class(&self, rclass: Class) -> Self {
        Self {
            rclass,
            ..self.clone()
        }
    }

    /// Returns a copy with a different TTL.
    #[must_use]
    pub fn with_ttl(&self, ttl: u32) -> Self {
        Self {
            ttl,
            ..self.clone()
        }
    }

    /// Sets the TTL in place.
    #[inline]
    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl;
    }

    /// Returns the type that groups this record into an RRset: the covered
    /// type for RRSIG, the record type otherwise.
    pub fn rrset_type(&self) -> Type {
        match &self.rdata {
            RData::RRSIG(rrsig) => rrsig.type_covered(),
            _ => self.rtype,
        }
    }

    /// Returns true if both records belong to the same RRset.
    pub fn same_rrset(&self, other: &ResourceRecord) -> bool {
        self.rclass == other.rclass
            && self.rtype == other.rtype
            && self.rrset_type() == other.rrset_type()
            && self.name == other.name
    }

    /// Returns true if this is a CNAME record.
    #[inline]
    pub fn is_cname(&self) -> bool {
        self.rtype.is_cname()
    }

    /// Decodes a record at the reader's position.
    ///
    /// The rdata is read inside an active window of RDLENGTH bytes; rdata
    /// that leaves bytes unread is rejected.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let name = Name::decode(reader)?;
        let rtype = Type::from_u16(reader.read_u16()?);
        let rclass = Class::from_u16(reader.read_u16()?);
        let ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()?;

        reader.set_active(usize::from(rdlength))?;
        let start = reader.position();
        let rdata = RData::decode(rtype, reader, rdlength)?;
        let consumed = reader.position() - start;
        reader.restore_active();

        if consumed != usize::from(rdlength) {
            return Err(Error::RDataLengthMismatch {
                rtype: rtype.to_string(),
                expected: usize::from(rdlength),
                actual: consumed,
            });
        }

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        })
    }

    /// Writes the record, backpatching RDLENGTH once the rdata is written.
    pub fn encode(
        &self,
        writer: &mut WireWriter,
        mut compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        self.name
            .encode(writer, compression.as_deref_mut(), canonical)?;
        writer.write_u16(self.rtype.to_u16())?;
        writer.write_u16(self.rclass.to_u16())?;
        writer.write_u32(self.ttl)?;

        let length_at = writer.position();
        writer.write_u16(0)?;
        let start = writer.position();
        self.rdata.encode(writer, compression, canonical)?;
        let rdlength = writer.position() - start;
        let rdlength = u16::try_from(rdlength).map_err(|_| Error::MessageTooLarge {
            size: rdlength,
            max_size: usize::from(u16::MAX),
        })?;
        writer.write_u16_at(length_at, rdlength)
    }

    /// Returns the uncompressed wire length.
    pub fn wire_len(&self) -> usize {
        self.name.wire_len() + 10 + self.rdata.wire_len()
    }

    /// Returns the uncompressed wire form.
    pub fn to_wire(&self) -> Result<Bytes> {
        let mut writer = WireWriter::new(self.wire_len());
        self.encode(&mut writer, None, false)?;
        Ok(writer.freeze())
    }

    /// Returns the RFC 4034 section 6.2 canonical wire form.
    pub fn to_canonical_wire(&self) -> Result<Bytes> {
        let mut writer = WireWriter::new(self.wire_len());
        self.encode(&mut writer, None, true)?;
        Ok(writer.freeze())
    }

    /// Parses a record from presentation format:
    /// `owner [ttl] [class] type rdata`, with TTL and class in either order.
    ///
    /// Relative names are completed with `origin`; a missing TTL takes
    /// `default_ttl`.
    pub fn parse_text(text: &str, origin: Option<&Name>, default_ttl: u32) -> Result<Self> {
        let mut tokens = Tokenizer::new(text);
        let name = tokens.get_name(origin)?;

        let mut ttl = None;
        let mut rclass = None;
        let rtype = loop {
            let word = tokens.get_word()?;
            if ttl.is_none() {
                if let Some(value) = parse_ttl(word) {
                    ttl = Some(value);
                    continue;
                }
            }
            if rclass.is_none() {
                if let Ok(value) = word.parse::<Class>() {
                    rclass = Some(value);
                    continue;
                }
            }
            break word
                .parse::<Type>()
                .map_err(|_| tokens.error(format!("unknown type \"{word}\"")))?;
        };

        let rdata = RData::parse_text(rtype, &mut tokens, origin)?;
        tokens.expect_eol()?;

        Ok(Self {
            name,
            rtype,
            rclass: rclass.unwrap_or_default(),
            ttl: ttl.unwrap_or(default_ttl),
            rdata,
        })
    }

    /// Writes the record in presentation format.
    pub fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        write!(
            out,
            "{}\t{}\t{}\t{}\t",
            self.name, self.ttl, self.rclass, self.rtype
        )?;
        self.rdata.format_text(out, options)
    }

    /// Returns the record in presentation format.
    pub fn to_text(&self, options: &Options) -> String {
        let mut out = String::new();
        let _ = self.format_text(&mut out, options);
        out
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_text(f, &Options::default())
    }
}

/// An RRset - records sharing owner name, class and RRset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRset {
    records: Vec<ResourceRecord>,
}

impl RRset {
    /// Creates an RRset from records.
    ///
    /// Fails if the list is empty or the records do not share owner, class
    /// and type.
    pub fn from_records(records: Vec<ResourceRecord>) -> Result<Self> {
        let Some(first) = records.first() else {
            return Err(Error::invalid_argument("an RRset needs at least one record"));
        };
        if let Some(stray) = records.iter().find(|r| !first.same_rrset(r)) {
            return Err(Error::invalid_argument(format!(
                "record {} {} does not belong to the {} {} RRset",
                stray.name(),
                stray.rrset_type(),
                first.name(),
                first.rrset_type()
            )));
        }
        Ok(Self { records })
    }

    /// Splits records into RRsets, in order of first appearance.
    pub fn group(records: impl IntoIterator<Item = ResourceRecord>) -> Vec<RRset> {
        let mut sets: Vec<RRset> = Vec::new();
        for record in records {
            match sets.iter_mut().find(|set| set.records[0].same_rrset(&record)) {
                Some(set) => set.records.push(record),
                None => sets.push(RRset {
                    records: vec![record],
                }),
            }
        }
        sets
    }

    /// Returns the common owner name.
    pub fn name(&self) -> &Name {
        self.records[0].name()
    }

    /// Returns the common RRset type.
    pub fn rtype(&self) -> Type {
        self.records[0].rrset_type()
    }

    /// Returns the common class.
    pub fn rclass(&self) -> Class {
        self.records[0].rclass()
    }

    /// Returns the records in this set.
    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Iterates over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRecord> {
        self.records.iter()
    }

    /// Adds a record, rejecting one that belongs to a different RRset.
    pub fn add(&mut self, record: ResourceRecord) -> Result<()> {
        if !self.records[0].same_rrset(&record) {
            return Err(Error::invalid_argument(format!(
                "record {} {} does not belong to the {} {} RRset",
                record.name(),
                record.rrset_type(),
                self.name(),
                self.rtype()
            )));
        }
        self.records.push(record);
        Ok(())
    }

    /// Returns the minimum TTL across all records.
    pub fn min_ttl(&self) -> u32 {
        self.records.iter().map(ResourceRecord::ttl).min().unwrap_or(0)
    }

    /// Sets the TTL of every record.
    pub fn set_ttl(&mut self, ttl: u32) {
        for record in &mut self.records {
            record.set_ttl(ttl);
        }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; an RRset holds at least one record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RRset {
    type Item = &'a ResourceRecord;
    type IntoIter = std::slice::Iter<'a, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
