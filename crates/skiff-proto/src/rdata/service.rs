//! Service record types (SRV, NAPTR, CAA).

use super::text::write_quoted;
use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SRV record - Service locator (RFC 2782).
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   PRIORITY                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    WEIGHT                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     PORT                      |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                    TARGET                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SRV {
    priority: u16,
    weight: u16,
    port: u16,
    target: Name,
}

impl SRV {
    /// Creates a new SRV record.
    pub fn new(priority: u16, weight: u16, port: u16, target: Name) -> Self {
        Self {
            priority,
            weight,
            port,
            target,
        }
    }

    /// Returns the priority (lower is preferred).
    #[inline]
    pub const fn priority(&self) -> u16 {
        self.priority
    }

    /// Returns the weight for servers of equal priority.
    #[inline]
    pub const fn weight(&self) -> u16 {
        self.weight
    }

    /// Returns the port.
    #[inline]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the target host.
    #[inline]
    pub fn target(&self) -> &Name {
        &self.target
    }

    /// Returns true if the target is "." (service decidedly not available).
    #[inline]
    pub fn is_unavailable(&self) -> bool {
        self.target.is_root()
    }
}

impl RDataCodec for SRV {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        Ok(Self {
            priority: reader.read_u16()?,
            weight: reader.read_u16()?,
            port: reader.read_u16()?,
            target: Name::decode(reader)?,
        })
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, canonical: bool) -> Result<()> {
        writer.write_u16(self.priority)?;
        writer.write_u16(self.weight)?;
        writer.write_u16(self.port)?;
        self.target.encode(writer, None, canonical)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        Ok(Self {
            priority: tokens.get_u16()?,
            weight: tokens.get_u16()?,
            port: tokens.get_u16()?,
            target: tokens.get_name(origin)?,
        })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(
            out,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }

    fn wire_len(&self) -> usize {
        6 + self.target.wire_len()
    }
}

/// NAPTR record - Naming Authority Pointer (RFC 3403).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NAPTR {
    order: u16,
    preference: u16,
    flags: Vec<u8>,
    service: Vec<u8>,
    regexp: Vec<u8>,
    replacement: Name,
}

impl NAPTR {
    /// Creates a new NAPTR record.
    pub fn new(
        order: u16,
        preference: u16,
        flags: impl Into<Vec<u8>>,
        service: impl Into<Vec<u8>>,
        regexp: impl Into<Vec<u8>>,
        replacement: Name,
    ) -> Result<Self> {
        let naptr = Self {
            order,
            preference,
            flags: flags.into(),
            service: service.into(),
            regexp: regexp.into(),
            replacement,
        };
        for field in [&naptr.flags, &naptr.service, &naptr.regexp] {
            if field.len() > 255 {
                return Err(Error::StringTooLong {
                    length: field.len(),
                });
            }
        }
        Ok(naptr)
    }

    /// Returns the order.
    #[inline]
    pub const fn order(&self) -> u16 {
        self.order
    }

    /// Returns the preference.
    #[inline]
    pub const fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the flags string.
    pub fn flags(&self) -> &[u8] {
        &self.flags
    }

    /// Returns the service string.
    pub fn service(&self) -> &[u8] {
        &self.service
    }

    /// Returns the regular expression.
    pub fn regexp(&self) -> &[u8] {
        &self.regexp
    }

    /// Returns the replacement name.
    pub fn replacement(&self) -> &Name {
        &self.replacement
    }
}

impl RDataCodec for NAPTR {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        Ok(Self {
            order: reader.read_u16()?,
            preference: reader.read_u16()?,
            flags: reader.read_counted_string()?.to_vec(),
            service: reader.read_counted_string()?.to_vec(),
            regexp: reader.read_counted_string()?.to_vec(),
            replacement: Name::decode(reader)?,
        })
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, canonical: bool) -> Result<()> {
        writer.write_u16(self.order)?;
        writer.write_u16(self.preference)?;
        writer.write_counted_string(&self.flags)?;
        writer.write_counted_string(&self.service)?;
        writer.write_counted_string(&self.regexp)?;
        self.replacement.encode(writer, None, canonical)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        Ok(Self {
            order: tokens.get_u16()?,
            preference: tokens.get_u16()?,
            flags: tokens.get_character_string()?,
            service: tokens.get_character_string()?,
            regexp: tokens.get_character_string()?,
            replacement: tokens.get_name(origin)?,
        })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{} {} ", self.order, self.preference)?;
        write_quoted(out, &self.flags)?;
        out.write_char(' ')?;
        write_quoted(out, &self.service)?;
        out.write_char(' ')?;
        write_quoted(out, &self.regexp)?;
        write!(out, " {}", self.replacement)
    }

    fn wire_len(&self) -> usize {
        7 + self.flags.len() + self.service.len() + self.regexp.len() + self.replacement.wire_len()
    }
}

/// CAA record - Certification Authority Authorization (RFC 8659).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CAA {
    flags: u8,
    tag: CompactString,
    value: Vec<u8>,
}

impl CAA {
    /// Issuer critical flag.
    pub const CRITICAL: u8 = 0x80;

    /// Creates a new CAA record.
    pub fn new(flags: u8, tag: impl Into<CompactString>, value: impl Into<Vec<u8>>) -> Result<Self> {
        let tag = tag.into();
        if tag.is_empty() || tag.len() > 255 || !tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::invalid_rdata("CAA", format!("invalid tag \"{tag}\"")));
        }
        Ok(Self {
            flags,
            tag,
            value: value.into(),
        })
    }

    /// Returns the flags byte.
    #[inline]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Returns true if the critical flag is set.
    #[inline]
    pub const fn is_critical(&self) -> bool {
        self.flags & Self::CRITICAL != 0
    }

    /// Returns the property tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the property value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl RDataCodec for CAA {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let flags = reader.read_u8()?;
        let tag = reader.read_counted_string()?;
        let tag = std::str::from_utf8(tag)
            .map_err(|_| Error::invalid_rdata("CAA", "invalid tag encoding"))?;
        let value = reader.read_remaining().to_vec();
        Self::new(flags, tag, value)
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_u8(self.flags)?;
        writer.write_counted_string(self.tag.as_bytes())?;
        writer.write_bytes(&self.value)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let flags = tokens.get_u8()?;
        let tag = tokens.get_word()?;
        let raw = tokens.get_quoted_or_word()?;
        let value = tokens.unescape(raw)?;
        Self::new(flags, tag, value).map_err(|e| tokens.error(e.to_string()))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{} {} ", self.flags, self.tag)?;
        write_quoted(out, &self.value)
    }

    fn wire_len(&self) -> usize {
        2 + self.tag.len() + self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn test_srv_unavailable() {
        let srv = SRV::new(0, 0, 0, Name::root());
        assert!(srv.is_unavailable());
        assert!(!SRV::new(10, 20, 443, name("server.example.com")).is_unavailable());
    }

    #[test]
    fn test_srv_target_not_compressed() {
        let mut writer = WireWriter::new(64);
        let mut table = CompressionTable::new();
        name("example.com.")
            .encode(&mut writer, Some(&mut table), false)
            .unwrap();
        let srv = SRV::new(1, 2, 80, name("example.com."));
        let start = writer.len();
        srv.encode(&mut writer, Some(&mut table), false).unwrap();
        assert_eq!(writer.len() - start, srv.wire_len());
    }

    #[test]
    fn test_srv_canonical_lowercases() {
        let srv = SRV::new(1, 2, 80, name("SIP.Example.COM."));
        let mut writer = WireWriter::new(64);
        srv.encode(&mut writer, None, true).unwrap();
        assert_eq!(&writer.as_bytes()[6..], b"\x03sip\x07example\x03com\x00");
    }

    #[test]
    fn test_naptr_text_roundtrip() {
        let text = r#"100 10 "U" "E2U+sip" "!^.*$!sip:info@example.com!" ."#;
        let mut tokens = Tokenizer::new(text);
        let naptr = NAPTR::parse_text(&mut tokens, None).unwrap();
        assert_eq!(naptr.order(), 100);
        assert_eq!(naptr.service(), b"E2U+sip");
        assert!(naptr.replacement().is_root());

        let mut out = String::new();
        naptr.format_text(&mut out, &Options::default()).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_naptr_wire_roundtrip() {
        let naptr = NAPTR::new(1, 2, "S", "SIP+D2U", "", name("_sip._udp.example.com")).unwrap();
        let mut writer = WireWriter::new(64);
        naptr.encode(&mut writer, None, false).unwrap();
        assert_eq!(writer.len(), naptr.wire_len());
        let bytes = writer.freeze();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(NAPTR::decode(&mut reader, bytes.len() as u16).unwrap(), naptr);
    }

    #[test]
    fn test_caa_text() {
        let mut tokens = Tokenizer::new(r#"128 issue "letsencrypt.org""#);
        let caa = CAA::parse_text(&mut tokens, None).unwrap();
        assert!(caa.is_critical());
        assert_eq!(caa.tag(), "issue");
        assert_eq!(caa.value(), b"letsencrypt.org");

        let mut out = String::new();
        caa.format_text(&mut out, &Options::default()).unwrap();
        assert_eq!(out, r#"128 issue "letsencrypt.org""#);
    }

    #[test]
    fn test_caa_rejects_bad_tag() {
        assert!(CAA::new(0, "is-sue", "x").is_err());
        assert!(CAA::new(0, "", "x").is_err());
    }

    #[test]
    fn test_caa_decode() {
        let data = b"\x00\x05issueca.example";
        let mut reader = WireReader::new(data);
        let caa = CAA::decode(&mut reader, data.len() as u16).unwrap();
        assert_eq!(caa.tag(), "issue");
        assert_eq!(caa.value(), b"ca.example");
        assert!(reader.is_empty());
    }
}
