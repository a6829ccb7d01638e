//! DNSSEC record types (DS, DNSKEY, RRSIG, NSEC).
//!
//! Only the record layouts live here; signature validation is left to
//! callers.

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::rtype::Type;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use data_encoding::{BASE64, HEXUPPER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// DS record - Delegation Signer (RFC 4034).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DS {
    key_tag: u16,
    algorithm: u8,
    digest_type: u8,
    digest: Vec<u8>,
}

impl DS {
    /// Creates a new DS record.
    pub fn new(key_tag: u16, algorithm: u8, digest_type: u8, digest: impl Into<Vec<u8>>) -> Self {
        Self {
            key_tag,
            algorithm,
            digest_type,
            digest: digest.into(),
        }
    }

    /// Returns the key tag of the referenced DNSKEY.
    #[inline]
    pub const fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// Returns the algorithm number.
    #[inline]
    pub const fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// Returns the digest type (1 = SHA-1, 2 = SHA-256, 4 = SHA-384).
    #[inline]
    pub const fn digest_type(&self) -> u8 {
        self.digest_type
    }

    /// Returns the digest.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl RDataCodec for DS {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let key_tag = reader.read_u16()?;
        let algorithm = reader.read_u8()?;
        let digest_type = reader.read_u8()?;
        let digest = reader.read_remaining().to_vec();
        Ok(Self::new(key_tag, algorithm, digest_type, digest))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_u16(self.key_tag)?;
        writer.write_u8(self.algorithm)?;
        writer.write_u8(self.digest_type)?;
        writer.write_bytes(&self.digest)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let key_tag = tokens.get_u16()?;
        let algorithm = tokens.get_u8()?;
        let digest_type = tokens.get_u8()?;
        let digest = tokens.get_remaining_hex()?;
        Ok(Self::new(key_tag, algorithm, digest_type, digest))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(
            out,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            HEXUPPER.encode(&self.digest)
        )
    }

    fn wire_len(&self) -> usize {
        4 + self.digest.len()
    }
}

/// DNSKEY record - DNS Public Key (RFC 4034).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DNSKEY {
    flags: u16,
    /// Always 3.
    protocol: u8,
    algorithm: u8,
    public_key: Vec<u8>,
}

impl DNSKEY {
    /// Zone Key flag bit.
    pub const FLAG_ZONE_KEY: u16 = 0x0100;

    /// Secure Entry Point flag bit.
    pub const FLAG_SEP: u16 = 0x0001;

    /// Creates a new DNSKEY record.
    pub fn new(flags: u16, protocol: u8, algorithm: u8, public_key: impl Into<Vec<u8>>) -> Self {
        Self {
            flags,
            protocol,
            algorithm,
            public_key: public_key.into(),
        }
    }

    /// Returns the flags.
    #[inline]
    pub const fn flags(&self) -> u16 {
        self.flags
    }

    /// Returns the protocol field.
    #[inline]
    pub const fn protocol(&self) -> u8 {
        self.protocol
    }

    /// Returns the algorithm number.
    #[inline]
    pub const fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// Returns true if this is a zone key.
    #[inline]
    pub const fn is_zone_key(&self) -> bool {
        self.flags & Self::FLAG_ZONE_KEY != 0
    }

    /// Returns true if this is a key signing key.
    #[inline]
    pub const fn is_sep(&self) -> bool {
        self.flags & Self::FLAG_SEP != 0
    }

    /// Returns the public key data.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Calculates the key tag (RFC 4034 Appendix B).
    pub fn key_tag(&self) -> u16 {
        let mut ac: u32 = u32::from(self.flags) + (u32::from(self.protocol) << 8) + u32::from(self.algorithm);
        for (i, &byte) in self.public_key.iter().enumerate() {
            if i & 1 == 0 {
                ac += u32::from(byte) << 8;
            } else {
                ac += u32::from(byte);
            }
        }
        ac += ac >> 16;
        (ac & 0xFFFF) as u16
    }
}

impl RDataCodec for DNSKEY {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let flags = reader.read_u16()?;
        let protocol = reader.read_u8()?;
        let algorithm = reader.read_u8()?;
        let public_key = reader.read_remaining().to_vec();
        Ok(Self::new(flags, protocol, algorithm, public_key))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_u16(self.flags)?;
        writer.write_u8(self.protocol)?;
        writer.write_u8(self.algorithm)?;
        writer.write_bytes(&self.public_key)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let flags = tokens.get_u16()?;
        let protocol = tokens.get_u8()?;
        let algorithm = tokens.get_u8()?;
        let public_key = tokens.get_remaining_base64()?;
        Ok(Self::new(flags, protocol, algorithm, public_key))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        let key = BASE64.encode(&self.public_key);
        if !options.multiline {
            return write!(out, "{} {} {} {key}", self.flags, self.protocol, self.algorithm);
        }
        writeln!(out, "{} {} {} (", self.flags, self.protocol, self.algorithm)?;
        write_wrapped(out, &key)?;
        let role = if self.is_sep() { "KSK" } else { "ZSK" };
        write!(
            out,
            "\t\t\t\t) ; {role}; alg = {}; key id = {}",
            self.algorithm,
            self.key_tag()
        )
    }

    fn wire_len(&self) -> usize {
        4 + self.public_key.len()
    }
}

/// Writes base64 text in indented 44-character lines.
fn write_wrapped<W: fmt::Write>(out: &mut W, text: &str) -> fmt::Result {
    let mut rest = text;
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(44));
        writeln!(out, "\t\t\t\t{line}")?;
        rest = tail;
    }
    Ok(())
}

/// RRSIG record - DNSSEC Signature (RFC 4034).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RRSIG {
    type_covered: Type,
    algorithm: u8,
    /// Labels in the original owner name, not counting root or a wildcard.
    labels: u8,
    original_ttl: u32,
    /// Seconds since the epoch.
    expiration: u32,
    /// Seconds since the epoch.
    inception: u32,
    key_tag: u16,
    signer: Name,
    signature: Vec<u8>,
}

impl RRSIG {
    /// Creates a new RRSIG record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        type_covered: Type,
        algorithm: u8,
        labels: u8,
        original_ttl: u32,
        expiration: u32,
        inception: u32,
        key_tag: u16,
        signer: Name,
        signature: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer,
            signature: signature.into(),
        }
    }

    /// Returns the type covered by this signature.
    #[inline]
    pub const fn type_covered(&self) -> Type {
        self.type_covered
    }

    /// Returns the algorithm number.
    #[inline]
    pub const fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// Returns the number of labels.
    #[inline]
    pub const fn labels(&self) -> u8 {
        self.labels
    }

    /// Returns the original TTL.
    #[inline]
    pub const fn original_ttl(&self) -> u32 {
        self.original_ttl
    }

    /// Returns the expiration time.
    #[inline]
    pub const fn expiration(&self) -> u32 {
        self.expiration
    }

    /// Returns the inception time.
    #[inline]
    pub const fn inception(&self) -> u32 {
        self.inception
    }

    /// Returns the key tag.
    #[inline]
    pub const fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// Returns the signer's name.
    #[inline]
    pub fn signer(&self) -> &Name {
        &self.signer
    }

    /// Returns the signature data.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Returns true if `now` lies within the validity period.
    pub fn is_valid_at(&self, now: u32) -> bool {
        now >= self.inception && now <= self.expiration
    }
}

impl RDataCodec for RRSIG {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        Ok(Self {
            type_covered: Type::from_u16(reader.read_u16()?),
            algorithm: reader.read_u8()?,
            labels: reader.read_u8()?,
            original_ttl: reader.read_u32()?,
            expiration: reader.read_u32()?,
            inception: reader.read_u32()?,
            key_tag: reader.read_u16()?,
            signer: Name::decode(reader)?,
            signature: reader.read_remaining().to_vec(),
        })
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, canonical: bool) -> Result<()> {
        writer.write_u16(self.type_covered.to_u16())?;
        writer.write_u8(self.algorithm)?;
        writer.write_u8(self.labels)?;
        writer.write_u32(self.original_ttl)?;
        writer.write_u32(self.expiration)?;
        writer.write_u32(self.inception)?;
        writer.write_u16(self.key_tag)?;
        self.signer.encode(writer, None, canonical)?;
        writer.write_bytes(&self.signature)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        let word = tokens.get_word()?;
        let type_covered = word
            .parse()
            .map_err(|_| tokens.error(format!("unknown type \"{word}\"")))?;
        let algorithm = tokens.get_u8()?;
        let labels = tokens.get_u8()?;
        let original_ttl = tokens.get_ttl()?;
        let word = tokens.get_word()?;
        let expiration =
            parse_time(word).ok_or_else(|| tokens.error(format!("invalid time \"{word}\"")))?;
        let word = tokens.get_word()?;
        let inception =
            parse_time(word).ok_or_else(|| tokens.error(format!("invalid time \"{word}\"")))?;
        let key_tag = tokens.get_u16()?;
        let signer = tokens.get_name(origin)?;
        let signature = tokens.get_remaining_base64()?;

        Ok(Self {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer,
            signature,
        })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        write!(
            out,
            "{} {} {} {} ",
            self.type_covered, self.algorithm, self.labels, self.original_ttl
        )?;
        write_time(out, self.expiration)?;
        out.write_char(' ')?;
        write_time(out, self.inception)?;
        write!(out, " {} {}", self.key_tag, self.signer)?;

        let signature = BASE64.encode(&self.signature);
        if !options.multiline {
            return write!(out, " {signature}");
        }
        writeln!(out, " (")?;
        write_wrapped(out, &signature)?;
        write!(out, "\t\t\t\t)")
    }

    fn wire_len(&self) -> usize {
        18 + self.signer.wire_len() + self.signature.len()
    }
}

/// Parses an RRSIG time: `YYYYMMDDHHmmSS` or plain seconds since the epoch.
fn parse_time(text: &str) -> Option<u32> {
    if text.len() != 14 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }
    let field = |range: std::ops::Range<usize>| text[range].parse::<i64>().ok();
    let (year, month, day) = (field(0..4)?, field(4..6)?, field(6..8)?);
    let (hour, minute, second) = (field(8..10)?, field(10..12)?, field(12..14)?);
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 || minute > 59 || second > 60 {
        return None;
    }
    let seconds = days_from_civil(year, month, day) * 86400 + hour * 3600 + minute * 60 + second;
    u32::try_from(seconds).ok()
}

/// Writes an RRSIG time as `YYYYMMDDHHmmSS` (UTC).
fn write_time<W: fmt::Write>(out: &mut W, time: u32) -> fmt::Result {
    let time = i64::from(time);
    let (year, month, day) = civil_from_days(time.div_euclid(86400));
    let secs = time.rem_euclid(86400);
    write!(
        out,
        "{year:04}{month:02}{day:02}{:02}{:02}{:02}",
        secs / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let doy = (153 * (month + if month > 2 { -3 } else { 9 }) + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// The set of types present at an NSEC owner (RFC 4034 section 4.1.2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeBitmap {
    types: BTreeSet<u16>,
}

impl TypeBitmap {
    /// Creates a bitmap from a list of types.
    pub fn new(types: impl IntoIterator<Item = Type>) -> Self {
        Self {
            types: types.into_iter().map(Type::to_u16).collect(),
        }
    }

    /// Returns true if `rtype` is present.
    pub fn contains(&self, rtype: Type) -> bool {
        self.types.contains(&rtype.to_u16())
    }

    /// Iterates over the types in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Type> + '_ {
        self.types.iter().map(|&t| Type::from_u16(t))
    }

    /// Returns the number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are present.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Decodes window blocks until the reader is exhausted.
    ///
    /// Windows must ascend and each block holds 1 to 32 bytes.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut types = BTreeSet::new();
        let mut last_window: Option<u8> = None;

        while !reader.is_empty() {
            let offset = reader.position();
            let window = reader.read_u8()?;
            let len = usize::from(reader.read_u8()?);
            if last_window.is_some_and(|last| window <= last) {
                return Err(Error::invalid_data(offset, "type bitmap windows out of order"));
            }
            if !(1..=32).contains(&len) {
                return Err(Error::invalid_data(offset, format!("type bitmap block of {len} bytes")));
            }
            for (i, &byte) in reader.read_bytes(len)?.iter().enumerate() {
                for bit in 0..8 {
                    if byte & (0x80 >> bit) != 0 {
                        types.insert(u16::from(window) << 8 | (i * 8 + bit) as u16);
                    }
                }
            }
            last_window = Some(window);
        }

        Ok(Self { types })
    }

    /// Writes the window blocks.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        for (window, block) in self.blocks() {
            writer.write_u8(window)?;
            writer.write_u8(block.len() as u8)?;
            writer.write_bytes(&block)?;
        }
        Ok(())
    }

    /// Returns the encoded length.
    pub fn wire_len(&self) -> usize {
        self.blocks().iter().map(|(_, block)| 2 + block.len()).sum()
    }

    fn blocks(&self) -> Vec<(u8, Vec<u8>)> {
        let mut blocks: Vec<(u8, Vec<u8>)> = Vec::new();
        for &t in &self.types {
            let window = (t >> 8) as u8;
            let low = (t & 0xFF) as usize;
            if blocks.last().map_or(true, |(w, _)| *w != window) {
                blocks.push((window, Vec::new()));
            }
            if let Some((_, block)) = blocks.last_mut() {
                if block.len() <= low / 8 {
                    block.resize(low / 8 + 1, 0);
                }
                block[low / 8] |= 0x80 >> (low % 8);
            }
        }
        blocks
    }
}

/// NSEC record - Next Secure (RFC 4034).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NSEC {
    next_name: Name,
    types: TypeBitmap,
}

impl NSEC {
    /// Creates a new NSEC record.
    pub fn new(next_name: Name, types: TypeBitmap) -> Self {
        Self { next_name, types }
    }

    /// Returns the next domain name.
    pub fn next_name(&self) -> &Name {
        &self.next_name
    }

    /// Returns the type bitmap.
    pub fn types(&self) -> &TypeBitmap {
        &self.types
    }
}

impl RDataCodec for NSEC {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let next_name = Name::decode(reader)?;
        let types = TypeBitmap::decode(reader)?;
        Ok(Self { next_name, types })
    }

    // The next name keeps its case in canonical form (RFC 6840 section 5.1).
    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        self.next_name.encode(writer, None, false)?;
        self.types.encode(writer)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        let next_name = tokens.get_name(origin)?;
        let mut types = BTreeSet::new();
        for word in tokens.get_remaining_words()? {
            let rtype: Type = word
                .parse()
                .map_err(|_| tokens.error(format!("unknown type \"{word}\"")))?;
            types.insert(rtype.to_u16());
        }
        Ok(Self {
            next_name,
            types: TypeBitmap { types },
        })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{}", self.next_name)?;
        for rtype in self.types.iter() {
            write!(out, " {rtype}")?;
        }
        Ok(())
    }

    fn wire_len(&self) -> usize {
        self.next_name.wire_len() + self.types.wire_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtype::RecordType;

    #[test]
    fn test_dnskey_key_tag() {
        // Wire form 01 00 03 08 01 02 03.
        let dnskey = DNSKEY::new(256, 3, 8, vec![1, 2, 3]);
        assert_eq!(dnskey.key_tag(), 2058);
        assert!(dnskey.is_zone_key());
        assert!(!dnskey.is_sep());
    }

    #[test]
    fn test_dnskey_multiline_reparses() {
        let dnskey = DNSKEY::new(257, 3, 13, vec![7u8; 64]);
        let mut text = String::new();
        dnskey
            .format_text(&mut text, &Options::new().with_multiline(true))
            .unwrap();
        assert!(text.contains("KSK"));

        let mut tokens = Tokenizer::new(&text);
        assert_eq!(DNSKEY::parse_text(&mut tokens, None).unwrap(), dnskey);
    }

    #[test]
    fn test_ds_text() {
        let mut tokens = Tokenizer::new("60485 5 1 2BB183AF5F22588179A53B0A98631FAD1A292118");
        let ds = DS::parse_text(&mut tokens, None).unwrap();
        assert_eq!(ds.key_tag(), 60485);
        assert_eq!(ds.digest().len(), 20);
        let mut out = String::new();
        ds.format_text(&mut out, &Options::default()).unwrap();
        assert_eq!(out, "60485 5 1 2BB183AF5F22588179A53B0A98631FAD1A292118");
    }

    #[test]
    fn test_time_conversion() {
        assert_eq!(parse_time("19700101000000"), Some(0));
        assert_eq!(parse_time("20030322173103"), Some(1048354263));
        assert_eq!(parse_time("1048354263"), Some(1048354263));
        assert_eq!(parse_time("20031322173103"), None);

        let mut out = String::new();
        write_time(&mut out, 1048354263).unwrap();
        assert_eq!(out, "20030322173103");
    }

    #[test]
    fn test_rrsig_text_roundtrip() {
        let text = "A 5 3 86400 20030322173103 20030220173103 2642 example.com. oJB1W6WNGv+ldvQ3WDG0MQkg5IEhjRip8WTrPYGv07h108dUKGMeDPKijVCHX3DDKdfb+v6oB9wfuh3DTJXUAfI/M0zmO/zz8bW0Rznl8O3tGNazPwQKkRN20XPXV6nwwfoXmJQbsLNrLfkGJ5D6fwFm8nN+6pBzeDQfsS3Ap3o=";
        let mut tokens = Tokenizer::new(text);
        let rrsig = RRSIG::parse_text(&mut tokens, None).unwrap();
        assert!(rrsig.type_covered().is(RecordType::A));
        assert_eq!(rrsig.key_tag(), 2642);
        assert!(rrsig.is_valid_at(1_046_000_000));

        let mut out = String::new();
        rrsig.format_text(&mut out, &Options::default()).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_rrsig_canonical_signer() {
        let rrsig = RRSIG::new(
            Type::from(RecordType::A),
            13,
            2,
            300,
            2,
            1,
            7,
            "Example.COM.".parse().unwrap(),
            vec![1, 2, 3],
        );
        let mut writer = WireWriter::new(64);
        rrsig.encode(&mut writer, None, true).unwrap();
        assert_eq!(&writer.as_bytes()[18..31], b"\x07example\x03com\x00");
        assert_eq!(writer.len(), rrsig.wire_len());
    }

    #[test]
    fn test_type_bitmap_rfc4034_example() {
        // host.example.com. NSEC: A MX RRSIG NSEC TYPE1234
        let mut tokens = Tokenizer::new("host.example.com. A MX RRSIG NSEC TYPE1234");
        let nsec = NSEC::parse_text(&mut tokens, None).unwrap();
        let mut writer = WireWriter::new(64);
        nsec.encode(&mut writer, None, false).unwrap();

        let bitmap = &writer.as_bytes()[nsec.next_name().wire_len()..];
        let mut expected = vec![0x00, 0x06, 0x40, 0x01, 0x00, 0x00, 0x00, 0x03, 0x04, 0x1b];
        expected.extend_from_slice(&[0; 26]);
        expected.push(0x20);
        assert_eq!(bitmap, &expected[..]);
        assert_eq!(nsec.wire_len(), writer.len());

        let bytes = writer.freeze();
        let mut reader = WireReader::new(&bytes);
        let decoded = NSEC::decode(&mut reader, bytes.len() as u16).unwrap();
        assert_eq!(decoded, nsec);
        assert!(decoded.types().contains(Type::from(RecordType::MX)));
        assert_eq!(decoded.types().len(), 5);
    }

    #[test]
    fn test_type_bitmap_rejects_bad_windows() {
        let data = [0x01, 0x01, 0x40, 0x00, 0x01, 0x40];
        let mut reader = WireReader::new(&data);
        assert!(TypeBitmap::decode(&mut reader).unwrap_err().is_wire_parse());

        let data = [0x00, 0x00];
        let mut reader = WireReader::new(&data);
        assert!(TypeBitmap::decode(&mut reader).is_err());
    }
}
