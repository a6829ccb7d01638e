//! Text-based record types (TXT, SPF, HINFO, RP).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Writes a character-string in quotes, escaping `"` and `\` and anything
/// outside printable ASCII.
pub(crate) fn write_quoted<W: fmt::Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    out.write_char('"')?;
    for &byte in bytes {
        match byte {
            b'"' | b'\\' => write!(out, "\\{}", byte as char)?,
            0x20..=0x7E => out.write_char(byte as char)?,
            _ => write!(out, "\\{byte:03}")?,
        }
    }
    out.write_char('"')
}

/// TXT record - Text (RFC 1035).
///
/// A TXT record can contain multiple strings, each up to 255 bytes. Longer
/// strings are split into 255-byte chunks on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TXT {
    strings: SmallVec<[Vec<u8>; 2]>,
}

impl TXT {
    /// Creates a new TXT record with the given strings.
    pub fn new(strings: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the text strings.
    pub fn strings(&self) -> &[Vec<u8>] {
        &self.strings
    }

    /// Returns all strings concatenated.
    pub fn data(&self) -> Vec<u8> {
        self.strings.concat()
    }

    /// Returns the data as a UTF-8 string if valid.
    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.data()).ok()
    }
}

impl RDataCodec for TXT {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let mut strings = SmallVec::new();
        while !reader.is_empty() {
            strings.push(reader.read_counted_string()?.to_vec());
        }
        Ok(Self { strings })
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        for s in &self.strings {
            if s.is_empty() {
                writer.write_u8(0)?;
            }
            for chunk in s.chunks(255) {
                writer.write_counted_string(chunk)?;
            }
        }
        Ok(())
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let mut strings = SmallVec::new();
        while !tokens.at_eol()? {
            strings.push(tokens.get_character_string()?);
        }
        if strings.is_empty() {
            return Err(tokens.error("TXT record requires at least one string"));
        }
        Ok(Self { strings })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        for (i, s) in self.strings.iter().enumerate() {
            if i > 0 {
                out.write_char(' ')?;
            }
            write_quoted(out, s)?;
        }
        Ok(())
    }

    fn wire_len(&self) -> usize {
        self.strings
            .iter()
            .map(|s| s.len() + s.len().div_ceil(255).max(1))
            .sum()
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_text(f, &Options::default())
    }
}

/// SPF record (RFC 7208); same layout as TXT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SPF(TXT);

impl SPF {
    /// Creates a new SPF record.
    pub fn new(strings: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        Self(TXT::new(strings))
    }

    /// Returns the underlying text strings.
    pub fn txt(&self) -> &TXT {
        &self.0
    }
}

impl RDataCodec for SPF {
    fn decode(reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        TXT::decode(reader, rdlength).map(Self)
    }

    fn encode(
        &self,
        writer: &mut WireWriter,
        compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        self.0.encode(writer, compression, canonical)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        TXT::parse_text(tokens, origin).map(Self)
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        self.0.format_text(out, options)
    }

    fn wire_len(&self) -> usize {
        self.0.wire_len()
    }
}

/// HINFO record - Host information (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HINFO {
    cpu: Vec<u8>,
    os: Vec<u8>,
}

impl HINFO {
    /// Creates a new HINFO record.
    pub fn new(cpu: impl Into<Vec<u8>>, os: impl Into<Vec<u8>>) -> Result<Self> {
        let (cpu, os) = (cpu.into(), os.into());
        for field in [&cpu, &os] {
            if field.len() > 255 {
                return Err(Error::StringTooLong {
                    length: field.len(),
                });
            }
        }
        Ok(Self { cpu, os })
    }

    /// Returns the CPU type.
    pub fn cpu(&self) -> &[u8] {
        &self.cpu
    }

    /// Returns the operating system.
    pub fn os(&self) -> &[u8] {
        &self.os
    }
}

impl RDataCodec for HINFO {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let cpu = reader.read_counted_string()?.to_vec();
        let os = reader.read_counted_string()?.to_vec();
        Ok(Self { cpu, os })
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_counted_string(&self.cpu)?;
        writer.write_counted_string(&self.os)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let cpu = tokens.get_character_string()?;
        let os = tokens.get_character_string()?;
        Ok(Self { cpu, os })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write_quoted(out, &self.cpu)?;
        out.write_char(' ')?;
        write_quoted(out, &self.os)
    }

    fn wire_len(&self) -> usize {
        2 + self.cpu.len() + self.os.len()
    }
}

/// RP record - Responsible Person (RFC 1183).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RP {
    /// Mailbox of the responsible person.
    mbox: Name,
    /// Name of a TXT record with more information.
    txt: Name,
}

impl RP {
    /// Creates a new RP record.
    pub fn new(mbox: Name, txt: Name) -> Self {
        Self { mbox, txt }
    }

    /// Returns the mailbox name.
    pub fn mbox(&self) -> &Name {
        &self.mbox
    }

    /// Returns the TXT domain name.
    pub fn txt(&self) -> &Name {
        &self.txt
    }
}

impl RDataCodec for RP {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let mbox = Name::decode(reader)?;
        let txt = Name::decode(reader)?;
        Ok(Self { mbox, txt })
    }

    fn encode(
        &self,
        writer: &mut WireWriter,
        mut compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        self.mbox
            .encode(writer, compression.as_deref_mut(), canonical)?;
        self.txt.encode(writer, compression, canonical)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        let mbox = tokens.get_name(origin)?;
        let txt = tokens.get_name(origin)?;
        Ok(Self { mbox, txt })
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "{} {}", self.mbox, self.txt)
    }

    fn wire_len(&self) -> usize {
        self.mbox.wire_len() + self.txt.wire_len()
    }
}
