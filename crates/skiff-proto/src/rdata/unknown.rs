//! Opaque rdata for types without a dedicated codec (RFC 3597).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::Result;
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use data_encoding::HEXUPPER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw rdata bytes, rendered as `\# <length> <hex>`.
///
/// The record type lives on the enclosing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unknown {
    data: Vec<u8>,
}

impl Unknown {
    /// Creates opaque rdata.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the raw RDATA.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Parses the `<length> <hex>` tail of the generic form, after `\#`.
    pub(crate) fn parse_generic(tokens: &mut Tokenizer<'_>) -> Result<Self> {
        let length = usize::from(tokens.get_u16()?);
        let data = if length == 0 {
            Vec::new()
        } else {
            tokens.get_remaining_hex()?
        };
        if data.len() != length {
            return Err(tokens.error(format!(
                "generic rdata declares {length} bytes but has {}",
                data.len()
            )));
        }
        Ok(Self { data })
    }
}

impl RDataCodec for Unknown {
    fn decode(reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        Ok(Self::new(reader.read_bytes(usize::from(rdlength))?))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_bytes(&self.data)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let word = tokens.get_word()?;
        if word != "\\#" {
            return Err(tokens.error(format!(
                "expected generic rdata \"\\#\", found \"{word}\""
            )));
        }
        Self::parse_generic(tokens)
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(out, "\\# {}", self.data.len())?;
        if !self.data.is_empty() {
            write!(out, " {}", HEXUPPER.encode(&self.data))?;
        }
        Ok(())
    }

    #[inline]
    fn wire_len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_text(f, &Options::default())
    }
}
