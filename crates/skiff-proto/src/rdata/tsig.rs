//! TSIG record data (RFC 8945).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::rcode::ResponseCode;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use data_encoding::{BASE64, HEXUPPER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest value of the 48-bit time field.
pub const MAX_TIME_SIGNED: u64 = (1 << 48) - 1;

/// TSIG record - Transaction signature.
///
/// # Wire Format
///
/// ```text
/// /                 ALGORITHM NAME                /
/// |          TIME SIGNED (48 bits)                |
/// |     FUDGE     |   MAC SIZE    |     MAC       /
/// |  ORIGINAL ID  |     ERROR     |  OTHER LEN    |
/// /                  OTHER DATA                   /
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TSIG {
    algorithm: Name,
    time_signed: u64,
    fudge: u16,
    mac: Vec<u8>,
    original_id: u16,
    error: u16,
    other: Vec<u8>,
}

impl TSIG {
    /// Creates a new TSIG record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        algorithm: Name,
        time_signed: u64,
        fudge: u16,
        mac: impl Into<Vec<u8>>,
        original_id: u16,
        error: u16,
        other: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        if time_signed > MAX_TIME_SIGNED {
            return Err(Error::invalid_argument("TSIG time does not fit in 48 bits"));
        }
        let tsig = Self {
            algorithm,
            time_signed,
            fudge,
            mac: mac.into(),
            original_id,
            error,
            other: other.into(),
        };
        if tsig.mac.len() > usize::from(u16::MAX) || tsig.other.len() > usize::from(u16::MAX) {
            return Err(Error::invalid_argument("TSIG field longer than 65535 bytes"));
        }
        Ok(tsig)
    }

    /// Returns the algorithm name.
    pub fn algorithm(&self) -> &Name {
        &self.algorithm
    }

    /// Returns the signing time in seconds since the epoch.
    #[inline]
    pub const fn time_signed(&self) -> u64 {
        self.time_signed
    }

    /// Returns the permitted clock skew in seconds.
    #[inline]
    pub const fn fudge(&self) -> u16 {
        self.fudge
    }

    /// Returns the MAC.
    pub fn mac(&self) -> &[u8] {
        &self.mac
    }

    /// Returns the message id the MAC was computed with.
    #[inline]
    pub const fn original_id(&self) -> u16 {
        self.original_id
    }

    /// Returns the extended error code.
    #[inline]
    pub const fn error(&self) -> u16 {
        self.error
    }

    /// Returns the other-data field.
    pub fn other(&self) -> &[u8] {
        &self.other
    }

    /// Writes the fields after the MAC that are covered by the signature:
    /// time signed, fudge, error, other length, other data.
    pub(crate) fn encode_timers_and_error(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_u48(self.time_signed)?;
        writer.write_u16(self.fudge)?;
        writer.write_u16(self.error)?;
        writer.write_u16(self.other.len() as u16)?;
        writer.write_bytes(&self.other)
    }
}

impl RDataCodec for TSIG {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let algorithm = Name::decode(reader)?;
        let time_signed = reader.read_u48()?;
        let fudge = reader.read_u16()?;
        let mac_len = usize::from(reader.read_u16()?);
        let mac = reader.read_bytes(mac_len)?.to_vec();
        let original_id = reader.read_u16()?;
        let error = reader.read_u16()?;
        let other_len = usize::from(reader.read_u16()?);
        let other = reader.read_bytes(other_len)?.to_vec();
        Ok(Self {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        })
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        self.algorithm.encode(writer, None, false)?;
        writer.write_u48(self.time_signed)?;
        writer.write_u16(self.fudge)?;
        writer.write_u16(self.mac.len() as u16)?;
        writer.write_bytes(&self.mac)?;
        writer.write_u16(self.original_id)?;
        writer.write_u16(self.error)?;
        writer.write_u16(self.other.len() as u16)?;
        writer.write_bytes(&self.other)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        let algorithm = tokens.get_name(origin)?;
        let word = tokens.get_word()?;
        let time_signed = word
            .parse::<u64>()
            .ok()
            .filter(|&t| t <= MAX_TIME_SIGNED)
            .ok_or_else(|| tokens.error(format!("invalid TSIG time \"{word}\"")))?;
        let fudge = tokens.get_u16()?;
        let mac_len = usize::from(tokens.get_u16()?);
        let mac = if mac_len == 0 {
            Vec::new()
        } else {
            let word = tokens.get_word()?;
            BASE64
                .decode(word.as_bytes())
                .map_err(|e| tokens.error(format!("invalid base64: {e}")))?
        };
        if mac.len() != mac_len {
            return Err(tokens.error("TSIG MAC length mismatch"));
        }
        let original_id = tokens.get_u16()?;
        let word = tokens.get_word()?;
        let error = match word.parse::<u16>() {
            Ok(code) => code,
            Err(_) => (0..=23u16)
                .find(|&code| {
                    ResponseCode::from_u16(code)
                        .is_some_and(|rcode| rcode.name().eq_ignore_ascii_case(word))
                })
                .ok_or_else(|| tokens.error(format!("unknown TSIG error \"{word}\"")))?,
        };
        let other_len = usize::from(tokens.get_u16()?);
        let other = if other_len == 0 {
            Vec::new()
        } else {
            tokens.get_remaining_hex()?
        };
        if other.len() != other_len {
            return Err(tokens.error("TSIG other-data length mismatch"));
        }
        Self::new(algorithm, time_signed, fudge, mac, original_id, error, other)
            .map_err(|e| tokens.error(e.to_string()))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(
            out,
            "{} {} {} {}",
            self.algorithm,
            self.time_signed,
            self.fudge,
            self.mac.len()
        )?;
        if !self.mac.is_empty() {
            write!(out, " {}", BASE64.encode(&self.mac))?;
        }
        write!(out, " {} ", self.original_id)?;
        match ResponseCode::from_u16(self.error) {
            Some(rcode) => write!(out, "{rcode}")?,
            None => write!(out, "{}", self.error)?,
        }
        write!(out, " {}", self.other.len())?;
        if !self.other.is_empty() {
            write!(out, " {}", HEXUPPER.encode(&self.other))?;
        }
        Ok(())
    }

    fn wire_len(&self) -> usize {
        self.algorithm.wire_len() + 16 + self.mac.len() + self.other.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TSIG {
        TSIG::new(
            "hmac-sha256.".parse().unwrap(),
            1_700_000_000,
            300,
            vec![0xAA; 32],
            0x1234,
            0,
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_tsig_wire_roundtrip() {
        let tsig = sample();
        let mut writer = WireWriter::new(128);
        tsig.encode(&mut writer, None, false).unwrap();
        assert_eq!(writer.len(), tsig.wire_len());

        let bytes = writer.freeze();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(TSIG::decode(&mut reader, bytes.len() as u16).unwrap(), tsig);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_tsig_text_roundtrip() {
        let tsig = sample();
        let mut text = String::new();
        tsig.format_text(&mut text, &Options::default()).unwrap();
        assert!(text.starts_with("hmac-sha256. 1700000000 300 32 "));
        assert!(text.ends_with(" 4660 NOERROR 0"));

        let mut tokens = Tokenizer::new(&text);
        assert_eq!(TSIG::parse_text(&mut tokens, None).unwrap(), tsig);
    }

    #[test]
    fn test_tsig_time_limit() {
        let result = TSIG::new(Name::root(), 1 << 48, 300, Vec::new(), 0, 0, Vec::new());
        assert!(result.is_err());
    }
}
