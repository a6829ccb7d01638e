//! Certificate and key fingerprint record types (SSHFP, TLSA).

use super::RDataCodec;
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use data_encoding::HEXUPPER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SSHFP record - SSH public key fingerprint (RFC 4255).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SSHFP {
    algorithm: u8,
    fingerprint_type: u8,
    fingerprint: Vec<u8>,
}

impl SSHFP {
    /// Creates a new SSHFP record.
    pub fn new(algorithm: u8, fingerprint_type: u8, fingerprint: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            fingerprint_type,
            fingerprint: fingerprint.into(),
        }
    }

    /// Returns the key algorithm (1 = RSA, 2 = DSA, 3 = ECDSA, 4 = Ed25519).
    #[inline]
    pub const fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// Returns the fingerprint type (1 = SHA-1, 2 = SHA-256).
    #[inline]
    pub const fn fingerprint_type(&self) -> u8 {
        self.fingerprint_type
    }

    /// Returns the fingerprint bytes.
    pub fn fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }
}

impl RDataCodec for SSHFP {
    fn decode(reader: &mut WireReader<'_>, _rdlength: u16) -> Result<Self> {
        let algorithm = reader.read_u8()?;
        let fingerprint_type = reader.read_u8()?;
        let fingerprint = reader.read_remaining().to_vec();
        Ok(Self::new(algorithm, fingerprint_type, fingerprint))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_u8(self.algorithm)?;
        writer.write_u8(self.fingerprint_type)?;
        writer.write_bytes(&self.fingerprint)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let algorithm = tokens.get_u8()?;
        let fingerprint_type = tokens.get_u8()?;
        let fingerprint = tokens.get_remaining_hex()?;
        Ok(Self::new(algorithm, fingerprint_type, fingerprint))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(
            out,
            "{} {} {}",
            self.algorithm,
            self.fingerprint_type,
            HEXUPPER.encode(&self.fingerprint)
        )
    }

    fn wire_len(&self) -> usize {
        2 + self.fingerprint.len()
    }
}

/// TLSA record - DANE TLS certificate association (RFC 6698).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TLSA {
    usage: u8,
    selector: u8,
    matching_type: u8,
    data: Vec<u8>,
}

impl TLSA {
    /// Creates a new TLSA record.
    pub fn new(usage: u8, selector: u8, matching_type: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            usage,
            selector,
            matching_type,
            data: data.into(),
        }
    }

    /// Returns the certificate usage.
    #[inline]
    pub const fn usage(&self) -> u8 {
        self.usage
    }

    /// Returns the selector (0 = full certificate, 1 = SubjectPublicKeyInfo).
    #[inline]
    pub const fn selector(&self) -> u8 {
        self.selector
    }

    /// Returns the matching type (0 = exact, 1 = SHA-256, 2 = SHA-512).
    #[inline]
    pub const fn matching_type(&self) -> u8 {
        self.matching_type
    }

    /// Returns the certificate association data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl RDataCodec for TLSA {
    fn decode(reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        if rdlength < 3 {
            return Err(Error::invalid_rdata("TLSA", "too short"));
        }
        let usage = reader.read_u8()?;
        let selector = reader.read_u8()?;
        let matching_type = reader.read_u8()?;
        let data = reader.read_remaining().to_vec();
        Ok(Self::new(usage, selector, matching_type, data))
    }

    fn encode(&self, writer: &mut WireWriter, _: Option<&mut CompressionTable>, _: bool) -> Result<()> {
        writer.write_u8(self.usage)?;
        writer.write_u8(self.selector)?;
        writer.write_u8(self.matching_type)?;
        writer.write_bytes(&self.data)
    }

    fn parse_text(tokens: &mut Tokenizer<'_>, _origin: Option<&Name>) -> Result<Self> {
        let usage = tokens.get_u8()?;
        let selector = tokens.get_u8()?;
        let matching_type = tokens.get_u8()?;
        let data = tokens.get_remaining_hex()?;
        Ok(Self::new(usage, selector, matching_type, data))
    }

    fn format_text<W: fmt::Write>(&self, out: &mut W, _: &Options) -> fmt::Result {
        write!(
            out,
            "{} {} {} {}",
            self.usage,
            self.selector,
            self.matching_type,
            HEXUPPER.encode(&self.data)
        )
    }

    fn wire_len(&self) -> usize {
        3 + self.data.len()
    }
}
