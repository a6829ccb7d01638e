//! Transaction signatures (RFC 8945).
//!
//! The MAC computation is delegated to a [`TsigSigner`], so callers can plug
//! in any keyed hash. [`HmacSigner`] covers the HMAC-SHA2 algorithms.
//! Signing and verification of whole messages live on
//! [`Message`](crate::Message).

use crate::class::RecordClass;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::rdata::TSIG;
use crate::wire::WireWriter;
use data_encoding::BASE64;
use ring::hmac;
use std::fmt;
use std::sync::Arc;

/// Default permitted clock skew in seconds.
pub const DEFAULT_FUDGE: u16 = 300;

/// Computes and checks MACs for one algorithm and secret.
pub trait TsigSigner: Send + Sync + fmt::Debug {
    /// Returns the algorithm name carried in the TSIG record.
    fn algorithm(&self) -> Name;

    /// Computes the MAC over `data`.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Returns true if `mac` is the MAC of `data`.
    fn verify(&self, data: &[u8], mac: &[u8]) -> bool;
}

/// HMAC algorithms available to [`HmacSigner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    /// hmac-sha256
    Sha256,
    /// hmac-sha384
    Sha384,
    /// hmac-sha512
    Sha512,
}

impl HmacAlgorithm {
    /// Returns the algorithm name as written in TSIG records.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "hmac-sha256.",
            Self::Sha384 => "hmac-sha384.",
            Self::Sha512 => "hmac-sha512.",
        }
    }

    /// Looks up an algorithm by its TSIG name, ignoring case.
    pub fn from_name(name: &Name) -> Option<Self> {
        [Self::Sha256, Self::Sha384, Self::Sha512]
            .into_iter()
            .find(|alg| name.to_string().eq_ignore_ascii_case(alg.name()))
    }

    fn ring_algorithm(self) -> hmac::Algorithm {
        match self {
            Self::Sha256 => hmac::HMAC_SHA256,
            Self::Sha384 => hmac::HMAC_SHA384,
            Self::Sha512 => hmac::HMAC_SHA512,
        }
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HMAC-SHA2 signer backed by `ring`.
pub struct HmacSigner {
    algorithm: HmacAlgorithm,
    key: hmac::Key,
}

impl HmacSigner {
    /// Creates a signer from a raw secret.
    pub fn new(algorithm: HmacAlgorithm, secret: &[u8]) -> Self {
        Self {
            algorithm,
            key: hmac::Key::new(algorithm.ring_algorithm(), secret),
        }
    }

    /// Creates a signer from a base64 secret, the form used in key files.
    pub fn from_base64(algorithm: HmacAlgorithm, secret: &str) -> Result<Self> {
        let secret = BASE64
            .decode(secret.as_bytes())
            .map_err(|e| Error::invalid_argument(format!("invalid TSIG secret: {e}")))?;
        Ok(Self::new(algorithm, &secret))
    }

    /// Returns the HMAC algorithm.
    pub const fn hmac_algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TsigSigner for HmacSigner {
    fn algorithm(&self) -> Name {
        // The names are static and valid.
        self.algorithm.name().parse().unwrap_or_else(|_| Name::root())
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(hmac::sign(&self.key, data).as_ref().to_vec())
    }

    fn verify(&self, data: &[u8], mac: &[u8]) -> bool {
        hmac::verify(&self.key, data, mac).is_ok()
    }
}

/// A named TSIG key.
#[derive(Debug, Clone)]
pub struct TsigKey {
    name: Name,
    signer: Arc<dyn TsigSigner>,
    fudge: u16,
}

impl TsigKey {
    /// Creates a key with the default fudge.
    pub fn new(name: Name, signer: Arc<dyn TsigSigner>) -> Self {
        Self {
            name,
            signer,
            fudge: DEFAULT_FUDGE,
        }
    }

    /// Creates an HMAC key from a base64 secret.
    pub fn hmac(name: Name, algorithm: HmacAlgorithm, secret: &str) -> Result<Self> {
        Ok(Self::new(name, Arc::new(HmacSigner::from_base64(algorithm, secret)?)))
    }

    /// Sets the permitted clock skew.
    #[must_use]
    pub fn with_fudge(mut self, fudge: u16) -> Self {
        self.fudge = fudge;
        self
    }

    /// Returns the key name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the algorithm name.
    pub fn algorithm(&self) -> Name {
        self.signer.algorithm()
    }

    /// Returns the permitted clock skew.
    pub const fn fudge(&self) -> u16 {
        self.fudge
    }

    /// Returns the signer.
    pub fn signer(&self) -> &Arc<dyn TsigSigner> {
        &self.signer
    }
}

/// Builds the byte string a TSIG MAC covers.
///
/// `message` must already carry the original id and an ARCOUNT that
/// excludes the TSIG record.
pub(crate) fn signing_data(
    prior_mac: Option<&[u8]>,
    message: &[u8],
    key_name: &Name,
    tsig: &TSIG,
) -> Result<Vec<u8>> {
    let mut writer = WireWriter::new(message.len() + 128);

    if let Some(mac) = prior_mac {
        let len = u16::try_from(mac.len())
            .map_err(|_| Error::invalid_argument("prior MAC longer than 65535 bytes"))?;
        writer.write_u16(len)?;
        writer.write_bytes(mac)?;
    }

    writer.write_bytes(message)?;
    writer.write_bytes(&key_name.to_canonical_wire())?;
    writer.write_u16(RecordClass::ANY.to_u16())?;
    writer.write_u32(0)?;
    writer.write_bytes(&tsig.algorithm().to_canonical_wire())?;
    tsig.encode_timers_and_error(&mut writer)?;

    Ok(writer.into_bytes().to_vec())
}
