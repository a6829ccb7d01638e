//! DNS record data (RDATA) types.
//!
//! Every concrete type implements [`RDataCodec`]; [`RData`] is the registry
//! that dispatches on the record type. Types without a codec are carried as
//! [`Unknown`] raw bytes and printed in the RFC 3597 `\# len hex` form,
//! which is also accepted when parsing any type.
//!
//! - **Address records**: A, AAAA
//! - **Name records**: NS, CNAME, PTR, DNAME, MX
//! - **Authority records**: SOA
//! - **Text records**: TXT, SPF, HINFO, RP
//! - **Service records**: SRV, NAPTR, CAA
//! - **Certificate records**: SSHFP, TLSA
//! - **DNSSEC records**: DS, DNSKEY, RRSIG, NSEC
//! - **Transaction records**: TSIG

pub mod address;
pub mod authority;
pub mod cert;
pub mod dnssec;
pub mod name;
pub mod service;
pub mod text;
pub mod tsig;
pub mod unknown;

pub use address::{A, AAAA};
pub use authority::SOA;
pub use cert::{SSHFP, TLSA};
pub use dnssec::{TypeBitmap, DNSKEY, DS, NSEC, RRSIG};
pub use name::{CNAME, DNAME, MX, NS, PTR};
pub use service::{CAA, NAPTR, SRV};
pub use text::{HINFO, RP, SPF, TXT};
pub use tsig::TSIG;
pub use unknown::Unknown;

use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::options::Options;
use crate::rtype::{RecordType, Type};
use crate::text::{Token, Tokenizer};
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// The contract every rdata type satisfies.
pub trait RDataCodec: Sized {
    /// Decodes rdata of `rdlength` bytes.
    ///
    /// The reader's active window already ends at the rdata boundary, while
    /// compression pointers may still reach anywhere earlier in the message.
    fn decode(reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self>;

    /// Writes the rdata. Only the RFC 1035 types pass `compression` on to
    /// their embedded names.
    fn encode(
        &self,
        writer: &mut WireWriter,
        compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()>;

    /// Parses the rdata fields from presentation format.
    fn parse_text(tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self>;

    /// Writes the rdata in presentation format.
    fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result;

    /// Uncompressed wire length.
    fn wire_len(&self) -> usize;
}

/// Decodes a complete rdata blob with a codec, as when a known type arrives
/// in the generic `\#` text form.
pub(crate) fn decode_exact<T: RDataCodec>(data: &[u8]) -> Result<T> {
    let rdlength = u16::try_from(data.len())
        .map_err(|_| Error::invalid_argument("rdata longer than 65535 bytes"))?;
    let mut reader = WireReader::new(data);
    let value = T::decode(&mut reader, rdlength)?;
    if !reader.is_empty() {
        return Err(Error::invalid_data(
            reader.position(),
            "trailing bytes after rdata",
        ));
    }
    Ok(value)
}

/// DNS record data.
///
/// This enum represents the parsed data for all supported DNS record types.
/// Unknown record types are preserved as opaque byte sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RData {
    // =========================================================================
    // Address Records
    // =========================================================================
    /// IPv4 address (A record)
    A(A),

    /// IPv6 address (AAAA record)
    AAAA(AAAA),

    // =========================================================================
    // Name Records
    // =========================================================================
    /// Name server (NS record)
    NS(NS),

    /// Canonical name (CNAME record)
    CNAME(CNAME),

    /// Pointer (PTR record)
    PTR(PTR),

    /// Delegation name (DNAME record)
    DNAME(DNAME),

    /// Mail exchange (MX record)
    MX(MX),

    // =========================================================================
    // Authority Records
    // =========================================================================
    /// Start of authority (SOA record)
    SOA(SOA),

    // =========================================================================
    // Text Records
    // =========================================================================
    /// Text (TXT record)
    TXT(TXT),

    /// Sender policy framework (SPF record)
    SPF(SPF),

    /// Host information (HINFO record)
    HINFO(HINFO),

    /// Responsible person (RP record)
    RP(RP),

    // =========================================================================
    // Service Records
    // =========================================================================
    /// Service location (SRV record)
    SRV(SRV),

    /// Naming authority pointer (NAPTR record)
    NAPTR(NAPTR),

    /// Certification authority authorization (CAA record)
    CAA(CAA),

    // =========================================================================
    // Certificate Records
    // =========================================================================
    /// SSH key fingerprint (SSHFP record)
    SSHFP(SSHFP),

    /// TLSA certificate association
    TLSA(TLSA),

    // =========================================================================
    // DNSSEC Records
    // =========================================================================
    /// Delegation signer (DS record)
    DS(DS),

    /// DNS public key (DNSKEY record)
    DNSKEY(DNSKEY),

    /// DNSSEC signature (RRSIG record)
    RRSIG(RRSIG),

    /// Next secure (NSEC record)
    NSEC(NSEC),

    // =========================================================================
    // Transaction Records
    // =========================================================================
    /// Transaction signature (TSIG record)
    TSIG(TSIG),

    // =========================================================================
    // Other
    // =========================================================================
    /// Unknown or unsupported record type (preserved as raw bytes)
    Unknown(Unknown),
}

/// Expands `$body` once per variant with `$r` bound to the inner value.
macro_rules! each_variant {
    ($self:expr, $r:ident => $body:expr) => {
        match $self {
            RData::A($r) => $body,
            RData::AAAA($r) => $body,
            RData::NS($r) => $body,
            RData::CNAME($r) => $body,
            RData::PTR($r) => $body,
            RData::DNAME($r) => $body,
            RData::MX($r) => $body,
            RData::SOA($r) => $body,
            RData::TXT($r) => $body,
            RData::SPF($r) => $body,
            RData::HINFO($r) => $body,
            RData::RP($r) => $body,
            RData::SRV($r) => $body,
            RData::NAPTR($r) => $body,
            RData::CAA($r) => $body,
            RData::SSHFP($r) => $body,
            RData::TLSA($r) => $body,
            RData::DS($r) => $body,
            RData::DNSKEY($r) => $body,
            RData::RRSIG($r) => $body,
            RData::NSEC($r) => $body,
            RData::TSIG($r) => $body,
            RData::Unknown($r) => $body,
        }
    };
}

/// Expands to a match from a known type onto its codec, falling back to
/// `$fallback` for types without one.
macro_rules! dispatch {
    ($rtype:expr, $codec:ident => $body:expr, $fallback:expr) => {
        match $rtype.as_known() {
            Some(RecordType::A) => { type $codec = A; RData::A($body) }
            Some(RecordType::AAAA) => { type $codec = AAAA; RData::AAAA($body) }
            Some(RecordType::NS) => { type $codec = NS; RData::NS($body) }
            Some(RecordType::CNAME) => { type $codec = CNAME; RData::CNAME($body) }
            Some(RecordType::PTR) => { type $codec = PTR; RData::PTR($body) }
            Some(RecordType::DNAME) => { type $codec = DNAME; RData::DNAME($body) }
            Some(RecordType::MX) => { type $codec = MX; RData::MX($body) }
            Some(RecordType::SOA) => { type $codec = SOA; RData::SOA($body) }
            Some(RecordType::TXT) => { type $codec = TXT; RData::TXT($body) }
            Some(RecordType::SPF) => { type $codec = SPF; RData::SPF($body) }
            Some(RecordType::HINFO) => { type $codec = HINFO; RData::HINFO($body) }
            Some(RecordType::RP) => { type $codec = RP; RData::RP($body) }
            Some(RecordType::SRV) => { type $codec = SRV; RData::SRV($body) }
            Some(RecordType::NAPTR) => { type $codec = NAPTR; RData::NAPTR($body) }
            Some(RecordType::CAA) => { type $codec = CAA; RData::CAA($body) }
            Some(RecordType::SSHFP) => { type $codec = SSHFP; RData::SSHFP($body) }
            Some(RecordType::TLSA) => { type $codec = TLSA; RData::TLSA($body) }
            Some(RecordType::DS) => { type $codec = DS; RData::DS($body) }
            Some(RecordType::DNSKEY) => { type $codec = DNSKEY; RData::DNSKEY($body) }
            Some(RecordType::RRSIG) => { type $codec = RRSIG; RData::RRSIG($body) }
            Some(RecordType::NSEC) => { type $codec = NSEC; RData::NSEC($body) }
            Some(RecordType::TSIG) => { type $codec = TSIG; RData::TSIG($body) }
            _ => RData::Unknown($fallback),
        }
    };
}

impl RData {
    /// Returns true if `rtype` has a dedicated codec.
    pub fn has_codec(rtype: Type) -> bool {
        matches!(
            rtype.as_known(),
            Some(
                RecordType::A
                    | RecordType::AAAA
                    | RecordType::NS
                    | RecordType::CNAME
                    | RecordType::PTR
                    | RecordType::DNAME
                    | RecordType::MX
                    | RecordType::SOA
                    | RecordType::TXT
                    | RecordType::SPF
                    | RecordType::HINFO
                    | RecordType::RP
                    | RecordType::SRV
                    | RecordType::NAPTR
                    | RecordType::CAA
                    | RecordType::SSHFP
                    | RecordType::TLSA
                    | RecordType::DS
                    | RecordType::DNSKEY
                    | RecordType::RRSIG
                    | RecordType::NSEC
                    | RecordType::TSIG
            )
        )
    }

    /// Decodes rdata of the given type from the reader.
    ///
    /// The caller limits the reader to `rdlength` bytes with
    /// [`WireReader::set_active`].
    pub fn decode(rtype: Type, reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        Ok(dispatch!(rtype, C => C::decode(reader, rdlength)?, Unknown::decode(reader, rdlength)?))
    }

    /// Parses rdata of the given type from presentation format.
    ///
    /// The generic `\# len hex` form is accepted for every type; for types
    /// with a codec the bytes are then decoded into the typed form.
    pub fn parse_text(rtype: Type, tokens: &mut Tokenizer<'_>, origin: Option<&Name>) -> Result<Self> {
        match tokens.get()? {
            Token::Word("\\#") => {
                let raw = Unknown::parse_generic(tokens)?;
                Ok(dispatch!(rtype, C => decode_exact::<C>(raw.data()).map_err(|e| tokens.error(e.to_string()))?, raw))
            }
            token => {
                tokens.unget(token);
                Ok(dispatch!(rtype, C => C::parse_text(tokens, origin)?, Unknown::parse_text(tokens, origin)?))
            }
        }
    }

    /// Writes the rdata to wire format.
    pub fn encode(
        &self,
        writer: &mut WireWriter,
        compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        each_variant!(self, r => r.encode(writer, compression, canonical))
    }

    /// Writes the rdata in presentation format.
    pub fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        each_variant!(self, r => r.format_text(out, options))
    }

    /// Returns the rdata in presentation format.
    pub fn to_text(&self, options: &Options) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.format_text(&mut out, options);
        out
    }

    /// Returns the uncompressed wire length of this RDATA.
    pub fn wire_len(&self) -> usize {
        each_variant!(self, r => r.wire_len())
    }

    /// Returns the record type for this RDATA, or `None` for raw data.
    pub fn record_type(&self) -> Option<RecordType> {
        Some(match self {
            RData::A(_) => RecordType::A,
            RData::AAAA(_) => RecordType::AAAA,
            RData::NS(_) => RecordType::NS,
            RData::CNAME(_) => RecordType::CNAME,
            RData::PTR(_) => RecordType::PTR,
            RData::DNAME(_) => RecordType::DNAME,
            RData::MX(_) => RecordType::MX,
            RData::SOA(_) => RecordType::SOA,
            RData::TXT(_) => RecordType::TXT,
            RData::SPF(_) => RecordType::SPF,
            RData::HINFO(_) => RecordType::HINFO,
            RData::RP(_) => RecordType::RP,
            RData::SRV(_) => RecordType::SRV,
            RData::NAPTR(_) => RecordType::NAPTR,
            RData::CAA(_) => RecordType::CAA,
            RData::SSHFP(_) => RecordType::SSHFP,
            RData::TLSA(_) => RecordType::TLSA,
            RData::DS(_) => RecordType::DS,
            RData::DNSKEY(_) => RecordType::DNSKEY,
            RData::RRSIG(_) => RecordType::RRSIG,
            RData::NSEC(_) => RecordType::NSEC,
            RData::TSIG(_) => RecordType::TSIG,
            RData::Unknown(_) => return None,
        })
    }

    /// Returns the IPv4 address if this is an A record.
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            RData::A(a) => Some(a.address()),
            _ => None,
        }
    }

    /// Returns the IPv6 address if this is an AAAA record.
    pub fn as_aaaa(&self) -> Option<Ipv6Addr> {
        match self {
            RData::AAAA(aaaa) => Some(aaaa.address()),
            _ => None,
        }
    }

    /// Returns the target name if this is a CNAME record.
    pub fn as_cname(&self) -> Option<&Name> {
        match self {
            RData::CNAME(cname) => Some(cname.target()),
            _ => None,
        }
    }

    /// Returns the SOA data if this is an SOA record.
    pub fn as_soa(&self) -> Option<&SOA> {
        match self {
            RData::SOA(soa) => Some(soa),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_text(f, &Options::default())
    }
}
