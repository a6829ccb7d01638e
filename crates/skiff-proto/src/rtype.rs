//! Resource record types.
//!
//! [`RecordType`] is the registered subset this crate names; [`Type`] is
//! what travels on the wire and keeps unregistered values intact.

use crate::error::{Error, Result};
use crate::registry::{iana_registry, parse_generic};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

iana_registry! {
    /// A registered DNS record type (RFC 1035 section 3.2.2 and later).
    ///
    /// Only some of these have a dedicated rdata codec; the rest are carried
    /// as opaque rdata.
    pub enum RecordType: u16 {
        A = 1, "A", "IPv4 host address.";
        NS = 2, "NS", "Authoritative name server.";
        MD = 3, "MD", "Mail destination (obsolete).";
        MF = 4, "MF", "Mail forwarder (obsolete).";
        CNAME = 5, "CNAME", "Canonical name for an alias.";
        SOA = 6, "SOA", "Start of a zone of authority.";
        MB = 7, "MB", "Mailbox domain name.";
        MG = 8, "MG", "Mail group member.";
        MR = 9, "MR", "Mail rename domain name.";
        NULL = 10, "NULL", "Opaque null record.";
        WKS = 11, "WKS", "Well known service description.";
        PTR = 12, "PTR", "Domain name pointer.";
        HINFO = 13, "HINFO", "Host information.";
        MINFO = 14, "MINFO", "Mailbox or mail list information.";
        MX = 15, "MX", "Mail exchange.";
        TXT = 16, "TXT", "Text strings.";
        RP = 17, "RP", "Responsible person.";
        AFSDB = 18, "AFSDB", "AFS database location.";
        X25 = 19, "X25", "X.25 PSDN address.";
        ISDN = 20, "ISDN", "ISDN address.";
        RT = 21, "RT", "Route through.";
        NSAP = 22, "NSAP", "NSAP address.";
        NSAP_PTR = 23, "NSAP-PTR", "NSAP domain name pointer.";
        SIG = 24, "SIG", "Security signature.";
        KEY = 25, "KEY", "Security key.";
        PX = 26, "PX", "X.400 mail mapping.";
        GPOS = 27, "GPOS", "Geographical position.";
        AAAA = 28, "AAAA", "IPv6 host address.";
        LOC = 29, "LOC", "Location information.";
        NXT = 30, "NXT", "Next domain (obsolete).";
        SRV = 33, "SRV", "Service locator.";
        NAPTR = 35, "NAPTR", "Naming authority pointer.";
        KX = 36, "KX", "Key exchanger.";
        CERT = 37, "CERT", "Certificate.";
        A6 = 38, "A6", "IPv6 address (historic).";
        DNAME = 39, "DNAME", "Subtree redirection.";
        OPT = 41, "OPT", "EDNS pseudo-record.";
        APL = 42, "APL", "Address prefix list.";
        DS = 43, "DS", "Delegation signer.";
        SSHFP = 44, "SSHFP", "SSH key fingerprint.";
        IPSECKEY = 45, "IPSECKEY", "IPsec keying material.";
        RRSIG = 46, "RRSIG", "RRset signature.";
        NSEC = 47, "NSEC", "Next secure name.";
        DNSKEY = 48, "DNSKEY", "Zone signing key.";
        DHCID = 49, "DHCID", "DHCP identifier.";
        NSEC3 = 50, "NSEC3", "Hashed next secure name.";
        NSEC3PARAM = 51, "NSEC3PARAM", "NSEC3 parameters.";
        TLSA = 52, "TLSA", "TLS certificate association.";
        SMIMEA = 53, "SMIMEA", "S/MIME certificate association.";
        HIP = 55, "HIP", "Host identity protocol.";
        CDS = 59, "CDS", "Child DS.";
        CDNSKEY = 60, "CDNSKEY", "Child DNSKEY.";
        OPENPGPKEY = 61, "OPENPGPKEY", "OpenPGP public key.";
        CSYNC = 62, "CSYNC", "Child-to-parent synchronization.";
        ZONEMD = 63, "ZONEMD", "Zone message digest.";
        SVCB = 64, "SVCB", "Service binding.";
        HTTPS = 65, "HTTPS", "HTTPS service binding.";
        SPF = 99, "SPF", "Sender policy framework.";
        EUI48 = 108, "EUI48", "48-bit extended unique identifier.";
        EUI64 = 109, "EUI64", "64-bit extended unique identifier.";
        TKEY = 249, "TKEY", "Transaction key.";
        TSIG = 250, "TSIG", "Transaction signature.";
        IXFR = 251, "IXFR", "Incremental zone transfer.";
        AXFR = 252, "AXFR", "Full zone transfer.";
        MAILB = 253, "MAILB", "Mailbox-related records.";
        MAILA = 254, "MAILA", "Mail agent records (obsolete).";
        ANY = 255, "ANY", "Every record type.";
        URI = 256, "URI", "Uniform resource identifier.";
        CAA = 257, "CAA", "Certification authority authorization.";
        AMTRELAY = 260, "AMTRELAY", "Automatic multicast tunneling relay.";
        TA = 32768, "TA", "DNSSEC trust authority.";
        DLV = 32769, "DLV", "DNSSEC lookaside validation (historic).";
    }
}

impl RecordType {
    /// Returns the wire value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the registered type for a wire value, if any.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl Default for RecordType {
    fn default() -> Self {
        Self::A
    }
}

/// A record type as found on the wire, registered or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    /// A value present in [`RecordType`].
    Known(RecordType),
    /// Any other value, printed as `TYPEnnn`.
    Unknown(u16),
}

impl Type {
    /// Classifies a wire value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordType::from_u16(value).map_or(Self::Unknown(value), Self::Known)
    }

    /// Returns the wire value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(rtype) => rtype.to_u16(),
            Self::Unknown(value) => value,
        }
    }

    /// Returns the registered type, if this is one.
    #[inline]
    pub const fn as_known(self) -> Option<RecordType> {
        match self {
            Self::Known(rtype) => Some(rtype),
            Self::Unknown(_) => None,
        }
    }

    /// Returns true for CNAME.
    #[inline]
    pub const fn is_cname(self) -> bool {
        matches!(self, Self::Known(RecordType::CNAME))
    }

    /// Returns true if this is `rtype`.
    #[inline]
    pub fn is(self, rtype: RecordType) -> bool {
        self == Self::Known(rtype)
    }
}

impl FromStr for Type {
    type Err = Error;

    /// Accepts a mnemonic (`mx`) or the generic form (`TYPE15`).
    fn from_str(s: &str) -> Result<Self> {
        RecordType::from_name(s)
            .map(Self::Known)
            .or_else(|| parse_generic(s, "TYPE").map(Self::from_u16))
            .ok_or_else(|| Error::invalid_argument(format!("unknown record type {s}")))
    }
}

impl From<RecordType> for Type {
    fn from(rtype: RecordType) -> Self {
        Self::Known(rtype)
    }
}

impl From<u16> for Type {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(rtype) => fmt::Display::fmt(rtype, f),
            Self::Unknown(value) => write!(f, "TYPE{value}"),
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::Known(RecordType::A)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_table() {
        for rtype in RecordType::ALL {
            assert_eq!(RecordType::from_u16(rtype.to_u16()), Some(*rtype));
            assert_eq!(RecordType::from_name(rtype.name()), Some(*rtype));
        }
        assert_eq!(RecordType::HTTPS.to_u16(), 65);
        assert_eq!(RecordType::from_u16(65535), None);
    }

    #[test]
    fn test_unregistered_type_survives() {
        let rtype = Type::from_u16(65534);
        assert_eq!(rtype.as_known(), None);
        assert_eq!(rtype.to_u16(), 65534);
        assert_eq!(rtype.to_string(), "TYPE65534");

        assert!(Type::from_u16(5).is_cname());
        assert!(Type::from(RecordType::AAAA).is(RecordType::AAAA));
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!("mx".parse::<Type>().unwrap(), Type::Known(RecordType::MX));
        assert_eq!("NSAP-PTR".parse::<Type>().unwrap(), Type::Known(RecordType::NSAP_PTR));
        assert_eq!("TYPE1".parse::<Type>().unwrap(), Type::Known(RecordType::A));
        assert_eq!("type731".parse::<Type>().unwrap(), Type::Unknown(731));
        assert!("TYPEx".parse::<Type>().is_err());
        assert!("BOGUS".parse::<Type>().is_err());
    }
}
