//! Response codes.
//!
//! The full code is twelve bits: the low four live in the header, the high
//! eight in the OPT record's TTL field. TSIG's error field carries the same
//! registry in sixteen bits.

use crate::registry::iana_registry;

iana_registry! {
    /// A registered response code (RFC 1035, RFC 6895).
    pub enum ResponseCode: u16 {
        NoError = 0, "NOERROR", "No error.";
        FormErr = 1, "FORMERR", "The server could not interpret the query.";
        ServFail = 2, "SERVFAIL", "The server failed to process the query.";
        NXDomain = 3, "NXDOMAIN", "The queried name does not exist.";
        NotImp = 4, "NOTIMP", "The query kind is not implemented.";
        Refused = 5, "REFUSED", "The server refused for policy reasons.";
        YXDomain = 6, "YXDOMAIN", "A name exists that should not.";
        YXRRSet = 7, "YXRRSET", "An RRset exists that should not.";
        NXRRSet = 8, "NXRRSET", "An RRset that should exist does not.";
        NotAuth = 9, "NOTAUTH", "Not authoritative, or not authorized.";
        NotZone = 10, "NOTZONE", "A name is outside the zone.";
        DsoTypeNI = 11, "DSOTYPENI", "DSO type not implemented.";
        BadVers = 16, "BADVERS", "Unsupported EDNS version; BADSIG in TSIG context.";
        BadKey = 17, "BADKEY", "TSIG key not recognized.";
        BadTime = 18, "BADTIME", "TSIG time outside the fudge window.";
        BadMode = 19, "BADMODE", "Bad TKEY mode.";
        BadName = 20, "BADNAME", "Duplicate key name.";
        BadAlg = 21, "BADALG", "Algorithm not supported.";
        BadTrunc = 22, "BADTRUNC", "Bad MAC truncation.";
        BadCookie = 23, "BADCOOKIE", "Bad or missing server cookie.";
    }
}

impl ResponseCode {
    /// TSIG signature failure, sharing code 16 with [`Self::BadVers`].
    pub const BADSIG: Self = Self::BadVers;

    /// Returns the full value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the registered code for a full value, if any.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns the low four bits, carried in the header.
    #[inline]
    pub const fn header_rcode(self) -> u8 {
        (self.to_u16() & 0x0F) as u8
    }

    /// Returns the high eight bits, carried in OPT.
    #[inline]
    pub const fn extended_rcode(self) -> u8 {
        (self.to_u16() >> 4) as u8
    }

    /// Joins the header and OPT halves.
    #[inline]
    pub fn from_parts(header_rcode: u8, extended_rcode: u8) -> Option<Self> {
        Self::from_u16(u16::from(extended_rcode) << 4 | u16::from(header_rcode & 0x0F))
    }

    /// Reads the header half alone, as when no OPT record is present.
    #[inline]
    pub fn from_header(value: u8) -> Option<Self> {
        Self::from_parts(value, 0)
    }

    /// Returns true if the code needs OPT to be expressed.
    #[inline]
    pub const fn is_extended(self) -> bool {
        self.extended_rcode() != 0
    }
}

impl Default for ResponseCode {
    fn default() -> Self {
        Self::NoError
    }
}
