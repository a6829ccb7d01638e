//! DNS message header.
//!
//! The DNS header is a fixed 12-byte structure at the start of every DNS message.
//! It contains control information and counts of the sections that follow.

use crate::error::{Error, Result};
use crate::opcode::OpCode;
use crate::rcode::ResponseCode;
use crate::wire::WireReader;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the DNS header in bytes.
pub const HEADER_SIZE: usize = 12;

bitflags! {
    /// DNS header flags.
    ///
    /// These flags control various aspects of DNS message processing
    /// and indicate the status of the response.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        /// Query/Response flag: 0 = query, 1 = response
        const QR = 0x8000;

        /// Authoritative Answer: server is authoritative for the domain
        const AA = 0x0400;

        /// Truncation: message was truncated
        const TC = 0x0200;

        /// Recursion Desired: client wants recursive resolution
        const RD = 0x0100;

        /// Recursion Available: server supports recursion
        const RA = 0x0080;

        /// Reserved for future use (must be zero)
        const Z = 0x0040;

        /// Authentic Data: response data is authenticated (DNSSEC)
        const AD = 0x0020;

        /// Checking Disabled: disable DNSSEC validation
        const CD = 0x0010;
    }
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// The four record sections of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// QUESTION section.
    Question,
    /// ANSWER section.
    Answer,
    /// AUTHORITY section.
    Authority,
    /// ADDITIONAL section.
    Additional,
}

impl Section {
    /// All sections in wire order.
    pub const ALL: [Section; 4] = [
        Section::Question,
        Section::Answer,
        Section::Authority,
        Section::Additional,
    ];

    /// Returns the section name as printed by dig.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Question => "QUESTION",
            Self::Answer => "ANSWER",
            Self::Authority => "AUTHORITY",
            Self::Additional => "ADDITIONAL",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Question => 0,
            Self::Answer => 1,
            Self::Authority => 2,
            Self::Additional => 3,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// DNS message header.
///
/// The header contains:
/// - A 16-bit message ID for matching requests to responses
/// - Flags indicating query/response, opcode, response status, etc.
/// - Counts of questions, answers, authority records, and additional records
///
/// The opcode and rcode are kept as raw 4-bit values so that unassigned
/// codes survive a decode/encode cycle; the typed views are
/// [`op_code`](Self::op_code) and [`response_code`](Self::response_code).
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    QDCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ANCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    NSCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ARCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Message identifier for matching requests to responses.
    pub id: u16,

    /// Flag bits.
    pub flags: HeaderFlags,

    /// Operation code (0-15).
    opcode: u8,

    /// Low four bits of the response code.
    rcode: u8,

    /// Section counts in wire order.
    counts: [u16; 4],
}

impl Header {
    /// Creates a new header with the given message ID.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            flags: HeaderFlags::empty(),
            opcode: 0,
            rcode: 0,
            counts: [0; 4],
        }
    }

    /// Creates a new query header with a random ID and RD set.
    pub fn query() -> Self {
        let mut header = Self::new(rand::random());
        header.flags = HeaderFlags::RD;
        header
    }

    /// Creates a response header from a query header.
    pub fn response_from(query: &Header) -> Self {
        Self {
            id: query.id,
            flags: HeaderFlags::QR | (query.flags & (HeaderFlags::RD | HeaderFlags::CD)),
            opcode: query.opcode,
            rcode: 0,
            counts: [0; 4],
        }
    }

    /// Returns the raw opcode.
    #[inline]
    pub const fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Returns the opcode if it is an assigned value.
    #[inline]
    pub fn op_code(&self) -> Option<OpCode> {
        OpCode::from_u8(self.opcode)
    }

    /// Sets the opcode; values above 15 do not fit the field.
    pub fn set_opcode(&mut self, opcode: u8) -> Result<()> {
        if opcode > 0x0F {
            return Err(Error::invalid_argument(format!(
                "opcode {opcode} out of range 0-15"
            )));
        }
        self.opcode = opcode;
        Ok(())
    }

    /// Returns the raw 4-bit rcode.
    #[inline]
    pub const fn rcode(&self) -> u8 {
        self.rcode
    }

    /// Returns the rcode if it is an assigned value.
    ///
    /// Only the header bits are considered; see
    /// [`Message::rcode`](crate::message::Message::rcode) for the value
    /// extended by EDNS.
    #[inline]
    pub fn response_code(&self) -> Option<ResponseCode> {
        ResponseCode::from_header(self.rcode)
    }

    /// Sets the rcode; values above 15 do not fit the field.
    pub fn set_rcode(&mut self, rcode: u8) -> Result<()> {
        if rcode > 0x0F {
            return Err(Error::invalid_argument(format!(
                "rcode {rcode} out of range 0-15"
            )));
        }
        self.rcode = rcode;
        Ok(())
    }

    /// Returns the count for `section`.
    #[inline]
    pub const fn count(&self, section: Section) -> u16 {
        self.counts[section.index()]
    }

    /// Overwrites the count for `section`.
    #[inline]
    pub fn set_count(&mut self, section: Section, count: u16) {
        self.counts[section.index()] = count;
    }

    /// Increments the count for `section`, failing at 65535.
    pub fn increment_count(&mut self, section: Section) -> Result<()> {
        let slot = &mut self.counts[section.index()];
        *slot = slot.checked_add(1).ok_or(Error::CountOutOfRange {
            section: section.name(),
            direction: "overflow",
        })?;
        Ok(())
    }

    /// Decrements the count for `section`, failing at zero.
    pub fn decrement_count(&mut self, section: Section) -> Result<()> {
        let slot = &mut self.counts[section.index()];
        *slot = slot.checked_sub(1).ok_or(Error::CountOutOfRange {
            section: section.name(),
            direction: "underflow",
        })?;
        Ok(())
    }

    /// Returns true if the flag is set.
    #[inline]
    pub fn flag(&self, flag: HeaderFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn set_flag(&mut self, flag: HeaderFlags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Returns true if this is a query.
    #[inline]
    pub fn is_query(&self) -> bool {
        !self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if the response is from an authoritative server.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(HeaderFlags::AA)
    }

    /// Returns true if the message was truncated.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    /// Returns true if recursion was requested.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.flags.contains(HeaderFlags::RD)
    }

    /// Returns true if recursion is available.
    #[inline]
    pub fn recursion_available(&self) -> bool {
        self.flags.contains(HeaderFlags::RA)
    }

    /// Sets the QR flag (marks as response).
    #[inline]
    pub fn set_response(&mut self, response: bool) {
        self.flags.set(HeaderFlags::QR, response);
    }

    /// Sets the AA flag.
    #[inline]
    pub fn set_authoritative(&mut self, aa: bool) {
        self.flags.set(HeaderFlags::AA, aa);
    }

    /// Sets the TC flag.
    #[inline]
    pub fn set_truncated(&mut self, tc: bool) {
        self.flags.set(HeaderFlags::TC, tc);
    }

    /// Sets the RD flag.
    #[inline]
    pub fn set_recursion_desired(&mut self, rd: bool) {
        self.flags.set(HeaderFlags::RD, rd);
    }

    /// Sets the RA flag.
    #[inline]
    pub fn set_recursion_available(&mut self, ra: bool) {
        self.flags.set(HeaderFlags::RA, ra);
    }

    /// Reads a header from the cursor.
    pub fn from_wire(reader: &mut WireReader<'_>) -> Result<Self> {
        if reader.remaining() < HEADER_SIZE {
            return Err(Error::buffer_too_short(HEADER_SIZE, reader.remaining()));
        }

        let id = reader.read_u16()?;
        let bits = reader.read_u16()?;
        let mut counts = [0u16; 4];
        for count in &mut counts {
            *count = reader.read_u16()?;
        }

        Ok(Self {
            id,
            flags: HeaderFlags::from_bits_truncate(bits),
            opcode: ((bits >> 11) & 0x0F) as u8,
            rcode: (bits & 0x0F) as u8,
            counts,
        })
    }

    /// Parses a header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::from_wire(&mut WireReader::new(data))
    }

    /// Serializes the header to wire format.
    pub fn to_wire(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..2].copy_from_slice(&self.id.to_be_bytes());

        let bits = self.flags.bits() | u16::from(self.opcode) << 11 | u16::from(self.rcode);
        buf[2..4].copy_from_slice(&bits.to_be_bytes());

        for (i, count) in self.counts.iter().enumerate() {
            let at = 4 + i * 2;
            buf[at..at + 2].copy_from_slice(&count.to_be_bytes());
        }

        buf
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Header {
    /// Formats the header the way dig prints it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ";; ->>HEADER<<- opcode: ")?;
        match self.op_code() {
            Some(op) => write!(f, "{op}")?,
            None => write!(f, "RESERVED{}", self.opcode)?,
        }
        write!(f, ", status: ")?;
        match self.response_code() {
            Some(rcode) => write!(f, "{rcode}")?,
            None => write!(f, "RESERVED{}", self.rcode)?,
        }
        write!(f, ", id: {}\n;; flags:", self.id)?;

        for (flag, name) in [
            (HeaderFlags::QR, "qr"),
            (HeaderFlags::AA, "aa"),
            (HeaderFlags::TC, "tc"),
            (HeaderFlags::RD, "rd"),
            (HeaderFlags::RA, "ra"),
            (HeaderFlags::AD, "ad"),
            (HeaderFlags::CD, "cd"),
        ] {
            if self.flags.contains(flag) {
                write!(f, " {name}")?;
            }
        }

        write!(
            f,
            "; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.count(Section::Question),
            self.count(Section::Answer),
            self.count(Section::Authority),
            self.count(Section::Additional)
        )
    }
}
