//! EDNS(0) support (RFC 6891).
//!
//! EDNS(0) - Extension Mechanisms for DNS - allows for larger UDP
//! payloads and additional functionality through the OPT pseudo-RR.
//! [`Edns`] is the decoded form; [`Edns::to_record`] and
//! [`Edns::from_record`] convert to and from the OPT record that travels
//! in the additional section.

use crate::class::Class;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::rdata::{RData, Unknown};
use crate::record::ResourceRecord;
use crate::rtype::{RecordType, Type};
use crate::wire::{WireReader, WireWriter};
use data_encoding::HEXUPPER;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Name Server Identifier (RFC 5001).
pub const OPTION_NSID: u16 = 3;
/// Client Subnet (RFC 7871).
pub const OPTION_CLIENT_SUBNET: u16 = 8;
/// DNS Cookie (RFC 7873).
pub const OPTION_COOKIE: u16 = 10;
/// TCP Keepalive (RFC 7828).
pub const OPTION_TCP_KEEPALIVE: u16 = 11;
/// Padding (RFC 7830).
pub const OPTION_PADDING: u16 = 12;
/// Extended DNS Error (RFC 8914).
pub const OPTION_EXTENDED_ERROR: u16 = 15;

/// DO bit in the OPT TTL flags.
const FLAG_DNSSEC_OK: u16 = 0x8000;

/// EDNS option value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdnsOption {
    /// Name Server Identifier.
    Nsid(Vec<u8>),

    /// Client subnet information.
    ClientSubnet {
        /// Source prefix length.
        source_prefix: u8,
        /// Scope prefix length.
        scope_prefix: u8,
        /// Client address; bits past the source prefix are zero.
        address: IpAddr,
    },

    /// DNS Cookie.
    Cookie {
        /// Client cookie (8 bytes).
        client: [u8; 8],
        /// Server cookie (8-32 bytes, optional).
        server: Option<Vec<u8>>,
    },

    /// TCP Keepalive timeout in units of 100 milliseconds.
    TcpKeepalive(Option<u16>),

    /// Padding bytes.
    Padding(Vec<u8>),

    /// Extended DNS Error.
    ExtendedError {
        /// Info code.
        info_code: u16,
        /// Extra text, possibly empty.
        extra_text: String,
    },

    /// Unknown option.
    Unknown {
        /// Option code.
        code: u16,
        /// Option data.
        data: Vec<u8>,
    },
}

impl EdnsOption {
    /// Creates a client subnet option, masking the address to the prefix.
    pub fn client_subnet(address: IpAddr, source_prefix: u8) -> Result<Self> {
        let max = max_prefix(&address);
        if source_prefix > max {
            return Err(Error::invalid_edns_option(
                OPTION_CLIENT_SUBNET,
                format!("source prefix {source_prefix} longer than {max}"),
            ));
        }
        Ok(Self::ClientSubnet {
            source_prefix,
            scope_prefix: 0,
            address: mask_address(address, source_prefix),
        })
    }

    /// Returns the option code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Nsid(_) => OPTION_NSID,
            Self::ClientSubnet { .. } => OPTION_CLIENT_SUBNET,
            Self::Cookie { .. } => OPTION_COOKIE,
            Self::TcpKeepalive(_) => OPTION_TCP_KEEPALIVE,
            Self::Padding(_) => OPTION_PADDING,
            Self::ExtendedError { .. } => OPTION_EXTENDED_ERROR,
            Self::Unknown { code, .. } => *code,
        }
    }

    fn data_len(&self) -> usize {
        match self {
            Self::Nsid(data) | Self::Padding(data) | Self::Unknown { data, .. } => data.len(),
            Self::ClientSubnet { source_prefix, .. } => 4 + prefix_bytes(*source_prefix),
            Self::Cookie { server, .. } => 8 + server.as_ref().map_or(0, Vec::len),
            Self::TcpKeepalive(timeout) => timeout.map_or(0, |_| 2),
            Self::ExtendedError { extra_text, .. } => 2 + extra_text.len(),
        }
    }

    /// Returns the wire format length, including code and length fields.
    pub fn wire_len(&self) -> usize {
        4 + self.data_len()
    }

    /// Writes the option.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        let len = u16::try_from(self.data_len())
            .map_err(|_| Error::invalid_edns_option(self.code(), "option data too long"))?;
        writer.write_u16(self.code())?;
        writer.write_u16(len)?;

        match self {
            Self::Nsid(data) | Self::Padding(data) | Self::Unknown { data, .. } => {
                writer.write_bytes(data)
            }
            Self::ClientSubnet {
                source_prefix,
                scope_prefix,
                address,
            } => {
                let (family, octets) = match address {
                    IpAddr::V4(v4) => (1u16, v4.octets().to_vec()),
                    IpAddr::V6(v6) => (2u16, v6.octets().to_vec()),
                };
                writer.write_u16(family)?;
                writer.write_u8(*source_prefix)?;
                writer.write_u8(*scope_prefix)?;
                writer.write_bytes(&octets[..prefix_bytes(*source_prefix)])
            }
            Self::Cookie { client, server } => {
                writer.write_bytes(client)?;
                match server {
                    Some(server) => writer.write_bytes(server),
                    None => Ok(()),
                }
            }
            Self::TcpKeepalive(timeout) => match timeout {
                Some(timeout) => writer.write_u16(*timeout),
                None => Ok(()),
            },
            Self::ExtendedError {
                info_code,
                extra_text,
            } => {
                writer.write_u16(*info_code)?;
                writer.write_bytes(extra_text.as_bytes())
            }
        }
    }

    /// Decodes one option at the reader's position.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let code = reader.read_u16()?;
        let length = usize::from(reader.read_u16()?);
        let data = reader.read_bytes(length)?;

        let option = match code {
            OPTION_NSID => Self::Nsid(data.to_vec()),
            OPTION_CLIENT_SUBNET => decode_client_subnet(data)?,
            OPTION_COOKIE => {
                if length != 8 && !(16..=40).contains(&length) {
                    return Err(Error::invalid_edns_option(
                        code,
                        format!("cookie length {length}"),
                    ));
                }
                let mut client = [0u8; 8];
                client.copy_from_slice(&data[..8]);
                let server = (length > 8).then(|| data[8..].to_vec());
                Self::Cookie { client, server }
            }
            OPTION_TCP_KEEPALIVE => match data {
                [] => Self::TcpKeepalive(None),
                [hi, lo] => Self::TcpKeepalive(Some(u16::from_be_bytes([*hi, *lo]))),
                _ => {
                    return Err(Error::invalid_edns_option(
                        code,
                        format!("keepalive length {length}"),
                    ))
                }
            },
            OPTION_PADDING => Self::Padding(data.to_vec()),
            OPTION_EXTENDED_ERROR => {
                if length < 2 {
                    return Err(Error::invalid_edns_option(code, "missing info code"));
                }
                Self::ExtendedError {
                    info_code: u16::from_be_bytes([data[0], data[1]]),
                    extra_text: String::from_utf8_lossy(&data[2..])
                        .trim_end_matches('\0')
                        .to_string(),
                }
            }
            _ => Self::Unknown {
                code,
                data: data.to_vec(),
            },
        };

        Ok(option)
    }
}

fn decode_client_subnet(data: &[u8]) -> Result<EdnsOption> {
    let invalid = |message: String| Error::invalid_edns_option(OPTION_CLIENT_SUBNET, message);

    if data.len() < 4 {
        return Err(invalid(format!("length {}", data.len())));
    }
    let family = u16::from_be_bytes([data[0], data[1]]);
    let source_prefix = data[2];
    let scope_prefix = data[3];
    let bytes = &data[4..];

    let address = match family {
        1 => {
            let mut octets = [0u8; 4];
            fill_prefix(&mut octets, bytes).map_err(invalid)?;
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        2 => {
            let mut octets = [0u8; 16];
            fill_prefix(&mut octets, bytes).map_err(invalid)?;
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return Err(invalid(format!("unknown address family {family}"))),
    };

    let max = max_prefix(&address);
    if source_prefix > max || scope_prefix > max {
        return Err(invalid(format!("prefix longer than {max}")));
    }
    if bytes.len() != prefix_bytes(source_prefix) {
        return Err(invalid(format!(
            "{} address bytes for a /{source_prefix}",
            bytes.len()
        )));
    }

    Ok(EdnsOption::ClientSubnet {
        source_prefix,
        scope_prefix,
        address,
    })
}

fn fill_prefix(octets: &mut [u8], bytes: &[u8]) -> std::result::Result<(), String> {
    if bytes.len() > octets.len() {
        return Err(format!("{} address bytes", bytes.len()));
    }
    octets[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

fn prefix_bytes(prefix: u8) -> usize {
    usize::from(prefix).div_ceil(8)
}

fn max_prefix(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask_address(address: IpAddr, prefix: u8) -> IpAddr {
    match address {
        IpAddr::V4(v4) => {
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
        }
        IpAddr::V6(v6) => {
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
        }
    }
}

impl fmt::Display for EdnsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nsid(data) => {
                write!(f, "NSID: {}", HEXUPPER.encode(data))?;
                if data.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                    write!(f, " (\"{}\")", String::from_utf8_lossy(data))?;
                }
                Ok(())
            }
            Self::ClientSubnet {
                source_prefix,
                scope_prefix,
                address,
            } => write!(f, "CLIENT-SUBNET: {address}/{source_prefix}/{scope_prefix}"),
            Self::Cookie { client, server } => {
                write!(f, "COOKIE: {}", HEXUPPER.encode(client))?;
                if let Some(server) = server {
                    write!(f, "{}", HEXUPPER.encode(server))?;
                }
                Ok(())
            }
            Self::TcpKeepalive(Some(timeout)) => write!(f, "TCP-KEEPALIVE: {timeout}"),
            Self::TcpKeepalive(None) => f.write_str("TCP-KEEPALIVE"),
            Self::Padding(data) => write!(f, "PADDING: {} bytes", data.len()),
            Self::ExtendedError {
                info_code,
                extra_text,
            } => {
                write!(f, "EDE: {info_code}")?;
                if !extra_text.is_empty() {
                    write!(f, " (\"{extra_text}\")")?;
                }
                Ok(())
            }
            Self::Unknown { code, data } => {
                write!(f, "OPT={code}: {}", HEXUPPER.encode(data))
            }
        }
    }
}

/// EDNS(0) OPT pseudo-RR data.
///
/// The OPT record is placed in the additional section and carries
/// EDNS information including version, flags, and options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edns {
    version: u8,
    udp_size: u16,
    /// Upper 8 bits of the 12-bit response code.
    extended_rcode: u8,
    /// Flag bits from the OPT TTL, DO included.
    flags: u16,
    options: SmallVec<[EdnsOption; 2]>,
}

impl Edns {
    /// Default UDP payload size for EDNS.
    pub const DEFAULT_UDP_SIZE: u16 = crate::DEFAULT_EDNS_UDP_SIZE;

    /// Creates a version 0 EDNS block with the default payload size.
    pub fn new() -> Self {
        Self {
            version: 0,
            udp_size: Self::DEFAULT_UDP_SIZE,
            extended_rcode: 0,
            flags: 0,
            options: SmallVec::new(),
        }
    }

    /// Sets the advertised UDP payload size.
    ///
    /// Sizes below 512 are raised to 512.
    #[must_use]
    pub fn with_udp_size(mut self, size: u16) -> Self {
        self.set_udp_size(size);
        self
    }

    /// Returns the EDNS version.
    #[inline]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Sets the EDNS version.
    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    /// Returns the advertised UDP payload size.
    #[inline]
    pub const fn udp_size(&self) -> u16 {
        self.udp_size
    }

    /// Sets the UDP payload size.
    pub fn set_udp_size(&mut self, size: u16) {
        self.udp_size = size.max(crate::MAX_UDP_MESSAGE_SIZE as u16);
    }

    /// Returns the extended RCODE.
    #[inline]
    pub const fn extended_rcode(&self) -> u8 {
        self.extended_rcode
    }

    /// Sets the extended RCODE.
    pub fn set_extended_rcode(&mut self, rcode: u8) {
        self.extended_rcode = rcode;
    }

    /// Returns true if the DNSSEC OK flag is set.
    #[inline]
    pub const fn dnssec_ok(&self) -> bool {
        self.flags & FLAG_DNSSEC_OK != 0
    }

    /// Sets the DNSSEC OK flag.
    pub fn set_dnssec_ok(&mut self, ok: bool) {
        if ok {
            self.flags |= FLAG_DNSSEC_OK;
        } else {
            self.flags &= !FLAG_DNSSEC_OK;
        }
    }

    /// Returns the raw flag bits.
    #[inline]
    pub const fn flags(&self) -> u16 {
        self.flags
    }

    /// Returns the EDNS options.
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Adds an option.
    pub fn add_option(&mut self, option: EdnsOption) {
        self.options.push(option);
    }

    /// Returns the first option with the given code.
    pub fn option(&self, code: u16) -> Option<&EdnsOption> {
        self.options.iter().find(|o| o.code() == code)
    }

    /// Returns the client cookie if present.
    pub fn cookie(&self) -> Option<&[u8; 8]> {
        self.options.iter().find_map(|o| match o {
            EdnsOption::Cookie { client, .. } => Some(client),
            _ => None,
        })
    }

    /// Returns the server cookie if present.
    pub fn server_cookie(&self) -> Option<&[u8]> {
        self.options.iter().find_map(|o| match o {
            EdnsOption::Cookie { server, .. } => server.as_deref(),
            _ => None,
        })
    }

    /// Returns the Extended DNS Error if present.
    pub fn extended_error(&self) -> Option<(u16, &str)> {
        self.options.iter().find_map(|o| match o {
            EdnsOption::ExtendedError {
                info_code,
                extra_text,
            } => Some((*info_code, extra_text.as_str())),
            _ => None,
        })
    }

    /// Decodes EDNS from an OPT record's class, TTL and RDATA.
    pub fn decode(class: u16, ttl: u32, rdata: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(rdata);
        let mut options = SmallVec::new();
        while !reader.is_empty() {
            options.push(EdnsOption::decode(&mut reader)?);
        }

        Ok(Self {
            version: (ttl >> 16) as u8,
            udp_size: class,
            extended_rcode: (ttl >> 24) as u8,
            flags: ttl as u16,
            options,
        })
    }

    /// Decodes EDNS from an OPT record.
    pub fn from_record(record: &ResourceRecord) -> Result<Self> {
        if !record.rtype().is(RecordType::OPT) {
            return Err(Error::invalid_argument(format!(
                "{} record is not OPT",
                record.rtype()
            )));
        }
        if !record.name().is_root() {
            return Err(Error::invalid_data(0, "OPT owner is not the root"));
        }
        let rdata = match record.rdata() {
            RData::Unknown(raw) => raw.data(),
            _ => return Err(Error::invalid_data(0, "OPT rdata is not raw")),
        };
        Self::decode(record.rclass().to_u16(), record.ttl(), rdata)
    }

    /// Returns the OPT TTL field.
    pub fn ttl(&self) -> u32 {
        u32::from(self.extended_rcode) << 24 | u32::from(self.version) << 16 | u32::from(self.flags)
    }

    /// Returns the length of the OPT RDATA.
    pub fn rdata_len(&self) -> usize {
        self.options.iter().map(EdnsOption::wire_len).sum()
    }

    /// Returns the full wire length of the OPT record.
    pub fn wire_len(&self) -> usize {
        // root name, type, class, ttl, rdlength
        1 + 2 + 2 + 4 + 2 + self.rdata_len()
    }

    /// Builds the OPT record.
    pub fn to_record(&self) -> Result<ResourceRecord> {
        let mut writer = WireWriter::new(self.rdata_len());
        for option in &self.options {
            option.encode(&mut writer)?;
        }
        Ok(ResourceRecord::new(
            Name::root(),
            Type::Known(RecordType::OPT),
            Class::from_u16(self.udp_size),
            self.ttl(),
            RData::Unknown(Unknown::new(writer.into_bytes().to_vec())),
        ))
    }
}

impl Default for Edns {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Edns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "; EDNS: version: {}, flags:{}; udp: {}",
            self.version,
            if self.dnssec_ok() { " do" } else { "" },
            self.udp_size
        )?;

        for option in &self.options {
            write!(f, "\n; {option}")?;
        }

        Ok(())
    }
}
