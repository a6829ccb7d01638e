//! # Skiff DNS Protocol Library
//!
//! This crate provides DNS protocol types, wire format encoding and
//! decoding, and presentation-format parsing following RFC 1035 and its
//! extensions.
//!
//! ## Features
//!
//! - **RFC 1035 wire format** with name compression on write and
//!   pointer-loop protection on read
//! - **Bounded cursors**: rdata is decoded inside an RDLENGTH window
//! - **EDNS0 support** (RFC 6891) with OPT pseudo-RR
//! - **Common record types** with wire, canonical and text codecs, plus
//!   RFC 3597 generic rdata for everything else
//! - **TSIG** (RFC 8945) signing and verification over a pluggable signer
//! - **Size-limited serialization** that sets TC instead of overflowing
//!
//! ## Example
//!
//! ```rust,ignore
//! use skiff_proto::{Message, Question, Name};
//!
//! // Build a DNS query
//! let query = Message::query(Question::a("example.com.".parse()?));
//!
//! // Serialize to wire format
//! let wire_bytes = query.to_wire()?;
//!
//! // Parse a DNS message from wire format
//! let message = Message::parse(&wire_bytes)?;
//! println!("{message}");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod compress;
pub mod edns;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod opcode;
pub mod options;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
mod registry;
pub mod rtype;
pub mod text;
pub mod tsig;
pub mod wire;

// Re-exports for convenience
pub use class::{Class, RecordClass};
pub use compress::CompressionTable;
pub use edns::{Edns, EdnsOption};
pub use error::{Error, ErrorKind, Result};
pub use header::{Header, HeaderFlags, Section};
pub use message::Message;
pub use name::Name;
pub use opcode::OpCode;
pub use options::Options;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::{RRset, ResourceRecord};
pub use rtype::{RecordType, Type};
pub use text::Tokenizer;
pub use tsig::{HmacAlgorithm, HmacSigner, TsigKey, TsigSigner};
pub use wire::{WireReader, WireWriter};

/// Maximum length of a DNS label (63 bytes per RFC 1035)
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a domain name (255 bytes per RFC 1035)
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum number of labels in a name, root label included
pub const MAX_LABELS: usize = 128;

/// Maximum size of a UDP DNS message without EDNS0 (512 bytes per RFC 1035)
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

/// Default EDNS0 UDP payload size (4096 bytes)
pub const DEFAULT_EDNS_UDP_SIZE: u16 = 4096;

/// DNS port (53)
pub const DNS_PORT: u16 = 53;
