//! DNS protocol error types.
//!
//! Every failure raised by the codec is an [`Error`]. Callers that only need
//! to decide what to do with a failure (drop the message, answer FORMERR,
//! report bad input to a user) can match on [`Error::kind`] instead of the
//! individual variants.

use thiserror::Error;

/// Result type alias for DNS protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of codec errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad presentation-format (zone file style) input.
    TextParse,
    /// Malformed, truncated or inconsistent binary input.
    WireParse,
    /// A name or label exceeded a length limit while being constructed.
    NameTooLong,
    /// A relative name was used where an absolute one is required.
    RelativeName,
    /// A caller passed a value outside its permitted range.
    InvalidArgument,
    /// Output did not fit into the available space.
    Encode,
    /// Transaction signature failure.
    Tsig,
}

/// DNS protocol errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Wire Format Parsing Errors
    // =========================================================================
    /// A read would cross the end of the readable window.
    #[error("truncated input at offset {offset}: {needed} more bytes required")]
    Truncated {
        /// Offset where the read started.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
    },

    /// Buffer is too short to contain the expected data.
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum size.
        expected: usize,
        /// Actual buffer size.
        actual: usize,
    },

    /// A cursor jump targeted a position outside the buffer.
    #[error("cannot jump to offset {target}: buffer is {len} bytes")]
    InvalidJump {
        /// Requested position.
        target: usize,
        /// Buffer length.
        len: usize,
    },

    /// Invalid data encountered during parsing.
    #[error("invalid data at offset {offset}: {message}")]
    InvalidData {
        /// Byte offset of the invalid data.
        offset: usize,
        /// Description of the error.
        message: String,
    },

    /// Invalid compression pointer.
    #[error("invalid compression pointer at offset {offset}: points to {target}")]
    InvalidCompressionPointer {
        /// Offset of the pointer.
        offset: usize,
        /// Target offset the pointer references.
        target: usize,
    },

    /// Too many compression pointer jumps.
    #[error("too many compression pointer jumps (>{max_jumps})")]
    TooManyCompressionJumps {
        /// Maximum allowed jumps.
        max_jumps: usize,
    },

    /// A label length byte used one of the reserved label types.
    #[error("invalid label type 0x{byte:02X} at offset {offset}")]
    InvalidLabelType {
        /// Offset of the length byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    // =========================================================================
    // Buffer Writing Errors
    // =========================================================================
    /// Buffer overflow during serialization.
    #[error("buffer overflow: cannot write {needed} bytes to buffer with {available} available")]
    BufferOverflow {
        /// Bytes needed to write.
        needed: usize,
        /// Available space in buffer.
        available: usize,
    },

    /// Counted string longer than 255 bytes.
    #[error("string too long: {length} bytes exceeds maximum of 255")]
    StringTooLong {
        /// Actual string length.
        length: usize,
    },

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum of {max_size}")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    // =========================================================================
    // Domain Name Errors
    // =========================================================================
    /// Label exceeds maximum length of 63 bytes.
    #[error("label too long: {length} bytes exceeds maximum of 63")]
    LabelTooLong {
        /// Actual label length.
        length: usize,
    },

    /// Domain name exceeds maximum length of 255 bytes.
    #[error("name too long: {length} bytes exceeds maximum of 255")]
    NameTooLong {
        /// Actual name length in wire format.
        length: usize,
    },

    /// Domain name has more than 128 labels.
    #[error("too many labels: {count} exceeds maximum of 128")]
    TooManyLabels {
        /// Number of labels.
        count: usize,
    },

    /// Empty label in the middle of a domain name.
    #[error("empty label at position {position} (only allowed at end for root)")]
    EmptyLabel {
        /// Position of the empty label.
        position: usize,
    },

    /// Presentation-format name that could not be parsed.
    #[error("invalid name \"{text}\": {message}")]
    BadName {
        /// The input text.
        text: String,
        /// Error description.
        message: String,
    },

    /// A relative name was used where an absolute name is required.
    #[error("relative name {name} where an absolute name is required")]
    RelativeName {
        /// The offending name.
        name: String,
    },

    // =========================================================================
    // Header Errors
    // =========================================================================
    /// A section count would leave the 16-bit range.
    #[error("{section} count {direction}")]
    CountOutOfRange {
        /// Section name.
        section: &'static str,
        /// "overflow" or "underflow".
        direction: &'static str,
    },

    /// Generic out-of-range argument.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the error.
        message: String,
    },

    // =========================================================================
    // RDATA Errors
    // =========================================================================
    /// RDATA length mismatch.
    #[error("RDATA length mismatch for {rtype}: expected {expected}, got {actual}")]
    RDataLengthMismatch {
        /// Record type.
        rtype: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Invalid RDATA content.
    #[error("invalid RDATA for {rtype}: {message}")]
    InvalidRData {
        /// Record type.
        rtype: String,
        /// Error description.
        message: String,
    },

    // =========================================================================
    // Presentation Format Errors
    // =========================================================================
    /// Bad presentation-format input.
    #[error("line {line}: {message}")]
    TextParse {
        /// One-based line number.
        line: usize,
        /// Error description.
        message: String,
    },

    // =========================================================================
    // EDNS Errors
    // =========================================================================
    /// Invalid EDNS option.
    #[error("invalid EDNS option {code}: {message}")]
    InvalidEdnsOption {
        /// Option code.
        code: u16,
        /// Error description.
        message: String,
    },

    /// Multiple OPT records in message.
    #[error("multiple OPT records in message (only one allowed)")]
    MultipleOptRecords,

    /// OPT record in wrong section.
    #[error("OPT record found in {section} section (must be in additional)")]
    OptInWrongSection {
        /// Section where OPT was found.
        section: String,
    },

    /// EDNS version other than 0.
    #[error("unsupported EDNS version {version}")]
    UnsupportedEdnsVersion {
        /// The version received.
        version: u8,
    },

    // =========================================================================
    // TSIG Errors
    // =========================================================================
    /// TSIG record present but not the last additional record.
    #[error("TSIG record is not the last record in the message")]
    TsigNotLast,

    /// Verification requested on a message without TSIG.
    #[error("message is not signed")]
    TsigMissing,

    /// Key name or algorithm does not match the verifying key.
    #[error("TSIG key {name} not recognized")]
    TsigBadKey {
        /// Key name from the message.
        name: String,
    },

    /// MAC did not verify.
    #[error("TSIG signature verification failed")]
    TsigBadSig,

    /// Signature time outside the permitted fudge window.
    #[error("TSIG time {time_signed} outside fudge window around {now}")]
    TsigBadTime {
        /// Time signed from the record.
        time_signed: u64,
        /// Local time at verification.
        now: u64,
    },

    /// The signer failed to produce a MAC.
    #[error("TSIG signing failed: {message}")]
    TsigSign {
        /// Error description.
        message: String,
    },
}

impl Error {
    /// Creates a new `Truncated` error.
    #[inline]
    pub fn truncated(offset: usize, needed: usize) -> Self {
        Self::Truncated { offset, needed }
    }

    /// Creates a new `BufferTooShort` error.
    #[inline]
    pub fn buffer_too_short(expected: usize, actual: usize) -> Self {
        Self::BufferTooShort { expected, actual }
    }

    /// Creates a new `BufferOverflow` error.
    #[inline]
    pub fn buffer_overflow(needed: usize, available: usize) -> Self {
        Self::BufferOverflow { needed, available }
    }

    /// Creates a new `InvalidData` error.
    #[inline]
    pub fn invalid_data(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidData {
            offset,
            message: message.into(),
        }
    }

    /// Creates a new `LabelTooLong` error.
    #[inline]
    pub fn label_too_long(length: usize) -> Self {
        Self::LabelTooLong { length }
    }

    /// Creates a new `NameTooLong` error.
    #[inline]
    pub fn name_too_long(length: usize) -> Self {
        Self::NameTooLong { length }
    }

    /// Creates a new `BadName` error.
    #[inline]
    pub fn bad_name(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadName {
            text: text.into(),
            message: message.into(),
        }
    }

    /// Creates a new `RelativeName` error.
    #[inline]
    pub fn relative_name(name: impl ToString) -> Self {
        Self::RelativeName {
            name: name.to_string(),
        }
    }

    /// Creates a new `InvalidArgument` error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRData` error.
    #[inline]
    pub fn invalid_rdata(rtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRData {
            rtype: rtype.into(),
            message: message.into(),
        }
    }

    /// Creates a new `TextParse` error.
    #[inline]
    pub fn text_parse(line: usize, message: impl Into<String>) -> Self {
        Self::TextParse {
            line,
            message: message.into(),
        }
    }

    /// Creates a new `TsigSign` error, for [`TsigSigner`](crate::TsigSigner)
    /// implementations.
    #[inline]
    pub fn tsig_sign(message: impl Into<String>) -> Self {
        Self::TsigSign {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidEdnsOption` error.
    #[inline]
    pub fn invalid_edns_option(code: u16, message: impl Into<String>) -> Self {
        Self::InvalidEdnsOption {
            code,
            message: message.into(),
        }
    }

    /// Returns the broad classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Truncated { .. }
            | Self::BufferTooShort { .. }
            | Self::InvalidJump { .. }
            | Self::InvalidData { .. }
            | Self::InvalidCompressionPointer { .. }
            | Self::TooManyCompressionJumps { .. }
            | Self::InvalidLabelType { .. }
            | Self::RDataLengthMismatch { .. }
            | Self::InvalidRData { .. }
            | Self::InvalidEdnsOption { .. }
            | Self::MultipleOptRecords
            | Self::OptInWrongSection { .. }
            | Self::UnsupportedEdnsVersion { .. }
            | Self::TsigNotLast => ErrorKind::WireParse,

            Self::TextParse { .. } | Self::EmptyLabel { .. } | Self::BadName { .. } => {
                ErrorKind::TextParse
            }

            Self::LabelTooLong { .. } | Self::NameTooLong { .. } | Self::TooManyLabels { .. } => {
                ErrorKind::NameTooLong
            }

            Self::RelativeName { .. } => ErrorKind::RelativeName,

            Self::CountOutOfRange { .. } | Self::InvalidArgument { .. } => {
                ErrorKind::InvalidArgument
            }

            Self::BufferOverflow { .. }
            | Self::StringTooLong { .. }
            | Self::MessageTooLarge { .. } => ErrorKind::Encode,

            Self::TsigMissing
            | Self::TsigBadKey { .. }
            | Self::TsigBadSig
            | Self::TsigBadTime { .. }
            | Self::TsigSign { .. } => ErrorKind::Tsig,
        }
    }

    /// Returns true if this error indicates malformed wire input that should
    /// be dropped.
    #[inline]
    pub fn is_wire_parse(&self) -> bool {
        self.kind() == ErrorKind::WireParse
    }

    /// Returns true if this error comes from presentation-format input.
    #[inline]
    pub fn is_text_parse(&self) -> bool {
        self.kind() == ErrorKind::TextParse
    }
}
