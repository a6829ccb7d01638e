//! DNS question section.
//!
//! The question section contains queries for information.
//! Each question has a domain name, query type, and query class.

use crate::class::{Class, RecordClass};
use crate::compress::CompressionTable;
use crate::error::Result;
use crate::name::Name;
use crate::rtype::{RecordType, Type};
use crate::text::Tokenizer;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     QNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QTYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QCLASS                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The domain name being queried.
    pub qname: Name,

    /// The type of record being requested.
    pub qtype: Type,

    /// The class of the query (usually IN for Internet).
    pub qclass: Class,
}

impl Question {
    /// Creates a new question.
    #[inline]
    pub fn new(qname: Name, qtype: Type, qclass: Class) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates an IN-class question for a known type.
    #[inline]
    pub fn internet(qname: Name, qtype: RecordType) -> Self {
        Self::new(qname, Type::Known(qtype), Class::Known(RecordClass::IN))
    }

    /// Creates a question for an A record lookup.
    #[inline]
    pub fn a(name: Name) -> Self {
        Self::internet(name, RecordType::A)
    }

    /// Creates a question for an AAAA record lookup.
    #[inline]
    pub fn aaaa(name: Name) -> Self {
        Self::internet(name, RecordType::AAAA)
    }

    /// Decodes a question at the reader's position.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let qname = Name::decode(reader)?;
        let qtype = Type::from_u16(reader.read_u16()?);
        let qclass = Class::from_u16(reader.read_u16()?);
        Ok(Self {
            qname,
            qtype,
            qclass,
        })
    }

    /// Writes the question.
    pub fn encode(&self, writer: &mut WireWriter, compression: Option<&mut CompressionTable>) -> Result<()> {
        self.qname.encode(writer, compression, false)?;
        writer.write_u16(self.qtype.to_u16())?;
        writer.write_u16(self.qclass.to_u16())
    }

    /// Returns the uncompressed wire length.
    pub fn wire_len(&self) -> usize {
        self.qname.wire_len() + 4
    }

    /// Parses `name [class] type` (class and type in either order).
    pub fn parse_text(text: &str, origin: Option<&Name>) -> Result<Self> {
        let mut tokens = Tokenizer::new(text);
        let qname = tokens.get_name(origin)?;

        let mut qclass = None;
        let mut qtype = None;
        while !tokens.at_eol()? {
            let word = tokens.get_word()?;
            if qclass.is_none() {
                if let Ok(class) = word.parse::<Class>() {
                    qclass = Some(class);
                    continue;
                }
            }
            if qtype.is_none() {
                if let Ok(rtype) = word.parse::<Type>() {
                    qtype = Some(rtype);
                    continue;
                }
            }
            return Err(tokens.error(format!("unexpected \"{word}\" in question")));
        }

        let qtype = qtype.ok_or_else(|| tokens.error("question without a type"))?;
        Ok(Self::new(qname, qtype, qclass.unwrap_or_default()))
    }

    /// Returns true if this question matches a response question.
    ///
    /// Matching is case-insensitive for the name, and exact for type and class.
    pub fn matches(&self, other: &Question) -> bool {
        self.qname == other.qname && self.qtype == other.qtype && self.qclass == other.qclass
    }

    /// Returns true if a record would answer this question.
    pub fn is_answered_by(&self, name: &Name, rtype: Type, rclass: Class) -> bool {
        if &self.qname != name {
            return false;
        }

        if self.qclass != rclass && !matches!(self.qclass, Class::Known(RecordClass::ANY)) {
            return false;
        }

        self.qtype == rtype
            || matches!(self.qtype, Type::Known(RecordType::ANY))
            || (rtype.is_cname() && !self.qtype.is_cname())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname, self.qclass, self.qtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn test_question_roundtrip() {
        let original = Question::aaaa(name("www.example.com"));
        let mut writer = WireWriter::new(64);
        original.encode(&mut writer, None).unwrap();
        assert_eq!(writer.len(), original.wire_len());

        let bytes = writer.freeze();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(Question::decode(&mut reader).unwrap(), original);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_question_truncated() {
        let data = b"\x07example\x03com\x00\x00\x01\x00";
        let mut reader = WireReader::new(data);
        assert!(Question::decode(&mut reader).unwrap_err().is_wire_parse());
    }

    #[test]
    fn test_question_text() {
        let q = Question::parse_text("example.com. MX", None).unwrap();
        assert!(q.qtype.is(RecordType::MX));
        assert_eq!(q.qclass, Class::Known(RecordClass::IN));
        assert_eq!(q.to_string(), "example.com.\tIN\tMX");

        let origin = name("example.com.");
        let q = Question::parse_text("www CH TXT", Some(&origin)).unwrap();
        assert_eq!(q.qname, name("www.example.com."));
        assert_eq!(q.qclass, Class::Known(RecordClass::CH));

        assert!(Question::parse_text("example.com.", None).is_err());
        assert!(Question::parse_text("example.com. A A", None).is_err());
    }

    #[test]
    fn test_question_matching() {
        let q1 = Question::a(name("example.com"));
        let q2 = Question::a(name("EXAMPLE.COM"));
        let q3 = Question::aaaa(name("example.com"));

        assert!(q1.matches(&q2));
        assert!(!q1.matches(&q3));
    }

    #[test]
    fn test_is_answered_by() {
        let owner = name("example.com");
        let q = Question::a(owner.clone());
        let class_in = Class::Known(RecordClass::IN);

        assert!(q.is_answered_by(&owner, Type::Known(RecordType::A), class_in));
        assert!(q.is_answered_by(&owner, Type::Known(RecordType::CNAME), class_in));
        assert!(!q.is_answered_by(&owner, Type::Known(RecordType::AAAA), class_in));
        assert!(!q.is_answered_by(&name("other.com"), Type::Known(RecordType::A), class_in));
    }
}
