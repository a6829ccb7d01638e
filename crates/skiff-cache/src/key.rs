//! Cache keys.

use skiff_proto::{Class, Name, Question, RRset, Type};
use std::fmt;

/// Identifies one cache entry: owner, type and class.
///
/// The owner is lowercased on construction so the key prints the same
/// however the record's owner was cased on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: Name,
    rtype: Type,
    rclass: Class,
}

impl CacheKey {
    /// Creates a key.
    pub fn new(name: &Name, rtype: Type, rclass: Class) -> Self {
        Self {
            name: name.lowercased(),
            rtype,
            rclass,
        }
    }

    /// Keys the answer to `question`.
    pub fn from_question(question: &Question) -> Self {
        Self::new(&question.qname, question.qtype, question.qclass)
    }

    /// Keys the slot `rrset` is stored in.
    pub fn from_rrset(rrset: &RRset) -> Self {
        Self::new(rrset.name(), rrset.rtype(), rrset.rclass())
    }

    /// Returns the lowercased owner.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the type.
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the class.
    pub fn rclass(&self) -> Class {
        self.rclass
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.rclass, self.rtype)
    }
}
