//! DNS domain name representation and operations.
//!
//! This module provides an implementation of DNS domain names following
//! RFC 1035 and RFC 2181. It supports:
//!
//! - Absolute and relative names
//! - Wire format decoding with compression pointer handling
//! - Presentation format with `\X` and `\DDD` escapes
//! - Case-insensitive comparison per DNS semantics
//! - Structural operations (concatenate, relativize, wildcard substitution)

mod label;
mod text;
mod wire;

pub use label::{Label, LabelIter};
pub use wire::MAX_COMPRESSION_JUMPS;

use crate::error::{Error, Result};
use crate::{MAX_LABELS, MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Storage for the uncompressed wire form of a name.
///
/// Most domain names fit within 64 bytes.
pub(crate) type NameBuf = SmallVec<[u8; 64]>;

/// A DNS domain name.
///
/// Domain names in DNS are sequences of labels separated by dots. Each label
/// can be up to 63 bytes, and the entire name (in wire format) can be up to
/// 255 bytes including length bytes and the root label.
///
/// # Wire Format
///
/// In wire format, a domain name is encoded as a sequence of labels, each
/// prefixed by a length byte, terminated by a zero-length label (the root).
/// For example, `www.example.com.` is encoded as:
///
/// ```text
/// 03 'w' 'w' 'w' 07 'e' 'x' 'a' 'm' 'p' 'l' 'e' 03 'c' 'o' 'm' 00
/// ```
///
/// A relative name is stored the same way without the terminating zero.
/// Relative names cannot be written to the wire.
///
/// # Comparison Semantics
///
/// DNS names are compared case-insensitively per RFC 1035. The hash and
/// equality implementations respect this requirement. Ordering is the
/// canonical ordering of RFC 4034 section 6.1.
///
/// # Example
///
/// ```rust
/// use skiff_proto::name::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("www.example.com.").unwrap();
/// assert_eq!(name.label_count(), 4); // www, example, com, root
/// assert!(name.is_absolute());
///
/// // Case-insensitive comparison
/// assert_eq!(Name::from_str("WWW.EXAMPLE.COM.").unwrap(), name);
/// ```
#[derive(Clone)]
pub struct Name {
    /// The uncompressed wire-format representation.
    wire: NameBuf,
    /// Number of labels (including root for absolute names).
    label_count: u8,
}

impl Name {
    /// Creates the root domain name.
    #[inline]
    pub fn root() -> Self {
        let mut wire = NameBuf::new();
        wire.push(0);
        Self {
            wire,
            label_count: 1,
        }
    }

    /// Creates the empty relative name, written `@` in presentation format.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            wire: SmallVec::new_const(),
            label_count: 0,
        }
    }

    /// Builds a name from raw label bytes.
    ///
    /// Labels must be non-empty; an absolute name gets the root label
    /// appended.
    pub fn from_labels<I, L>(labels: I, absolute: bool) -> Result<Self>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut wire = NameBuf::new();
        let mut count = 0usize;

        for (position, label) in labels.into_iter().enumerate() {
            let label = label.as_ref();
            if label.is_empty() {
                return Err(Error::EmptyLabel { position });
            }
            push_label(&mut wire, label)?;
            count += 1;
        }

        if absolute {
            wire.push(0);
            count += 1;
        }

        Self::checked(wire, count)
    }

    /// Creates a name from uncompressed wire bytes.
    ///
    /// The slice must hold exactly one name; pointers are not allowed.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let mut count = 0usize;

        while pos < slice.len() {
            let len = slice[pos] as usize;
            if len & 0xC0 != 0 {
                return Err(Error::InvalidLabelType {
                    offset: pos,
                    byte: slice[pos],
                });
            }

            count += 1;
            pos += 1 + len;
            if len == 0 {
                break;
            }
        }

        if pos != slice.len() {
            return Err(Error::invalid_data(pos, "trailing bytes after name"));
        }

        Self::checked(NameBuf::from_slice(slice), count)
    }

    /// Validates the global length limits.
    fn checked(wire: NameBuf, count: usize) -> Result<Self> {
        if wire.len() > MAX_NAME_LENGTH {
            return Err(Error::name_too_long(wire.len()));
        }
        if count > MAX_LABELS {
            return Err(Error::TooManyLabels { count });
        }
        Ok(Self {
            wire,
            // Bounded by MAX_LABELS above.
            label_count: count as u8,
        })
    }

    /// Returns the wire format representation.
    ///
    /// For relative names there is no terminating zero.
    #[inline]
    pub fn as_wire(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len()
    }

    /// Returns the number of labels in the name (including root).
    #[inline]
    pub const fn label_count(&self) -> usize {
        self.label_count as usize
    }

    /// Returns true if this is the root domain.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.wire.as_slice() == [0]
    }

    /// Returns true if this is the empty relative name.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wire.is_empty()
    }

    /// Returns true if the name ends with the root label.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.wire.last() == Some(&0)
    }

    /// Same as [`is_absolute`](Self::is_absolute).
    #[inline]
    pub fn is_fqdn(&self) -> bool {
        self.is_absolute()
    }

    /// Returns true if the leftmost label is `*`.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.wire.starts_with(&[1, b'*'])
    }

    /// Returns an iterator over the labels in the name.
    #[inline]
    pub fn labels(&self) -> LabelIter<'_> {
        LabelIter::new(&self.wire)
    }

    /// Returns the label at the given index (0 = leftmost label).
    pub fn label(&self, index: usize) -> Option<Label<'_>> {
        self.labels().nth(index)
    }

    /// Offset of each label in the wire form.
    fn label_offsets(&self) -> SmallVec<[usize; 16]> {
        let mut offsets = SmallVec::new();
        let mut pos = 0;
        while pos < self.wire.len() {
            offsets.push(pos);
            let len = self.wire[pos] as usize;
            if len == 0 {
                break;
            }
            pos += 1 + len;
        }
        offsets
    }

    /// Returns the name with the leftmost `n` labels removed.
    fn suffix(&self, n: usize) -> Self {
        let start = self
            .label_offsets()
            .get(n)
            .copied()
            .unwrap_or(self.wire.len());
        Self {
            wire: NameBuf::from_slice(&self.wire[start..]),
            label_count: self.label_count.saturating_sub(n as u8),
        }
    }

    /// Returns the parent domain (removes the leftmost label).
    ///
    /// Returns `None` for the root domain and for single-label relative
    /// names.
    pub fn parent(&self) -> Option<Self> {
        if self.label_count <= 1 {
            return None;
        }
        Some(self.suffix(1))
    }

    /// Returns the subdomain formed by prepending a label.
    pub fn prepend_label(&self, label: impl AsRef<[u8]>) -> Result<Self> {
        let label = label.as_ref();
        if label.is_empty() {
            return Err(Error::EmptyLabel { position: 0 });
        }

        let mut wire = NameBuf::with_capacity(1 + label.len() + self.wire.len());
        push_label(&mut wire, label)?;
        wire.extend_from_slice(&self.wire);
        Self::checked(wire, self.label_count() + 1)
    }

    /// Appends `suffix` to this name.
    ///
    /// The prefix must be relative since nothing can follow the root label.
    pub fn concatenate(&self, suffix: &Name) -> Result<Self> {
        if self.is_absolute() {
            return Err(Error::invalid_argument(format!(
                "cannot append to absolute name {self}"
            )));
        }

        let mut wire = NameBuf::with_capacity(self.wire.len() + suffix.wire.len());
        wire.extend_from_slice(&self.wire);
        wire.extend_from_slice(&suffix.wire);
        Self::checked(wire, self.label_count() + suffix.label_count())
    }

    /// Makes the name absolute by appending the root label.
    pub fn to_absolute(&self) -> Result<Self> {
        if self.is_absolute() {
            return Ok(self.clone());
        }
        self.concatenate(&Self::root())
    }

    /// Strips `origin` from the end of the name.
    ///
    /// Returns a relative name, [`Name::empty`] when the name equals the
    /// origin, or an unchanged copy when the name is not below `origin`.
    #[must_use]
    pub fn relativize(&self, origin: &Name) -> Self {
        if !origin.is_absolute() || !self.is_subdomain_of(origin) {
            return self.clone();
        }

        let keep = self.label_count() - origin.label_count();
        let end = self
            .label_offsets()
            .get(keep)
            .copied()
            .unwrap_or(self.wire.len());
        Self {
            wire: NameBuf::from_slice(&self.wire[..end]),
            label_count: keep as u8,
        }
    }

    /// Replaces the leftmost `n` labels with a single `*` label.
    pub fn wild(&self, n: usize) -> Result<Self> {
        let labels = self.label_count() - usize::from(self.is_absolute());
        if n == 0 || n > labels {
            return Err(Error::invalid_argument(format!(
                "cannot replace {n} labels of {self} with a wildcard"
            )));
        }
        self.suffix(n).prepend_label(b"*")
    }

    /// Returns true if this name is equal to or below `other`.
    ///
    /// Both names must share absoluteness.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if self.label_count() < other.label_count() || self.is_absolute() != other.is_absolute() {
            return false;
        }

        let skip = self.label_count() - other.label_count();
        self.labels()
            .skip(skip)
            .zip(other.labels())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }

    /// Converts the name to lowercase in place.
    pub fn to_lowercase(&mut self) {
        self.wire.make_ascii_lowercase();
    }

    /// Returns a lowercased copy of the name.
    #[must_use]
    pub fn lowercased(&self) -> Self {
        let mut copy = self.clone();
        copy.to_lowercase();
        copy
    }

    /// Returns the canonical (lowercased) form per RFC 4034 section 6.2.
    #[must_use]
    pub fn canonical(&self) -> Self {
        self.lowercased()
    }

    /// Returns the uncompressed, lowercased wire form.
    pub fn to_canonical_wire(&self) -> NameBuf {
        let mut wire = self.wire.clone();
        wire.make_ascii_lowercase();
        wire
    }

    /// Calculates a hash using lowercase comparison.
    fn lowercase_hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.label_count);
        for byte in &self.wire {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

/// Appends one length-prefixed label.
pub(crate) fn push_label(wire: &mut NameBuf, label: &[u8]) -> Result<()> {
    if label.len() > MAX_LABEL_LENGTH {
        return Err(Error::label_too_long(label.len()));
    }
    wire.push(label.len() as u8);
    wire.extend_from_slice(label);
    Ok(())
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a domain name from a string.
    ///
    /// The string should be in the standard dotted format (e.g.,
    /// `www.example.com.`). A trailing dot indicates a fully-qualified domain
    /// name. If no trailing dot is present, one is implied.
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, Some(&Self::root()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        if self.is_empty() {
            return f.write_str("@");
        }

        let mut first = true;
        for label in self.labels() {
            if label.is_empty() {
                f.write_str(".")?;
                break;
            }
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{label}")?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{self}\")")
    }
}

impl PartialEq for Name {
    /// Case-insensitive comparison per DNS semantics.
    fn eq(&self, other: &Self) -> bool {
        self.label_count == other.label_count && self.wire.eq_ignore_ascii_case(&other.wire)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lowercase_hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    /// Canonical DNS name ordering per RFC 4034.
    fn cmp(&self, other: &Self) -> Ordering {
        let self_labels: SmallVec<[Label<'_>; 16]> = self.labels().collect();
        let other_labels: SmallVec<[Label<'_>; 16]> = other.labels().collect();

        // Compare from right to left (root first)
        for (a, b) in self_labels.iter().rev().zip(other_labels.iter().rev()) {
            let cmp = a.cmp_canonical(b);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        self_labels.len().cmp(&other_labels.len())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn test_root_name() {
        let root = Name::root();
        assert!(root.is_root());
        assert!(root.is_absolute());
        assert_eq!(root.label_count(), 1);
        assert_eq!(root.to_string(), ".");
        assert_eq!(root.as_wire(), &[0]);
    }

    #[test]
    fn test_name_parsing() {
        let n = name("www.example.com.");
        assert!(!n.is_root());
        assert!(n.is_absolute());
        assert_eq!(n.label_count(), 4);
        assert_eq!(n.to_string(), "www.example.com.");

        // Without trailing dot
        assert_eq!(n, name("www.example.com"));
    }

    #[test]
    fn test_case_insensitive_comparison() {
        let lower = name("www.example.com");
        let upper = name("WWW.EXAMPLE.COM");
        let mixed = name("Www.ExAmPlE.CoM");

        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
        // Display keeps the original case.
        assert_eq!(mixed.to_string(), "Www.ExAmPlE.CoM.");

        let mut set = hashbrown::HashSet::new();
        set.insert(lower);
        assert!(set.contains(&upper));
    }

    #[test]
    fn test_label_iteration() {
        let n = name("www.example.com");
        let labels: Vec<_> = n.labels().map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["www", "example", "com", ""]);
    }

    #[test]
    fn test_parent() {
        let n = name("www.example.com");

        let parent1 = n.parent().unwrap();
        assert_eq!(parent1.to_string(), "example.com.");

        let parent2 = parent1.parent().unwrap();
        assert_eq!(parent2.to_string(), "com.");

        let parent3 = parent2.parent().unwrap();
        assert!(parent3.is_root());

        assert!(parent3.parent().is_none());
    }

    #[test]
    fn test_subdomain_check() {
        let n = name("www.example.com");
        let parent = name("example.com");
        let other = name("other.com");

        assert!(n.is_subdomain_of(&parent));
        assert!(n.is_subdomain_of(&n));
        assert!(n.is_subdomain_of(&Name::root()));
        assert!(!parent.is_subdomain_of(&n));
        assert!(!n.is_subdomain_of(&other));
    }

    #[test]
    fn test_length_limits() {
        let label63 = "a".repeat(63);
        assert!(Name::from_str(&label63).is_ok());

        let label64 = "a".repeat(64);
        assert!(matches!(
            Name::from_str(&label64),
            Err(Error::LabelTooLong { length: 64 })
        ));

        // Four 62-byte labels plus root: 4 * 63 + 1 = 253 bytes.
        let l62 = "b".repeat(62);
        let ok = [l62.as_str(); 4].join(".");
        assert_eq!(name(&ok).wire_len(), 253);

        // Exactly 255 bytes: three 63-byte labels, one 61-byte label, root.
        let exact = format!("{label63}.{label63}.{label63}.{}", "c".repeat(61));
        assert_eq!(name(&exact).wire_len(), 255);

        let over = format!("{label63}.{label63}.{label63}.{}", "c".repeat(62));
        assert!(matches!(
            Name::from_str(&over),
            Err(Error::NameTooLong { length: 256 })
        ));

        // 128 one-byte labels need 257 bytes, so the byte limit trips first.
        let many = vec!["a"; 128].join(".");
        assert_eq!(
            Name::from_str(&many).unwrap_err().kind(),
            crate::error::ErrorKind::NameTooLong
        );
    }

    #[test]
    fn test_from_labels_and_slice() {
        let n = Name::from_labels(["www", "example", "com"], true).unwrap();
        assert_eq!(n, name("www.example.com."));

        let relative = Name::from_labels(["www"], false).unwrap();
        assert!(!relative.is_absolute());
        assert_eq!(relative.to_string(), "www");

        let wire = n.as_wire().to_vec();
        assert_eq!(Name::from_slice(&wire).unwrap(), n);
        assert!(Name::from_slice(&[3, b'a', b'b']).is_err());
        assert!(Name::from_labels(["a", ""], true).is_err());
    }

    #[test]
    fn test_prepend_label() {
        let n = name("example.com");
        let subdomain = n.prepend_label("www").unwrap();
        assert_eq!(subdomain.to_string(), "www.example.com.");
        assert_eq!(subdomain.label_count(), 4);
    }

    #[test]
    fn test_concatenate_and_relativize() {
        let origin = name("example.com.");
        let relative = Name::parse("www", None).unwrap();

        let full = relative.concatenate(&origin).unwrap();
        assert_eq!(full, name("www.example.com."));
        assert!(origin.concatenate(&origin).is_err());

        let back = full.relativize(&origin);
        assert_eq!(back, relative);
        assert!(!back.is_absolute());

        assert!(origin.relativize(&origin).is_empty());
        assert_eq!(origin.relativize(&origin).to_string(), "@");

        let unrelated = name("other.org.");
        assert_eq!(unrelated.relativize(&origin), unrelated);
    }

    #[test]
    fn test_wildcard_substitution() {
        let n = name("a.b.example.com.");
        let wild = n.wild(2).unwrap();
        assert_eq!(wild.to_string(), "*.example.com.");
        assert!(wild.is_wildcard());
        assert!(!n.is_wildcard());

        assert!(n.wild(0).is_err());
        assert!(n.wild(5).is_err());
    }

    #[test]
    fn test_canonical_ordering() {
        // RFC 4034 section 6.1 example, in canonical order.
        let ordered = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ];
        let names: Vec<Name> = ordered.iter().map(|s| name(s)).collect();

        let mut shuffled = names.clone();
        shuffled.reverse();
        shuffled.sort();
        assert_eq!(shuffled, names);
    }

    #[test]
    fn test_serde_as_string() {
        let n = name("mail.example.org.");
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"mail.example.org.\"");
        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
