//! Labels: the dot-separated components of a name.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

/// A borrowed view of one label, without its length octet.
///
/// Equality and ordering ignore ASCII case; ordering is the RFC 4034
/// section 6.1 canonical order.
#[derive(Clone, Copy)]
pub struct Label<'a>(&'a [u8]);

impl<'a> Label<'a> {
    /// Wraps raw label bytes.
    #[inline]
    pub const fn from_bytes(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Returns the length in octets.
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty root label.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares with ASCII case folded.
    #[inline]
    pub fn eq_ignore_ascii_case(&self, other: &Label<'_>) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }

    /// Canonical order: case-folded octet strings, a prefix sorting first.
    pub fn cmp_canonical(&self, other: &Label<'_>) -> Ordering {
        match self.0.iter().zip(other.0).find(|(a, b)| !a.eq_ignore_ascii_case(b)) {
            Some((a, b)) => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
            None => self.len().cmp(&other.len()),
        }
    }
}

/// Writes one label octet in presentation form.
///
/// Printable ASCII passes through except for the characters that are
/// special in master files, which get a backslash. Everything else
/// becomes `\DDD`.
pub(crate) fn write_escaped(f: &mut impl fmt::Write, byte: u8) -> fmt::Result {
    const SPECIAL: &[u8] = b".\\\"();@$";
    if SPECIAL.contains(&byte) {
        write!(f, "\\{}", char::from(byte))
    } else if byte.is_ascii_graphic() {
        f.write_char(char::from(byte))
    } else {
        write!(f, "\\{byte:03}")
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|&byte| write_escaped(f, byte))
    }
}

impl fmt::Debug for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Label").field(&self.to_string()).finish()
    }
}

impl PartialEq for Label<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl Eq for Label<'_> {}

impl PartialOrd for Label<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_canonical(other)
    }
}

/// Walks the labels of an uncompressed wire name.
///
/// An absolute name ends with its empty root label; a relative one ends
/// after its last label.
#[derive(Clone)]
pub struct LabelIter<'a> {
    rest: &'a [u8],
}

impl<'a> LabelIter<'a> {
    /// Starts at the first length octet of `wire`.
    #[inline]
    pub fn new(wire: &'a [u8]) -> Self {
        Self { rest: wire }
    }
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Label<'a>> {
        let (&len, tail) = self.rest.split_first()?;
        let len = usize::from(len);
        let label = tail.get(..len)?;
        self.rest = if len == 0 { &[] } else { &tail[len..] };
        Some(Label(label))
    }
}

impl FusedIterator for LabelIter<'_> {}
