//! Name compression table used while writing a message.

use crate::name::NameBuf;
use hashbrown::HashMap;
use tracing::trace;

/// Highest offset a compression pointer can reach (14 bits).
pub const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Maps name suffixes already written to a message onto their offsets.
///
/// Keys are the lowercased, uncompressed wire form of each suffix, so
/// lookups are case-insensitive like name comparison.
#[derive(Debug, Clone, Default)]
pub struct CompressionTable {
    entries: HashMap<NameBuf, u16>,
    trace: bool,
}

impl CompressionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `trace!` events for every insert and hit.
    #[must_use]
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Looks up the offset of a previously written suffix.
    pub fn get(&self, suffix: &[u8]) -> Option<u16> {
        let key = lowercase(suffix);
        let offset = self.entries.get(&key).copied();
        if self.trace {
            if let Some(offset) = offset {
                trace!(offset, len = suffix.len(), "compression hit");
            }
        }
        offset
    }

    /// Registers `suffix` as written at `offset`.
    ///
    /// Offsets a pointer cannot reach are ignored, as is a suffix that is
    /// already registered (the earliest occurrence wins).
    pub fn add(&mut self, offset: usize, suffix: &[u8]) {
        let Ok(offset) = u16::try_from(offset) else {
            return;
        };
        if usize::from(offset) > MAX_POINTER_OFFSET {
            return;
        }
        let key = lowercase(suffix);
        if self.trace {
            trace!(offset, len = suffix.len(), "compression entry added");
        }
        self.entries.entry(key).or_insert(offset);
    }

    /// Drops every entry at or after `offset`.
    ///
    /// Used when the writer discards output so that later names never point
    /// at bytes that were rolled back.
    pub fn forget_from(&mut self, offset: usize) {
        self.entries.retain(|_, at| usize::from(*at) < offset);
    }

    /// Returns the number of registered suffixes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn lowercase(suffix: &[u8]) -> NameBuf {
    let mut key = NameBuf::from_slice(suffix);
    key.make_ascii_lowercase();
    key
}
