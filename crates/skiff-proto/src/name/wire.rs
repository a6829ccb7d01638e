//! Wire format encoding and decoding of names, with compression.

use super::{Name, NameBuf};
use crate::compress::CompressionTable;
use crate::error::{Error, Result};
use crate::wire::{WireReader, WireWriter};
use crate::{MAX_LABELS, MAX_NAME_LENGTH};
use tracing::trace;

/// Maximum number of compression pointers followed for a single name.
pub const MAX_COMPRESSION_JUMPS: usize = 128;

impl Name {
    /// Decodes a possibly compressed name at the reader's position.
    ///
    /// Compression pointers must point strictly before the start of the name
    /// segment that contains them, which rules out loops. After the name the
    /// reader sits just past the first pointer (or the root label).
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut wire = NameBuf::new();
        let mut labels = 0usize;
        let mut floor = reader.position();
        let mut jumps = 0usize;
        let mut followed = false;

        loop {
            let at = reader.position();
            let len = reader.read_u8()?;

            match len & 0xC0 {
                0x00 => {
                    labels += 1;
                    if labels > MAX_LABELS {
                        return Err(Error::invalid_data(at, "name has more than 128 labels"));
                    }
                    let total = wire.len() + 1 + len as usize;
                    if total > MAX_NAME_LENGTH {
                        return Err(Error::invalid_data(
                            at,
                            format!("name length {total} exceeds {MAX_NAME_LENGTH}"),
                        ));
                    }

                    wire.push(len);
                    if len == 0 {
                        break;
                    }
                    wire.extend_from_slice(reader.read_bytes(len as usize)?);
                }
                0xC0 => {
                    let low = reader.read_u8()?;
                    let target = (usize::from(len & 0x3F) << 8) | usize::from(low);
                    if target >= floor {
                        return Err(Error::InvalidCompressionPointer { offset: at, target });
                    }

                    jumps += 1;
                    if jumps > MAX_COMPRESSION_JUMPS {
                        return Err(Error::TooManyCompressionJumps {
                            max_jumps: MAX_COMPRESSION_JUMPS,
                        });
                    }
                    if reader.traces_pointers() {
                        trace!(offset = at, target, "following compression pointer");
                    }

                    if !followed {
                        reader.save();
                        followed = true;
                    }
                    reader.jump(target)?;
                    floor = target;
                }
                _ => return Err(Error::InvalidLabelType { offset: at, byte: len }),
            }
        }

        if followed {
            reader.restore()?;
        }

        Ok(Self {
            wire,
            // At most MAX_LABELS, checked above.
            label_count: labels as u8,
        })
    }

    /// Writes the name to `writer`.
    ///
    /// With a compression table, the longest suffix already present in the
    /// message is replaced by a pointer and every newly written suffix is
    /// registered. Canonical output is lowercased and never compressed.
    pub fn encode(
        &self,
        writer: &mut WireWriter,
        compression: Option<&mut CompressionTable>,
        canonical: bool,
    ) -> Result<()> {
        if !self.is_absolute() {
            return Err(Error::relative_name(self));
        }
        if canonical {
            return writer.write_bytes(&self.to_canonical_wire());
        }
        let Some(table) = compression else {
            return writer.write_bytes(&self.wire);
        };

        let wire = self.as_wire();
        let mut pos = 0;
        while wire[pos] != 0 {
            let suffix = &wire[pos..];
            if let Some(offset) = table.get(suffix) {
                return writer.write_u16(0xC000 | offset);
            }

            table.add(writer.position(), suffix);
            let end = pos + 1 + wire[pos] as usize;
            writer.write_bytes(&wire[pos..end])?;
            pos = end;
        }
        writer.write_u8(0)
    }

    /// Returns the uncompressed wire form, failing for relative names.
    pub fn to_wire(&self) -> Result<NameBuf> {
        if !self.is_absolute() {
            return Err(Error::relative_name(self));
        }
        Ok(self.wire.clone())
    }
}
