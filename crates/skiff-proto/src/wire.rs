//! Wire format cursors.
//!
//! [`WireReader`] and [`WireWriter`] are the byte-level foundation for every
//! codec in this crate. Both are bounds-checked: a read that would cross the
//! end of the readable window fails with [`Error::Truncated`] rather than
//! panicking, which is what lets the decoders accept hostile input.

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};

/// A cursor for reading DNS wire format data.
///
/// Besides sequential reads the reader supports:
///
/// - an absolute [`jump`](Self::jump), used to follow compression pointers;
/// - a single-slot [`save`](Self::save)/[`restore`](Self::restore) pair that
///   remembers where to resume after a pointer has been followed;
/// - an *active window* ([`set_active`](Self::set_active)) that limits reads
///   to a record's declared RDLENGTH.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    /// The underlying data.
    data: &'a [u8],
    /// Current position.
    pos: usize,
    /// End of the readable window.
    end: usize,
    /// Saved position and window end.
    saved: Option<(usize, usize)>,
    /// Window end to return to on `restore_active`.
    saved_end: Option<usize>,
    /// Emit trace events when compression pointers are followed.
    trace_pointers: bool,
}

impl<'a> WireReader<'a> {
    /// Creates a new wire reader.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
            saved: None,
            saved_end: None,
            trace_pointers: false,
        }
    }

    /// Enables or disables tracing of compression pointers.
    #[must_use]
    pub const fn with_pointer_tracing(mut self, enabled: bool) -> Self {
        self.trace_pointers = enabled;
        self
    }

    /// Returns true if compression pointers should be traced.
    #[inline]
    pub const fn traces_pointers(&self) -> bool {
        self.trace_pointers
    }

    /// Returns the underlying data.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the current position (the read index).
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes left in the active window.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    /// Returns true if there are no remaining bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Moves to an absolute position, forward or backward.
    ///
    /// Jumping clears the active window; the window in effect at the last
    /// [`save`](Self::save) comes back with [`restore`](Self::restore).
    pub fn jump(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::InvalidJump {
                target: pos,
                len: self.data.len(),
            });
        }
        self.pos = pos;
        self.end = self.data.len();
        Ok(())
    }

    /// Remembers the current position and window.
    ///
    /// Only one position is kept; a second call overwrites the first.
    #[inline]
    pub fn save(&mut self) {
        self.saved = Some((self.pos, self.end));
    }

    /// Returns to the position and window remembered by [`save`](Self::save).
    pub fn restore(&mut self) -> Result<()> {
        let (pos, end) = self
            .saved
            .take()
            .ok_or_else(|| Error::invalid_argument("restore without a saved position"))?;
        self.pos = pos;
        self.end = end;
        Ok(())
    }

    /// Limits reads to the next `len` bytes.
    pub fn set_active(&mut self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::truncated(self.pos, len));
        }
        self.saved_end = Some(self.end);
        self.end = self.pos + len;
        Ok(())
    }

    /// Removes the window installed by [`set_active`](Self::set_active).
    #[inline]
    pub fn restore_active(&mut self) {
        self.end = self.saved_end.take().unwrap_or(self.data.len());
    }

    /// Advances the position by the given amount.
    #[inline]
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    #[inline]
    fn check(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::truncated(self.pos, n));
        }
        Ok(())
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Reads a big-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let value = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Reads a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let b = &self.data[self.pos..self.pos + 4];
        let value = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        self.pos += 4;
        Ok(value)
    }

    /// Reads a big-endian 48-bit integer (TSIG time fields).
    pub fn read_u48(&mut self) -> Result<u64> {
        let high = u64::from(self.read_u16()?);
        let low = u64::from(self.read_u32()?);
        Ok(high << 32 | low)
    }

    /// Reads a slice of bytes.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.check(len)?;
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads everything left in the active window.
    #[inline]
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..self.end.max(self.pos)];
        self.pos = self.end.max(self.pos);
        slice
    }

    /// Reads a character-string: a length byte followed by that many bytes.
    pub fn read_counted_string(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }

    /// Peeks at a single byte without advancing.
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        self.check(1)?;
        Ok(self.data[self.pos])
    }
}

/// A writer for DNS wire format data.
///
/// Wraps a growable `BytesMut`. Writes happen at the current position, which
/// is normally the end of the buffer; [`jump`](Self::jump) moves it back so
/// that a length field can be rewritten once the data it describes is known.
#[derive(Debug)]
pub struct WireWriter {
    /// The underlying buffer.
    buf: BytesMut,
    /// Write position.
    pos: usize,
    /// Position remembered by `save`.
    saved: Option<usize>,
    /// Maximum size.
    max_size: Option<usize>,
}

impl WireWriter {
    /// Creates a new wire writer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            pos: 0,
            saved: None,
            max_size: None,
        }
    }

    /// Creates a wire writer that refuses to grow beyond `max_size` bytes.
    pub fn with_max_size(capacity: usize, max_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity.min(max_size)),
            pos: 0,
            saved: None,
            max_size: Some(max_size),
        }
    }

    /// Returns the length of the written data.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the current write position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining space before the max size.
    pub fn remaining(&self) -> usize {
        self.max_size
            .map_or(usize::MAX, |max| max.saturating_sub(self.pos))
    }

    /// Moves the write position to `pos`, which must be within the written
    /// data.
    pub fn jump(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(Error::InvalidJump {
                target: pos,
                len: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Remembers the current position for a later [`restore`](Self::restore).
    #[inline]
    pub fn save(&mut self) {
        self.saved = Some(self.pos);
    }

    /// Discards everything written since the last [`save`](Self::save).
    pub fn restore(&mut self) -> Result<()> {
        let pos = self
            .saved
            .take()
            .ok_or_else(|| Error::invalid_argument("restore without a saved position"))?;
        self.buf.truncate(pos);
        self.pos = pos;
        Ok(())
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    /// Writes a big-endian u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a big-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes the low 48 bits of `value` big-endian.
    pub fn write_u48(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_be_bytes()[2..])
    }

    /// Writes a slice of bytes at the current position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        if let Some(max) = self.max_size {
            if end > max {
                return Err(Error::buffer_overflow(bytes.len(), self.remaining()));
            }
        }

        let overlap = self.buf.len().saturating_sub(self.pos).min(bytes.len());
        self.buf[self.pos..self.pos + overlap].copy_from_slice(&bytes[..overlap]);
        self.buf.extend_from_slice(&bytes[overlap..]);
        self.pos = end;
        Ok(())
    }

    /// Writes a character-string: a length byte followed by the bytes.
    pub fn write_counted_string(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u8::try_from(bytes.len()).map_err(|_| Error::StringTooLong {
            length: bytes.len(),
        })?;
        self.write_u8(len)?;
        self.write_bytes(bytes)
    }

    /// Overwrites a u16 that was written earlier, leaving the position alone.
    pub fn write_u16_at(&mut self, offset: usize, value: u16) -> Result<()> {
        if offset + 2 > self.buf.len() {
            return Err(Error::InvalidJump {
                target: offset,
                len: self.buf.len(),
            });
        }
        self.buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Returns a reference to the written data.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the underlying buffer.
    #[inline]
    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }

    /// Returns the data as frozen bytes.
    #[inline]
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new(512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_reader() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x12);
        assert_eq!(reader.read_u16().unwrap(), 0x3456);
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.read_bytes(2).unwrap(), &[0x78, 0x9A]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_wire_reader_bounds() {
        let data = [0x12, 0x34];
        let mut reader = WireReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::Truncated { offset: 0, needed: 4 })
        ));
        // A failed read does not move the cursor.
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_counted_string() {
        let data = [3, b'a', b'b', b'c', 5, b'x'];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.read_counted_string().unwrap(), b"abc");
        assert!(reader.read_counted_string().unwrap_err().is_wire_parse());
    }

    #[test]
    fn test_active_window() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut reader = WireReader::new(&data);
        reader.advance(1).unwrap();

        reader.set_active(2).unwrap();
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.read_u16().unwrap(), 0x0203);
        assert!(reader.read_u8().is_err());

        reader.restore_active();
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.read_u8().unwrap(), 4);

        assert!(reader.set_active(10).is_err());
    }

    #[test]
    fn test_jump_save_restore() {
        let data = [10, 20, 30, 40];
        let mut reader = WireReader::new(&data);
        reader.advance(3).unwrap();

        reader.save();
        reader.jump(1).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 20);
        reader.restore().unwrap();
        assert_eq!(reader.read_u8().unwrap(), 40);

        assert!(reader.restore().is_err());
        assert!(matches!(
            reader.jump(5),
            Err(Error::InvalidJump { target: 5, len: 4 })
        ));
    }

    #[test]
    fn test_restore_brings_back_window() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut reader = WireReader::new(&data);
        reader.advance(4).unwrap();
        reader.set_active(1).unwrap();

        reader.save();
        reader.jump(0).unwrap();
        assert_eq!(reader.remaining(), 6);
        reader.restore().unwrap();
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_wire_writer() {
        let mut writer = WireWriter::new(16);

        writer.write_u8(0x12).unwrap();
        writer.write_u16(0x3456).unwrap();
        writer.write_u32(0x789ABCDE).unwrap();

        assert_eq!(writer.len(), 7);
        assert_eq!(
            writer.as_bytes(),
            &[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE]
        );
    }

    #[test]
    fn test_writer_backpatch() {
        let mut writer = WireWriter::new(16);
        writer.write_u8(0xFF).unwrap();
        let length_at = writer.position();
        writer.write_u16(0).unwrap();
        writer.write_bytes(b"abc").unwrap();
        let end = writer.position();

        writer.jump(length_at).unwrap();
        writer.write_u16(3).unwrap();
        writer.jump(end).unwrap();
        writer.write_u8(0xEE).unwrap();

        assert_eq!(writer.as_bytes(), &[0xFF, 0, 3, b'a', b'b', b'c', 0xEE]);
        assert!(writer.jump(100).is_err());
    }

    #[test]
    fn test_writer_save_restore() {
        let mut writer = WireWriter::new(16);
        writer.write_u16(0x0102).unwrap();
        writer.save();
        writer.write_u32(0xFFFF_FFFF).unwrap();
        writer.restore().unwrap();

        assert_eq!(writer.as_bytes(), &[1, 2]);
        assert_eq!(writer.position(), 2);
    }

    #[test]
    fn test_writer_counted_string() {
        let mut writer = WireWriter::new(16);
        writer.write_counted_string(b"hi").unwrap();
        assert_eq!(writer.as_bytes(), &[2, b'h', b'i']);

        let long = vec![b'x'; 256];
        assert!(matches!(
            writer.write_counted_string(&long),
            Err(Error::StringTooLong { length: 256 })
        ));
    }

    #[test]
    fn test_wire_writer_max_size() {
        let mut writer = WireWriter::with_max_size(100, 4);

        writer.write_u16(0x1234).unwrap();
        assert!(writer.write_u32(0x12345678).is_err());
    }

    #[test]
    fn test_u48_roundtrip() {
        let mut writer = WireWriter::new(8);
        writer.write_u48(0x0000_1234_5678_9ABC).unwrap();
        assert_eq!(writer.len(), 6);

        let mut reader = WireReader::new(writer.as_bytes());
        assert_eq!(reader.read_u48().unwrap(), 0x1234_5678_9ABC);
    }
}
