//! Growable byte buffer with independent read and write cursors.
//!
//! [`BinaryBuffer`] knows nothing about HTTP. It stores raw bytes and offers
//! typed accessors in two flavours:
//!
//! - **cursor based** (`get_u32`, `put_u32`, ...): read at the read cursor or
//!   append at the write cursor, then advance that cursor by the width of the
//!   value;
//! - **index based** (`get_u32_at`, `put_u32_at`, ...): operate on an explicit
//!   position. Index reads never move a cursor; index writes *set* the write
//!   cursor to `index + width` so a message can be built field by field.
//!
//! Reads past the end of the buffer are not errors: they yield the zero value
//! of the requested type. Callers that need to detect truncation must compare
//! positions against [`BinaryBuffer::len`], not values.
//!
//! Multi-byte values are encoded little-endian.

use std::char::TryFromCharError;
use std::mem::size_of;

/// Capacity reserved by [`BinaryBuffer::default`].
pub const DEFAULT_CAPACITY: usize = 4096;

/// Byte sequence with a read cursor and a write cursor.
#[derive(Debug)]
pub struct BinaryBuffer {
    bytes: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

macro_rules! typed_accessors {
    ($($ty:ty => $get:ident, $get_at:ident, $put:ident, $put_at:ident;)*) => {
        $(
            #[doc = concat!("Reads a `", stringify!($ty), "` at the read cursor and advances it.")]
            pub fn $get(&mut self) -> $ty {
                let value = self.$get_at(self.read_pos);
                self.read_pos += size_of::<$ty>();
                value
            }

            #[doc = concat!("Reads a `", stringify!($ty), "` at `index`; zero when out of range.")]
            pub fn $get_at(&self, index: usize) -> $ty {
                self.read_array::<{ size_of::<$ty>() }>(index)
                    .map(<$ty>::from_le_bytes)
                    .unwrap_or_default()
            }

            #[doc = concat!("Writes a `", stringify!($ty), "` at the write cursor, growing as needed.")]
            pub fn $put(&mut self, value: $ty) {
                self.append(&value.to_le_bytes());
            }

            #[doc = concat!("Writes a `", stringify!($ty), "` at `index` and moves the write cursor past it.")]
            pub fn $put_at(&mut self, value: $ty, index: usize) {
                self.insert(&value.to_le_bytes(), index);
            }
        )*
    };
}

impl BinaryBuffer {
    /// Creates an empty buffer with room for `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// Creates a buffer holding a copy of `data`.
    ///
    /// The read cursor starts at 0 and the write cursor at the end of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut buffer = Self::new(data.len());
        buffer.put_bytes(data);
        buffer
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes between the read cursor and the end of the buffer.
    pub fn bytes_remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.read_pos)
    }

    /// Empties the buffer and resets both cursors. Capacity is kept.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Resizes to exactly `new_size` bytes (zero filled) and resets both cursors.
    pub fn resize(&mut self, new_size: usize) {
        self.bytes.resize(new_size, 0);
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Compares length, then every byte. Cursors are ignored.
    pub fn equals(&self, other: &BinaryBuffer) -> bool {
        if self.len() != other.len() {
            return false;
        }

        for (index, byte) in self.bytes.iter().enumerate() {
            if *byte != other.bytes[index] {
                return false;
            }
        }
        true
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The bytes from the read cursor to the end of the buffer.
    pub fn unread(&self) -> &[u8] {
        &self.bytes[self.read_pos.min(self.bytes.len())..]
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn set_read_pos(&mut self, pos: usize) {
        self.read_pos = pos;
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn set_write_pos(&mut self, pos: usize) {
        self.write_pos = pos;
    }

    /// Linear search for `key` starting at `start`.
    ///
    /// When searching for a non-zero key the scan gives up at the first zero
    /// byte, treating it as an implicit string terminator.
    pub fn find(&self, key: u8, start: usize) -> Option<usize> {
        for (index, &byte) in self.bytes.iter().enumerate().skip(start) {
            if key != 0 && byte == 0 {
                return None;
            }
            if byte == key {
                return Some(index);
            }
        }
        None
    }

    /// Replaces occurrences of `key` with `rep` from `start` onwards.
    ///
    /// Stops at a zero byte under the same rule as [`find`](Self::find).
    pub fn replace(&mut self, key: u8, rep: u8, start: usize, first_only: bool) {
        for byte in self.bytes.iter_mut().skip(start) {
            if key != 0 && *byte == 0 {
                break;
            }
            if *byte == key {
                *byte = rep;
                if first_only {
                    return;
                }
            }
        }
    }

    /// Returns the byte at the read cursor without moving it.
    pub fn peek(&self) -> u8 {
        self.get_u8_at(self.read_pos)
    }

    /// Reads one byte at the read cursor as a Latin-1 `char`.
    pub fn get_char(&mut self) -> char {
        char::from(self.get_u8())
    }

    pub fn get_char_at(&self, index: usize) -> char {
        char::from(self.get_u8_at(index))
    }

    /// Reads `len` bytes from the read cursor and advances it by `len`.
    ///
    /// Positions past the end of the buffer read as zero.
    pub fn get_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0; len];
        let start = self.read_pos.min(self.bytes.len());
        let end = self.read_pos.saturating_add(len).min(self.bytes.len());
        if start < end {
            out[..end - start].copy_from_slice(&self.bytes[start..end]);
        }
        self.read_pos = self.read_pos.saturating_add(len);
        out
    }

    /// Writes `value` as a single byte at the write cursor.
    ///
    /// Chars are one byte wide, so anything above U+00FF is refused and
    /// nothing is written.
    pub fn put_char(&mut self, value: char) -> Result<(), TryFromCharError> {
        self.put_u8(u8::try_from(value)?);
        Ok(())
    }

    /// Writes `value` as a single byte at `index`, see [`put_char`](Self::put_char).
    pub fn put_char_at(&mut self, value: char, index: usize) -> Result<(), TryFromCharError> {
        self.put_u8_at(u8::try_from(value)?, index);
        Ok(())
    }

    /// Appends `data` at the write cursor.
    pub fn put_bytes(&mut self, data: &[u8]) {
        self.append(data);
    }

    /// Moves the write cursor to `index`, then appends `data` there.
    pub fn put_bytes_at(&mut self, data: &[u8], index: usize) {
        self.write_pos = index;
        self.append(data);
    }

    /// Appends the full contents of another buffer, regardless of its cursors.
    pub fn put_buffer(&mut self, src: &BinaryBuffer) {
        self.append(&src.bytes);
    }

    typed_accessors! {
        u8 => get_u8, get_u8_at, put_u8, put_u8_at;
        u16 => get_u16, get_u16_at, put_u16, put_u16_at;
        u32 => get_u32, get_u32_at, put_u32, put_u32_at;
        u64 => get_u64, get_u64_at, put_u64, put_u64_at;
        f32 => get_f32, get_f32_at, put_f32, put_f32_at;
        f64 => get_f64, get_f64_at, put_f64, put_f64_at;
    }

    fn read_array<const N: usize>(&self, index: usize) -> Option<[u8; N]> {
        let end = index.checked_add(N)?;
        self.bytes.get(index..end)?.try_into().ok()
    }

    fn append(&mut self, data: &[u8]) {
        let end = self.write_pos + data.len();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[self.write_pos..end].copy_from_slice(data);
        self.write_pos = end;
    }

    fn insert(&mut self, data: &[u8], index: usize) {
        let end = index + data.len();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[index..end].copy_from_slice(data);
        self.write_pos = end;
    }
}

impl Default for BinaryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cloning copies the contents into a new buffer with both cursors at 0.
impl Clone for BinaryBuffer {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            read_pos: 0,
            write_pos: 0,
        }
    }
}

impl PartialEq for BinaryBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for BinaryBuffer {}

impl From<&[u8]> for BinaryBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_write_grows_to_cover_range_only() {
        let mut buf = BinaryBuffer::new(0);
        buf.put_u32_at(7, 4);

        assert_eq!(buf.len(), 8);
        assert_eq!(buf.write_pos(), 8);
        assert_eq!(buf.get_u32_at(4), 7);
        assert_eq!(buf.get_u32_at(0), 0);
    }

    #[test]
    fn out_of_range_read_is_zero() {
        let mut buf = BinaryBuffer::from_bytes(&[1, 2, 3]);
        assert_eq!(buf.get_u32_at(0), 0);
        assert_eq!(buf.get_f64(), 0.0);
        assert_eq!(buf.read_pos(), 8);
    }
}
