//! Sequential big-endian reader with bounds checking

use std::io::{Cursor, Read};

use nether_tracker::FormatError;

/// Reads fields front to back. Any read past the end is
/// [`FormatError::TruncatedFile`] and leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    /// Advance without reading, clamped to the end of the data
    pub fn skip(&mut self, count: usize) {
        let target = (self.position() + count).min(self.cursor.get_ref().len());
        self.cursor.set_position(target as u64);
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16, FormatError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Borrow the next `count` bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], FormatError> {
        if count > self.remaining() {
            return Err(FormatError::TruncatedFile);
        }
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + count) as u64);
        Ok(&data[start..start + count])
    }

    /// Read `count` bytes as signed 8-bit PCM
    pub fn read_i8_vec(&mut self, count: usize) -> Result<Vec<i8>, FormatError> {
        Ok(self
            .read_bytes(count)?
            .iter()
            .map(|&b| b as i8)
            .collect())
    }

    /// Read a fixed-width text field
    pub fn read_string(&mut self, len: usize) -> Result<String, FormatError> {
        Ok(read_string(self.read_bytes(len)?))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), FormatError> {
        if buf.len() > self.remaining() {
            return Err(FormatError::TruncatedFile);
        }
        self.cursor
            .read_exact(buf)
            .map_err(|_| FormatError::TruncatedFile)
    }
}

/// Text up to the first NUL, non-printable bytes as spaces, trailing spaces trimmed
pub(crate) fn read_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..len]
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian() {
        let data = [0x12, 0x34, 0xFF];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u16_be().unwrap(), 0x1234);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let data = [0x01];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u16_be(), Err(FormatError::TruncatedFile));
        // Failed read does not consume
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.read_u8(), Err(FormatError::TruncatedFile));
    }

    #[test]
    fn test_read_bytes_and_skip() {
        let data = [1, 2, 3, 4, 5];
        let mut reader = BinaryReader::new(&data);
        reader.skip(1);
        assert_eq!(reader.read_bytes(2).unwrap(), &[2, 3]);
        assert!(reader.read_bytes(3).is_err());
        assert_eq!(reader.read_array::<2>().unwrap(), [4, 5]);
        reader.skip(10);
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn test_read_i8_vec() {
        let data = [0x00, 0x7F, 0x80, 0xFF];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_i8_vec(4).unwrap(), vec![0, 127, -128, -1]);
    }

    #[test]
    fn test_read_string() {
        assert_eq!(read_string(b"Hello\0World"), "Hello");
        assert_eq!(read_string(b"No null"), "No null");
        assert_eq!(read_string(b"Trailing   "), "Trailing");
        assert_eq!(read_string(b"tab\there"), "tab here");
        assert_eq!(read_string(b""), "");
    }
}
