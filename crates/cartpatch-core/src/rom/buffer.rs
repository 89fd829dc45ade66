use crate::error::{Error, Result};

use super::codec;

/// Owned ROM image.
///
/// Every read and write is bounds-checked and reports [`Error::OutOfBounds`]
/// instead of panicking or silently extending. Growth and truncation only happen
/// through [`ByteBuffer::resize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer of `len` copies of `value`.
    pub fn filled(len: usize, value: u8) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn last(&self) -> Option<u8> {
        self.data.last().copied()
    }

    /// Grow or shrink to exactly `len` bytes, filling new bytes with `fill`.
    pub fn resize(&mut self, len: usize, fill: u8) {
        self.data.resize(len, fill);
    }

    fn range(&self, offset: usize, len: usize) -> Result<std::ops::Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(Error::OutOfBounds {
                offset,
                len,
                size: self.data.len(),
            }),
        }
    }

    pub fn get(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let range = self.range(offset, len)?;
        Ok(&self.data[range])
    }

    pub fn get_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let range = self.range(offset, len)?;
        Ok(&mut self.data[range])
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.get(offset, 1)?[0])
    }

    /// Overwrite `bytes.len()` bytes at `offset`.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.get_mut(offset, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn fill(&mut self, offset: usize, len: usize, value: u8) -> Result<()> {
        self.get_mut(offset, len)?.fill(value);
        Ok(())
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32> {
        codec::read_u32_le(&self.data, offset).ok_or(Error::OutOfBounds {
            offset,
            len: 4,
            size: self.data.len(),
        })
    }

    pub fn write_u32_le(&mut self, offset: usize, value: u32) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn read_u24_le(&self, offset: usize) -> Result<u32> {
        codec::read_u24_le(&self.data, offset).ok_or(Error::OutOfBounds {
            offset,
            len: 3,
            size: self.data.len(),
        })
    }

    pub fn write_u24_le(&mut self, offset: usize, value: u32) -> Result<()> {
        self.write(offset, &codec::u24_le_bytes(value))
    }

    /// Run `f` against a working copy and keep the result only if it succeeds.
    ///
    /// A failing pipeline leaves `self` exactly as it was before the call.
    pub fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut ByteBuffer) -> Result<T>,
    {
        let mut work = self.clone();
        let output = f(&mut work)?;
        *self = work;
        Ok(output)
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(buffer: ByteBuffer) -> Self {
        buffer.data
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_within_bounds() {
        let mut buffer = ByteBuffer::filled(8, 0xFF);
        buffer.write(2, &[1, 2, 3]).unwrap();
        assert_eq!(buffer.as_slice(), &[0xFF, 0xFF, 1, 2, 3, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_write_out_of_bounds_does_not_extend() {
        let mut buffer = ByteBuffer::filled(4, 0);
        let err = buffer.write(3, &[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfBounds {
                offset: 3,
                len: 2,
                size: 4
            }
        ));
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_offset_overflow_is_out_of_bounds() {
        let buffer = ByteBuffer::filled(4, 0);
        assert!(buffer.get(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_little_endian_words() {
        let mut buffer = ByteBuffer::filled(8, 0);
        buffer.write_u32_le(4, 0x0800_00C0).unwrap();
        assert_eq!(buffer.get(4, 4).unwrap(), &[0xC0, 0x00, 0x00, 0x08]);
        assert_eq!(buffer.read_u32_le(4).unwrap(), 0x0800_00C0);
        assert!(buffer.read_u32_le(5).is_err());

        buffer.write_u24_le(0, 0x00AB_CDEF).unwrap();
        assert_eq!(buffer.get(0, 4).unwrap(), &[0xEF, 0xCD, 0xAB, 0x00]);
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let mut buffer = ByteBuffer::filled(4, 0x11);
        let result: Result<()> = buffer.transact(|work| {
            work.write(0, &[0xAA])?;
            work.resize(16, 0);
            work.write(100, &[0xBB])
        });
        assert!(result.is_err());
        assert_eq!(buffer, ByteBuffer::filled(4, 0x11));
    }

    #[test]
    fn test_transact_commits_on_success() {
        let mut buffer = ByteBuffer::filled(4, 0x11);
        let written = buffer
            .transact(|work| {
                work.write(1, &[0x22, 0x33])?;
                Ok(2)
            })
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(buffer.as_slice(), &[0x11, 0x22, 0x33, 0x11]);
    }
}
