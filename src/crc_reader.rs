use std::io::{Read, Result};

/// Wraps an existing reader and calculates CRC32 while reading from it.
pub struct CrcReader<T> {
    inner_reader: T,
    hasher: crc32fast::Hasher,
    bytes_read: u64,
}

impl<T> CrcReader<T> {
    pub fn new(inner_reader: T) -> Self {
        CrcReader {
            inner_reader,
            hasher: crc32fast::Hasher::new(),
            bytes_read: 0,
        }
    }

    pub fn get_crc32(&self) -> u32 {
        // Cloning as a workaround -- finalize consumes, but we only have the hasher borrowed
        self.hasher.clone().finalize()
    }

    /// Number of bytes that went through the hasher so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<T: Read> Read for CrcReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let size_read = self.inner_reader.read(buf)?;
        self.hasher.update(&buf[..size_read]);
        self.bytes_read += size_read as u64;
        Ok(size_read)
    }
}
