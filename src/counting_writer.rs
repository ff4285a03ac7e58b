use std::io::{Result, Write};

/// Counts bytes accepted by the wrapped writer.
///
/// The count is the position where the next record starts, also after a
/// write failed part way through.
#[derive(Debug)]
pub struct CountingWriter<W> {
    writer: W,
    written_bytes_count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(writer: W) -> CountingWriter<W> {
        CountingWriter {
            writer,
            written_bytes_count: 0,
        }
    }

    pub fn written_bytes_count(&self) -> u64 {
        self.written_bytes_count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let written = self.writer.write(buf)?;
        self.written_bytes_count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}
