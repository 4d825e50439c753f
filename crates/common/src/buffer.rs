use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use tracing::trace;

/// In-memory byte stream with an explicit open/closed state.
///
/// Reads, writes and seeks succeed while the buffer is open. After
/// [`MemoryBuffer::close`] every I/O call returns an error and the
/// capability queries report `false`.
#[derive(Debug, Default)]
pub struct MemoryBuffer {
    cursor: Cursor<Vec<u8>>,
    closed: bool,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(data),
            closed: false,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    pub fn can_read(&self) -> bool {
        self.is_open()
    }

    pub fn can_write(&self) -> bool {
        self.is_open()
    }

    pub fn can_seek(&self) -> bool {
        self.is_open()
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Releases the contents. Returns `true` only for the call that actually closed it.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        trace!(len = self.len(), "Closing memory buffer");
        self.closed = true;
        self.cursor = Cursor::default();
        true
    }

    /// Consumes the buffer, returning its contents (empty once closed)
    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            Err(io::Error::other("memory buffer is closed"))
        } else {
            Ok(())
        }
    }
}

impl Read for MemoryBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        self.cursor.read(buf)
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.cursor.flush()
    }
}

impl Seek for MemoryBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.ensure_open()?;
        self.cursor.seek(pos)
    }
}
