//! In-memory body streams.

use bytes::Bytes;
use std::collections::TryReserveError;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Readable, writable and seekable in-memory body.
///
/// Request and response bodies are both backed by a [`Stream`]. Rendering a
/// stream as text always covers the whole buffer, independent of the current
/// position.
///
/// # Example
///
/// ```
/// use kitbridge_http::Stream;
/// use std::io::Write;
///
/// let mut body = Stream::new();
/// body.write_all(b"hello").unwrap();
/// assert_eq!(body.contents(), "hello");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    inner: Cursor<Vec<u8>>,
}

/// Body of a native request.
pub type RequestBody = Stream;

impl Stream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty temporary stream with `capacity` bytes reserved up
    /// front.
    ///
    /// # Errors
    ///
    /// Returns the reservation error if the buffer cannot be allocated.
    pub fn temp(capacity: usize) -> Result<Self, TryReserveError> {
        let mut buffer = Vec::new();
        buffer.try_reserve(capacity)?;
        Ok(Self {
            inner: Cursor::new(buffer),
        })
    }

    /// Creates a stream holding `data`, positioned at the start.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Cursor::new(data.into()),
        }
    }

    /// Whole buffer as text, replacing invalid UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.inner.get_ref()).into_owned()
    }

    /// Whole buffer as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.inner.get_ref())
    }

    /// Borrow the whole buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.inner.get_ref()
    }

    /// Number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    /// Reserved capacity of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.get_ref().capacity()
    }

    /// Current read/write position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Moves the position back to the start.
    pub fn rewind(&mut self) {
        self.inner.set_position(0);
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
