//! Response body allocation.

use kitbridge_http::Stream;
use std::fmt;
use std::io;

/// Provides the body stream of each skeleton response.
pub trait StreamAllocator: Send + Sync {
    /// Creates an empty, writable body stream.
    fn allocate(&self) -> io::Result<Stream>;
}

/// Allocates in-memory streams with a reserved capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAllocator {
    capacity: usize,
}

impl MemoryAllocator {
    /// Creates an allocator reserving `capacity` bytes per stream.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Bytes reserved per stream.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl StreamAllocator for MemoryAllocator {
    fn allocate(&self) -> io::Result<Stream> {
        Stream::temp(self.capacity).map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))
    }
}

/// Wraps a closure as a [`StreamAllocator`].
pub struct AllocatorFn<F>(F);

impl<F> AllocatorFn<F>
where
    F: Fn() -> io::Result<Stream> + Send + Sync,
{
    /// Creates the allocator.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> StreamAllocator for AllocatorFn<F>
where
    F: Fn() -> io::Result<Stream> + Send + Sync,
{
    fn allocate(&self) -> io::Result<Stream> {
        (self.0)()
    }
}

impl<F> fmt::Debug for AllocatorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocatorFn").finish_non_exhaustive()
    }
}
