//! Fixed-capacity read buffer with named-region bookkeeping.
//!
//! The same buffer is reused as the raw read target while parsing the header
//! block and as the staging area for leftover body bytes afterwards. It never
//! holds more than one capacity's worth of unconsumed bytes.

use std::io;

/// Capacity of the read buffer, shared with the byte-I/O layer.
///
/// Bounds both the chunk size of a single raw socket read and the maximum
/// length of a status or header line.
pub const BUF_SIZE: usize = 8 * 1024;

/// A fixed-capacity byte buffer tracking how much of it is filled.
///
/// The filled region always sits at the front. [`ReadBuffer::carry_to_front`]
/// relocates a trailing sub-region to the front, which is how body bytes that
/// arrived in the same raw read as the header block are preserved.
pub(crate) struct ReadBuffer {
    bytes: Box<[u8; BUF_SIZE]>,
    len: usize,
}

impl ReadBuffer {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Box::new([0u8; BUF_SIZE]),
            len: 0,
        }
    }

    /// The filled region.
    pub(crate) fn filled(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of filled bytes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard the filled region.
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    /// Perform one raw read into the free tail of the buffer.
    ///
    /// Returns the number of bytes the reader produced; 0 means either
    /// end-of-stream or a full buffer. Never reads more than the remaining
    /// capacity.
    pub(crate) fn fill_from<R: io::Read>(&mut self, reader: &mut R) -> io::Result<usize> {
        let n = reader.read(&mut self.bytes[self.len..])?;
        self.len += n;
        Ok(n)
    }

    /// Move the filled region starting at `start` to the front of the buffer
    /// and shrink the fill level accordingly.
    ///
    /// `copy_within` has memmove semantics, so the overlap between source and
    /// destination is handled without manual index ordering.
    pub(crate) fn carry_to_front(&mut self, start: usize) {
        debug_assert!(start <= self.len);
        self.bytes.copy_within(start..self.len, 0);
        self.len -= start;
    }
}
