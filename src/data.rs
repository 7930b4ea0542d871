//! Caller-owned data buffers for I/O payloads.
//!
//! A [`DataBuffer`] is the memory region an I/O descriptor's payload is
//! read from or written into. The allocation is owned by the external
//! caller; descriptors hold cheap clones of the handle so the same
//! descriptor can be rebound to different buffers across its lifetime.

use bytes::BytesMut;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// A shared handle to a caller-owned byte region.
///
/// Cloning a `DataBuffer` clones the handle, not the bytes. The backing
/// allocation is fixed-length for the life of the buffer; the dispatcher
/// addresses it through a window at a descriptor-recorded offset.
#[derive(Debug, Clone)]
pub struct DataBuffer {
    inner: Arc<Mutex<BytesMut>>,
}

impl DataBuffer {
    /// Create a new zero-filled buffer of the given length.
    pub fn new(len: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BytesMut::zeroed(len))),
        }
    }

    /// Create a buffer holding a copy of the given bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BytesMut::from(bytes))),
        }
    }

    /// Length of the backing region in bytes.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the backing region is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill the entire region with a byte value.
    pub fn fill(&self, byte: u8) {
        self.inner.lock().fill(byte);
    }

    /// Lock the backing region for direct access.
    pub fn lock(&self) -> MutexGuard<'_, BytesMut> {
        self.inner.lock()
    }

    /// Copy `len` bytes starting at `offset` out into a new vector.
    ///
    /// Returns `None` if the window does not fit within the region.
    pub fn copy_out(&self, offset: usize, len: usize) -> Option<Vec<u8>> {
        let guard = self.inner.lock();
        guard.get(offset..offset + len).map(|s| s.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zero_filled() {
        let buf = DataBuffer::new(64);
        assert_eq!(buf.len(), 64);
        assert_eq!(buf.copy_out(0, 64).unwrap(), vec![0u8; 64]);
    }

    #[test]
    fn clone_shares_backing_region() {
        let buf = DataBuffer::from_slice(b"hello");
        let alias = buf.clone();
        alias.fill(b'x');
        assert_eq!(buf.copy_out(0, 5).unwrap(), b"xxxxx");
    }

    #[test]
    fn copy_out_rejects_overrun() {
        let buf = DataBuffer::new(16);
        assert!(buf.copy_out(8, 16).is_none());
        assert!(buf.copy_out(0, 16).is_some());
    }
}
