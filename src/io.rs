//! I/O descriptors.
//!
//! An [`IoDescriptor`] names one positional transfer against a volume:
//! a direction, a starting address, a length, and a binding to the
//! [`DataBuffer`] window holding the payload. Descriptors are plain data;
//! the backend's `submit_*` operations consume them. The external
//! framework recycles descriptor objects, so the buffer binding is
//! mutable and replaceable.

use crate::data::DataBuffer;
use std::fmt;

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    /// Transfer bytes from the volume into the data buffer.
    Read,
    /// Transfer bytes from the data buffer into the volume.
    Write,
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoDirection::Read => write!(f, "read"),
            IoDirection::Write => write!(f, "write"),
        }
    }
}

/// A request to read or write a byte range of a volume.
#[derive(Debug, Clone)]
pub struct IoDescriptor {
    dir: IoDirection,
    addr: u64,
    len: u32,
    data: Option<(DataBuffer, usize)>,
}

impl IoDescriptor {
    /// Create a descriptor for a transfer of `len` bytes at `addr`.
    ///
    /// The descriptor starts with no buffer bound; bind one with
    /// [`set_data`](Self::set_data) before submitting.
    pub fn new(dir: IoDirection, addr: u64, len: u32) -> Self {
        Self {
            dir,
            addr,
            len,
            data: None,
        }
    }

    /// Transfer direction.
    pub fn dir(&self) -> IoDirection {
        self.dir
    }

    /// Starting byte address within the volume.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Transfer length in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Returns true if the transfer length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bind a data buffer and payload offset to this descriptor.
    ///
    /// Replaces any previous binding. The offset is not validated
    /// against the buffer's length here; the dispatcher checks the
    /// window when the descriptor is submitted.
    pub fn set_data(&mut self, buffer: DataBuffer, offset: usize) {
        self.data = Some((buffer, offset));
    }

    /// The currently bound buffer and offset, if any.
    pub fn get_data(&self) -> Option<(&DataBuffer, usize)> {
        self.data.as_ref().map(|(buf, offset)| (buf, *offset))
    }

    /// Retarget a recycled descriptor at a new transfer.
    ///
    /// Keeps the current buffer binding; callers rebind with
    /// [`set_data`](Self::set_data) when the payload moves.
    pub fn reset(&mut self, dir: IoDirection, addr: u64, len: u32) {
        self.dir = dir;
        self.addr = addr;
        self.len = len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display() {
        assert_eq!(IoDirection::Read.to_string(), "read");
        assert_eq!(IoDirection::Write.to_string(), "write");
    }

    #[test]
    fn starts_unbound() {
        let io = IoDescriptor::new(IoDirection::Read, 0, 512);
        assert!(io.get_data().is_none());
    }

    #[test]
    fn set_data_rebinds() {
        let mut io = IoDescriptor::new(IoDirection::Write, 4096, 512);

        let first = DataBuffer::new(1024);
        io.set_data(first, 0);
        assert_eq!(io.get_data().unwrap().1, 0);

        let second = DataBuffer::new(2048);
        io.set_data(second, 512);
        let (buf, offset) = io.get_data().unwrap();
        assert_eq!(offset, 512);
        assert_eq!(buf.len(), 2048);
    }

    #[test]
    fn set_data_does_not_validate_offset() {
        // Bounds are the caller's responsibility at bind time; the
        // dispatcher rejects the window at submit time instead.
        let mut io = IoDescriptor::new(IoDirection::Read, 0, 512);
        io.set_data(DataBuffer::new(16), 9999);
        assert_eq!(io.get_data().unwrap().1, 9999);
    }

    #[test]
    fn reset_retargets_and_keeps_binding() {
        let mut io = IoDescriptor::new(IoDirection::Write, 0, 512);
        io.set_data(DataBuffer::new(512), 0);

        io.reset(IoDirection::Read, 8192, 256);
        assert_eq!(io.dir(), IoDirection::Read);
        assert_eq!(io.addr(), 8192);
        assert_eq!(io.len(), 256);
        assert!(io.get_data().is_some());
    }
}
