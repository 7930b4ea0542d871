//! File-backed volume implementation.
//!
//! [`FileVolume`] persists a fixed-size addressable byte range to a
//! single flat file, one file per [`VolumeKind`]. The file carries no
//! header or metadata; any structure within it is imposed entirely by
//! the storage engine running on top.

use crate::backend::VolumeBackend;
use crate::config::VolumeConfig;
use crate::error::{VolumeError, VolumeResult};
use crate::io::{IoDescriptor, IoDirection};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, trace};

/// The logical identity of a volume.
///
/// The storage framework works against exactly two volumes: the cache
/// device and the backing core device. The kind determines which file
/// under the configured directory persists the volume's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKind {
    /// The backing core device.
    Core,
    /// The cache device.
    Cache,
}

impl VolumeKind {
    /// All recognized volume kinds.
    pub const ALL: [VolumeKind; 2] = [VolumeKind::Core, VolumeKind::Cache];

    /// The backing file name for this kind.
    pub fn file_name(&self) -> &'static str {
        match self {
            VolumeKind::Core => "core",
            VolumeKind::Cache => "cache",
        }
    }
}

impl fmt::Display for VolumeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for VolumeKind {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(VolumeKind::Core),
            "cache" => Ok(VolumeKind::Cache),
            other => Err(VolumeError::UnknownVolume(other.to_string())),
        }
    }
}

/// An emulated block-storage volume backed by a host file.
///
/// Each instance owns its backing file handle; two instances of the same
/// kind are independent as far as this type is concerned, and callers
/// that need exclusive access to a backing file must not open the same
/// kind twice concurrently.
///
/// Positional reads and writes take `&self`; the OS performs each
/// `pread`/`pwrite` atomically, but no ordering is imposed between
/// overlapping transfers submitted concurrently. Callers needing
/// write-before-read consistency must serialize their submissions.
#[derive(Debug)]
pub struct FileVolume {
    kind: VolumeKind,
    path: PathBuf,
    capacity: u64,
    max_io_size: u32,
    file: Option<File>,
}

impl FileVolume {
    /// Create a closed volume of the given kind.
    ///
    /// The backing file path is `config.dir/<kind>`. No filesystem
    /// access happens until [`open`](VolumeBackend::open).
    pub fn new(kind: VolumeKind, config: &VolumeConfig) -> Self {
        Self {
            kind,
            path: config.dir.join(kind.file_name()),
            capacity: config.capacity,
            max_io_size: config.max_io_size,
            file: None,
        }
    }

    /// The volume's logical identity.
    pub fn kind(&self) -> VolumeKind {
        self.kind
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file is currently open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn file(&self) -> VolumeResult<&File> {
        self.file.as_ref().ok_or(VolumeError::NotOpen(self.kind))
    }

    fn check_range(&self, addr: u64, len: u32) -> VolumeResult<()> {
        if len > self.max_io_size {
            return Err(VolumeError::IoTooLarge {
                len,
                max: self.max_io_size,
            });
        }
        let end = addr
            .checked_add(u64::from(len))
            .ok_or(VolumeError::OutOfRange {
                addr,
                len,
                capacity: self.capacity,
            })?;
        if end > self.capacity {
            return Err(VolumeError::OutOfRange {
                addr,
                len,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl VolumeBackend for FileVolume {
    fn open(&mut self) -> VolumeResult<()> {
        if self.file.is_some() {
            return Err(VolumeError::AlreadyOpen(self.kind));
        }

        let preexisting = self.path.try_exists()?;

        let file = if preexisting {
            // Reuse without truncation so prior contents survive a
            // restart. A shorter file is extended back to capacity;
            // extension preserves existing bytes.
            let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
            if file.metadata()?.len() < self.capacity {
                file.set_len(self.capacity)?;
            }
            file
        } else {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }

            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;
            file.set_len(self.capacity)?;
            file
        };

        info!(volume = %self.kind, preexisting, "volume open");

        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) -> VolumeResult<()> {
        let file = self.file.take().ok_or(VolumeError::NotOpen(self.kind))?;
        drop(file);

        info!(volume = %self.kind, "volume close");
        Ok(())
    }

    fn submit_io(&self, io: &IoDescriptor) -> VolumeResult<()> {
        let file = self.file()?;

        let addr = io.addr();
        let len = io.len();
        self.check_range(addr, len)?;

        let (buffer, offset) = io.get_data().ok_or(VolumeError::NoDataBound)?;

        let mut guard = buffer.lock();
        let have = guard.len();
        let need = len as usize;
        let window = guard
            .get_mut(offset..offset + need)
            .ok_or(VolumeError::BufferTooSmall { need, offset, have })?;

        // write_all_at/read_exact_at turn any shortfall into an error
        // instead of silently transferring fewer bytes.
        match io.dir() {
            IoDirection::Write => file.write_all_at(window, addr)?,
            IoDirection::Read => file.read_exact_at(window, addr)?,
        }

        debug!(volume = %self.kind, dir = %io.dir(), addr, len, "io");

        Ok(())
    }

    fn submit_flush(&self, _io: &IoDescriptor) -> VolumeResult<()> {
        trace!(volume = %self.kind, "flush (no-op)");
        Ok(())
    }

    fn submit_discard(&self, _io: &IoDescriptor) -> VolumeResult<()> {
        trace!(volume = %self.kind, "discard (no-op)");
        Ok(())
    }

    fn length(&self) -> u64 {
        self.capacity
    }

    fn max_io_size(&self) -> u32 {
        self.max_io_size
    }
}

impl Drop for FileVolume {
    fn drop(&mut self) {
        // Dropping a still-open volume releases the handle without the
        // close-side diagnostics. Callers wanting those use close().
        self.file.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataBuffer;
    use tempfile::tempdir;

    fn test_config(dir: &Path) -> VolumeConfig {
        VolumeConfig::new()
            .dir(dir)
            .capacity(1024 * 1024)
            .max_io_size(64 * 1024)
    }

    fn write_descriptor(addr: u64, payload: &[u8]) -> IoDescriptor {
        let mut io = IoDescriptor::new(IoDirection::Write, addr, payload.len() as u32);
        io.set_data(DataBuffer::from_slice(payload), 0);
        io
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("core".parse::<VolumeKind>().unwrap(), VolumeKind::Core);
        assert_eq!("cache".parse::<VolumeKind>().unwrap(), VolumeKind::Cache);

        let err = "swap".parse::<VolumeKind>().unwrap_err();
        assert!(matches!(err, VolumeError::UnknownVolume(name) if name == "swap"));
    }

    #[test]
    fn open_creates_sized_file() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let mut volume = FileVolume::new(VolumeKind::Core, &config);
        assert!(!volume.is_open());

        volume.open().unwrap();
        assert!(volume.is_open());

        let len = std::fs::metadata(dir.path().join("core")).unwrap().len();
        assert_eq!(len, config.capacity);

        volume.close().unwrap();
    }

    #[test]
    fn double_open_fails() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));

        volume.open().unwrap();
        assert!(matches!(
            volume.open(),
            Err(VolumeError::AlreadyOpen(VolumeKind::Core))
        ));
    }

    #[test]
    fn double_close_fails() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Cache, &test_config(dir.path()));

        volume.open().unwrap();
        volume.close().unwrap();
        assert!(matches!(
            volume.close(),
            Err(VolumeError::NotOpen(VolumeKind::Cache))
        ));
    }

    #[test]
    fn io_requires_open_volume() {
        let dir = tempdir().unwrap();
        let volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));

        let io = write_descriptor(0, &[0u8; 512]);
        assert!(matches!(
            volume.submit_io(&io),
            Err(VolumeError::NotOpen(VolumeKind::Core))
        ));
    }

    #[test]
    fn io_requires_bound_buffer() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        let io = IoDescriptor::new(IoDirection::Read, 0, 512);
        assert!(matches!(
            volume.submit_io(&io),
            Err(VolumeError::NoDataBound)
        ));
    }

    #[test]
    fn io_rejects_oversized_transfer() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        let len = volume.max_io_size() + 1;
        let mut io = IoDescriptor::new(IoDirection::Read, 0, len);
        io.set_data(DataBuffer::new(len as usize), 0);

        assert!(matches!(
            volume.submit_io(&io),
            Err(VolumeError::IoTooLarge { .. })
        ));
    }

    #[test]
    fn io_rejects_out_of_range_address() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        let mut io = IoDescriptor::new(IoDirection::Write, volume.length() - 256, 512);
        io.set_data(DataBuffer::new(512), 0);

        assert!(matches!(
            volume.submit_io(&io),
            Err(VolumeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn io_rejects_undersized_buffer_window() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        let mut io = IoDescriptor::new(IoDirection::Read, 0, 512);
        io.set_data(DataBuffer::new(512), 256);

        assert!(matches!(
            volume.submit_io(&io),
            Err(VolumeError::BufferTooSmall {
                need: 512,
                offset: 256,
                have: 512,
            })
        ));
    }

    #[test]
    fn write_read_round_trip() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        let payload: Vec<u8> = (0..512u32).map(|i| (i % 251) as u8).collect();
        let io = write_descriptor(4096, &payload);
        volume.submit_io(&io).unwrap();

        let mut read = IoDescriptor::new(IoDirection::Read, 4096, 512);
        let out = DataBuffer::new(512);
        read.set_data(out.clone(), 0);
        volume.submit_io(&read).unwrap();

        assert_eq!(out.copy_out(0, 512).unwrap(), payload);
    }

    #[test]
    fn transfer_honors_buffer_offset() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        // Payload sits in the middle of a larger buffer
        let buffer = DataBuffer::new(1024);
        buffer.lock()[256..512].fill(0x5a);

        let mut write = IoDescriptor::new(IoDirection::Write, 0, 256);
        write.set_data(buffer, 256);
        volume.submit_io(&write).unwrap();

        let out = DataBuffer::new(256);
        let mut read = IoDescriptor::new(IoDirection::Read, 0, 256);
        read.set_data(out.clone(), 0);
        volume.submit_io(&read).unwrap();

        assert_eq!(out.copy_out(0, 256).unwrap(), vec![0x5a; 256]);
    }

    #[test]
    fn flush_and_discard_complete_without_touching_contents() {
        let dir = tempdir().unwrap();
        let mut volume = FileVolume::new(VolumeKind::Core, &test_config(dir.path()));
        volume.open().unwrap();

        let payload = vec![0xcd; 512];
        volume.submit_io(&write_descriptor(8192, &payload)).unwrap();

        let span = IoDescriptor::new(IoDirection::Write, 0, 0);
        volume.submit_flush(&span).unwrap();
        volume.submit_discard(&span).unwrap();

        let out = DataBuffer::new(512);
        let mut read = IoDescriptor::new(IoDirection::Read, 8192, 512);
        read.set_data(out.clone(), 0);
        volume.submit_io(&read).unwrap();
        assert_eq!(out.copy_out(0, 512).unwrap(), payload);
    }

    #[test]
    fn reopen_preserves_contents() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let payload = vec![0xee; 4096];
        {
            let mut volume = FileVolume::new(VolumeKind::Cache, &config);
            volume.open().unwrap();
            volume.submit_io(&write_descriptor(0, &payload)).unwrap();
            volume.close().unwrap();
        }

        let mut volume = FileVolume::new(VolumeKind::Cache, &config);
        volume.open().unwrap();

        let out = DataBuffer::new(4096);
        let mut read = IoDescriptor::new(IoDirection::Read, 0, 4096);
        read.set_data(out.clone(), 0);
        volume.submit_io(&read).unwrap();
        assert_eq!(out.copy_out(0, 4096).unwrap(), payload);

        // Reopen must not have truncated or resized the file
        let len = std::fs::metadata(volume.path()).unwrap().len();
        assert_eq!(len, config.capacity);
    }

    #[test]
    fn short_existing_file_is_extended() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let path = dir.path().join("core");

        std::fs::write(&path, b"stub").unwrap();

        let mut volume = FileVolume::new(VolumeKind::Core, &config);
        volume.open().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len, config.capacity);

        // Prior bytes survive extension
        let out = DataBuffer::new(4);
        let mut read = IoDescriptor::new(IoDirection::Read, 0, 4);
        read.set_data(out.clone(), 0);
        volume.submit_io(&read).unwrap();
        assert_eq!(out.copy_out(0, 4).unwrap(), b"stub");
    }

    #[test]
    fn length_and_max_io_size_are_constant() {
        let dir = tempdir().unwrap();
        let config = VolumeConfig::new().dir(dir.path());

        for kind in VolumeKind::ALL {
            let volume = FileVolume::new(kind, &config);
            assert_eq!(volume.length(), 209_715_200);
            assert_eq!(volume.max_io_size(), 131_072);
        }
    }
}
