//! The volume backend capability trait.

use crate::error::VolumeResult;
use crate::io::IoDescriptor;

/// The operation set a volume backend exposes to the storage framework.
///
/// The framework holds implementations behind `dyn VolumeBackend` and
/// drives them through this trait alone. Every operation is synchronous:
/// completion is the returned [`VolumeResult`], delivered before the call
/// returns. No operation queues work or suspends.
///
/// Lifecycle: [`open`](Self::open) acquires the backing store,
/// [`close`](Self::close) releases it. Submitting I/O against a volume
/// that is not open is an error. Close is not idempotent; a double close
/// fails rather than silently succeeding.
pub trait VolumeBackend: Send + std::fmt::Debug {
    /// Acquire the backing store for this volume.
    ///
    /// A pre-existing backing store is reused without truncation so its
    /// contents survive across process restarts; an absent one is created
    /// and sized to the full volume capacity.
    fn open(&mut self) -> VolumeResult<()>;

    /// Release the backing store.
    fn close(&mut self) -> VolumeResult<()>;

    /// Perform one positional transfer described by `io`.
    ///
    /// The descriptor must have a data buffer bound. The transfer runs to
    /// completion before this returns; any I/O failure or shortfall is
    /// reported through the returned result, the same path a success
    /// takes.
    fn submit_io(&self, io: &IoDescriptor) -> VolumeResult<()>;

    /// Flush the backing store. The emulated backend has no volatile
    /// write cache, so this completes immediately with success.
    fn submit_flush(&self, io: &IoDescriptor) -> VolumeResult<()>;

    /// Discard a byte range. The emulated backend treats this as a no-op
    /// and completes immediately with success.
    fn submit_discard(&self, io: &IoDescriptor) -> VolumeResult<()>;

    /// Logical size of the volume in bytes.
    fn length(&self) -> u64;

    /// Largest single transfer the caller may submit, in bytes.
    fn max_io_size(&self) -> u32;
}
