//! Error types for volume operations.

use crate::volume::VolumeKind;

/// Result alias for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// Errors that can occur during volume lifecycle, I/O dispatch, or
/// registry operations.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// The volume name is not one of the recognized kinds.
    #[error("unknown volume name: {0:?}")]
    UnknownVolume(String),

    /// The volume instance already holds an open backing file.
    #[error("volume {0} is already open")]
    AlreadyOpen(VolumeKind),

    /// The operation requires an open backing file. Also raised on
    /// double close.
    #[error("volume {0} is not open")]
    NotOpen(VolumeKind),

    /// The request length exceeds the advertised maximum I/O size.
    #[error("io length {len} exceeds max io size {max}")]
    IoTooLarge {
        /// Requested transfer length.
        len: u32,
        /// Maximum single-transfer length for this volume.
        max: u32,
    },

    /// The request range does not fit within the volume.
    #[error("io range out of bounds: addr {addr} + len {len} > capacity {capacity}")]
    OutOfRange {
        /// Requested starting address.
        addr: u64,
        /// Requested transfer length.
        len: u32,
        /// Volume capacity in bytes.
        capacity: u64,
    },

    /// The descriptor was submitted without a bound data buffer.
    #[error("io descriptor has no data buffer bound")]
    NoDataBound,

    /// The bound buffer window does not cover the transfer.
    #[error("data buffer too small: need {need} bytes at offset {offset}, have {have}")]
    BufferTooSmall {
        /// Bytes required by the transfer.
        need: usize,
        /// Recorded offset into the buffer.
        offset: usize,
        /// Total buffer length.
        have: usize,
    },

    /// A volume type with this identifier is already registered.
    #[error("volume type {0} already registered")]
    TypeExists(u32),

    /// No volume type with this identifier is registered.
    #[error("volume type {0} not registered")]
    UnknownType(u32),

    /// Configuration failed validation or could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Backing-file creation, open, resize, or transfer failure.
    /// Short positional transfers surface here as well.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
