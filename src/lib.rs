//! file-volume: an emulated block-storage backend persisted to host files.
//!
//! This crate presents fixed-size addressable byte volumes to a storage
//! engine, persisting each volume's bytes to a single flat file. It is
//! the substrate a caching engine runs against when no real block device
//! is available:
//!
//! - **Config**: `VolumeConfig` — backing directory, capacity, max I/O size
//! - **Volumes**: `FileVolume` — open/close lifecycle, lazy backing-file
//!   creation vs. reuse
//! - **I/O**: `IoDescriptor` + `DataBuffer` — positional transfers against
//!   an open volume
//! - **Registry**: `Context` — volume-type registration and instantiation,
//!   plus reload detection
//!
//! # Architecture
//!
//! ```text
//!        +---------------------------+
//!        |      storage engine       |
//!        |  (cache policy, queueing) |
//!        +-------------+-------------+
//!                      |
//!                      v
//!        +---------------------------+
//!        |          Context          |
//!        |   (volume-type registry)  |
//!        +-------------+-------------+
//!                      |
//!                      v
//!        +---------------------------+
//!        |  dyn VolumeBackend        |
//!        |  (FileVolume)             |
//!        +------+-------------+------+
//!               |             |
//!               v             v
//!          "cache" file   "core" file
//! ```
//!
//! Every operation is synchronous: `submit_io` performs its positional
//! transfer and reports completion through its returned result before it
//! returns. The crate imposes no ordering between overlapping transfers
//! submitted concurrently; that is the engine's job.
//!
//! # Example
//!
//! ```no_run
//! use file_volume::{
//!     Context, DataBuffer, IoDescriptor, IoDirection, VolumeConfig,
//!     registry::{FILE_VOLUME_TYPE, register_file_volume},
//! };
//!
//! # fn main() -> Result<(), file_volume::VolumeError> {
//! let ctx = Context::new(VolumeConfig::default())?;
//! register_file_volume(&ctx)?;
//!
//! let mut volume = ctx.volume(FILE_VOLUME_TYPE, "core")?;
//! volume.open()?;
//!
//! let mut io = IoDescriptor::new(IoDirection::Write, 0, 4096);
//! io.set_data(DataBuffer::new(4096), 0);
//! volume.submit_io(&io)?;
//!
//! volume.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod config;
mod data;
mod error;
mod io;
pub mod registry;
mod volume;

pub use backend::VolumeBackend;
pub use config::VolumeConfig;
pub use data::DataBuffer;
pub use error::{VolumeError, VolumeResult};
pub use io::{IoDescriptor, IoDirection};
pub use registry::Context;
pub use volume::{FileVolume, VolumeKind};
