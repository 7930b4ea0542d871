//! Volume-type registry and framework context.
//!
//! The storage framework integrates with volume backends through a
//! [`Context`]: backend implementations register a factory under a
//! numeric type identifier, and the framework instantiates volumes by
//! type and logical name. The context also owns the one piece of
//! cross-call state in this crate, the reload flag.

use crate::backend::VolumeBackend;
use crate::config::VolumeConfig;
use crate::error::{VolumeError, VolumeResult};
use crate::volume::{FileVolume, VolumeKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Identifier a volume type is registered under.
pub type VolumeTypeId = u32;

/// Type identifier for the file-backed volume implementation.
pub const FILE_VOLUME_TYPE: VolumeTypeId = 1;

/// Properties describing a registered volume type.
#[derive(Debug, Clone)]
pub struct VolumeTypeProps {
    /// Human-readable type name for diagnostics.
    pub name: &'static str,

    /// Whether the backend provides atomic writes. The file-backed
    /// implementation does not.
    pub atomic_writes: bool,
}

/// Factory producing backend instances for a registered type.
pub type VolumeFactory =
    Box<dyn Fn(VolumeKind, &VolumeConfig) -> Box<dyn VolumeBackend> + Send + Sync>;

struct VolumeType {
    props: VolumeTypeProps,
    factory: VolumeFactory,
}

/// Framework context owning the volume-type registry and reload state.
pub struct Context {
    config: VolumeConfig,
    types: Mutex<HashMap<VolumeTypeId, VolumeType>>,
    reload: OnceLock<bool>,
}

impl Context {
    /// Create a context with the given configuration.
    pub fn new(config: VolumeConfig) -> VolumeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            types: Mutex::new(HashMap::new()),
            reload: OnceLock::new(),
        })
    }

    /// The context's volume configuration.
    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    /// Register a volume type under `id`.
    ///
    /// Fails if a type with the same identifier is already registered.
    pub fn register_volume_type(
        &self,
        id: VolumeTypeId,
        props: VolumeTypeProps,
        factory: VolumeFactory,
    ) -> VolumeResult<()> {
        let mut types = self.types.lock();
        if types.contains_key(&id) {
            return Err(VolumeError::TypeExists(id));
        }

        debug!(id, name = props.name, "volume type registered");
        types.insert(id, VolumeType { props, factory });
        Ok(())
    }

    /// Unregister the volume type under `id`.
    pub fn unregister_volume_type(&self, id: VolumeTypeId) -> VolumeResult<()> {
        let mut types = self.types.lock();
        let removed = types.remove(&id).ok_or(VolumeError::UnknownType(id))?;

        debug!(id, name = removed.props.name, "volume type unregistered");
        Ok(())
    }

    /// Properties of the volume type under `id`.
    pub fn volume_type_props(&self, id: VolumeTypeId) -> VolumeResult<VolumeTypeProps> {
        let types = self.types.lock();
        let entry = types.get(&id).ok_or(VolumeError::UnknownType(id))?;
        Ok(entry.props.clone())
    }

    /// Instantiate a closed volume of the registered type `id`.
    ///
    /// The logical `name` must be one of the recognized volume names;
    /// anything else fails resolution rather than defaulting to a known
    /// backing path.
    pub fn volume(&self, id: VolumeTypeId, name: &str) -> VolumeResult<Box<dyn VolumeBackend>> {
        let kind: VolumeKind = name.parse()?;

        let types = self.types.lock();
        let entry = types.get(&id).ok_or(VolumeError::UnknownType(id))?;
        Ok((entry.factory)(kind, &self.config))
    }

    /// Whether the cache volume's backing file pre-existed this context.
    ///
    /// Checked against the filesystem exactly once; every later call
    /// returns the cached answer even if the backing file has since been
    /// created or deleted. The framework uses this to choose between
    /// initializing fresh cache metadata and recovering the previous
    /// session's.
    pub fn volume_previously_existed(&self) -> bool {
        *self.reload.get_or_init(|| {
            self.config
                .dir
                .join(VolumeKind::Cache.file_name())
                .exists()
        })
    }
}

/// Register the file-backed volume implementation with a context.
///
/// Call once after creating the context; pair with
/// [`Context::unregister_volume_type`] on teardown.
pub fn register_file_volume(ctx: &Context) -> VolumeResult<()> {
    ctx.register_volume_type(
        FILE_VOLUME_TYPE,
        VolumeTypeProps {
            name: "file-volume",
            atomic_writes: false,
        },
        Box::new(|kind, config| Box::new(FileVolume::new(kind, config))),
    )
}
