//! CSI volume type.

use std::collections::BTreeSet;

use super::{AllocID, VolumeIdentity};
use crate::usage::VolumeRef;

/// A CSI volume as known to the node.
///
/// Only `namespace` and `id` form the volume's identity. The remaining
/// fields are housekeeping that changes over the volume's life.
#[derive(Debug, Clone, Default)]
pub struct CsiVolume {
    pub id: String,
    pub namespace: String,
    pub name: String,
    pub plugin_id: String,
    pub schedulable: bool,
    pub read_allocs: BTreeSet<AllocID>,
    pub write_allocs: BTreeSet<AllocID>,
}

impl CsiVolume {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            namespace: namespace.into(),
            schedulable: true,
            ..Default::default()
        }
    }

    pub fn with_plugin(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugin_id = plugin_id.into();
        self
    }
}

impl VolumeIdentity for CsiVolume {
    fn volume_ref(&self) -> VolumeRef {
        VolumeRef::new(&self.namespace, &self.id)
    }
}
