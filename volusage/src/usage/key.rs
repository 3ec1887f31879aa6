//! Usage keys: what a set of claims is recorded against.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical identity of a volume.
///
/// Keys are built from this rather than from a volume object, so two
/// separately loaded copies of the same volume land on the same usage set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeRef {
    pub namespace: String,
    pub volume_id: String,
}

impl VolumeRef {
    pub fn new(namespace: impl Into<String>, volume_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            volume_id: volume_id.into(),
        }
    }
}

impl fmt::Display for VolumeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.volume_id)
    }
}

/// How the volume is presented to the workload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentMode {
    #[default]
    Unknown,
    BlockDevice,
    FileSystem,
}

impl AttachmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentMode::Unknown => "unknown",
            AttachmentMode::BlockDevice => "block",
            AttachmentMode::FileSystem => "file-system",
        }
    }
}

/// How many nodes and writers may share the volume.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    #[default]
    Unknown,
    SingleNodeReaderOnly,
    SingleNodeWriter,
    MultiNodeReaderOnly,
    MultiNodeSingleWriter,
    MultiNodeMultiWriter,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Unknown => "unknown",
            AccessMode::SingleNodeReaderOnly => "single-node-reader-only",
            AccessMode::SingleNodeWriter => "single-node-writer",
            AccessMode::MultiNodeReaderOnly => "multi-node-reader-only",
            AccessMode::MultiNodeSingleWriter => "multi-node-single-writer",
            AccessMode::MultiNodeMultiWriter => "multi-node-multi-writer",
        }
    }
}

/// Requested usage mode of a claim.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(default)]
pub struct UsageOptions {
    pub read_only: bool,
    pub attachment_mode: AttachmentMode,
    pub access_mode: AccessMode,
}

impl UsageOptions {
    /// Stable, filesystem-safe rendering, e.g. `ro-file-system-single-node-reader-only`.
    pub fn to_key_string(&self) -> String {
        let rw = if self.read_only { "ro" } else { "rw" };
        format!(
            "{}-{}-{}",
            rw,
            self.attachment_mode.as_str(),
            self.access_mode.as_str()
        )
    }
}

/// Key of one usage set.
///
/// `usage: None` is the single implicit mode used by plain claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UsageKey {
    pub volume: VolumeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageOptions>,
}

impl UsageKey {
    pub fn new(volume: VolumeRef) -> Self {
        Self {
            volume,
            usage: None,
        }
    }

    pub fn with_usage(volume: VolumeRef, usage: UsageOptions) -> Self {
        Self {
            volume,
            usage: Some(usage),
        }
    }
}

impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.usage {
            Some(usage) => write!(f, "{}[{}]", self.volume, usage.to_key_string()),
            None => write!(f, "{}", self.volume),
        }
    }
}
