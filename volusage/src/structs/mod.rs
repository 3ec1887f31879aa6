//! Scheduler-side objects consumed by the usage tracker.
//!
//! The tracker only needs two capabilities from its collaborators, expressed
//! as the [`Claimant`] and [`VolumeIdentity`] traits. `Allocation` and
//! `CsiVolume` are the concrete types the volume manager hands in.

mod alloc;
mod volume;

pub use alloc::{AllocClientStatus, AllocID, Allocation, Job};
pub use volume::CsiVolume;

use crate::usage::VolumeRef;

/// A workload that can hold a claim on a volume.
pub trait Claimant: Clone {
    /// Stable identity used to match claims on release.
    fn claim_id(&self) -> &AllocID;

    /// Copy retained by the tracker. Must drop heavy owned substructures
    /// (job definitions and the like) so the tracker does not extend their
    /// lifetime.
    fn detached_copy(&self) -> Self;
}

/// Anything that resolves to a logical volume identity.
pub trait VolumeIdentity {
    fn volume_ref(&self) -> VolumeRef;
}

impl VolumeIdentity for VolumeRef {
    fn volume_ref(&self) -> VolumeRef {
        self.clone()
    }
}

impl<T: VolumeIdentity + ?Sized> VolumeIdentity for &T {
    fn volume_ref(&self) -> VolumeRef {
        (**self).volume_ref()
    }
}
