// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Narrow hardware access capability injected into the bootstrap path.
//!
//! The topology construction needs exactly two things from the hardware: the identity of the
//! processor it is running on, and the ability to flush written structures to memory on platforms
//! where they are not allocated in coherent memory. Keeping these behind a trait instead of ad hoc
//! register and cache calls lets the whole bootstrap run on the host with a fake implementation.

use arm_psci::Mpidr;

#[cfg(all(target_arch = "aarch64", not(test)))]
mod el3;
#[cfg(all(target_arch = "aarch64", not(test)))]
pub use el3::El3Hardware;

/// Access to the current processor's identity and to cache maintenance.
pub trait HardwareAccess {
    /// Whether the power domain node arrays live in memory that is coherent for all processors.
    ///
    /// When this is `false`, the bootstrap explicitly flushes the node arrays before secondary
    /// CPUs — which are not yet coherency participants — can observe them. The per-node locks do
    /// not help here, as locking presumes coherency.
    const COHERENT_MEMORY: bool;

    /// Reads the affinity identifier of the calling processor.
    fn current_affinity_id(&self) -> Mpidr;

    /// Flushes the data cache for the `size` bytes starting at `base`, making preceding writes to
    /// that range visible to observers outside the coherency domain.
    fn flush_data_cache_range(&self, base: usize, size: usize);
}

/// Flushes the memory occupied by `object` through `hw`, if the memory model requires it.
pub fn flush_object<H: HardwareAccess, T: ?Sized>(hw: &H, object: &T) {
    if !H::COHERENT_MEMORY {
        hw.flush_data_cache_range(object as *const T as *const () as usize, size_of_val(object));
    }
}
