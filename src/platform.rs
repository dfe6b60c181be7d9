// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Platform description of the power domain topology and the power management hook table.

use arm_psci::{ErrorCode, Mpidr};
#[cfg(not(test))]
use spin::Once;

macro_rules! select_platform {
    (platform = $condition:literal, $mod:ident::$plat_impl:ident) => {
        #[cfg(all(platform = $condition, not(test)))]
        mod $mod;

        #[cfg(all(platform = $condition, not(test)))]
        pub use $mod::$plat_impl as PlatformImpl;
    };
    (default, $mod:ident::$plat_impl:ident) => {
        #[cfg(all(not(platform = "fvp"), not(test)))]
        mod $mod;

        #[cfg(all(not(platform = "fvp"), not(test)))]
        pub use $mod::$plat_impl as PlatformImpl;
    };
    (test, $mod:ident::$plat_impl:ident) => {
        #[cfg(test)]
        pub mod $mod;

        #[cfg(test)]
        pub use $mod::$plat_impl as PlatformImpl;
    };
}

select_platform!(platform = "fvp", fvp::Fvp);
select_platform!(default, qemu::Qemu);
select_platform!(test, test::TestPlatform);

/// Static description of a platform's power domain topology.
///
/// Every constant and function is fixed at build time; the topology cannot change after boot.
pub trait Platform {
    /// The number of CPU cores, which is also the number of leaf nodes in the topology tree.
    const CORE_COUNT: usize;

    /// The highest power domain level. CPUs are level 0, so this is also the number of non-CPU
    /// levels in the tree.
    const MAX_POWER_LEVEL: usize;

    /// The total number of power domains, CPUs included.
    const POWER_DOMAIN_COUNT: usize;

    /// Returns the power domain topology as the count of child nodes in breadth-first traversal
    /// order. The first entry is the number of root power domains.
    ///
    /// Children of the same parent must be mapped to adjacent core indices by
    /// [`core_position`](Self::core_position); the tree builder relies on this to compute
    /// contiguous CPU ranges.
    fn topology() -> &'static [usize];

    /// Returns whether the given MPIDR names a CPU that exists on this platform.
    fn mpidr_is_valid(mpidr: Mpidr) -> bool;

    /// Returns the linear core index for a valid MPIDR.
    ///
    /// The result is unique per valid MPIDR and smaller than [`CORE_COUNT`](Self::CORE_COUNT).
    fn core_position(mpidr: Mpidr) -> usize;

    /// Returns the platform's power management hook table, if it has been provided.
    ///
    /// Returning `None` is a fatal platform configuration error: the PSCI service cannot operate
    /// without at least the mandatory hooks.
    fn power_management_hooks() -> Option<&'static PowerManagementHooks>;
}

/// The power management hooks a platform exposes to the PSCI implementation.
///
/// Only the presence of each hook matters to this crate: the derived capability mask advertises
/// an operation exactly when the hooks it needs are present. The hooks themselves are invoked by
/// the runtime coordinator, not here.
#[derive(Clone, Copy, Debug)]
pub struct PowerManagementHooks {
    /// Turns on the power domain of the CPU identified by the MPIDR.
    pub domain_on: Option<fn(Mpidr) -> Result<(), ErrorCode>>,
    /// Completes a power-on on the freshly started CPU.
    pub domain_on_finish: Option<fn()>,
    /// Programs the power controller to turn the calling CPU's domain off.
    pub domain_off: Option<fn()>,
    /// Programs the power controller for a suspend of the calling CPU's domain.
    pub domain_suspend: Option<fn()>,
    /// Completes a suspend after wake-up.
    pub domain_suspend_finish: Option<fn()>,
    /// Shuts down the system.
    pub system_off: Option<fn() -> !>,
    /// Resets the system, equivalent to a hardware power cycle.
    pub system_reset: Option<fn() -> !>,
}

#[cfg(not(test))]
static PM_HOOKS: Once<&'static PowerManagementHooks> = Once::new();

/// Registers the power management hook table.
///
/// The embedding firmware must call this once, before [`crate::setup::PsciTopology::new`] runs on
/// the primary CPU. Later calls are ignored.
#[cfg(not(test))]
pub fn register_power_management_hooks(hooks: &'static PowerManagementHooks) {
    PM_HOOKS.call_once(|| hooks);
}

#[cfg(not(test))]
fn registered_power_management_hooks() -> Option<&'static PowerManagementHooks> {
    PM_HOOKS.get().copied()
}
