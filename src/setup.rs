// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Bootstrap initialization of the PSCI topology on the primary CPU.
//!
//! [`PsciTopology::new`] runs the whole boot-time sequence: build the power domain tree from the
//! platform descriptor, compute and verify the CPU ranges, record the booting CPU's identity,
//! flush the structures for not-yet-coherent observers, mark the boot path powered, and derive
//! the capability mask from the platform's power management hooks. Every failure on this path is
//! a configuration error the firmware cannot continue from, so it aborts.

use crate::{
    hw::HardwareAccess,
    platform::{Platform, PlatformImpl, PowerManagementHooks},
    tree::PowerDomainTree,
};
use bitflags::bitflags;
use core::fmt::{self, Debug, Formatter};
use log::info;
use spin::Once;

bitflags! {
    /// The PSCI operations the platform supports.
    #[derive(Debug, Eq, PartialEq, Clone, Copy)]
    #[repr(transparent)]
    pub struct PsciCapabilities: u32 {
        /// Version, feature and state queries, supported on every platform.
        const GENERIC = 1 << 0;
        /// `CPU_OFF`.
        const CPU_OFF = 1 << 1;
        /// `CPU_ON`.
        const CPU_ON = 1 << 2;
        /// `CPU_SUSPEND`.
        const CPU_SUSPEND = 1 << 3;
        /// `SYSTEM_OFF`.
        const SYSTEM_OFF = 1 << 4;
        /// `SYSTEM_RESET`.
        const SYSTEM_RESET = 1 << 5;
    }
}

impl PsciCapabilities {
    /// Derives the capability mask from the hooks the platform provides.
    ///
    /// `CPU_ON` and `CPU_SUSPEND` each need both their request and their completion hook; the
    /// other operations need a single hook. The generic queries depend on no hooks at all.
    pub fn derive(hooks: &PowerManagementHooks) -> Self {
        let mut capabilities = Self::GENERIC;

        if hooks.domain_off.is_some() {
            capabilities |= Self::CPU_OFF;
        }
        if hooks.domain_on.is_some() && hooks.domain_on_finish.is_some() {
            capabilities |= Self::CPU_ON;
        }
        if hooks.domain_suspend.is_some() && hooks.domain_suspend_finish.is_some() {
            capabilities |= Self::CPU_SUSPEND;
        }
        if hooks.system_off.is_some() {
            capabilities |= Self::SYSTEM_OFF;
        }
        if hooks.system_reset.is_some() {
            capabilities |= Self::SYSTEM_RESET;
        }

        capabilities
    }
}

/// The initialized PSCI topology: the power domain tree, the platform's power management hook
/// table, and the capability mask derived from it.
pub struct PsciTopology {
    tree: PowerDomainTree,
    hooks: &'static PowerManagementHooks,
    capabilities: PsciCapabilities,
}

impl PsciTopology {
    /// Builds the power domain topology on the booting CPU.
    ///
    /// Must run exactly once, on the primary CPU, before any secondary CPU is released. Aborts on
    /// a malformed topology descriptor or a missing hook table.
    ///
    /// The caller owns the returned value's final location: on platforms without coherent memory
    /// the tree must be flushed there, via [`PowerDomainTree::flush`], before any secondary CPU
    /// can observe it. Flushing earlier would only cover wherever the value lived at the time.
    /// [`init`] stores the instance in a static and flushes it in place.
    pub fn new<H: HardwareAccess>(hw: &H) -> Self {
        Self::with_hooks(hw, PlatformImpl::power_management_hooks())
    }

    fn with_hooks<H: HardwareAccess>(
        hw: &H,
        hooks: Option<&'static PowerManagementHooks>,
    ) -> Self {
        let tree = PowerDomainTree::new(PlatformImpl::topology());
        tree.update_cpu_ranges();
        tree.verify_cpu_ranges();

        let mpidr = hw.current_affinity_id();
        assert!(
            PlatformImpl::mpidr_is_valid(mpidr),
            "booting CPU's affinity identifier is unknown to the platform"
        );
        let primary_index = PlatformImpl::core_position(mpidr);
        tree.register_cpu(primary_index, mpidr);

        tree.set_boot_path_on(primary_index);

        let hooks = hooks.expect("platform provided no power management hooks");
        let capabilities = PsciCapabilities::derive(hooks);

        info!("PSCI topology initialized on CPU {primary_index}, capabilities {capabilities:?}");

        Self {
            tree,
            hooks,
            capabilities,
        }
    }

    /// The power domain tree.
    pub fn tree(&self) -> &PowerDomainTree {
        &self.tree
    }

    /// The platform's power management hook table.
    pub fn hooks(&self) -> &'static PowerManagementHooks {
        self.hooks
    }

    /// The supported PSCI operations, fixed at initialization.
    pub fn capabilities(&self) -> PsciCapabilities {
        self.capabilities
    }
}

impl Debug for PsciTopology {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.tree.fmt(f)
    }
}

static TOPOLOGY: Once<PsciTopology> = Once::new();

/// Initializes the PSCI topology singleton on the booting CPU and returns it.
///
/// Only the first call initializes; later calls return the existing instance.
pub fn init<H: HardwareAccess>(hw: &H) -> &'static PsciTopology {
    let topology = TOPOLOGY.call_once(|| PsciTopology::new(hw));
    // Secondaries outside the coherency domain read the tree at this address, so the flush must
    // happen after the move into the static, not on the temporary the builder worked on.
    topology.tree.flush(hw);
    topology
}

/// Returns the PSCI topology singleton. Panics if [`init`] has not completed.
pub fn get() -> &'static PsciTopology {
    TOPOLOGY
        .get()
        .expect("PSCI topology accessed before initialization")
}
