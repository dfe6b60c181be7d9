// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Per-CPU non-secure execution context slots.
//!
//! One context per CPU, indexed by the same linear core index as the CPU leaf nodes of the power
//! domain tree. The slots hold the architectural state programmed before returning to the normal
//! world; this crate only owns their allocation and reset, the world-switch code fills them in.

use crate::platform::{Platform, PlatformImpl};
use spin::mutex::SpinMutex;

/// The number of general purpose registers saved per context.
const GP_REG_COUNT: usize = 31;

/// Saved non-secure execution state of one CPU.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CpuContext {
    /// Saved general purpose registers x0-x30.
    pub gp_regs: [u64; GP_REG_COUNT],
    /// Saved stack pointer.
    pub sp: u64,
    /// Exception return address.
    pub elr: u64,
    /// Saved program status.
    pub spsr: u64,
}

impl CpuContext {
    const EMPTY: Self = Self {
        gp_regs: [0; GP_REG_COUNT],
        sp: 0,
        elr: 0,
        spsr: 0,
    };

    /// Returns the context to its empty post-boot state.
    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

static NS_CPU_CONTEXTS: [SpinMutex<CpuContext>; PlatformImpl::CORE_COUNT] =
    [const { SpinMutex::new(CpuContext::EMPTY) }; PlatformImpl::CORE_COUNT];

/// Returns the non-secure context slot associated with the given core index.
pub fn ns_context(cpu_index: usize) -> &'static SpinMutex<CpuContext> {
    &NS_CPU_CONTEXTS[cpu_index]
}

/// Resets the context slot of a CPU while its leaf node is allocated.
pub(crate) fn reset_ns_context(cpu_index: usize) {
    NS_CPU_CONTEXTS[cpu_index].lock().reset();
}
