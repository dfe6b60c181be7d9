// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Hardware access backed by the real EL3 system registers and cache maintenance instructions.

use super::HardwareAccess;
use arm_psci::Mpidr;
use core::arch::asm;

const MPIDR_AFF_MASK: u64 = 0xff;
const MPIDR_AFF1_SHIFT: u64 = 8;
const MPIDR_AFF2_SHIFT: u64 = 16;
const MPIDR_AFF3_SHIFT: u64 = 32;

/// CTR_EL0.DminLine, log2 of the smallest data cache line in words.
const CTR_DMINLINE_SHIFT: u64 = 16;
const CTR_DMINLINE_MASK: u64 = 0xf;

/// Hardware access for aarch64 at EL3.
pub struct El3Hardware;

impl HardwareAccess for El3Hardware {
    // BL31 keeps these structures in normal memory; secondaries observe them before enabling
    // their data caches.
    const COHERENT_MEMORY: bool = false;

    fn current_affinity_id(&self) -> Mpidr {
        let mpidr: u64;
        // SAFETY: Reading MPIDR_EL1 has no side effects.
        unsafe {
            asm!("mrs {}, mpidr_el1", out(reg) mpidr, options(nomem, nostack, preserves_flags));
        }
        Mpidr {
            aff0: (mpidr & MPIDR_AFF_MASK) as u8,
            aff1: ((mpidr >> MPIDR_AFF1_SHIFT) & MPIDR_AFF_MASK) as u8,
            aff2: ((mpidr >> MPIDR_AFF2_SHIFT) & MPIDR_AFF_MASK) as u8,
            aff3: Some(((mpidr >> MPIDR_AFF3_SHIFT) & MPIDR_AFF_MASK) as u8),
        }
    }

    fn flush_data_cache_range(&self, base: usize, size: usize) {
        let ctr: u64;
        // SAFETY: Reading CTR_EL0 has no side effects.
        unsafe {
            asm!("mrs {}, ctr_el0", out(reg) ctr, options(nomem, nostack, preserves_flags));
        }
        let line_size = 4usize << ((ctr >> CTR_DMINLINE_SHIFT) & CTR_DMINLINE_MASK);

        let mut address = base & !(line_size - 1);
        while address < base + size {
            // SAFETY: DC CVAC only cleans the data cache; it does not access or modify the
            // memory contents.
            unsafe {
                asm!("dc cvac, {}", in(reg) address, options(nostack, preserves_flags));
            }
            address += line_size;
        }
        // Complete the cache maintenance before any other observer is released.
        // SAFETY: DSB is a barrier with no memory access of its own.
        unsafe {
            asm!("dsb sy", options(nostack, preserves_flags));
        }
    }
}
