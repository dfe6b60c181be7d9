// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Boot-time construction of the PSCI power domain topology.
//!
//! This crate builds the data structures the PSCI implementation coordinates on at runtime: the
//! tree of power domains with CPUs as leaves, the per-CPU non-secure context slots, and the
//! capability mask derived from the platform's power management hook table. Construction runs
//! exactly once, on the primary CPU, before any secondary CPU is released from reset. After that
//! the tree shape is immutable; only the per-node state fields change, under the per-node locks.
//!
//! The platform describes its topology as a flat array of child counts in breadth-first order
//! (see [`platform::Platform::topology`]). [`setup::PsciTopology::new`] decodes it, computes the
//! CPU index range covered by every non-CPU domain, marks the booting CPU's ancestry path on and
//! derives the capability mask from the hook table.

#![cfg_attr(not(test), no_std)]

pub mod context;
pub mod hw;
pub mod platform;
pub mod setup;
pub mod tree;

pub use setup::{PsciCapabilities, PsciTopology, get, init};
pub use tree::PowerDomainTree;
