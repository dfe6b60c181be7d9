// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Topology description for the Arm FVP base platform.

use super::{Platform, PowerManagementHooks};
use arm_psci::Mpidr;

const FVP_CLUSTER_COUNT: usize = 2;
const FVP_MAX_CPUS_PER_CLUSTER: usize = 4;

/// The FVP base platform: two clusters of four CPUs below one system domain.
pub struct Fvp;

impl Platform for Fvp {
    const CORE_COUNT: usize = FVP_CLUSTER_COUNT * FVP_MAX_CPUS_PER_CLUSTER;
    const MAX_POWER_LEVEL: usize = 2;
    const POWER_DOMAIN_COUNT: usize = 1 + FVP_CLUSTER_COUNT + Self::CORE_COUNT;

    fn topology() -> &'static [usize] {
        &[1, FVP_CLUSTER_COUNT, FVP_MAX_CPUS_PER_CLUSTER, FVP_MAX_CPUS_PER_CLUSTER]
    }

    fn mpidr_is_valid(mpidr: Mpidr) -> bool {
        mpidr.aff3.unwrap_or(0) == 0
            && mpidr.aff2 == 0
            && usize::from(mpidr.aff1) < FVP_CLUSTER_COUNT
            && usize::from(mpidr.aff0) < FVP_MAX_CPUS_PER_CLUSTER
    }

    fn core_position(mpidr: Mpidr) -> usize {
        usize::from(mpidr.aff1) * FVP_MAX_CPUS_PER_CLUSTER + usize::from(mpidr.aff0)
    }

    fn power_management_hooks() -> Option<&'static PowerManagementHooks> {
        super::registered_power_management_hooks()
    }
}
