// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The power domain tree: non-CPU domain nodes and CPU leaf nodes in two fixed-capacity arenas.
//!
//! The tree is built once by the primary CPU from the platform's breadth-first topology
//! descriptor. Nodes refer to each other by index, not by reference, so the whole structure lives
//! in statically sized arrays and never allocates. Every node is wrapped in a [`SpinMutex`]; the
//! mutex is the per-node lock the runtime coordinator takes when reading or changing aggregate
//! power state once secondary CPUs are running. Construction itself is single-threaded and leaves
//! every lock released.

use crate::{
    context,
    hw::{self, HardwareAccess},
    platform::{Platform, PlatformImpl},
};
use arm_psci::{AffinityInfo, Mpidr, PowerState};
use arrayvec::ArrayVec;
use core::{
    fmt::{self, Debug, Formatter},
    ops::Range,
    slice::{Iter, IterMut},
};
use log::debug;
use spin::mutex::{SpinMutex, SpinMutexGuard};

/// Aggregate power state of a non-CPU power domain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LocalPowerState {
    /// Every CPU below the domain is off, so the domain itself may be powered down.
    Off,
    /// At least one CPU below the domain needs it powered.
    On,
}

/// A non-CPU power domain node, e.g. a cluster or the whole system.
#[derive(Debug)]
pub struct PowerDomainNode {
    /// Hierarchy level; CPU leaves are level 0, so this is at least 1.
    level: usize,
    /// Parent node index, or `None` for a root domain.
    parent: Option<usize>,
    /// Range of CPU leaf indices covered by this node's subtree.
    cpu_range: Range<usize>,
    /// Aggregate power state of the domain.
    local_state: LocalPowerState,
}

impl PowerDomainNode {
    fn new(level: usize, parent: Option<usize>) -> Self {
        Self {
            level,
            parent,
            cpu_range: 0..0,
            local_state: LocalPowerState::Off,
        }
    }

    /// Hierarchy level of this node; CPU leaves are level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Index of the parent node, or `None` for a root domain.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Range of CPU leaf indices covered by this node's subtree.
    pub fn cpu_range(&self) -> Range<usize> {
        self.cpu_range.clone()
    }

    /// First CPU leaf index covered by this node's subtree.
    pub fn cpu_start_index(&self) -> usize {
        self.cpu_range.start
    }

    /// Number of CPU leaves covered by this node's subtree.
    pub fn cpu_count(&self) -> usize {
        self.cpu_range.len()
    }

    /// Aggregate power state of the domain.
    pub fn local_state(&self) -> LocalPowerState {
        self.local_state
    }

    /// Sets the aggregate power state of the domain.
    pub fn set_local_state(&mut self, local_state: LocalPowerState) {
        self.local_state = local_state;
    }

    /// Opens a new, empty CPU range starting at `cpu_index`.
    fn set_cpu_start(&mut self, cpu_index: usize) {
        self.cpu_range = cpu_index..cpu_index;
    }

    /// Accounts one more CPU leaf to this node's subtree.
    fn increment_cpu_count(&mut self) {
        self.cpu_range.end += 1;
    }
}

/// A CPU power domain node, a leaf of the tree.
#[derive(Debug)]
pub struct CpuDomainNode {
    /// Index of the immediate non-CPU parent node.
    parent: usize,
    /// The CPU's hardware affinity identifier; `None` until the CPU registers itself.
    affinity_id: Option<Mpidr>,
    /// Current power state of the CPU.
    power_state: AffinityInfo,
    /// Power state parameter of an outstanding suspend; `None` when no suspend is in progress.
    saved_suspend_state: Option<PowerState>,
}

impl CpuDomainNode {
    fn new(parent: usize) -> Self {
        Self {
            parent,
            affinity_id: None,
            power_state: AffinityInfo::Off,
            saved_suspend_state: None,
        }
    }

    /// Index of the immediate non-CPU parent node.
    pub fn parent(&self) -> usize {
        self.parent
    }

    /// The CPU's hardware affinity identifier, once the CPU has registered itself.
    pub fn affinity_id(&self) -> Option<Mpidr> {
        self.affinity_id
    }

    /// Records the CPU's hardware affinity identifier.
    pub fn set_affinity_id(&mut self, affinity_id: Mpidr) {
        self.affinity_id = Some(affinity_id);
    }

    /// Current power state of the CPU.
    pub fn power_state(&self) -> AffinityInfo {
        self.power_state
    }

    /// Sets the current power state of the CPU.
    pub fn set_power_state(&mut self, power_state: AffinityInfo) {
        self.power_state = power_state;
    }

    /// Power state parameter of an outstanding suspend, if any.
    pub fn saved_suspend_state(&self) -> Option<PowerState> {
        self.saved_suspend_state
    }

    /// Stores the power state parameter of a suspend in progress.
    pub fn save_suspend_state(&mut self, state: PowerState) {
        self.saved_suspend_state = Some(state);
    }

    /// Takes and invalidates the stored suspend power state.
    pub fn take_suspend_state(&mut self) -> Option<PowerState> {
        self.saved_suspend_state.take()
    }
}

/// Lock guards for all ancestor domains of one CPU.
///
/// The nodes are always locked from the lowest level to the highest, so two CPUs climbing towards
/// a shared ancestor cannot deadlock. Dropping the object releases the guards in reverse order.
#[derive(Debug)]
pub struct AncestorPowerDomains<'a> {
    list: ArrayVec<SpinMutexGuard<'a, PowerDomainNode>, { PlatformImpl::MAX_POWER_LEVEL }>,
}

impl<'a> AncestorPowerDomains<'a> {
    fn new(index: usize, mutexes: &'a [SpinMutex<PowerDomainNode>]) -> Self {
        let mut list = ArrayVec::new();
        let mut parent = Some(index);

        while let Some(index) = parent {
            let locked = mutexes[index].lock();
            parent = locked.parent;
            list.push(locked);
        }

        Self { list }
    }

    /// Creates an immutable iterator starting from the lowest level.
    pub fn iter(&self) -> Iter<'_, SpinMutexGuard<'a, PowerDomainNode>> {
        self.list.iter()
    }

    /// Creates a mutable iterator starting from the lowest level.
    pub fn iter_mut(&mut self) -> IterMut<'_, SpinMutexGuard<'a, PowerDomainNode>> {
        self.list.iter_mut()
    }
}

impl Drop for AncestorPowerDomains<'_> {
    fn drop(&mut self) {
        while let Some(guard) = self.list.pop() {
            drop(guard);
        }
    }
}

/// The power domain tree: all non-CPU and CPU power nodes, and safe ways to access them.
pub struct PowerDomainTree {
    non_cpu_nodes: ArrayVec<SpinMutex<PowerDomainNode>, { Self::NON_CPU_DOMAIN_COUNT }>,
    cpu_nodes: ArrayVec<SpinMutex<CpuDomainNode>, { Self::CPU_DOMAIN_COUNT }>,
}

impl PowerDomainTree {
    const CPU_DOMAIN_COUNT: usize = PlatformImpl::CORE_COUNT;
    const NON_CPU_DOMAIN_COUNT: usize =
        PlatformImpl::POWER_DOMAIN_COUNT - Self::CPU_DOMAIN_COUNT;

    /// Builds the tree from the platform's breadth-first topology descriptor.
    ///
    /// The first descriptor entry is the number of root domains; entry `k` gives the number of
    /// children of node `k - 1`. Levels are processed top-down, so children of the same parent
    /// occupy adjacent slots. A descriptor that overflows either arena or does not produce
    /// exactly [`Platform::CORE_COUNT`] CPU leaves is a fatal configuration error.
    pub fn new(topology: &[usize]) -> Self {
        let mut non_cpu_nodes: ArrayVec<_, { Self::NON_CPU_DOMAIN_COUNT }> = ArrayVec::new();
        let mut cpu_nodes: ArrayVec<_, { Self::CPU_DOMAIN_COUNT }> = ArrayVec::new();

        // The descriptor starts with a single count, the number of roots, read as if it were the
        // child count of a virtual node above the top level.
        let mut nodes_at_level = 1;
        let mut desc_index = 0;

        for level in (1..=PlatformImpl::MAX_POWER_LEVEL).rev() {
            let mut nodes_at_next_level = 0;

            for _ in 0..nodes_at_level {
                assert!(desc_index < topology.len(), "truncated power domain descriptor");
                let child_count = topology[desc_index];
                // Node k is described by descriptor entry k + 1, so the parent of the nodes
                // allocated here is the node the current entry describes.
                let parent = desc_index.checked_sub(1);

                for _ in 0..child_count {
                    non_cpu_nodes
                        .try_push(SpinMutex::new(PowerDomainNode::new(level, parent)))
                        .expect("power domain descriptor overflows the non-CPU node array");
                }

                nodes_at_next_level += child_count;
                desc_index += 1;
            }

            nodes_at_level = nodes_at_next_level;
        }

        for _ in 0..nodes_at_level {
            assert!(desc_index < topology.len(), "truncated power domain descriptor");
            let child_count = topology[desc_index];
            let parent = desc_index - 1;

            for _ in 0..child_count {
                let cpu_index = cpu_nodes.len();
                cpu_nodes
                    .try_push(SpinMutex::new(CpuDomainNode::new(parent)))
                    .expect("power domain descriptor overflows the CPU node array");
                context::reset_ns_context(cpu_index);
            }

            desc_index += 1;
        }

        assert_eq!(
            cpu_nodes.len(),
            Self::CPU_DOMAIN_COUNT,
            "power domain descriptor does not cover every CPU"
        );

        debug!(
            "Built power domain tree with {} non-CPU nodes and {} CPUs",
            non_cpu_nodes.len(),
            cpu_nodes.len()
        );

        Self {
            non_cpu_nodes,
            cpu_nodes,
        }
    }

    /// Returns the non-CPU ancestor node indices of a CPU, from its direct parent up to a root.
    pub fn ancestor_indices(
        &self,
        cpu_index: usize,
    ) -> ArrayVec<usize, { PlatformImpl::MAX_POWER_LEVEL }> {
        let mut ancestors = ArrayVec::new();
        let mut parent = Some(self.cpu_nodes[cpu_index].lock().parent);

        while let Some(index) = parent {
            ancestors
                .try_push(index)
                .expect("ancestor chain deeper than the maximum power level");
            parent = self.non_cpu_nodes[index].lock().parent;
        }

        ancestors
    }

    /// Computes the CPU range of every non-CPU node in one pass over the CPU leaves.
    ///
    /// For each CPU in index order, the ancestor at every level is compared with the previous
    /// CPU's ancestor at the same level: a change starts that ancestor's range, and the ancestor's
    /// count is incremented either way. This only yields correct ranges because the builder
    /// allocates children of the same parent adjacently, which makes every subtree's CPUs one
    /// contiguous run of indices.
    pub fn update_cpu_ranges(&self) {
        let mut previous_ancestors = [None; PlatformImpl::MAX_POWER_LEVEL];

        for cpu_index in 0..self.cpu_nodes.len() {
            let ancestors = self.ancestor_indices(cpu_index);

            for (previous, &ancestor) in previous_ancestors.iter_mut().zip(&ancestors) {
                let mut node = self.non_cpu_nodes[ancestor].lock();
                if *previous != Some(ancestor) {
                    *previous = Some(ancestor);
                    node.set_cpu_start(cpu_index);
                }
                node.increment_cpu_count();
            }
        }
    }

    /// Recomputes every CPU range from the ancestor chains and asserts that it matches.
    ///
    /// The single-pass range computation trusts the descriptor to keep children of the same
    /// parent adjacent; nothing else checks that, and a violation would corrupt state
    /// coordination silently. The extra pass is linear and runs once at boot.
    pub fn verify_cpu_ranges(&self) {
        for (index, node) in self.non_cpu_nodes.iter().enumerate() {
            let mut covered = 0;
            let mut first = None;
            let mut last = 0;

            for cpu_index in 0..self.cpu_nodes.len() {
                if self.ancestor_indices(cpu_index).contains(&index) {
                    covered += 1;
                    first.get_or_insert(cpu_index);
                    last = cpu_index;
                }
            }

            let node = node.lock();
            match first {
                Some(first) => {
                    assert_eq!(
                        covered,
                        last - first + 1,
                        "CPUs below power domain node {index} are not index-adjacent"
                    );
                    assert_eq!(
                        node.cpu_range,
                        first..last + 1,
                        "wrong CPU range on power domain node {index}"
                    );
                }
                None => assert!(
                    node.cpu_range.is_empty(),
                    "wrong CPU range on childless power domain node {index}"
                ),
            }
        }
    }

    /// Stores the real affinity identifier of a CPU in its leaf node.
    ///
    /// Each CPU does this for itself: the primary during [`crate::setup::PsciTopology::new`],
    /// secondaries when they first run through their own bootstrap.
    pub fn register_cpu(&self, cpu_index: usize, affinity_id: Mpidr) {
        self.cpu_nodes[cpu_index].lock().set_affinity_id(affinity_id);
    }

    /// Flushes both node arrays to memory if the memory model requires it, so that CPUs which are
    /// not yet coherency participants observe the built tree.
    pub fn flush<H: HardwareAccess>(&self, hw: &H) {
        hw::flush_object(hw, self.non_cpu_nodes.as_slice());
        hw::flush_object(hw, self.cpu_nodes.as_slice());
    }

    /// Marks the given CPU and all its ancestor domains as on, top level first.
    ///
    /// Boot path only: this runs before any other CPU is released, so the locks are uncontended
    /// and taken one at a time.
    pub fn set_boot_path_on(&self, cpu_index: usize) {
        for &index in self.ancestor_indices(cpu_index).iter().rev() {
            self.non_cpu_nodes[index]
                .lock()
                .set_local_state(LocalPowerState::On);
        }
        self.cpu_nodes[cpu_index]
            .lock()
            .set_power_state(AffinityInfo::On);
    }

    /// Returns a lock guard for a CPU leaf node.
    pub fn locked_cpu_node(&self, cpu_index: usize) -> SpinMutexGuard<'_, CpuDomainNode> {
        self.cpu_nodes[cpu_index].lock()
    }

    /// Returns a lock guard for a non-CPU power domain node.
    pub fn locked_power_node(&self, index: usize) -> SpinMutexGuard<'_, PowerDomainNode> {
        self.non_cpu_nodes[index].lock()
    }

    /// The number of non-CPU power domain nodes actually populated.
    pub fn power_node_count(&self) -> usize {
        self.non_cpu_nodes.len()
    }

    /// The number of CPU leaf nodes.
    pub fn cpu_node_count(&self) -> usize {
        self.cpu_nodes.len()
    }

    /// Locks all ancestor nodes of a CPU, runs the closure and unlocks the nodes.
    ///
    /// This is the acquisition order the runtime coordinator must use: always from the lowest
    /// level to the highest, releasing in reverse.
    pub fn with_ancestors_locked<F, T>(&self, cpu: &mut CpuDomainNode, f: F) -> T
    where
        F: FnOnce(&mut CpuDomainNode, AncestorPowerDomains<'_>) -> T,
    {
        let ancestors = AncestorPowerDomains::new(cpu.parent, &self.non_cpu_nodes);
        f(cpu, ancestors)
    }
}

impl Debug for PowerDomainTree {
    /// Outputs the tree in Graphviz DOT format.
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "digraph {{")?;
        for (index, node) in self.non_cpu_nodes.iter().enumerate() {
            if let Some(locked) = node.try_lock() {
                writeln!(f, "PD{index} [label=\"{locked:#?}\"]")?;
                if let Some(parent) = locked.parent {
                    writeln!(f, "PD{parent} -> PD{index}")?;
                }
            } else {
                writeln!(f, "PD{index} [label=\"PowerDomainNode is locked\"]")?;
            }
        }

        for (index, cpu) in self.cpu_nodes.iter().enumerate() {
            if let Some(locked) = cpu.try_lock() {
                writeln!(f, "CPU{index} [label=\"{locked:#?}\"]")?;
                writeln!(f, "PD{} -> CPU{}", locked.parent, index)?;
            } else {
                writeln!(f, "CPU{index} [label=\"CpuDomainNode is locked\"]")?;
            }
        }

        writeln!(f, "}}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::test::TestPlatform;

    /// Builds a tree the way the bootstrap does: construct, aggregate ranges, verify.
    fn build(topology: &[usize]) -> PowerDomainTree {
        let tree = PowerDomainTree::new(topology);
        tree.update_cpu_ranges();
        tree.verify_cpu_ranges();
        tree
    }

    #[test]
    fn power_domain_node() {
        let mut node = PowerDomainNode::new(2, Some(1));
        assert_eq!(2, node.level());
        assert_eq!(Some(1), node.parent());
        assert_eq!(LocalPowerState::Off, node.local_state());
        assert!(node.cpu_range().is_empty());

        node.set_cpu_start(4);
        assert_eq!(4, node.cpu_start_index());
        assert_eq!(0, node.cpu_count());

        node.increment_cpu_count();
        node.increment_cpu_count();
        assert_eq!(4..6, node.cpu_range());
        assert_eq!(2, node.cpu_count());

        node.set_local_state(LocalPowerState::On);
        assert_eq!(LocalPowerState::On, node.local_state());
    }

    #[test]
    fn cpu_domain_node() {
        let mut node = CpuDomainNode::new(3);
        assert_eq!(3, node.parent());
        assert_eq!(None, node.affinity_id());
        assert_eq!(AffinityInfo::Off, node.power_state());
        assert_eq!(None, node.saved_suspend_state());

        let mpidr = Mpidr::from_aff3210(0, 1, 0, 2);
        node.set_affinity_id(mpidr);
        assert_eq!(Some(mpidr), node.affinity_id());

        node.set_power_state(AffinityInfo::OnPending);
        assert_eq!(AffinityInfo::OnPending, node.power_state());

        node.save_suspend_state(PowerState::PowerDown(3));
        assert_eq!(Some(PowerState::PowerDown(3)), node.saved_suspend_state());
        assert_eq!(Some(PowerState::PowerDown(3)), node.take_suspend_state());
        assert_eq!(None, node.saved_suspend_state());
    }

    #[test]
    fn tree_create() {
        let tree = build(TestPlatform::topology());

        let expected_levels = [3, 2, 2, 1, 1, 1, 1];
        let expected_parents = [None, Some(0), Some(0), Some(1), Some(1), Some(2), Some(2)];
        let expected_ranges = [0..13, 0..6, 6..13, 0..3, 3..6, 6..9, 9..13];
        let expected_cpu_parents = [3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 6];

        assert_eq!(expected_parents.len(), tree.power_node_count());
        assert_eq!(expected_cpu_parents.len(), tree.cpu_node_count());

        for (index, ((level, parent), range)) in expected_levels
            .into_iter()
            .zip(expected_parents)
            .zip(expected_ranges)
            .enumerate()
        {
            let node = tree.locked_power_node(index);
            assert_eq!(level, node.level());
            assert_eq!(parent, node.parent());
            assert_eq!(range, node.cpu_range());
        }

        for (cpu_index, parent) in expected_cpu_parents.into_iter().enumerate() {
            let cpu = tree.locked_cpu_node(cpu_index);
            assert_eq!(parent, cpu.parent());
            assert_eq!(None, cpu.affinity_id());
            assert_eq!(AffinityInfo::Off, cpu.power_state());
            assert_eq!(None, cpu.saved_suspend_state());
        }
    }

    #[test]
    fn tree_create_multiple_roots() {
        // Same 13 CPUs and the same three non-CPU levels, but as a forest of two root domains:
        // each root holds one SoC, the first SoC two clusters of 4, the second one cluster of 5.
        let tree = build(&[2, 1, 1, 2, 1, 4, 4, 5]);

        let expected_levels = [3, 3, 2, 2, 1, 1, 1];
        let expected_parents = [None, None, Some(0), Some(1), Some(2), Some(2), Some(3)];
        let expected_ranges = [0..8, 8..13, 0..8, 8..13, 0..4, 4..8, 8..13];
        let expected_cpu_parents = [4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 6];

        assert_eq!(expected_parents.len(), tree.power_node_count());

        for (index, ((level, parent), range)) in expected_levels
            .into_iter()
            .zip(expected_parents)
            .zip(expected_ranges)
            .enumerate()
        {
            let node = tree.locked_power_node(index);
            assert_eq!(level, node.level());
            assert_eq!(parent, node.parent());
            assert_eq!(range, node.cpu_range());
        }

        for (cpu_index, parent) in expected_cpu_parents.into_iter().enumerate() {
            assert_eq!(parent, tree.locked_cpu_node(cpu_index).parent());
        }

        // The root ranges jointly cover the whole CPU index space without overlap.
        assert_eq!(0..8, tree.locked_power_node(0).cpu_range());
        assert_eq!(8..13, tree.locked_power_node(1).cpu_range());
    }

    #[test]
    fn range_exactness() {
        let tree = build(TestPlatform::topology());

        for index in 0..tree.power_node_count() {
            let range = tree.locked_power_node(index).cpu_range();
            for cpu_index in 0..tree.cpu_node_count() {
                let covered = tree.ancestor_indices(cpu_index).contains(&index);
                assert_eq!(covered, range.contains(&cpu_index));
            }
        }
    }

    #[test]
    fn cpu_counts_match_children() {
        let tree = build(TestPlatform::topology());

        for index in 0..tree.power_node_count() {
            let node = tree.locked_power_node(index);
            let level = node.level();
            let range = node.cpu_range();
            drop(node);

            let children_total: usize = if level == 1 {
                (0..tree.cpu_node_count())
                    .filter(|&cpu| tree.locked_cpu_node(cpu).parent() == index)
                    .count()
            } else {
                (0..tree.power_node_count())
                    .filter(|&child| tree.locked_power_node(child).parent() == Some(index))
                    .map(|child| tree.locked_power_node(child).cpu_count())
                    .sum()
            };

            assert_eq!(children_total, range.len());
        }
    }

    #[test]
    fn sibling_ranges_disjoint_and_contiguous() {
        let tree = build(TestPlatform::topology());

        for index in 0..tree.power_node_count() {
            let parent_range = tree.locked_power_node(index).cpu_range();
            let mut child_ranges: Vec<Range<usize>> = (0..tree.power_node_count())
                .filter(|&child| tree.locked_power_node(child).parent() == Some(index))
                .map(|child| tree.locked_power_node(child).cpu_range())
                .collect();
            if child_ranges.is_empty() {
                continue;
            }

            child_ranges.sort_by_key(|range| range.start);
            assert_eq!(parent_range.start, child_ranges.first().unwrap().start);
            assert_eq!(parent_range.end, child_ranges.last().unwrap().end);
            for pair in child_ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn ancestor_indices_reach_the_root() {
        let tree = build(TestPlatform::topology());

        assert_eq!(&[3, 1, 0], tree.ancestor_indices(0).as_slice());
        assert_eq!(&[5, 2, 0], tree.ancestor_indices(8).as_slice());
        assert_eq!(&[6, 2, 0], tree.ancestor_indices(12).as_slice());
    }

    #[test]
    fn boot_path_marked_on() {
        let tree = build(TestPlatform::topology());
        tree.set_boot_path_on(4);

        for cpu_index in 0..tree.cpu_node_count() {
            let expected = if cpu_index == 4 {
                AffinityInfo::On
            } else {
                AffinityInfo::Off
            };
            assert_eq!(expected, tree.locked_cpu_node(cpu_index).power_state());
        }

        let on_path = tree.ancestor_indices(4);
        for index in 0..tree.power_node_count() {
            let expected = if on_path.contains(&index) {
                LocalPowerState::On
            } else {
                LocalPowerState::Off
            };
            assert_eq!(expected, tree.locked_power_node(index).local_state());
        }
    }

    #[test]
    fn locks_start_released() {
        let tree = build(TestPlatform::topology());

        for index in 0..tree.power_node_count() {
            assert!(tree.non_cpu_nodes[index].try_lock().is_some());
        }
        for cpu_index in 0..tree.cpu_node_count() {
            assert!(tree.cpu_nodes[cpu_index].try_lock().is_some());
        }
    }

    #[test]
    fn ancestors_locked_bottom_up() {
        let tree = build(TestPlatform::topology());

        let mut cpu = tree.locked_cpu_node(12);
        tree.with_ancestors_locked(&mut cpu, |_cpu, ancestors| {
            assert_eq!(3, ancestors.iter().len());
            let mut iter = ancestors.iter();
            assert_eq!(Some(2), iter.next().unwrap().parent());
            assert_eq!(Some(0), iter.next().unwrap().parent());
            assert_eq!(None, iter.next().unwrap().parent());
        });
    }

    #[test]
    #[should_panic(expected = "does not cover every CPU")]
    fn malformed_descriptor_with_missing_cpus() {
        // The last cluster claims 3 CPUs instead of 4, totalling 12 of 13.
        PowerDomainTree::new(&[1, 2, 2, 2, 3, 3, 3, 3]);
    }

    #[test]
    #[should_panic(expected = "overflows the CPU node array")]
    fn malformed_descriptor_with_excess_cpus() {
        PowerDomainTree::new(&[1, 2, 2, 2, 4, 4, 4, 4]);
    }

    #[test]
    #[should_panic(expected = "truncated power domain descriptor")]
    fn malformed_descriptor_truncated() {
        PowerDomainTree::new(&[1, 2]);
    }
}
