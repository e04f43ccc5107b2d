//! Static [`octree`](tree::Octree) implementation.
//!
//! Classifies a fixed snapshot of spatial elements into a hierarchy of
//! axis-aligned regions, driven by pluggable geometric predicates and a
//! pluggable subdivision heuristic. Built for one-shot bucketing: load a
//! snapshot, [`rebuild`](tree::Octree::rebuild), then iterate the leaves —
//! for example to draw only nearby elements or to visualize density.
//!
//! There is no insertion or removal after a build; replace the snapshot and
//! rebuild instead. Ray casts, k-NN and range queries are out of scope.
//!
//! ## Design notes
//!
//! - Nodes live in a flat, index-stable arena ([`Pool`](pool::Pool));
//!   children are referenced by [`NodeId`], never by pointer.
//! - The leaf/internal state is an explicit tag ([`NodeType`](node::NodeType)),
//!   and a subdivided node keeps the element list it held for introspection.
//! - Few allocations on the hot path: [`smallvec`] for per-node element
//!   lists, [`heapless`] for the bounded candidate buffer.
//!
//! ## Example
//!
//! Store any element type; implement [`Position`] (or [`Bounded`] for
//! volumetric elements) to use the ready-made classifiers, or supply your
//! own [`Classify`](classify::Classify) predicates.
//!
//! ```rust
//! use octostat::prelude::*;
//!
//! let bounds = Aabb::new(TVec3::splat(0.0f32), TVec3::splat(20.0));
//! let mut tree = Octree::from_aabb(bounds, SimpleThreshold::<4>);
//!
//! tree.set_elements(vec![
//!     TVec3::new(1.0, 1.0, 1.0),
//!     TVec3::new(1.0, 1.0, 2.0),
//!     TVec3::new(1.0, 1.0, 3.0),
//!     TVec3::new(1.0, 1.0, 4.0),
//!     TVec3::new(1.0, 1.0, 5.0),
//!     TVec3::new(18.0, 18.0, 18.0),
//! ]);
//! tree.rebuild().unwrap();
//!
//! // More than four points shared an octant, so the root subdivided.
//! assert!(tree.node(tree.root()).is_branch());
//!
//! for &leaf in tree.leaves() {
//!     let view = tree.view(leaf);
//!     for point in view.iter() {
//!         assert!(view.aabb().is_inside(*point));
//!     }
//! }
//! ```

pub mod bounding;
pub mod classify;
pub mod node;
pub mod pool;
pub mod prelude;
pub mod tree;

use crate::bounding::{Aabb, Real, TVec3};
use std::{error::Error, fmt, ops::Deref};

/// Implement to represent your object as a point in a
/// [`tree`](tree::Octree).
///
/// Point elements work with [`SimpleThreshold`](classify::SimpleThreshold)
/// out of the box. A point gets a degenerate zero-volume [`Bounded`] impl
/// for free.
pub trait Position {
    type R: Real;

    fn position(&self) -> TVec3<Self::R>;
}

impl<R: Real> Position for TVec3<R> {
    type R = R;

    fn position(&self) -> TVec3<R> {
        *self
    }
}

impl<T> Position for Box<T>
where
    T: Position,
{
    type R = T::R;

    fn position(&self) -> TVec3<Self::R> {
        self.deref().position()
    }
}

/// Implement to represent your object as a volume in a
/// [`tree`](tree::Octree).
///
/// Volumetric elements work with
/// [`OccupancyThreshold`](classify::OccupancyThreshold), which weighs how
/// much of each candidate octant an element occupies.
pub trait Bounded {
    type R: Real;

    fn bounds(&self) -> Aabb<Self::R>;
}

impl<R: Real, T> Bounded for T
where
    T: Position<R = R>,
{
    type R = R;

    fn bounds(&self) -> Aabb<R> {
        Aabb::new_unchecked(self.position(), self.position())
    }
}

impl<R: Real> Bounded for Aabb<R> {
    type R = R;

    fn bounds(&self) -> Aabb<R> {
        *self
    }
}

/// Index [`tree.nodes`](pool::Pool) with it.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        value.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId {}", self.0)
    }
}

/// Index the element snapshot with it.
///
/// Ids are positions in the snapshot, assigned in insertion order.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ElementId(pub u32);

impl From<ElementId> for usize {
    fn from(value: ElementId) -> Self {
        value.0 as usize
    }
}

impl From<usize> for ElementId {
    fn from(value: usize) -> Self {
        ElementId(value as u32)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId: {}", self.0)
    }
}

/// Enum of all possible errors of the octree's operations.
#[derive(Debug, PartialEq)]
pub enum TreeError {
    /// Attempt to add an element to a subdivided
    /// [`Node`](node::Node).
    NotLeaf(String),

    /// The subdivision heuristic was still asking for children at the
    /// configured depth limit.
    MaxDepthExceeded(String),
}

impl Error for TreeError {}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NotLeaf(info) => write!(f, "Node is not a Leaf. {info}"),
            TreeError::MaxDepthExceeded(info) => {
                write!(f, "Subdivision depth limit exceeded. {info}")
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::classify::{from_fns, OccupancyThreshold, SimpleThreshold};
    use crate::node::{NodeType, NodeView};
    use crate::tree::Octree;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct DummyVolume {
        aabb: Aabb<f32>,
    }

    impl Bounded for DummyVolume {
        type R = f32;

        fn bounds(&self) -> Aabb<f32> {
            self.aabb
        }
    }

    impl DummyVolume {
        fn new(mins: TVec3<f32>, maxs: TVec3<f32>) -> Self {
            DummyVolume {
                aabb: Aabb::new(mins, maxs),
            }
        }
    }

    fn cube(size: f32) -> Aabb<f32> {
        Aabb::new(TVec3::zero(), TVec3::splat(size))
    }

    fn random_points(n: usize, range: f32, seed: u64) -> Vec<TVec3<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                TVec3::new(
                    rng.gen_range(0.0..range),
                    rng.gen_range(0.0..range),
                    rng.gen_range(0.0..range),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_snapshot() {
        let mut tree: Octree<f32, TVec3<f32>, SimpleThreshold<4>> =
            Octree::from_aabb(cube(20.0), SimpleThreshold::<4>);

        tree.rebuild().unwrap();

        assert_eq!(tree.leaves(), &[NodeId(0)]);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(NodeId(0)).is_empty());
        assert_eq!(tree.node(NodeId(0)).element_count(), 0);
        assert_eq!(tree.dropped(), 0);
    }

    #[test]
    fn test_threshold_scenario() {
        // Five points stacked in one octant, threshold of four: the root
        // splits, and splitting continues until every leaf holds at most
        // four elements.
        let mut tree = Octree::from_aabb(cube(20.0), SimpleThreshold::<4>);
        tree.set_elements((1..=5).map(|z| TVec3::new(1.0, 1.0, z as f32)).collect());

        tree.rebuild().unwrap();

        let root = tree.node(tree.root());
        assert!(root.is_branch());
        // The branch reports the count it held before splitting.
        assert_eq!(root.element_count(), 5);
        assert_eq!(tree.dropped(), 0);

        let mut total = 0;
        for &leaf in tree.leaves() {
            let node = tree.node(leaf);
            assert!(node.element_count() <= 4);
            total += node.element_count();
            for point in tree.view(leaf).iter() {
                assert!(node.aabb.is_inside(*point));
            }
        }
        assert_eq!(total, 5);
    }

    #[test]
    fn test_partition_and_containment() {
        let points = random_points(512, 20.0, 0x910583);
        let mut tree =
            Octree::from_aabb_with_capacity(cube(20.0), SimpleThreshold::<8>, points.len());
        tree.set_elements(points);

        tree.rebuild().unwrap();
        assert_eq!(tree.dropped(), 0);

        let mut seen = HashSet::new();
        for &leaf in tree.leaves() {
            let node = tree.node(leaf);
            for &element in node.element_ids() {
                assert!(seen.insert(element), "{element} owned by two leaves");
                assert!(node.aabb.is_inside(tree.elements()[usize::from(element)]));
            }
        }
        assert_eq!(seen.len(), tree.len());
    }

    #[test]
    fn test_leaf_completeness() {
        let mut tree = Octree::from_aabb(cube(20.0), SimpleThreshold::<2>);
        tree.set_elements(random_points(64, 20.0, 0x24819));

        tree.rebuild().unwrap();

        let expected: Vec<NodeId> = (0..tree.node_count())
            .map(NodeId::from)
            .filter(|&id| tree.node(id).is_leaf())
            .collect();
        assert_eq!(tree.leaves(), expected);
        assert!(tree
            .leaves()
            .iter()
            .all(|&id| !tree.node(id).is_branch()));
    }

    #[test]
    fn test_parent_chain_reaches_root() {
        let mut tree = Octree::from_aabb(cube(20.0), SimpleThreshold::<2>);
        tree.set_elements(random_points(64, 20.0, 0x24819));

        tree.rebuild().unwrap();

        for &leaf in tree.leaves() {
            let mut depth = 0;
            let mut parent = tree.node(leaf).parent;
            while let Some(id) = parent {
                parent = tree.node(id).parent;
                depth += 1;
            }
            // Each level halves the box, so the chain length pins the size.
            let expected = 20.0f32 / (1 << depth) as f32;
            let size = tree.node(leaf).aabb.maxs - tree.node(leaf).aabb.mins;
            assert!((size.x - expected).abs() < 1e-4);
            assert_eq!(tree.node(leaf).parent.is_none(), leaf == tree.root());
        }
    }

    #[test]
    fn test_rebuild_idempotent() {
        let mut tree = Octree::from_aabb(cube(20.0), SimpleThreshold::<4>);
        tree.set_elements(random_points(256, 20.0, 7));

        type Shape = Vec<(Aabb<f32>, NodeType, Vec<ElementId>)>;
        let shape = |tree: &Octree<f32, TVec3<f32>, SimpleThreshold<4>>| -> Shape {
            tree.iter_nodes()
                .map(|n| (n.aabb, n.ntype, n.element_ids().to_vec()))
                .collect()
        };

        tree.rebuild().unwrap();
        let first_shape = shape(&tree);
        let first_leaves = tree.leaves().to_vec();

        tree.rebuild().unwrap();
        assert_eq!(shape(&tree), first_shape);
        assert_eq!(tree.leaves(), first_leaves);
    }

    #[test]
    fn test_outside_root_dropped() {
        let mut tree = Octree::from_aabb(cube(20.0), SimpleThreshold::<4>);
        tree.push_element(TVec3::new(1.0, 1.0, 1.0));
        tree.push_element(TVec3::new(5.0, 5.0, 5.0));
        tree.push_element(TVec3::splat(25.0));

        tree.rebuild().unwrap();

        assert_eq!(tree.dropped(), 1);
        assert_eq!(tree.len(), 3);

        let owned: usize = tree
            .iter_leaves()
            .map(|node| node.element_count())
            .sum();
        assert_eq!(owned, 2);
        assert!(!tree
            .iter_leaves()
            .any(|node| node.element_ids().contains(&ElementId(2))));
    }

    #[test]
    fn test_equal_occupancy_goes_to_first_octant() {
        // An element centred exactly on the splitting point occupies all
        // eight children equally; the stable tie-break assigns it to
        // octant 0, and the second split pins it to that octant's upper
        // corner cell.
        let mut tree = Octree::from_aabb(cube(16.0), OccupancyThreshold::<1>);
        tree.set_elements(vec![
            DummyVolume::new(TVec3::splat(7.0), TVec3::splat(9.0)),
            DummyVolume::new(TVec3::splat(1.0), TVec3::splat(2.0)),
        ]);

        tree.rebuild().unwrap();
        assert_eq!(tree.dropped(), 0);

        let leaf_of = |element: ElementId| -> Aabb<f32> {
            let id = tree
                .leaves()
                .iter()
                .find(|&&id| tree.node(id).element_ids().contains(&element))
                .unwrap();
            tree.node(*id).aabb
        };

        assert_eq!(
            leaf_of(ElementId(0)),
            Aabb::new(TVec3::splat(4.0), TVec3::splat(8.0))
        );
        assert_eq!(
            leaf_of(ElementId(1)),
            Aabb::new(TVec3::splat(0.0), TVec3::splat(4.0))
        );
    }

    #[test]
    fn test_depth_limit_stops_runaway_heuristic() {
        let classifier = from_fns(
            |point: &TVec3<f32>, aabb: &Aabb<f32>| aabb.is_inside(*point),
            |_: NodeView<f32, TVec3<f32>>| true,
        );
        let mut tree = Octree::from_aabb(cube(16.0), classifier).max_depth(8);
        tree.push_element(TVec3::splat(1.0));

        let err = tree.rebuild().unwrap_err();
        assert!(matches!(err, TreeError::MaxDepthExceeded(_)));
        assert!(tree.leaves().is_empty());
    }

    #[test]
    fn test_volumes_straddling_planes_stay_unique() {
        // Volumes overlapping several octants must still end up in exactly
        // one leaf each.
        let mut rng = StdRng::seed_from_u64(0x5851);
        let volumes: Vec<DummyVolume> = (0..128)
            .map(|_| {
                let mins = TVec3::new(
                    rng.gen_range(0.0..30.0f32),
                    rng.gen_range(0.0..30.0),
                    rng.gen_range(0.0..30.0),
                );
                let size = TVec3::splat(rng.gen_range(0.5..3.0));
                DummyVolume::new(mins, mins + size)
            })
            .collect();

        let mut tree = Octree::from_aabb(cube(32.0), OccupancyThreshold::<6>);
        tree.set_elements(volumes);
        tree.rebuild().unwrap();

        let mut seen = HashSet::new();
        for &leaf in tree.leaves() {
            for &element in tree.node(leaf).element_ids() {
                assert!(seen.insert(element));
            }
        }
        assert_eq!(seen.len() + tree.dropped(), tree.len());
    }
}
