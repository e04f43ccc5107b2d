//! Classification predicates driving the build.
//!
//! A [`Classify`] implementation answers the three questions the tree asks
//! while it builds: does an element intersect a box, how much of a box does
//! an element occupy (optional tie-break), and should a node subdivide.
//!
//! [`SimpleThreshold`] and [`OccupancyThreshold`] cover the common cases;
//! [`FnClassify`] adapts plain closures.

use crate::{
    bounding::{Aabb, Real},
    node::NodeView,
    Bounded, Position,
};

/// The predicate set injected into a [`tree`](crate::tree::Octree) at
/// construction.
pub trait Classify<R: Real, T> {
    /// Does `element` intersect `aabb`?
    ///
    /// Decides both root admission and child assignment during
    /// redistribution.
    fn intersects(&self, element: &T, aabb: &Aabb<R>) -> bool;

    /// Occupancy of `aabb` by `element`, used to pick between several
    /// intersecting children.
    ///
    /// `None` (the default) degrades the tie-break to first-match in
    /// octant order. A constant value behaves the same way, since only a
    /// strictly greater occupancy displaces an earlier candidate.
    fn occupancy(&self, element: &T, aabb: &Aabb<R>) -> Option<R> {
        let _ = (element, aabb);
        None
    }

    /// Should the node subdivide further?
    ///
    /// Only consulted for nodes holding at least one element.
    /// Implementations dividing by the element count should still guard
    /// zero defensively.
    fn should_subdivide(&self, node: NodeView<'_, R, T>) -> bool;
}

/// Box/box intersection predicate over an element's own bounds.
pub fn intersects_aabb<R, T>(element: &T, aabb: &Aabb<R>) -> bool
where
    R: Real,
    T: Bounded<R = R>,
{
    aabb.overlaps(&element.bounds())
}

/// Fraction of the element's own volume that falls inside `aabb`.
///
/// A degenerate element with zero volume (a point) reports zero
/// everywhere, which resolves any tie to the first candidate.
pub fn occupies_box<R, T>(element: &T, aabb: &Aabb<R>) -> R
where
    R: Real,
    T: Bounded<R = R>,
{
    let bounds = element.bounds();
    let total = bounds.volume();
    if total <= R::zero() {
        return R::zero();
    }
    match bounds.intersection(aabb) {
        Some(overlap) => overlap.volume() / total,
        None => R::zero(),
    }
}

/// Element-count threshold for point-like elements.
///
/// Intersection is an inclusive point-in-box test and no occupancy is
/// supplied, so a point sitting exactly on a splitting plane goes to the
/// first intersecting octant.
pub struct SimpleThreshold<const MAX: usize>;

impl<R, T, const MAX: usize> Classify<R, T> for SimpleThreshold<MAX>
where
    R: Real,
    T: Position<R = R>,
{
    fn intersects(&self, element: &T, aabb: &Aabb<R>) -> bool {
        aabb.is_inside(element.position())
    }

    fn should_subdivide(&self, node: NodeView<'_, R, T>) -> bool {
        node.element_count() > MAX
    }
}

/// Element-count threshold for volumetric elements.
///
/// An element overlapping several children is assigned to the one it
/// occupies the most, ties resolving to the earliest octant.
pub struct OccupancyThreshold<const MAX: usize>;

impl<R, T, const MAX: usize> Classify<R, T> for OccupancyThreshold<MAX>
where
    R: Real,
    T: Bounded<R = R>,
{
    fn intersects(&self, element: &T, aabb: &Aabb<R>) -> bool {
        intersects_aabb(element, aabb)
    }

    fn occupancy(&self, element: &T, aabb: &Aabb<R>) -> Option<R> {
        Some(occupies_box(element, aabb))
    }

    fn should_subdivide(&self, node: NodeView<'_, R, T>) -> bool {
        node.element_count() > MAX
    }
}

/// [`Classify`] over independently injected closures.
///
/// Build one with [`from_fns`] (no occupancy) or
/// [`FnClassify::with_occupancy`].
pub struct FnClassify<FI, FO, FS> {
    intersects: FI,
    occupancy: Option<FO>,
    subdivide: FS,
}

/// Occupancy signature used when [`from_fns`] leaves it unset.
pub type OccupancyFn<R, T> = fn(&T, &Aabb<R>) -> R;

impl<FI, FO, FS> FnClassify<FI, FO, FS> {
    pub fn with_occupancy(intersects: FI, occupancy: FO, subdivide: FS) -> Self {
        FnClassify {
            intersects,
            occupancy: Some(occupancy),
            subdivide,
        }
    }
}

/// Classifier from an intersection and a subdivision closure, with the
/// multi-intersection tie-break degraded to first-match.
pub fn from_fns<R, T, FI, FS>(
    intersects: FI,
    subdivide: FS,
) -> FnClassify<FI, OccupancyFn<R, T>, FS>
where
    R: Real,
    FI: Fn(&T, &Aabb<R>) -> bool,
    FS: for<'a> Fn(NodeView<'a, R, T>) -> bool,
{
    FnClassify {
        intersects,
        occupancy: None,
        subdivide,
    }
}

impl<R, T, FI, FO, FS> Classify<R, T> for FnClassify<FI, FO, FS>
where
    R: Real,
    FI: Fn(&T, &Aabb<R>) -> bool,
    FO: Fn(&T, &Aabb<R>) -> R,
    FS: for<'a> Fn(NodeView<'a, R, T>) -> bool,
{
    fn intersects(&self, element: &T, aabb: &Aabb<R>) -> bool {
        (self.intersects)(element, aabb)
    }

    fn occupancy(&self, element: &T, aabb: &Aabb<R>) -> Option<R> {
        self.occupancy.as_ref().map(|f| f(element, aabb))
    }

    fn should_subdivide(&self, node: NodeView<'_, R, T>) -> bool {
        (self.subdivide)(node)
    }
}
