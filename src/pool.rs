//! Index-stable node arena.

use std::{
    array::from_fn,
    ops::{Index, IndexMut},
};

use crate::{
    bounding::{Aabb, Real},
    node::Node,
    NodeId,
};

/// Growable arena handing out stable [`NodeId`] indices.
///
/// Ids stay valid across further insertions, so callers may hold child and
/// parent handles while the arena grows mid-build. Individual slots are
/// never freed; the whole arena is discarded wholesale between builds.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    vec: Vec<T>,
}

impl<T> Pool<T> {
    /// Number of stored items.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    #[inline(always)]
    pub(crate) fn insert(&mut self, t: T) -> NodeId {
        self.vec.push(t);
        NodeId::from(self.vec.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.vec.get(usize::from(id))
    }

    /// Iterates items in arena (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.vec.iter()
    }

    /// Iterates `(id, item)` pairs in arena order.
    pub fn iter_ids(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.vec
            .iter()
            .enumerate()
            .map(|(index, item)| (NodeId::from(index), item))
    }
}

/// Indexing a [`pool`](Pool) with [`NodeId`].
///
/// ```ignore
/// let node = &tree.nodes[NodeId(42)];
/// ```
impl<T> Index<NodeId> for Pool<T> {
    type Output = T;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.vec[usize::from(index)]
    }
}

impl<T> IndexMut<NodeId> for Pool<T> {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.vec[usize::from(index)]
    }
}

impl<R: Real> Pool<Node<R>> {
    /// Constructs a [`Pool`] of [`nodes`](Node) seeded with a root node.
    ///
    /// The root adopts the aabb's dimensions.
    pub(crate) fn from_aabb(aabb: Aabb<R>) -> Self {
        let root = Node::from_aabb(aabb, None);
        Pool { vec: vec![root] }
    }

    /// Like [`from_aabb`](Pool::from_aabb), with a capacity hint to reduce
    /// reallocations during the build.
    pub(crate) fn from_aabb_with_capacity(aabb: Aabb<R>, capacity: usize) -> Self {
        let root = Node::from_aabb(aabb, None);
        let mut vec = Vec::with_capacity(capacity);
        vec.push(root);
        Pool { vec }
    }

    /// Discards every node and reseeds a fresh root with the given aabb.
    pub(crate) fn clear_with_aabb(&mut self, aabb: Aabb<R>) {
        self.vec.clear();
        self.vec.push(Node::from_aabb(aabb, None));
    }

    /// Materializes the 8 octant children of `parent` and returns their ids.
    ///
    /// Does not flip the parent's node type; the tree does that once the
    /// children exist.
    #[inline(always)]
    pub(crate) fn branch(&mut self, parent: NodeId) -> [NodeId; 8] {
        let aabbs = self[parent].aabb.split();
        from_fn(|i| self.insert(Node::from_aabb(aabbs[i], Some(parent))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::TVec3;

    fn pool() -> Pool<Node<f32>> {
        Pool::from_aabb(Aabb::new(TVec3::zero(), TVec3::splat(8.0f32)))
    }

    #[test]
    fn test_seeded_root() {
        let pool = pool();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[NodeId(0)].aabb.maxs, TVec3::splat(8.0));
        assert!(pool[NodeId(0)].parent.is_none());
    }

    #[test]
    fn test_branch_creates_octants() {
        let mut pool = pool();
        let children = pool.branch(NodeId(0));

        assert_eq!(pool.len(), 9);
        let expected = pool[NodeId(0)].aabb.split();
        for (i, &child) in children.iter().enumerate() {
            assert_eq!(pool[child].aabb, expected[i]);
            assert_eq!(pool[child].parent, Some(NodeId(0)));
        }
    }

    #[test]
    fn test_stable_ids_across_growth() {
        let mut pool = pool();
        let first = pool.branch(NodeId(0));
        let before = pool[first[3]].aabb;

        // Grow well past the initial allocation.
        for _ in 0..64 {
            pool.branch(NodeId(0));
        }
        assert_eq!(pool[first[3]].aabb, before);
        assert_eq!(pool.iter_ids().count(), pool.len());
    }

    #[test]
    fn test_clear_with_aabb() {
        let mut pool = pool();
        pool.branch(NodeId(0));
        assert_eq!(pool.len(), 9);

        let aabb = Aabb::new(TVec3::zero(), TVec3::splat(2.0f32));
        pool.clear_with_aabb(aabb);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[NodeId(0)].aabb, aabb);
        assert!(pool[NodeId(0)].is_empty());
    }
}
