//! [`Octree`] implementation.

use std::array::from_fn;

use heapless::Vec as HVec;

use crate::{
    bounding::{Aabb, Real},
    classify::Classify,
    node::{Branch, Node, NodeType, NodeView},
    pool::Pool,
    ElementId, NodeId, TreeError,
};

/// Subdivision depth limit applied when none is configured.
///
/// Deep enough for any sane heuristic over float boxes; a heuristic that
/// never stops subdividing hits the limit and surfaces
/// [`TreeError::MaxDepthExceeded`] instead of exhausting the stack.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Static spatial partitioning tree.
///
/// Owns a snapshot of elements, a node arena and a leaf index. The caller
/// supplies the root bounding volume and a [`Classify`] predicate set;
/// [`rebuild`](Octree::rebuild) classifies the snapshot into leaves.
///
/// The tree is static: there is no insertion or removal after a build.
/// Replace the snapshot and rebuild instead; each call discards the prior
/// arena and leaf index wholesale.
pub struct Octree<R, T, C>
where
    R: Real,
    C: Classify<R, T>,
{
    pub(crate) nodes: Pool<Node<R>>,
    pub(crate) elements: Vec<T>,
    classifier: C,
    aabb: Aabb<R>,
    leaves: Vec<NodeId>,
    dropped: usize,
    max_depth: usize,
}

impl<R, T, C> Octree<R, T, C>
where
    R: Real,
    C: Classify<R, T>,
{
    /// Creates a tree over `aabb` with the given predicate set.
    pub fn from_aabb(aabb: Aabb<R>, classifier: C) -> Self {
        Octree {
            nodes: Pool::from_aabb(aabb),
            elements: Default::default(),
            classifier,
            aabb,
            leaves: Default::default(),
            dropped: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Like [`from_aabb`](Octree::from_aabb), with capacity hints for the
    /// element snapshot and the node arena.
    pub fn from_aabb_with_capacity(aabb: Aabb<R>, classifier: C, capacity: usize) -> Self {
        Octree {
            nodes: Pool::from_aabb_with_capacity(aabb, capacity),
            elements: Vec::with_capacity(capacity),
            classifier,
            aabb,
            leaves: Default::default(),
            dropped: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the subdivision depth limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Replaces the element snapshot wholesale.
    ///
    /// Invalidates the leaf index until the next
    /// [`rebuild`](Octree::rebuild).
    pub fn set_elements(&mut self, elements: Vec<T>) {
        self.elements = elements;
        self.leaves.clear();
    }

    /// Appends one element to the snapshot ahead of a build.
    pub fn push_element(&mut self, element: T) -> ElementId {
        self.elements.push(element);
        self.leaves.clear();
        ElementId::from(self.elements.len() - 1)
    }

    /// Root bounding volume.
    pub fn aabb(&self) -> &Aabb<R> {
        &self.aabb
    }

    /// Id of the root node. Valid from construction onwards.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The full element snapshot, including elements dropped from the tree.
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn get_element(&self, element: ElementId) -> Option<&T> {
        self.elements.get(usize::from(element))
    }

    /// Number of elements in the snapshot.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node<R> {
        &self.nodes[id]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node<R>> {
        self.nodes.get(id)
    }

    /// Iterates every arena node in arena order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node<R>> + '_ {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Read-only view of a node for element iteration.
    pub fn view(&self, id: NodeId) -> NodeView<'_, R, T> {
        NodeView::new(&self.nodes[id], &self.elements)
    }

    /// Leaf ids in arena order. Stable for a given build.
    ///
    /// Empty until the first successful [`rebuild`](Octree::rebuild).
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Iterates the leaf nodes in arena order.
    pub fn iter_leaves(&self) -> impl Iterator<Item = &Node<R>> + '_ {
        self.leaves.iter().map(|&id| &self.nodes[id])
    }

    /// Elements discarded during the last build: outside the root volume,
    /// or outside every child during redistribution.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Discards the previous hierarchy and reclassifies the snapshot.
    ///
    /// Idempotent: repeated calls over an unchanged snapshot produce
    /// structurally identical trees. Elements that do not intersect the
    /// root volume are excluded for this cycle and counted in
    /// [`dropped`](Octree::dropped).
    ///
    /// On [`TreeError::MaxDepthExceeded`] the leaf index is left empty and
    /// the tree should be considered unbuilt.
    pub fn rebuild(&mut self) -> Result<(), TreeError> {
        self.nodes.clear_with_aabb(self.aabb);
        self.leaves.clear();
        self.dropped = 0;

        let root = self.root();
        for index in 0..self.elements.len() {
            if self.classifier.intersects(&self.elements[index], &self.aabb) {
                self.nodes[root].add_element(ElementId::from(index))?;
            } else {
                self.dropped += 1;
            }
        }

        self.build_node(root, 0)?;

        for (id, node) in self.nodes.iter_ids() {
            if node.is_leaf() {
                self.leaves.push(id);
            }
        }
        Ok(())
    }

    fn build_node(&mut self, node: NodeId, depth: usize) -> Result<(), TreeError> {
        // An empty node is terminal; the heuristic is never consulted.
        match self.nodes[node].ntype {
            NodeType::Empty | NodeType::Branch(_) => return Ok(()),
            NodeType::Leaf => (),
        }

        let view = NodeView::new(&self.nodes[node], &self.elements);
        if !self.classifier.should_subdivide(view) {
            return Ok(());
        }

        if depth >= self.max_depth {
            return Err(TreeError::MaxDepthExceeded(format!(
                "{node} still subdividing at depth {depth}",
            )));
        }

        let children = self.nodes.branch(node);
        let boxes: [Aabb<R>; 8] = from_fn(|i| self.nodes[children[i]].aabb);
        self.nodes[node].ntype = NodeType::Branch(Branch::new(children));

        // The branch keeps its id list for introspection; the children now
        // own the elements.
        let held = self.nodes[node].element_ids().to_vec();
        for element in held {
            let e = &self.elements[usize::from(element)];

            let mut candidates: HVec<usize, 8> = HVec::new();
            for (i, aabb) in boxes.iter().enumerate() {
                if self.classifier.intersects(e, aabb) {
                    // Eight boxes, capacity eight.
                    unsafe { candidates.push_unchecked(i) };
                }
            }

            let target = match candidates.split_first() {
                None => {
                    self.dropped += 1;
                    continue;
                }
                Some((&first, [])) => first,
                Some((&first, rest)) => self.pick_occupied(e, first, rest, &boxes),
            };

            self.nodes[children[target]].add_element(element)?;
        }

        for child in children {
            self.build_node(child, depth + 1)?;
        }
        Ok(())
    }

    /// Resolves a multi-intersection by greatest occupancy.
    ///
    /// Starts from a sentinel below any real occupancy and only a strictly
    /// greater value displaces an earlier candidate, so ties are stable.
    /// If the classifier supplies no occupancy the first candidate wins.
    fn pick_occupied(
        &self,
        element: &T,
        first: usize,
        rest: &[usize],
        boxes: &[Aabb<R>; 8],
    ) -> usize {
        let mut target = first;
        let mut best = R::neg_infinity();
        for &index in std::iter::once(&first).chain(rest) {
            match self.classifier.occupancy(element, &boxes[index]) {
                Some(occupancy) if occupancy > best => {
                    best = occupancy;
                    target = index;
                }
                Some(_) => (),
                None => return first,
            }
        }
        target
    }
}
