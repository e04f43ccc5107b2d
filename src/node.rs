use core::fmt;

use smallvec::SmallVec;

use crate::{
    bounding::{Aabb, Real},
    ElementId, NodeId, TreeError,
};

/// One region of space inside the [`tree`](crate::tree::Octree).
///
/// The box is assigned at creation and never resized. Children, when
/// present, live in the tree's node arena and are referenced by index.
#[derive(Debug, Clone)]
pub struct Node<R: Real> {
    pub aabb: Aabb<R>,
    pub ntype: NodeType,
    pub parent: Option<NodeId>,
    elements: SmallVec<[ElementId; 8]>,
}

impl<R: Real> Default for Node<R> {
    fn default() -> Self {
        Node {
            aabb: Aabb::<R>::default(),
            ntype: Default::default(),
            parent: Default::default(),
            elements: Default::default(),
        }
    }
}

impl<R: Real> Node<R> {
    pub(crate) fn from_aabb(aabb: Aabb<R>, parent: Option<NodeId>) -> Self {
        Node {
            aabb,
            parent,
            ..Default::default()
        }
    }

    /// Terminal node: [`Empty`](NodeType::Empty) or [`Leaf`](NodeType::Leaf).
    ///
    /// These are exactly the nodes the leaf index collects after a build.
    pub fn is_leaf(&self) -> bool {
        !matches!(self.ntype, NodeType::Branch(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.ntype, NodeType::Empty)
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.ntype, NodeType::Branch(_))
    }

    /// Number of element ids held by this node.
    ///
    /// A branch retains the list it held before subdividing, so for a
    /// branch this reports the informational held-before-split count.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Ids of the held elements.
    pub fn element_ids(&self) -> &[ElementId] {
        &self.elements
    }

    /// Appends an element id while the node is still terminal.
    ///
    /// A subdivided node rejects further additions: its elements are
    /// owned by the children and a silent append would be lost.
    pub fn add_element(&mut self, element: ElementId) -> Result<(), TreeError> {
        match self.ntype {
            NodeType::Branch(_) => Err(TreeError::NotLeaf(format!(
                "Attempt to add {element} to {}",
                self.ntype
            ))),
            NodeType::Empty => {
                self.ntype = NodeType::Leaf;
                self.elements.push(element);
                Ok(())
            }
            NodeType::Leaf => {
                self.elements.push(element);
                Ok(())
            }
        }
    }

    /// Child ids in octant order; empty for a terminal node.
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        match self.ntype {
            NodeType::Branch(branch) => Some(branch.children),
            _ => None,
        }
        .into_iter()
        .flatten()
    }
}

/// Tri-state node tag.
///
/// Replaces a sign-encoded element count: `Empty` is a terminal node with
/// no elements, `Leaf` a terminal node holding elements, `Branch` an
/// internal node whose 8 children own the elements.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub enum NodeType {
    #[default]
    Empty,
    Leaf,
    Branch(Branch),
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Empty => write!(f, "NodeType: Empty"),
            NodeType::Leaf => write!(f, "NodeType: Leaf"),
            NodeType::Branch(branch) => write!(f, "NodeType: Branch({:?})", branch),
        }
    }
}

/// The 8 children of a subdivided node, in octant table order.
///
/// Subdivision always creates the full set; there is no partial branch.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct Branch {
    pub children: [NodeId; 8],
}

impl Branch {
    pub(crate) fn new(children: [NodeId; 8]) -> Self {
        Branch { children }
    }
}

/// Read-only view of a node handed to subdivision heuristics.
///
/// Exposes the bounding volume, the element count and element iteration,
/// nothing else. Heuristics that divide by the element count should still
/// guard zero, although the build never consults them for an empty node.
#[derive(Clone, Copy)]
pub struct NodeView<'a, R: Real, T> {
    node: &'a Node<R>,
    elements: &'a [T],
}

impl<'a, R: Real, T> NodeView<'a, R, T> {
    pub(crate) fn new(node: &'a Node<R>, elements: &'a [T]) -> Self {
        NodeView { node, elements }
    }

    pub fn aabb(&self) -> &'a Aabb<R> {
        &self.node.aabb
    }

    pub fn element_count(&self) -> usize {
        self.node.element_count()
    }

    pub fn is_empty(&self) -> bool {
        self.node.element_count() == 0
    }

    /// Iterates the elements held by the node.
    pub fn iter(self) -> impl Iterator<Item = &'a T> {
        let ids: &'a [ElementId] = self.node.element_ids();
        ids.iter().map(move |&e| &self.elements[usize::from(e)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::TVec3;

    #[test]
    fn test_add_element_states() {
        let mut node =
            Node::from_aabb(Aabb::new(TVec3::zero(), TVec3::splat(4.0f32)), None);
        assert!(node.is_leaf());
        assert!(node.is_empty());

        assert_eq!(node.add_element(ElementId(0)), Ok(()));
        assert_eq!(node.ntype, NodeType::Leaf);
        assert_eq!(node.add_element(ElementId(1)), Ok(()));
        assert_eq!(node.element_count(), 2);

        node.ntype = NodeType::Branch(Branch::default());
        assert!(node.add_element(ElementId(2)).is_err());
        // The held list survives subdivision for introspection.
        assert_eq!(node.element_count(), 2);
        assert!(!node.is_leaf());
    }

    #[test]
    fn test_children_iteration() {
        let mut node =
            Node::from_aabb(Aabb::new(TVec3::zero(), TVec3::splat(4.0f64)), None);
        assert_eq!(node.children().count(), 0);

        let ids: [NodeId; 8] = std::array::from_fn(|i| NodeId(i as u32 + 1));
        node.ntype = NodeType::Branch(Branch::new(ids));
        let collected: Vec<NodeId> = node.children().collect();
        assert_eq!(collected, ids);
    }

    #[test]
    fn test_view_iteration() {
        let elements = vec![
            TVec3::new(1.0f32, 1.0, 1.0),
            TVec3::new(2.0, 2.0, 2.0),
            TVec3::new(3.0, 3.0, 3.0),
        ];
        let mut node =
            Node::from_aabb(Aabb::new(TVec3::zero(), TVec3::splat(4.0f32)), None);
        node.add_element(ElementId(2)).unwrap();
        node.add_element(ElementId(0)).unwrap();

        let view = NodeView::new(&node, &elements);
        assert_eq!(view.element_count(), 2);
        let seen: Vec<TVec3<f32>> = view.iter().copied().collect();
        assert_eq!(seen, vec![elements[2], elements[0]]);

        // Restartable.
        assert_eq!(view.iter().count(), 2);
    }
}
