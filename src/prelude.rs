//! Import for most of the crate's functionality.
//!
//! ```rust
//! use octostat::prelude::*;
//! ```

pub use crate::{
    bounding::{Aabb, BVec3, Real, TVec3},
    classify::{from_fns, Classify, FnClassify, OccupancyThreshold, SimpleThreshold},
    node::{Node, NodeType, NodeView},
    tree::{Octree, DEFAULT_MAX_DEPTH},
    Bounded, ElementId, NodeId, Position, TreeError,
};
