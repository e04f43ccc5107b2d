//! Buckets a synthetic point cloud and prints timings and tree stats.
//!
//! The cloud avoids a sphere around the origin and a thin shell further
//! out, so the density is uneven and the tree ends up lopsided.
//!
//! ```sh
//! cargo run --release --example points
//! ```

use std::time::Instant;

use octostat::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const NUM_POINTS: usize = 2500;

fn random_point(rng: &mut StdRng, aabb: &Aabb<f32>) -> TVec3<f32> {
    let centre = aabb.centre();
    let extents = aabb.extents();
    // Random in [-1, 1] per axis, pulled in a little from the faces.
    let mut offset = |extent: f32| rng.gen_range(-1.0..=1.0f32) * extent * 0.9;
    centre + TVec3::new(offset(extents.x), offset(extents.y), offset(extents.z))
}

/// The closer a point is to the origin, the less chance it spawns, and a
/// fuzzy shell further out is carved away too.
fn can_spawn(rng: &mut StdRng, point: TVec3<f32>) -> bool {
    let threshold = 10.0 + rng.gen::<f32>() * 8.0;
    let shell = 30.0 + rng.gen::<f32>() * 5.0;
    let distance = point.length();

    distance > threshold
        && (shell - distance).abs() > 10.0
        && point.z < 7.0 + rng.gen::<f32>() * 10.0
}

fn main() {
    let aabb = Aabb::new(TVec3::zero(), TVec3::splat(20.0f32));
    let mut tree = Octree::from_aabb_with_capacity(aabb, SimpleThreshold::<40>, NUM_POINTS);

    let mut rng = StdRng::seed_from_u64(0x910583);
    let start = Instant::now();

    let mut points = Vec::with_capacity(NUM_POINTS);
    while points.len() < NUM_POINTS {
        let point = random_point(&mut rng, &aabb);
        if can_spawn(&mut rng, point) {
            points.push(point);
        }
    }
    tree.set_elements(points);
    let populate = start.elapsed();

    let start = Instant::now();
    tree.rebuild().expect("snapshot fits the configured depth");
    let build = start.elapsed();

    println!(
        "Took {:.3} ms to populate, {:.3} ms to build the octree",
        populate.as_secs_f64() * 1e3,
        build.as_secs_f64() * 1e3
    );

    let occupied = tree
        .iter_leaves()
        .filter(|node| !node.is_empty())
        .count();
    println!(
        "{} nodes, {} leaves ({} occupied), {} points dropped",
        tree.node_count(),
        tree.leaves().len(),
        occupied,
        tree.dropped()
    );

    let mut deepest: Option<&Node<f32>> = None;
    let depth_of = |node: &Node<f32>| {
        let mut depth = 0;
        let mut parent = node.parent;
        while let Some(id) = parent {
            parent = tree.node(id).parent;
            depth += 1;
        }
        depth
    };
    let mut max_depth = 0;
    for node in tree.iter_leaves() {
        let depth = depth_of(node);
        if depth > max_depth {
            max_depth = depth;
            deepest = Some(node);
        }
    }
    if let Some(node) = deepest {
        println!(
            "deepest leaf at depth {} holds {} points in {}",
            max_depth,
            node.element_count(),
            node.aabb
        );
    }
}
