use criterion::{black_box, criterion_group, criterion_main, Criterion};
use octostat::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const RANGE: f32 = 4096.0;

fn random_points(n: usize, seed: u64) -> Vec<TVec3<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            TVec3::new(
                rng.gen_range(0.0..RANGE),
                rng.gen_range(0.0..RANGE),
                rng.gen_range(0.0..RANGE),
            )
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let aabb = Aabb::new(TVec3::zero(), TVec3::splat(RANGE));

    let mut group = c.benchmark_group("rebuild");
    for n in [4096, 65536] {
        let points = random_points(n, 0x910583);
        let mut tree = Octree::from_aabb_with_capacity(aabb, SimpleThreshold::<32>, n);
        tree.set_elements(points);

        group.bench_function(format!("{n} points"), |b| {
            b.iter(|| {
                tree.rebuild().unwrap();
                black_box(tree.leaves().len())
            })
        });
    }
    group.finish();

    let points = random_points(65536, 0x910583);
    let mut tree = Octree::from_aabb_with_capacity(aabb, SimpleThreshold::<32>, points.len());
    tree.set_elements(points);
    tree.rebuild().unwrap();

    c.bench_function("iter leaves 65536", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &leaf in tree.leaves() {
                count += tree.view(leaf).iter().count();
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
