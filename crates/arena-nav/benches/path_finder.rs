use arena_core::{SplitMix64, TileLayout, Vec3};
use arena_nav::{NavGrid, NavGridConfig, PathFinder};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn arena(size: usize, props: usize) -> (TileLayout, NavGrid) {
    let mut layout = TileLayout::flat(size, size, 10.0, 0.0).expect("layout");
    let mut rng = SplitMix64::new(0x5eed);
    layout.scatter_props(&mut rng, props, 40.0);
    // Keep the corners free for start and goal.
    let last = size - 1;
    for (x, z) in [(0, 0), (last, last)] {
        layout.clear_prop(x, z).expect("corner");
    }
    let grid = NavGrid::from_area(NavGridConfig::new(10.0, 10.0), &layout).expect("grid");
    (layout, grid)
}

fn bench_path_finder(c: &mut Criterion) {
    let (layout, grid) = arena(32, 120);
    let start = Vec3::new(5.0, 0.0, 5.0);
    let goal = Vec3::new(315.0, 0.0, 315.0);

    let mut group = c.benchmark_group("arena-nav/grid");

    group.bench_function("build_32x32", |b| {
        b.iter(|| {
            let grid = NavGrid::from_area(NavGridConfig::new(10.0, 10.0), &layout).expect("grid");
            black_box(grid.obstacle_count());
        })
    });

    let mut finder = PathFinder::new();
    group.bench_function("resolve_4way_reuse", |b| {
        b.iter(|| {
            black_box(finder.resolve(&grid, start, goal));
        })
    });

    let mut finder = PathFinder::new().with_diagonals(true);
    group.bench_function("resolve_8way_reuse", |b| {
        b.iter(|| {
            black_box(finder.resolve(&grid, start, goal));
        })
    });

    group.bench_function("resolve_fresh_pool", |b| {
        b.iter(|| {
            let mut finder = PathFinder::new();
            black_box(finder.resolve(&grid, start, goal));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_path_finder);
criterion_main!(benches);
