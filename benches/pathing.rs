use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use maze_nav::generators;
use maze_nav::occupancy::{GridPoint, OccupancyGrid};
use maze_nav::pathing::{Algorithm, Pathfinder};
use maze_nav::units::{Height, Width};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

fn large_layout() -> OccupancyGrid {
    let mut rng = XorShiftRng::seed_from_u64(350);
    let g = generators::generate(Width(175), Height(175), &mut rng).unwrap();
    OccupancyGrid::from_maze(&g)
}

fn bench_search(c: &mut Criterion, name: &str, algorithm: Algorithm) {
    let layout = large_layout();
    let finder = Pathfinder::new(algorithm);
    let (start, goal) = (GridPoint::new(1, 1), GridPoint::new(349, 349));
    c.bench_function(name, move |b| b.iter(|| finder.search(&layout, start, goal)));
}

fn bench_breadth_first(c: &mut Criterion) {
    bench_search(c, "breadth_first_350", Algorithm::BreadthFirst);
}

fn bench_dijkstra(c: &mut Criterion) {
    bench_search(c, "dijkstra_350", Algorithm::Dijkstra);
}

fn bench_a_star(c: &mut Criterion) {
    bench_search(c, "a_star_350", Algorithm::AStar);
}

fn bench_components(c: &mut Criterion) {
    let layout = large_layout();
    c.bench_function("component_count_350", move |b| b.iter(|| layout.component_count()));
}

criterion_group!(benches,
    bench_breadth_first,
    bench_dijkstra,
    bench_a_star,
    bench_components
);
criterion_main!(benches);
