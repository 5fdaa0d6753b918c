#![allow(missing_docs, clippy::unwrap_used)]
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use graft_core::{Application, Graph, Plain, RuleSystem};
use graft_dry_tests::{complete, grid, rules};

fn bench_subdivide_grid(c: &mut Criterion) {
    let mut system = RuleSystem::<Plain>::new();
    let subdivide = rules::edge_subdivision(&mut system).unwrap();
    let mut group = c.benchmark_group("rewrite/subdivide_grid");
    for &side in &[10usize, 30, 60] {
        let host: Graph = grid(side, side).unwrap();
        let batch: Vec<Application> = system
            .find_rule_match(subdivide, &host, &mut ())
            .unwrap()
            .into_iter()
            .map(|m| Application::new(subdivide, m))
            .collect();
        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &batch, |b, batch| {
            b.iter_batched(
                || host.clone(),
                |host| system.apply_matches(&host, batch, &mut ()).unwrap(),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

// Every edge of K_n sits in n - 2 triangles, so splices pile onto shared
// ports and the merge phases do real work.
fn bench_overlapping_triangles(c: &mut Criterion) {
    let mut system = RuleSystem::<Plain>::new();
    rules::triangle_expansion(&mut system).unwrap();
    let mut group = c.benchmark_group("rewrite/overlapping_triangles");
    for &n in &[5usize, 8, 12] {
        let host: Graph = complete(n).unwrap();
        let batch = system.find_all_matches(&host, &mut ());
        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &batch, |b, batch| {
            b.iter(|| system.apply_matches(&host, batch, &mut ()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_subdivide_grid, bench_overlapping_triangles);
criterion_main!(benches);
