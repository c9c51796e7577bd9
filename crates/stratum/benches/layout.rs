use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use stratum::{
    ContainerSpec, CoordinateMode, EdgeSpec, GraphBuilder, GraphSnapshot, LayoutConfig,
    RoutingMode,
};
use std::hint::black_box;
use std::time::Duration;

fn build_dag(name: &str, node_count: usize, fanout: usize, config: LayoutConfig) -> GraphSnapshot {
    let builder = GraphBuilder::with_config(config);
    let id = |i: usize| format!("{name}_n{i}");

    // A spine to guarantee connectivity.
    for i in 0..node_count.saturating_sub(1) {
        builder.add_edge(EdgeSpec::new(id(i), id(i + 1)).with_weight(2.0));
    }

    // Extra forward edges to create crossing pressure.
    for i in 0..node_count {
        for k in 2..=(fanout + 1) {
            let to = i + k;
            if to >= node_count {
                break;
            }
            builder.add_edge(EdgeSpec::new(id(i), id(to)));
        }
        let to = i + 10;
        if to < node_count {
            builder.add_edge(EdgeSpec::new(id(i), id(to)).with_minlen(2).with_weight(0.5));
        }
    }

    // Every tenth node goes into a bordered group.
    for start in (0..node_count).step_by(40) {
        let members: Vec<String> = (start..node_count.min(start + 40))
            .step_by(10)
            .map(id)
            .collect();
        builder.add_container(
            None,
            ContainerSpec::bordered(format!("{name}_c{start}")).with_nodes(members),
        );
    }

    match builder.build() {
        Ok(snapshot) => snapshot,
        Err(err) => panic!("benchmark graph `{name}` is invalid: {err}"),
    }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("dag_50_f3", 50usize, 3usize),
        ("dag_200_f4", 200usize, 4usize),
    ];

    for (name, nodes, fanout) in cases {
        for mode in [CoordinateMode::Default, CoordinateMode::Improved] {
            let config = LayoutConfig {
                coordinates: mode,
                ..Default::default()
            };
            let snapshot = build_dag(name, nodes, fanout, config);
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), name),
                &snapshot,
                |b, snapshot| b.iter(|| black_box(stratum::layout(black_box(snapshot)))),
            );
        }
    }

    let orthogonal = build_dag(
        "ortho_50",
        50,
        2,
        LayoutConfig {
            routing: RoutingMode::Orthogonal,
            ..Default::default()
        },
    );
    group.bench_with_input(
        BenchmarkId::new("orthogonal", "dag_50_f2"),
        &orthogonal,
        |b, snapshot| b.iter(|| black_box(stratum::layout(black_box(snapshot)))),
    );

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
