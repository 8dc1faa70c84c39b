use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use vizbind::core::force::{CenterForce, CollideForce, LinkForce, ManyBodyForce};
use vizbind::core::{
    ContinuousScale, Dataset, ForceSet, ForceSimulation, LinearScale, LinkSpec, LogScale, Record,
    SimNode, Value, reconcile,
};
use vizbind::render::{LayerKind, Primitive, ShapeLayer};

fn bench_scale_mapping(c: &mut Criterion) {
    let linear = LinearScale::new((0.0, 10_000.0), (1_080.0, 0.0)).expect("valid scale");
    let log = LogScale::new((142.0, 100_000.0), (0.0, 1_920.0)).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = linear.map(black_box(4_321.123));
            black_box(linear.invert(px))
        })
    });
    c.bench_function("log_scale_round_trip", |b| {
        b.iter(|| {
            let px = log.map(black_box(4_321.123));
            black_box(log.invert(px))
        })
    });
}

fn bench_reconcile_10k(c: &mut Criterion) {
    let previous: Vec<u32> = (0..10_000).collect();
    let next: Vec<u32> = (5_000..15_000).collect();

    c.bench_function("reconcile_10k_half_overlap", |b| {
        b.iter(|| black_box(reconcile(black_box(&previous), black_box(&next))))
    });
}

fn bench_layer_bind_1k(c: &mut Criterion) {
    let dataset: Dataset = (0..1_000)
        .map(|i| {
            Record::new()
                .with("country", Value::Text(format!("c{i}")))
                .with("income", Value::Number(f64::from(i) * 10.0))
        })
        .collect::<Dataset>()
        .with_key_field("country");

    c.bench_function("shape_layer_rebind_1k", |b| {
        let mut layer = ShapeLayer::new(LayerKind::Series);
        b.iter(|| {
            let outcome = layer.bind(&dataset, |record, index| {
                Primitive::circle(
                    record.number("income").unwrap_or(0.0),
                    index as f64,
                    5.0,
                )
            });
            black_box(outcome.patches.len())
        })
    });
}

fn bench_force_step_200(c: &mut Criterion) {
    let nodes: Vec<SimNode> = (0..200).map(|i| SimNode::new(format!("n{i}"))).collect();
    let links: Vec<LinkSpec> = (1..200)
        .map(|i| LinkSpec {
            source: format!("n{}", i / 2),
            target: format!("n{i}"),
            value: 1.0,
        })
        .collect();
    let forces = ForceSet {
        center: Some(CenterForce { x: 400.0, y: 350.0 }),
        many_body: Some(ManyBodyForce {
            strength: -50.0,
            ..ManyBodyForce::default()
        }),
        collide: Some(CollideForce {
            radius: 10.0,
            strength: 0.9,
        }),
        link: Some(LinkForce::default()),
    };
    let simulation = ForceSimulation::new(nodes, &links, forces).expect("valid simulation");

    c.bench_function("force_step_200_nodes", |b| {
        let mut simulation = simulation.clone();
        b.iter(|| {
            simulation.set_alpha(1.0);
            simulation.restart();
            black_box(simulation.step())
        })
    });
}

criterion_group!(
    benches,
    bench_scale_mapping,
    bench_reconcile_10k,
    bench_layer_bind_1k,
    bench_force_step_200
);
criterion_main!(benches);
