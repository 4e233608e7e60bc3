use criterion::{black_box, criterion_group, criterion_main, Criterion};
use schemedit::prelude::*;
use schemedit::{locate_component, locate_module, merge_modules};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture() -> Circuit {
    Circuit::load(&fixture_path("three_modules.json")).unwrap()
}

fn bench_merge_modules(c: &mut Criterion) {
    let circuit = load_fixture();
    let config = EditorConfig::default();

    c.bench_function("merge_modules", |b| {
        b.iter(|| {
            let mut circuit = circuit.clone();
            merge_modules(&mut circuit, "top", black_box(&["M1", "M2", "M3"]), &config)
        });
    });
}

fn bench_hit_testing(c: &mut Criterion) {
    let circuit = load_fixture();
    let config = EditorConfig::default();
    let layer = circuit.layers.get("top");
    let m1 = circuit.layers["top"].modules.get("M1");

    c.bench_function("locate_module", |b| {
        b.iter(|| locate_module(black_box(Position::new(305.0, 102.0)), layer));
    });
    c.bench_function("locate_component_zoomed", |b| {
        b.iter(|| locate_component(black_box(Position::new(230.0, 262.0)), m1, true, &config));
    });
}

criterion_group!(benches, bench_merge_modules, bench_hit_testing);
criterion_main!(benches);
