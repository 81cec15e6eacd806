//! Evaluator performance benchmark
//! Covers the three stages of a run: parameter flattening, classification and evaluation

use code_builder::{Evaluator, ParameterTables};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

/// Expression documents of varying complexity
fn test_expressions() -> Vec<(&'static str, Value)> {
    vec![
        ("simple", json!({"attr": "token"})),
        (
            "medium",
            json!({"function": "concat", "args": ["Bearer ", {"attr": "token"}]}),
        ),
        (
            "complex",
            json!({
                "function": "base64_encode",
                "args": [{
                    "function": "hash_hmac",
                    "args": [
                        "sha256",
                        {"function": "implode", "args": ["\n", [
                            {"request": "method"},
                            {"function": "date", "args": ["Y-m-d\\TH:i:sP", {"function": "time"}]},
                            {"function": "ifempty", "args": [{"attr": "path"}, "/"]}
                        ]]},
                        {"attr": "#secret"},
                        true
                    ]
                }]
            }),
        ),
    ]
}

fn test_params() -> Value {
    json!({
        "attr": {"token": "abc", "path": "", "#secret": "key", "nested": {"a": [1, 2, {"b": 3}]}},
        "request": {"method": "GET"}
    })
}

/// Benchmark parameter flattening
fn bench_params(c: &mut Criterion) {
    let params = test_params();
    c.bench_function("params/flatten", |b| {
        b.iter(|| black_box(ParameterTables::from_json(black_box(&params))))
    });
}

/// Benchmark classification
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(1));

    let evaluator = Evaluator::new();
    let tables = ParameterTables::from_json(&test_params()).expect("valid params");

    for (complexity, tree) in test_expressions() {
        group.bench_with_input(BenchmarkId::new("classify", complexity), &tree, |b, tree| {
            b.iter(|| black_box(evaluator.classify(black_box(tree), &tables)))
        });
    }

    group.finish();
}

/// Benchmark full runs
fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.throughput(Throughput::Elements(1));

    let evaluator = Evaluator::new();
    let params = test_params();

    for (complexity, tree) in test_expressions() {
        group.bench_with_input(BenchmarkId::new("run", complexity), &tree, |b, tree| {
            b.iter(|| black_box(evaluator.run(black_box(tree), &params)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_params, bench_classify, bench_run);
criterion_main!(benches);
