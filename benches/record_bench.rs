//! Benchmarks for key conversion and record ingestion
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mt_metadata::{MetadataRecord, flatten, nest, standard_catalog};
use serde_json::{Map, Value, json};

/// Fully populated station in nested form
fn sample_station() -> Value {
    json!({
        "id": "MT001",
        "geographic_name": "Whitehorse, YK",
        "location": {
            "latitude": "60.72",
            "longitude": -135.05,
            "elevation": 700,
            "declination": {"value": 18.5, "model": "IGRF"}
        },
        "orientation": {"method": "compass", "reference_frame": "geographic"},
        "channels_recorded": "ex, ey, hx, hy, hz",
        "time_period": {"start": "2020-06-01 12:00:00", "end": "2020-06-15T08:30:00Z"},
        "acquired_by": {"name": "J. Doe", "organization": "Survey Co."},
        "provenance": {"creation_time": "2020-07-01T00:00:00+00:00"}
    })
}

/// Nested tree `depth` levels deep with `width` entries per level
fn generate_tree(width: usize, depth: usize) -> Value {
    let mut node = Map::new();
    for i in 0..width {
        node.insert(format!("leaf_{}", i), json!(i));
    }
    let mut tree = Value::Object(node);
    for level in 0..depth {
        let mut parent = Map::new();
        for i in 0..width {
            parent.insert(format!("branch_{}_{}", level, i), tree.clone());
        }
        tree = Value::Object(parent);
    }
    tree
}

/// Benchmark flatten and nest
fn bench_key_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_conversion");

    for (width, depth) in [(10, 1), (10, 2), (5, 4)].iter() {
        let tree = generate_tree(*width, *depth);
        let flat = flatten(&tree).unwrap();
        group.throughput(Throughput::Elements(flat.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("flatten", flat.len()),
            &tree,
            |b, tree| b.iter(|| black_box(flatten(tree))),
        );
        group.bench_with_input(BenchmarkId::new("nest", flat.len()), &flat, |b, flat| {
            b.iter(|| black_box(nest(flat)))
        });
    }

    group.finish();
}

/// Benchmark record ingestion and output
fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("station_record");
    let schema = standard_catalog().unwrap().entity("station").unwrap();
    let data = sample_station();
    let record = MetadataRecord::from_dict(schema.clone(), &data).unwrap();
    let json = record.to_json(true).unwrap();
    let xml = record.to_xml().unwrap();

    group.bench_function("from_dict", |b| {
        b.iter(|| black_box(MetadataRecord::from_dict(schema.clone(), &data)))
    });
    group.bench_function("from_json", |b| {
        b.iter(|| black_box(MetadataRecord::from_json(schema.clone(), &json)))
    });
    group.bench_function("from_xml", |b| {
        b.iter(|| black_box(MetadataRecord::from_xml(schema.clone(), &xml)))
    });
    group.bench_function("to_json_nested", |b| b.iter(|| black_box(record.to_json(true))));
    group.bench_function("to_xml", |b| b.iter(|| black_box(record.to_xml())));

    group.finish();
}

criterion_group!(benches, bench_key_conversion, bench_record);
criterion_main!(benches);
