//! Benchmarks for geo crate distance calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gigmap_geo::{batch::calculate_distances_sorted, distance_km, Coordinate, LocationItem};
use serde_json::json;

fn create_test_items(count: usize) -> Vec<LocationItem> {
    (0..count)
        .map(|i| {
            // Generate points in a grid around Bangalore, half of them as strings
            let lat = 12.0 + (i as f64 * 0.01) % 2.0;
            let lng = 77.0 + (i as f64 * 0.01) % 2.0;
            let (latitude, longitude) = if i % 2 == 0 {
                (json!(lat), json!(lng))
            } else {
                (json!(lat.to_string()), json!(lng.to_string()))
            };
            LocationItem { id: format!("listing-{i}"), latitude, longitude }
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    c.bench_function("distance_km_numbers", |b| {
        b.iter(|| distance_km(black_box(12.9716), black_box(77.5946), black_box(13.0827), black_box(80.2707)))
    });

    c.bench_function("distance_km_strings", |b| {
        b.iter(|| distance_km(black_box("12.9716"), black_box("77.5946"), black_box("13.0827"), black_box("80.2707")))
    });
}

fn bench_sorted_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_feed");
    let viewer = Coordinate::new(12.9716, 77.5946);

    for size in [10, 100, 1000, 10000].iter() {
        let items = create_test_items(*size);

        group.bench_with_input(BenchmarkId::new("sorted", size), size, |b, _| {
            b.iter(|| calculate_distances_sorted(black_box(viewer), black_box(&items), None))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_sorted_feed);
criterion_main!(benches);
