use corona_map::cases::{format_cases, CaseLayer};
use corona_map::map::Viewport;
use corona_map::model::{to_feature_collection, CountryInfo, CountryRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geojson::JsonObject;

fn synthetic_records(n: usize) -> Vec<CountryRecord> {
    (0..n)
        .map(|i| {
            let lon = (i as f64 * 1.7).rem_euclid(360.0) - 180.0;
            let lat = (i as f64 * 0.9).rem_euclid(160.0) - 80.0;
            CountryRecord {
                country: format!("Country {i}"),
                cases: (i as u64) * 137,
                deaths: (i as u64) * 3,
                recovered: (i as u64) * 60,
                updated: Some(1_584_000_000_000 + i as u64),
                country_info: CountryInfo {
                    lat: Some(lat),
                    long: Some(lon),
                    extra: JsonObject::new(),
                },
                extra: JsonObject::new(),
            }
        })
        .collect()
}

fn bench_projection(c: &mut Criterion) {
    let viewport = Viewport::home(320, 160);
    let points: Vec<(f64, f64)> = (0..10_000)
        .map(|i| {
            let lon = (i as f64 * 0.036).rem_euclid(360.0) - 180.0;
            let lat = (i as f64 * 0.016).rem_euclid(160.0) - 80.0;
            (lon, lat)
        })
        .collect();

    c.bench_function("project_10k_points", |b| {
        b.iter(|| {
            for &(lon, lat) in &points {
                black_box(viewport.project(lon, lat));
            }
        })
    });
}

fn bench_format_cases(c: &mut Criterion) {
    c.bench_function("format_cases", |b| {
        b.iter(|| {
            for cases in [0u64, 999, 1000, 1999, 12345, 999_999, 1_500_000] {
                black_box(format_cases(black_box(cases)));
            }
        })
    });
}

fn bench_layer_build(c: &mut Criterion) {
    let records = synthetic_records(250);

    c.bench_function("feature_collection_250", |b| {
        b.iter(|| black_box(to_feature_collection(black_box(&records))))
    });

    let fc = to_feature_collection(&records);
    c.bench_function("case_layer_250", |b| {
        b.iter(|| black_box(CaseLayer::from_features(black_box(&fc))))
    });
}

criterion_group!(benches, bench_projection, bench_format_cases, bench_layer_build);
criterion_main!(benches);
