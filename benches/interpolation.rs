use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hydromet::{
    bilinear, closest_quarters, inverse_distance_weighting, CornerSeries, GridCell, LatLon,
    SamplePoint, GRID_RESOLUTION,
};

/// 9 days of hourly values, the size of one deployment forecast window.
fn hourly_series(offset: f64) -> Vec<f64> {
    (0..216).map(|i| offset + (i as f64) * 0.1).collect()
}

fn bench_interpolation(c: &mut Criterion) {
    c.bench_function("closest_quarters", |b| {
        b.iter(|| closest_quarters(black_box(43.35)))
    });

    let series = [
        hourly_series(0.0),
        hourly_series(10.0),
        hourly_series(20.0),
        hourly_series(30.0),
    ];
    let cell = GridCell::enclosing(LatLon(43.35, 19.36), GRID_RESOLUTION);
    let corners: Vec<LatLon> = cell.corners().to_vec();

    c.bench_function("idw_4_points_216_steps", |b| {
        let samples: Vec<SamplePoint> = corners
            .iter()
            .zip(&series)
            .map(|(&location, values)| SamplePoint {
                location,
                values,
            })
            .collect();
        b.iter(|| inverse_distance_weighting(black_box(LatLon(43.35, 19.36)), &samples, 2.0))
    });

    c.bench_function("bilinear_216_steps", |b| {
        let corner_series = CornerSeries {
            south_west: &series[0],
            south_east: &series[1],
            north_east: &series[2],
            north_west: &series[3],
        };
        b.iter(|| bilinear(black_box(LatLon(43.35, 19.36)), &cell, &corner_series))
    });
}

criterion_group!(benches, bench_interpolation);
criterion_main!(benches);
