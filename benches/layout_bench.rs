use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use timeline_layout::api::{TimelineLayout, TimelineLayoutConfig};
use timeline_layout::core::{
    IntervalId, MILLIS_PER_DAY, MILLIS_PER_HOUR, PlacedInterval, PlacementTable, Point, ScaleUnit,
    TimeAxisMapper, TimeSpan,
};

const YEAR_2020: i64 = 1_577_836_800_000;

fn generated_spans(count: u64) -> Vec<(IntervalId, TimeSpan)> {
    (0..count)
        .map(|i| {
            let start = YEAR_2020 + (i as i64 * 7_919 % 3_650) * MILLIS_PER_DAY / 10;
            let duration = (i as i64 % 97 + 1) * MILLIS_PER_HOUR;
            let span = TimeSpan::new(start, start + duration).expect("valid generated span");
            (IntervalId(i), span)
        })
        .collect()
}

fn bench_cyclic_time_to_x(c: &mut Criterion) {
    let window = TimeSpan::new(YEAR_2020, YEAR_2020 + 5 * 365 * MILLIS_PER_DAY).expect("window");
    let mapper = TimeAxisMapper::with_window(ScaleUnit::Hour, true, window).expect("mapper");

    c.bench_function("cyclic_time_to_x", |b| {
        b.iter(|| {
            let _ = mapper
                .time_to_x(black_box(YEAR_2020 + 900 * MILLIS_PER_DAY))
                .expect("to pixel");
        })
    });
}

fn bench_assign_10k(c: &mut Criterion) {
    let window = TimeSpan::new(YEAR_2020, YEAR_2020 + 365 * MILLIS_PER_DAY).expect("window");
    let mapper = TimeAxisMapper::with_window(ScaleUnit::Hour, false, window).expect("mapper");
    let intervals: Vec<PlacedInterval> = generated_spans(10_000)
        .into_iter()
        .map(|(id, span)| {
            let mut interval = PlacedInterval::new(id, span);
            interval.update_geometry(&mapper).expect("geometry");
            interval
        })
        .collect();

    c.bench_function("assign_10k", |b| {
        b.iter(|| {
            let mut batch = intervals.clone();
            let mut table = PlacementTable::new();
            black_box(table.assign(batch.iter_mut()));
        })
    });
}

fn bench_hit_test_10k(c: &mut Criterion) {
    let config = TimelineLayoutConfig::new(ScaleUnit::Hour);
    let mut layout = TimelineLayout::new(config).expect("layout init");
    for (id, span) in generated_spans(10_000) {
        layout.insert_interval(id, span).expect("insert");
    }

    c.bench_function("hit_test_10k", |b| {
        b.iter(|| {
            let _ = layout.hit_test(black_box(Point::new(12_345, 60)));
        })
    });
}

fn bench_snapshot_json_2k(c: &mut Criterion) {
    let config = TimelineLayoutConfig::new(ScaleUnit::Day);
    let mut layout = TimelineLayout::new(config).expect("layout init");
    for (id, span) in generated_spans(2_000) {
        layout.insert_interval(id, span).expect("insert");
    }

    c.bench_function("layout_snapshot_json_2k", |b| {
        b.iter(|| {
            let _ = layout
                .snapshot_json_pretty()
                .expect("snapshot json should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_cyclic_time_to_x,
    bench_assign_10k,
    bench_hit_test_10k,
    bench_snapshot_json_2k
);
criterion_main!(benches);
