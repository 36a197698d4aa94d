use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use isd_window::models::{StationCatalog, StationRecord};
use isd_window::processors::enricher::enrich;
use isd_window::processors::{BatchAggregator, WindowAggregator, WindowSettings};
use isd_window::readers::ObservationParser;
use std::time::Duration;
use tokio::time::Instant;

const COUNTRIES: [&str; 5] = ["US", "CA", "NO", "FR", "JP"];

fn create_catalog(station_count: usize) -> StationCatalog {
    StationCatalog::from_records((0..station_count).map(|i| {
        StationRecord::new(
            format!("{:06}", 700000 + i),
            format!("{:05}", 10000 + i),
            COUNTRIES[i % COUNTRIES.len()].to_string(),
        )
    }))
}

fn create_lines(station_count: usize, per_station: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(station_count * per_station);
    for i in 0..station_count {
        for j in 0..per_station {
            let year = 2010 + (j % 5);
            let temp = (j as i32 % 400) - 200;
            let quality = if j % 7 == 0 { '9' } else { '1' };
            lines.push(format!(
                "0000{:06}{:05}{}010100514+41960-087932FM-15+0205KORD V0202701N{:04}{}220001CN0160931N9{:+05}{}-01721102071",
                700000 + i,
                10000 + i,
                year,
                j % 120,
                quality,
                temp,
                quality
            ));
        }
    }
    lines
}

fn benchmark_parse(c: &mut Criterion) {
    let lines = create_lines(10, 100);
    let parser = ObservationParser::new();

    c.bench_function("parse_isd_lines", |b| {
        b.iter(|| {
            let parsed = lines.iter().filter(|l| parser.parse(l).is_ok()).count();
            black_box(parsed)
        })
    });
}

fn benchmark_window_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_tick_by_size");

    for &size in &[1_000usize, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::new("observations", size), &size, |b, &size| {
            let catalog = create_catalog(50);
            let parser = ObservationParser::new();
            let mut window = WindowAggregator::new(WindowSettings::new(Duration::from_secs(3600)));
            let arrival = Instant::now();
            for line in create_lines(50, size / 50) {
                if let Ok(observation) = parser.parse(&line) {
                    window.add(enrich(observation, &catalog), arrival);
                }
            }

            b.iter(|| black_box(window.on_tick(arrival).rows.len()))
        });
    }

    group.finish();
}

fn benchmark_batch_aggregate(c: &mut Criterion) {
    let catalog = create_catalog(100);
    let text = create_lines(100, 200).join("\n");
    let aggregator = BatchAggregator::default();

    c.bench_function("batch_aggregate", |b| {
        b.iter(|| {
            let outcome = aggregator.aggregate_text(&text, &catalog, None);
            black_box(outcome.map(|o| o.rows.len()).unwrap_or(0))
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_window_tick,
    benchmark_batch_aggregate
);
criterion_main!(benches);
