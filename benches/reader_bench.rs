//! Benchmarks for the in-memory readers.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use seisread::{
    PhaseFormat, Region, parse_common_receiver, parse_event_time, parse_faults, parse_phases,
};

const EVENTS: usize = 200;
const PHASES_PER_EVENT: usize = 20;

fn hypoinverse_content() -> String {
    let mut content = String::new();
    for event in 0..EVENTS {
        content.push_str(&format!(
            "2023-05-04T23:{:02}:05.759223Z,37.8112,-122.0573,8.12,2.1,nc{}\n",
            event % 60,
            event
        ));
        for phase in 0..PHASES_PER_EVENT {
            content.push_str(&format!(
                "ST{:02},2023-05-04T23:{:02}:07.120000Z,2023-05-04T23:{:02}:08.950000Z\n",
                phase,
                event % 60,
                event % 60
            ));
        }
    }
    content
}

fn tomoatt_content() -> String {
    let mut content = String::new();
    for event in 0..EVENTS {
        content.push_str(&format!(
            "{} 2023 5 4 23 23 5.759223 37.8112 -122.0573 8.12 2.1 {} ev{}\n",
            event, PHASES_PER_EVENT, event
        ));
        for phase in 0..PHASES_PER_EVENT {
            content.push_str(&format!(
                "{} {} ST{:02} 37.8735 -122.2610 243.0 P 3.2140 S 5.6000\n",
                event, phase, phase
            ));
        }
    }
    content
}

fn common_receiver_content() -> String {
    let mut content = String::new();
    for pair in 0..EVENTS {
        content.push_str(&format!("# {} {} 0.87\n", pair, pair + 1));
        for phase in 0..PHASES_PER_EVENT {
            let kind = if phase % 2 == 0 { "P" } else { "S" };
            content.push_str(&format!("ST{:02} 12.3400 12.1100 {}\n", phase, kind));
        }
    }
    content
}

fn fault_content() -> String {
    let mut content = String::from("<kml><Document>\n");
    for fault in 0..EVENTS {
        content.push_str("<Placemark><coordinates>");
        for point in 0..PHASES_PER_EVENT {
            let lon = -123.0 + (fault * PHASES_PER_EVENT + point) as f64 * 0.0005;
            content.push_str(&format!("{:.4},37.{:04},0 ", lon, point));
        }
        content.push_str("</coordinates></Placemark>\n");
    }
    content.push_str("</Document></kml>\n");
    content
}

fn bench_phase_readers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_phases");
    group.throughput(Throughput::Elements((EVENTS * (PHASES_PER_EVENT + 1)) as u64));

    let hypoinverse = hypoinverse_content();
    group.bench_function("hypoinverse_output", |b| {
        b.iter(|| parse_phases(black_box(&hypoinverse), PhaseFormat::HypoinverseOutput))
    });

    let tomoatt = tomoatt_content();
    group.bench_function("tomoatt_input", |b| {
        b.iter(|| parse_phases(black_box(&tomoatt), PhaseFormat::TomoAttInput))
    });

    group.finish();
}

fn bench_common_receiver(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_common_receiver");
    group.throughput(Throughput::Elements((EVENTS * (PHASES_PER_EVENT + 1)) as u64));

    let content = common_receiver_content();
    group.bench_function("with_network_code", |b| {
        b.iter(|| parse_common_receiver(black_box(&content), Some("BK")))
    });

    group.finish();
}

fn bench_faults(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_faults");
    group.throughput(Throughput::Elements((EVENTS * PHASES_PER_EVENT) as u64));

    let content = fault_content();
    let region = Region::new(-122.5, -121.0, 37.0, 38.0);
    group.bench_function("clip_to_region", |b| {
        b.iter(|| parse_faults(black_box(&content), &region))
    });

    group.finish();
}

fn bench_timestamps(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_event_time");

    group.bench_function("iso", |b| {
        b.iter(|| parse_event_time(black_box("2023-06-19T18:31:37.518071Z")))
    });

    group.bench_function("compact", |b| {
        b.iter(|| parse_event_time(black_box("20230504232305.91")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_phase_readers,
    bench_common_receiver,
    bench_faults,
    bench_timestamps
);
criterion_main!(benches);
