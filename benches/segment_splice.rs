//! Benchmarks for segment-range lookup and playlist splicing.
//!
//! Every completed job performs one `segment_range_for` lookup (against the
//! original playlist) and one `splice` to build the merged playlist — runs
//! once per job, but against playlists that can run into the thousands of
//! segments for long-form VOD content.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use adstitch::hls::playlist::{Segment, segment_range_for, splice};

fn generate_segments(count: usize, duration_s: f64) -> Vec<Segment> {
    (0..count)
        .map(|i| Segment {
            index: i,
            path: format!("segment{i:03}.ts"),
            duration_s,
            sequence_offset: 0,
        })
        .collect()
}

fn bench_segment_range_for(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_range_for");
    for count in [100usize, 1_000, 10_000] {
        let segments = generate_segments(count, 6.0);
        let midpoint = (count as f64 * 6.0) / 2.0;
        group.bench_with_input(BenchmarkId::from_parameter(count), &segments, |b, segments| {
            b.iter(|| segment_range_for(black_box(segments), black_box(midpoint), black_box(midpoint + 10.0)))
        });
    }
    group.finish();
}

fn bench_splice(c: &mut Criterion) {
    let mut group = c.benchmark_group("splice");
    for count in [100usize, 1_000, 10_000] {
        let original = generate_segments(count, 6.0);
        let edited = generate_segments(2, 10.0);
        let a = count / 3;
        let b_idx = a + 1;
        group.bench_with_input(BenchmarkId::from_parameter(count), &(original, edited), |bencher, (original, edited)| {
            bencher.iter(|| splice(black_box(original), black_box(edited), black_box(a), black_box(b_idx)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segment_range_for, bench_splice);
criterion_main!(benches);
