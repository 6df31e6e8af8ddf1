//! Benchmarks for subtitle parsing and gap detection.
//!
//! Subtitle parsing runs once per job submission, but transcripts for
//! longer-form content can run into thousands of cues, and gap detection
//! is O(n) over them — this is the hot path feeding both the placement
//! oracle's prompt context and the segment-boundary search.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use adstitch::subtitle::{find_gaps, parse_file};

fn generate_srt(cue_count: usize) -> String {
    let mut out = String::new();
    let mut t = 0.0_f64;
    for i in 0..cue_count {
        let start = t;
        let end = t + 2.5;
        out.push_str(&format!(
            "{}\n{} --> {}\nLine of dialogue number {}.\n\n",
            i + 1,
            format_ts(start),
            format_ts(end),
            i
        ));
        t = end + 4.0;
    }
    out
}

fn format_ts(s: f64) -> String {
    let ms = (s.fract() * 1000.0).round() as u32;
    let total = s.trunc() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let sec = total % 60;
    format!("{h:02}:{m:02}:{sec:02},{ms:03}")
}

fn bench_parse_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_file");
    for cue_count in [50usize, 500, 5000] {
        let content = generate_srt(cue_count);
        group.bench_with_input(BenchmarkId::from_parameter(cue_count), &content, |b, content| {
            b.iter(|| parse_file(black_box("bench.srt"), black_box(content)))
        });
    }
    group.finish();
}

fn bench_find_gaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_gaps");
    for cue_count in [50usize, 500, 5000] {
        let content = generate_srt(cue_count);
        let cues = parse_file("bench.srt", &content).expect("valid fixture");
        group.bench_with_input(BenchmarkId::from_parameter(cue_count), &cues, |b, cues| {
            b.iter(|| find_gaps(black_box(cues), black_box(3.0)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_file, bench_find_gaps);
criterion_main!(benches);
