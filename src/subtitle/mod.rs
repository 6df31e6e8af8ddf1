//! Subtitle parsing and dialogue-gap detection.
//!
//! Accepts SRT and WebVTT timed text, normalizes both into one `Cue`
//! sequence, and finds inter-cue silences wide enough to host an ad.

mod parser;
mod time;

pub use parser::{parse_srt, parse_vtt, parse_subtitles};
pub use time::{seconds_to_timestamp, timestamp_to_seconds};

use serde::{Deserialize, Serialize};

/// One timed subtitle entry. `start` and `end` are in seconds from media
/// origin; invariant `start < end` is enforced by `Cue::new`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    pub fn new(index: usize, start: f64, end: f64, text: String) -> Option<Self> {
        if start < end {
            Some(Self { index, start, end, text })
        } else {
            None
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A silent interval between two adjacent cues, wide enough to be a
/// candidate ad-placement window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub context_before: String,
    pub context_after: String,
}

/// Strip inline `<...>` markup and collapse embedded newlines into spaces.
fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '\n' => {
                if !in_tag {
                    out.push(' ');
                }
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Parse a subtitle file's contents, dispatching on extension or on the
/// `WEBVTT` header per the spec's format-detection rule.
pub fn parse_file(filename: &str, content: &str) -> crate::error::Result<Vec<Cue>> {
    if filename.to_lowercase().ends_with(".vtt") || content.starts_with("WEBVTT") {
        parse_vtt(content)
    } else {
        parse_srt(content)
    }
}

/// Find gaps between adjacent cues with duration `>= min_gap`, sorted by
/// duration descending. Context windows are bounded to array ends:
/// `context_before` spans `[i-2, i]`, `context_after` spans `[i+1, i+3]`.
pub fn find_gaps(cues: &[Cue], min_gap: f64) -> Vec<Gap> {
    let mut gaps = Vec::new();

    for i in 0..cues.len().saturating_sub(1) {
        let current = &cues[i];
        let next = &cues[i + 1];
        let duration = next.start - current.end;

        if duration >= min_gap {
            let before_start = i.saturating_sub(2);
            let context_before = cues[before_start..=i]
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let after_end = (i + 4).min(cues.len());
            let context_after = cues[(i + 1)..after_end]
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            gaps.push(Gap {
                start: current.end,
                end: next.start,
                duration,
                context_before,
                context_after,
            });
        }
    }

    gaps.sort_by(|a, b| b.duration.partial_cmp(&a.duration).unwrap());
    gaps
}

/// Render the full transcript as `[HH:MM:SS,mmm] text` lines.
pub fn full_transcript(cues: &[Cue]) -> String {
    cues.iter()
        .map(|c| format!("[{}] {}", seconds_to_timestamp(c.start), c.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarized transcript for oracle prompting: the full transcript if the
/// cue count is within `cap`, otherwise every `⌊n/cap⌋`-th cue.
pub fn transcript_summary(cues: &[Cue], cap: usize) -> String {
    if cues.len() <= cap {
        return full_transcript(cues);
    }

    let step = cues.len() / cap;
    let sampled: Vec<&Cue> = cues.iter().step_by(step.max(1)).take(cap).collect();

    sampled
        .iter()
        .map(|c| format!("[{}] {}", seconds_to_timestamp(c.start), c.text))
        .collect::<Vec<_>>()
        .join("\n")
}
