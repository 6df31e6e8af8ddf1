use super::{Cue, clean_text};
use crate::error::{PipelineError, Result};

/// Parse SRT content into cues, sorted by start time.
///
/// Blocks that fail to parse (bad index, malformed timestamp) are skipped
/// individually (best-effort). If the whole file yields no cues, the
/// parser fails with `invalid-subtitles`.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>> {
    let mut entries = Vec::new();

    for block in split_blocks(content) {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 3 {
            continue;
        }

        let Ok(index) = lines[0].trim().parse::<usize>() else {
            continue;
        };

        let Some((start_str, end_str)) = split_arrow(lines[1].trim()) else {
            continue;
        };

        let Some(start) = parse_srt_time(start_str) else {
            continue;
        };
        let Some(end) = parse_srt_time(end_str) else {
            continue;
        };

        let text = clean_text(&lines[2..].join(" "));

        match Cue::new(index, start, end, text) {
            Some(cue) => entries.push(cue),
            None => continue,
        }
    }

    if entries.is_empty() && !content.trim().is_empty() {
        return Err(PipelineError::InvalidSubtitles(
            "no valid SRT cues found".to_string(),
        ));
    }

    entries.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
    Ok(entries)
}

/// Parse WebVTT content into cues, sorted by start time. The `WEBVTT`
/// header block is skipped; the first line of each remaining block
/// containing `-->` is treated as the timing line.
pub fn parse_vtt(content: &str) -> Result<Vec<Cue>> {
    let body = strip_vtt_header(content);
    let mut entries = Vec::new();
    let mut index = 0usize;

    for block in split_blocks(&body) {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.is_empty() {
            continue;
        }

        let Some(time_line_idx) = lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };

        let Some((start_str, end_str)) = split_arrow(lines[time_line_idx].trim()) else {
            continue;
        };

        let Some(start) = parse_vtt_time(start_str) else {
            continue;
        };
        let Some(end) = parse_vtt_time(end_str) else {
            continue;
        };

        let text = clean_text(&lines[(time_line_idx + 1)..].join(" "));

        index += 1;
        match Cue::new(index, start, end, text) {
            Some(cue) => entries.push(cue),
            None => continue,
        }
    }

    if entries.is_empty() && !content.trim().is_empty() {
        return Err(PipelineError::InvalidSubtitles(
            "no valid VTT cues found".to_string(),
        ));
    }

    entries.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
    Ok(entries)
}

/// Dispatch on extension/header, as `parse_file` does at the module root.
pub fn parse_subtitles(filename: &str, content: &str) -> Result<Vec<Cue>> {
    super::parse_file(filename, content)
}

fn split_blocks(content: &str) -> Vec<&str> {
    content
        .trim()
        .split("\n\n")
        .flat_map(|b| b.split("\r\n\r\n"))
        .filter(|b| !b.trim().is_empty())
        .collect()
}

fn strip_vtt_header(content: &str) -> String {
    if let Some(rest) = content.strip_prefix("WEBVTT") {
        if let Some(pos) = rest.find("\n\n") {
            return rest[pos + 2..].to_string();
        }
        if let Some(pos) = rest.find("\r\n\r\n") {
            return rest[pos + 4..].to_string();
        }
        return rest.to_string();
    }
    content.to_string()
}

fn split_arrow(line: &str) -> Option<(&str, &str)> {
    line.split_once("-->")
        .map(|(a, b)| (a.trim(), b.trim().split_whitespace().next().unwrap_or(b.trim())))
}

/// `HH:MM:SS,mmm` / `HH:MM:SS.mmm` / `HH:MM:SS`.
fn parse_srt_time(s: &str) -> Option<f64> {
    let normalized = s.replace(',', ".");
    parse_hms(&normalized)
}

/// `HH:MM:SS.mmm` or short `MM:SS.mmm`.
fn parse_vtt_time(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some(v) = parse_hms(s) {
        return Some(v);
    }
    // short form MM:SS.mmm
    let (mmss, ms) = s.split_once('.')?;
    let mut parts = mmss.split(':');
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let millis: f64 = format!("0.{ms}").parse().ok()?;
    Some(minutes * 60.0 + seconds + millis)
}

fn parse_hms(s: &str) -> Option<f64> {
    let (hms, ms) = match s.split_once('.') {
        Some((hms, ms)) => (hms, Some(ms)),
        None => (s, None),
    };
    let mut parts = hms.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let millis = match ms {
        Some(m) if m.len() == 3 => format!("0.{m}").parse().ok()?,
        Some(_) => return None,
        None => 0.0,
    };
    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello <i>world</i>\n\n2\n00:00:05,500 --> 00:00:07,250\nSecond line\nwraps here\n";

    const SAMPLE_VTT: &str = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:03.000\nHello world\n\n2\n00:05.500 --> 00:07.250\nShort form\n";

    #[test]
    fn parses_srt_basic() {
        let cues = parse_srt(SAMPLE_SRT).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello world");
        assert_eq!(cues[0].start, 1.0);
        assert_eq!(cues[0].end, 3.0);
        assert_eq!(cues[1].text, "Second line wraps here");
    }

    #[test]
    fn parses_vtt_basic_and_short_form() {
        let cues = parse_vtt(SAMPLE_VTT).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].start, 5.5);
        assert_eq!(cues[1].end, 7.25);
    }

    #[test]
    fn skips_malformed_blocks_best_effort() {
        let content = "1\nnot-a-timestamp\nbroken\n\n2\n00:00:01,000 --> 00:00:02,000\nok\n";
        let cues = parse_srt(content).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "ok");
    }

    #[test]
    fn empty_file_yields_invalid_subtitles_error() {
        let content = "1\nbroken\nbroken\n";
        let err = parse_srt(content).unwrap_err();
        assert_eq!(err.kind(), "invalid-subtitles");
    }

    #[test]
    fn dispatches_on_extension_and_header() {
        assert_eq!(
            super::super::parse_file("x.srt", SAMPLE_SRT).unwrap().len(),
            2
        );
        assert_eq!(
            super::super::parse_file("x.vtt", SAMPLE_VTT).unwrap().len(),
            2
        );
        assert_eq!(
            super::super::parse_file("x.txt", SAMPLE_VTT).unwrap().len(),
            2
        );
    }

    #[test]
    fn cues_sorted_by_start() {
        let content = "2\n00:00:05,000 --> 00:00:06,000\nlater\n\n1\n00:00:01,000 --> 00:00:02,000\nearlier\n";
        let cues = parse_srt(content).unwrap();
        assert_eq!(cues[0].text, "earlier");
        assert_eq!(cues[1].text, "later");
    }
}
