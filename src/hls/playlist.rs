use m3u8_rs::Playlist as M3uPlaylist;
use serde::{Deserialize, Serialize};

/// One segment file referenced by a playlist.
///
/// `path` is the file name as it will appear in `#EXTINF`/URI lines
/// (`segment000.ts`, …); `sequence_offset` carries the playlist's
/// `EXT-X-MEDIA-SEQUENCE` base this segment was numbered against, since a
/// merged playlist always restarts at sequence 0 (§4.2).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub path: String,
    pub duration_s: f64,
    pub sequence_offset: usize,
}

/// A parsed or synthesized VOD playlist: ordered segments plus the two
/// scalar header values whose value depends on the segment list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub segments: Vec<Segment>,
    pub target_duration: u64,
    pub media_sequence: usize,
}

impl Playlist {
    pub fn new(segments: Vec<Segment>) -> Self {
        let target_duration = segments
            .iter()
            .map(|s| s.duration_s.ceil() as u64)
            .max()
            .unwrap_or(0);
        Self {
            segments,
            target_duration,
            media_sequence: 0,
        }
    }
}

/// Emit the exact VOD template the spec mandates:
///
/// ```text
/// #EXTM3U
/// #EXT-X-VERSION:3
/// #EXT-X-TARGETDURATION:<ceil(max_seg_duration)>
/// #EXT-X-MEDIA-SEQUENCE:0
/// #EXTINF:<duration_s.fff>,
/// <segment_url>
/// ...
/// #EXT-X-ENDLIST
/// ```
pub fn emit_playlist(playlist: &Playlist) -> String {
    let mut out = String::new();
    out.push_str("#EXTM3U\n");
    out.push_str("#EXT-X-VERSION:3\n");
    out.push_str(&format!(
        "#EXT-X-TARGETDURATION:{}\n",
        playlist.target_duration
    ));
    out.push_str(&format!(
        "#EXT-X-MEDIA-SEQUENCE:{}\n",
        playlist.media_sequence
    ));
    for seg in &playlist.segments {
        out.push_str(&format!("#EXTINF:{:.3},\n", seg.duration_s));
        out.push_str(&seg.path);
        out.push('\n');
    }
    out.push_str("#EXT-X-ENDLIST\n");
    out
}

/// Forgiving playlist parse built on `m3u8-rs`: unknown tags are carried by
/// the parser rather than aborting, and per-segment `EXTINF` durations are
/// read verbatim (never assume uniform `target_duration` slicing). A
/// master playlist or a parse failure both resolve to an empty playlist —
/// this crate only ever hands itself VOD media playlists it wrote or
/// segmented itself.
pub fn parse_playlist(content: &str) -> Playlist {
    let media = match m3u8_rs::parse_playlist_res(content.as_bytes()) {
        Ok(M3uPlaylist::MediaPlaylist(media)) => media,
        _ => return Playlist::new(Vec::new()),
    };

    let media_sequence = media.media_sequence as usize;
    let segments = media
        .segments
        .into_iter()
        .enumerate()
        .map(|(index, seg)| Segment {
            index,
            path: seg.uri,
            duration_s: seg.duration as f64,
            sequence_offset: media_sequence,
        })
        .collect();

    Playlist {
        segments,
        target_duration: media.target_duration.ceil() as u64,
        media_sequence,
    }
}

/// Locate the original-segment index range `[a, b)` covering `[t0, t1)`,
/// reading actual per-segment durations rather than assuming uniform
/// `target_duration` slicing (§9 Design Notes, segment-index Open
/// Question). `a` is the segment containing `t0`; `b` is one past the
/// segment containing `t1`.
pub fn segment_range_for(segments: &[Segment], t0: f64, t1: f64) -> (usize, usize) {
    if segments.is_empty() {
        return (0, 0);
    }
    let a = segment_index_at(segments, t0);
    let b = (segment_index_at(segments, t1) + 1).min(segments.len());
    (a, b.max(a))
}

fn segment_index_at(segments: &[Segment], t: f64) -> usize {
    let mut acc = 0.0;
    for (i, seg) in segments.iter().enumerate() {
        acc += seg.duration_s;
        if acc > t {
            return i;
        }
    }
    segments.len() - 1
}

/// Splice operation (§4.2): replace `O[a..b)` with `E[0..K)`, renumbering
/// the merged sequence `segment000.ts, segment001.ts, …`. `K` may differ
/// from `b - a`. Returns the merged, renumbered segment list; the caller
/// is responsible for the corresponding file copy/rename.
pub fn splice(original: &[Segment], edited: &[Segment], a: usize, b: usize) -> Vec<Segment> {
    let n = original.len();
    let a = a.min(n);
    let b = b.clamp(a, n);

    let mut merged: Vec<Segment> = Vec::with_capacity(a + edited.len() + (n - b));
    merged.extend_from_slice(&original[..a]);
    merged.extend_from_slice(edited);
    merged.extend_from_slice(&original[b..]);

    for (i, seg) in merged.iter_mut().enumerate() {
        seg.index = i;
        seg.path = format!("segment{i:03}.ts");
        seg.sequence_offset = 0;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(i: usize, dur: f64) -> Segment {
        Segment {
            index: i,
            path: format!("segment{i:03}.ts"),
            duration_s: dur,
            sequence_offset: 0,
        }
    }

    #[test]
    fn emit_matches_exact_template() {
        let playlist = Playlist::new(vec![seg(0, 9.5), seg(1, 10.0)]);
        let out = emit_playlist(&playlist);
        assert_eq!(
            out,
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:10\n#EXT-X-MEDIA-SEQUENCE:0\n#EXTINF:9.500,\nsegment000.ts\n#EXTINF:10.000,\nsegment001.ts\n#EXT-X-ENDLIST\n"
        );
    }

    #[test]
    fn parse_round_trips_emit() {
        let playlist = Playlist::new(vec![seg(0, 9.5), seg(1, 10.0)]);
        let text = emit_playlist(&playlist);
        let parsed = parse_playlist(&text);
        assert_eq!(parsed.segments.len(), 2);
        assert_eq!(parsed.segments[0].duration_s, 9.5);
        assert_eq!(parsed.segments[1].path, "segment001.ts");
    }

    #[test]
    fn parse_ignores_unknown_tags() {
        let content = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-SOMETHING:weird\n#EXTINF:5.000,\nsegment000.ts\n#EXT-X-ENDLIST\n";
        let playlist = parse_playlist(content);
        assert_eq!(playlist.segments.len(), 1);
        assert_eq!(playlist.segments[0].duration_s, 5.0);
    }

    #[test]
    fn splice_identity_when_edited_matches_original_range() {
        let original = vec![seg(0, 10.0), seg(1, 10.0), seg(2, 10.0)];
        let edited = vec![original[1].clone()];
        let merged = splice(&original, &edited, 1, 2);
        assert_eq!(merged.len(), original.len());
        for (m, o) in merged.iter().zip(original.iter()) {
            assert_eq!(m.duration_s, o.duration_s);
        }
    }

    #[test]
    fn splice_renumbers_and_changes_length() {
        let original: Vec<Segment> = (0..5).map(|i| seg(i, 10.0)).collect();
        let edited: Vec<Segment> = (0..2).map(|i| seg(i, 10.0)).collect();
        // replace segments [1,4) (3 segments) with 2 edited segments
        let merged = splice(&original, &edited, 1, 4);
        assert_eq!(merged.len(), 1 + 2 + 1);
        let names: Vec<&str> = merged.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "segment000.ts",
                "segment001.ts",
                "segment002.ts",
                "segment003.ts"
            ]
        );
    }

    #[test]
    fn splice_count_formula_holds() {
        let n = 10;
        let k = 4;
        let (a, b) = (3usize, 7usize);
        let original: Vec<Segment> = (0..n).map(|i| seg(i, 10.0)).collect();
        let edited: Vec<Segment> = (0..k).map(|i| seg(i, 7.5)).collect();
        let merged = splice(&original, &edited, a, b);
        assert_eq!(merged.len(), a + k + (n - b));
    }
}
