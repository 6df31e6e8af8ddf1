//! HLS playlist emission, forgiving parsing, and segment splicing.

pub mod playlist;

pub use playlist::{Playlist, Segment, emit_playlist, parse_playlist, segment_range_for, splice};
