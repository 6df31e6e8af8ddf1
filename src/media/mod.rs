//! Media Operator: `ffmpeg`/`ffprobe` subprocess wrappers.
//!
//! All four operations are external-toolchain invocations rather than an
//! in-process codec; the process boundary is the unit of isolation and
//! failure here, same as the teacher's HTTP-origin proxying is the unit
//! of isolation for playlist fetches.

mod encoder;
mod operator;

pub use encoder::HardwareEncoder;
pub use operator::{HlsSegmentInfo, MediaOperator};
