//! Placement Oracle (C4): two-pass AI decision engine.
//!
//! Pass 1 reasons over the transcript/gap list to propose candidate
//! insertion points; Pass 2 shows a vision-capable model one frame per
//! candidate and picks the best. Both passes and the single-pass/profile
//! variants are dispatched through one `OracleClient` transport, per the
//! `OracleTask` design note — duck-typed methods in the source collapse
//! into typed request/response pairs here.

mod client;
mod prompts;
mod types;

pub use client::OracleClient;
pub use types::{Candidate, Placement, Product, ViewerProfile, VisionSelection};
