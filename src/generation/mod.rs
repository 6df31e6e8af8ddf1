//! Generation Client (C5): upload the buffer clip, regenerate it with the
//! product integrated via a v2v provider, download the result.

mod client;
mod prompt;
mod upload;

pub use client::{GenerationClient, GenerationResult};
pub use prompt::build_prompt;
pub use upload::upload_to_temp_hosting;
