//! Encoder adapters.
//!
//! Sinks consume rendered frames in timeline order and are driven by [`crate::render_job`].

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
