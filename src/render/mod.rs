//! Frame production: per-slide renderers, the slide timeline, and job streaming.

/// Owned RGB8 frame buffers.
pub mod frame;
/// Job streaming into frame sinks.
pub mod pipeline;
/// Per-slide frame generation.
pub mod slide;
/// Back-to-back slide sequencing.
pub mod timeline;
