//! Rendering utilities for human-facing report surfaces.

#![forbid(unsafe_code)]

mod markdown;
mod model;

pub use markdown::render_markdown;
pub use model::{RenderableData, RenderableEntry, RenderableReport, RenderableVerdict};
