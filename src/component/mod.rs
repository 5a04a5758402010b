//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod media_pipeline;
pub mod preview_generator;
pub mod thumbnail_generator;

pub use media_pipeline::{MediaPipeline, PipelineReport};
pub use preview_generator::PreviewGenerator;
pub use thumbnail_generator::ThumbnailGenerator;
